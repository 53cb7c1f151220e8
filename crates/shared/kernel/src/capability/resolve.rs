use crate::capability::candidate::ConfigureThisEndpoint;
use crate::capability::merger::merge;
use crate::capability::probe::{construct, detect_instance};
use crate::capability::publisher::{ConfigurationPublisher, PublishedHandle};
use crate::capability::registry::CapabilityRegistry;
use crate::capability::validator::validate;
use crate::error::ResolveError;
use courier_domain::{EffectiveConfiguration, TypeRef};
use std::sync::Arc;
use tracing::{info, instrument};

/// Detects, validates and merges the capabilities of `E` into its effective configuration.
///
/// The registry and the endpoint type are the only inputs: resolving twice gives equal
/// results.
///
/// # Errors
/// Returns [`ResolveError::Probe`] or [`ResolveError::Conflict`].
pub fn resolve<E: ConfigureThisEndpoint>(
    registry: &CapabilityRegistry,
) -> Result<EffectiveConfiguration, ResolveError> {
    let instance = construct::<E>()?;
    resolve_instance(&instance, registry)
}

/// Like [`resolve`], for an endpoint instance the caller already built.
///
/// # Errors
/// Returns [`ResolveError::Probe`] or [`ResolveError::Conflict`].
#[instrument(skip_all, fields(endpoint = std::any::type_name::<E>()))]
pub fn resolve_instance<E: ConfigureThisEndpoint>(
    instance: &Arc<E>,
    registry: &CapabilityRegistry,
) -> Result<EffectiveConfiguration, ResolveError> {
    let detected = detect_instance(instance, registry)?;
    validate(&detected, registry)?;
    Ok(merge(&detected, registry, TypeRef::of::<E>()))
}

/// Resolves `E` and publishes the result before any subsystem starts.
///
/// # Errors
/// Any resolution error, or [`ResolveError::AlreadyPublished`] if `publisher` already
/// holds a configuration.
#[instrument(skip_all, fields(endpoint = std::any::type_name::<E>()))]
pub fn bootstrap<E: ConfigureThisEndpoint>(
    registry: &CapabilityRegistry,
    publisher: &ConfigurationPublisher,
) -> Result<PublishedHandle, ResolveError> {
    let config = resolve::<E>(registry)?;
    info!(
        endpoint = config.endpoint_name(),
        resolved = config.resolved_contracts().bits().count_ones(),
        "Endpoint configuration resolved"
    );
    publisher.publish(config)
}
