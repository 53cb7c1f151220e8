//! Capability contracts an endpoint type may implement.
//!
//! Implementing a trait is half of the declaration: the endpoint also lists the contract
//! (see [`Capabilities`](super::Capabilities) or `#[derive(Endpoint)]`), and the listing
//! only compiles when the trait is implemented.

use courier_domain::{Container, Hook, MessageEndpoint, Order, Severity, TypeRef};
use std::path::PathBuf;
use std::sync::Arc;

/// Name used for the installed service instead of the endpoint type's name.
pub trait EndpointName {
    fn endpoint_name(&self) -> String;
}

/// Explicit set of types to configure.
pub trait TypesToScan {
    fn types_to_scan(&self) -> Vec<TypeRef>;
}

/// Assemblies (crates/modules) whose types are configured.
pub trait AssembliesToScan {
    fn assemblies_to_scan(&self) -> Vec<String>;
}

/// Directory whose assemblies are loaded and scanned.
pub trait ProbeDirectory {
    fn probe_directory(&self) -> PathBuf;
}

/// Additional code run at startup.
pub trait StartupAction {
    fn startup_action(&self) -> Hook;
}

/// Container type built for dependency injection.
pub trait ContainerTypeToUse<T: Container + Default> {}

/// Ready container instance used for dependency injection.
pub trait ContainerInstanceToUse {
    type Container: Container;

    fn container_instance(&self) -> Arc<Self::Container>;
}

/// Endpoint type run once configuration completes.
pub trait ToRun<T: MessageEndpoint + Default> {}

/// Use the XML serializer.
pub trait ToUseXmlSerialization {}

/// Namespace for the XML serializer.
pub trait XmlSerializationNamespace {
    fn namespace(&self) -> String;
}

/// Serialization is configured by the endpoint itself, from its custom initialization.
pub trait MyOwnSerialization: WantCustomInitialization {}

/// Saga persistence is configured by the endpoint itself, from its custom initialization.
pub trait MyOwnSagaPersistence: WantCustomInitialization {}

/// Endpoint-provided initialization, run after logging is in place.
pub trait WantCustomInitialization: Send + Sync + 'static {
    fn init(&self);
}

/// Logging is configured by the endpoint itself.
pub trait MyOwnLoggingConfiguration: Send + Sync + 'static {
    fn configure_logging(&self);
}

/// Severity threshold for the host logger.
pub trait LoggingLevel {
    fn level(&self) -> Severity;
}

/// Order in which message handlers are invoked.
pub trait MessageHandlerOrdering {
    fn specify_order(&self, order: &mut Order);
}

/// Use NHibernate-backed subscription storage.
pub trait ToUseNHibernateSubscriptionStorage {}
