use crate::contract::{ContractId, ContractSet, GroupId};
use crate::types::{ContainerRef, EndpointType, HandlerOrdering, Hook, Severity, TypeRef};
use crate::value::CapabilityValue;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;
use strum_macros::Display;

/// Serializer the transport engine is told to use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum SerializationChoice {
    Xml,
    Custom,
    #[default]
    FrameworkDefault,
}

/// Saga and subscription persistence strategy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum PersistenceChoice {
    Custom,
    NHibernate,
    #[default]
    FrameworkDefault,
}

/// Container the bootstrap step wires up.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum ContainerKind {
    #[default]
    Default,
    Selected(ContainerRef),
}

/// Where endpoint types are discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScanSource {
    Types(Vec<TypeRef>),
    Assemblies(Vec<String>),
    Directory(PathBuf),
}

impl Default for ScanSource {
    fn default() -> Self {
        Self::Directory(PathBuf::from("."))
    }
}

/// Name used when installing and addressing the endpoint.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub enum EndpointNameOverride {
    Explicit(String),
    #[default]
    TypeName,
}

/// How one registered contract was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Read from the endpoint type.
    Detected(CapabilityValue),
    /// Registry default.
    Default(CapabilityValue),
    /// No value and no default; the consumer treats the capability as absent.
    Unset,
    /// No member of the group was detected; the group's fallback applies.
    Fallback(GroupId),
    /// Detected but outranked by another member of a precedence group.
    Shadowed { value: CapabilityValue, winner: ContractId },
    /// Detected but ignored because a required contract is missing.
    Suppressed { value: CapabilityValue, missing: ContractId },
}

impl Resolution {
    /// Returns `true` when the detected value is the one in effect.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Detected(_))
    }

    /// The value in effect, if any.
    #[must_use]
    pub const fn effective_value(&self) -> Option<&CapabilityValue> {
        match self {
            Self::Detected(value) | Self::Default(value) => Some(value),
            _ => None,
        }
    }
}

/// A non-fatal note produced while resolving, replayed once logging is up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub contract: ContractId,
    pub message: String,
}

/// The fully resolved endpoint configuration.
#[derive(Debug, Clone)]
pub struct EffectiveConfigurationInner {
    /// The endpoint type the configuration was resolved from.
    pub endpoint: TypeRef,
    pub endpoint_name: EndpointNameOverride,
    pub scan: ScanSource,
    pub serialization: SerializationChoice,
    pub xml_namespace: String,
    pub container: ContainerKind,
    pub persistence: PersistenceChoice,
    pub logging_level: Severity,
    pub custom_logging: Option<Hook>,
    pub handler_ordering: HandlerOrdering,
    pub startup_action: Option<Hook>,
    pub custom_initialization: Option<Hook>,
    pub run: Option<EndpointType>,
    /// One entry per registered contract.
    pub resolutions: BTreeMap<ContractId, Resolution>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Immutable, cheaply clonable handle to the resolved configuration.
///
/// There is intentionally no `DerefMut`: once built, the configuration never changes.
#[derive(Debug, Clone)]
pub struct EffectiveConfiguration {
    inner: Arc<EffectiveConfigurationInner>,
}

impl EffectiveConfiguration {
    #[must_use]
    pub fn new(inner: EffectiveConfigurationInner) -> Self {
        Self { inner: Arc::new(inner) }
    }

    /// The endpoint name: the explicit override or the endpoint type's short name.
    #[must_use]
    pub fn endpoint_name(&self) -> &str {
        match &self.inner.endpoint_name {
            EndpointNameOverride::Explicit(name) => name,
            EndpointNameOverride::TypeName => self.inner.endpoint.short_name(),
        }
    }

    #[must_use]
    pub fn custom_logging_configured(&self) -> bool {
        self.inner.custom_logging.is_some()
    }

    #[must_use]
    pub fn resolution(&self, id: ContractId) -> Option<&Resolution> {
        self.inner.resolutions.get(&id)
    }

    /// Contracts whose detected value is in effect.
    #[must_use]
    pub fn resolved_contracts(&self) -> ContractSet {
        self.inner
            .resolutions
            .iter()
            .filter(|(_, resolution)| resolution.is_resolved())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Returns `true` when both handles point at the same published record.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Deref for EffectiveConfiguration {
    type Target = EffectiveConfigurationInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
