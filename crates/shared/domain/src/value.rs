use crate::contract::ValueKind;
use crate::types::{ContainerRef, EndpointType, HandlerOrdering, Hook, Severity, TypeRef};
use std::path::PathBuf;

/// A value extracted from an endpoint type for one contract.
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityValue {
    /// Marker contracts: presence only.
    Present,
    Text(String),
    Path(PathBuf),
    Types(Vec<TypeRef>),
    Names(Vec<String>),
    Container(ContainerRef),
    Endpoint(EndpointType),
    Severity(Severity),
    Ordering(HandlerOrdering),
    Hook(Hook),
}

impl CapabilityValue {
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Present => ValueKind::Present,
            Self::Text(_) => ValueKind::Text,
            Self::Path(_) => ValueKind::Path,
            Self::Types(_) => ValueKind::Types,
            Self::Names(_) => ValueKind::Names,
            Self::Container(_) => ValueKind::Container,
            Self::Endpoint(_) => ValueKind::Endpoint,
            Self::Severity(_) => ValueKind::Severity,
            Self::Ordering(_) => ValueKind::Ordering,
            Self::Hook(_) => ValueKind::Hook,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for CapabilityValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CapabilityValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Severity> for CapabilityValue {
    fn from(value: Severity) -> Self {
        Self::Severity(value)
    }
}

impl From<PathBuf> for CapabilityValue {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}
