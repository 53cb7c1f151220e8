//! # Domain Models
//!
//! Pure data for the endpoint host: the closed catalog of capability contracts, the values
//! they carry, the resolved [`EffectiveConfiguration`], and operator [`HostSettings`].
//! Keep it lean: no I/O and no resolution logic, just data and simple helpers.

pub mod config;
pub mod contract;
pub mod effective;
pub mod types;
pub mod value;

pub use config::{HostSettings, HostSettingsInner, LoggingSettings, ScanSourceKind};
pub use contract::{ContractId, ContractSet, ContractShape, GroupId, ValueKind};
pub use effective::{
    ContainerKind, Diagnostic, EffectiveConfiguration, EffectiveConfigurationInner,
    EndpointNameOverride, PersistenceChoice, Resolution, ScanSource, SerializationChoice,
};
pub use types::{
    Container, ContainerRef, EndpointType, HandlerOrdering, Hook, MessageEndpoint, Order,
    Severity, TypeRef,
};
pub use value::CapabilityValue;
