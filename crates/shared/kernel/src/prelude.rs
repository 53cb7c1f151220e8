pub use crate::capability::contracts::*;
pub use crate::capability::{
    Capabilities, CapabilityRegistry, ConfigurationPublisher, ConfigureThisEndpoint,
    PublishedHandle, bootstrap, resolve,
};
pub use crate::error::ResolveError;
pub use courier_derive::Endpoint;
pub use courier_domain::{
    Container, EffectiveConfiguration, HostSettings, Hook, MessageEndpoint, Order,
    PersistenceChoice, ScanSource, SerializationChoice, Severity, TypeRef,
};
