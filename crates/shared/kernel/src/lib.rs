//! Endpoint configuration kernel.
//!
//! Resolves which capability contracts an endpoint type satisfies into one immutable,
//! published [`EffectiveConfiguration`](domain::EffectiveConfiguration), and loads the
//! operator settings that shape the registry defaults.
//!
//! ## Declaring an endpoint
//! ```rust
//! use courier_kernel::prelude::*;
//!
//! #[derive(Default)]
//! struct Orders;
//!
//! impl EndpointName for Orders {
//!     fn endpoint_name(&self) -> String {
//!         "orders".to_owned()
//!     }
//! }
//!
//! impl ToUseXmlSerialization for Orders {}
//!
//! impl ConfigureThisEndpoint for Orders {
//!     fn create() -> Self {
//!         Self
//!     }
//!
//!     fn declare(capabilities: &mut Capabilities<Self>) {
//!         capabilities.endpoint_name().xml_serialization();
//!     }
//! }
//!
//! let registry = CapabilityRegistry::standard(&HostSettings::default()).unwrap();
//! let config = resolve::<Orders>(&registry).unwrap();
//! assert_eq!(config.endpoint_name(), "orders");
//! assert_eq!(config.serialization, SerializationChoice::Xml);
//! ```
pub mod capability;
pub mod config;
pub mod error;
pub mod prelude;

pub use courier_domain as domain;
pub use error::ResolveError;
