//! Capability detection and configuration resolution.
//!
//! An endpoint type declares which contracts it satisfies. Resolution detects them against
//! the [`CapabilityRegistry`], validates the cross-contract rules, merges the result with
//! registry defaults and publishes one immutable [`EffectiveConfiguration`](courier_domain::EffectiveConfiguration).
//!
//! ```text
//! detect -> validate -> merge -> publish
//! ```

mod candidate;
pub mod contracts;
mod merger;
mod probe;
mod publisher;
mod registry;
mod resolve;
mod validator;

pub use candidate::{Capabilities, ConfigureThisEndpoint, Declared, Extractor};
pub use merger::merge;
pub use probe::{DetectedCapabilities, DetectedCapability, construct, detect, detect_instance};
pub use publisher::{ConfigurationPublisher, PublishedHandle, current, publish};
pub use registry::{
    CapabilityContract, CapabilityRegistry, ContractDefault, Dependency, ExclusionGroup,
    PrecedenceGroup, Strength,
};
pub use resolve::{bootstrap, resolve, resolve_instance};
pub use validator::{Violation, Violations, validate, violations};
