use crate::error::ResolveError;
use courier_domain::EffectiveConfiguration;
use std::ops::Deref;
use std::sync::OnceLock;
use tracing::{info, warn};

static GLOBAL: ConfigurationPublisher = ConfigurationPublisher::new();

/// Write-once slot for the effective configuration.
///
/// Publication is atomic: readers see either nothing or the complete record, never a
/// partial one. A second `publish` is rejected and the first value stays in place.
#[derive(Debug, Default)]
pub struct ConfigurationPublisher {
    slot: OnceLock<EffectiveConfiguration>,
}

impl ConfigurationPublisher {
    #[must_use]
    pub const fn new() -> Self {
        Self { slot: OnceLock::new() }
    }

    /// The process-wide publisher used by [`publish`] and [`current`].
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Publishes `config` for every subsystem to read.
    ///
    /// # Errors
    /// Returns [`ResolveError::AlreadyPublished`] if a configuration is already in place.
    pub fn publish(&self, config: EffectiveConfiguration) -> Result<PublishedHandle, ResolveError> {
        let endpoint = config.endpoint_name().to_owned();
        if let Err(rejected) = self.slot.set(config) {
            warn!(endpoint = rejected.endpoint_name(), "Configuration was already published");
            return Err(ResolveError::AlreadyPublished { context: None });
        }
        info!(%endpoint, "Configuration published");
        self.current()
    }

    /// The published configuration.
    ///
    /// # Errors
    /// Returns [`ResolveError::NotPublished`] before the first successful `publish`.
    pub fn current(&self) -> Result<PublishedHandle, ResolveError> {
        self.slot
            .get()
            .cloned()
            .map(PublishedHandle)
            .ok_or_else(|| ResolveError::NotPublished { context: None })
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.slot.get().is_some()
    }
}

/// Read access to the published configuration. Clones share the same record.
#[derive(Debug, Clone)]
pub struct PublishedHandle(EffectiveConfiguration);

impl PublishedHandle {
    #[must_use]
    pub fn configuration(&self) -> &EffectiveConfiguration {
        &self.0
    }
}

impl Deref for PublishedHandle {
    type Target = EffectiveConfiguration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Publishes to the process-wide publisher.
///
/// # Errors
/// See [`ConfigurationPublisher::publish`].
pub fn publish(config: EffectiveConfiguration) -> Result<PublishedHandle, ResolveError> {
    ConfigurationPublisher::global().publish(config)
}

/// Reads from the process-wide publisher.
///
/// # Errors
/// See [`ConfigurationPublisher::current`].
pub fn current() -> Result<PublishedHandle, ResolveError> {
    ConfigurationPublisher::global().current()
}
