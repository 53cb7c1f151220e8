//! # Courier Host
//!
//! Starts a message endpoint from its declared capabilities: resolves and publishes the
//! effective configuration, then runs the bootstrap steps that consume it.
//!
//! ## Example
//! ```no_run
//! use courier_host::Host;
//! use courier_kernel::prelude::*;
//!
//! #[derive(Default, Endpoint)]
//! #[endpoint(EndpointName)]
//! struct Orders;
//!
//! impl EndpointName for Orders {
//!     fn endpoint_name(&self) -> String {
//!         "orders".to_owned()
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let host = Host::builder().start::<Orders>()?;
//!     host.shutdown();
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use courier_domain::{
    Container, ContainerKind, EffectiveConfiguration, HostSettings, MessageEndpoint,
};
use courier_kernel::capability::{
    CapabilityRegistry, ConfigurationPublisher, ConfigureThisEndpoint, PublishedHandle, bootstrap,
};
use courier_logger::Logger;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Container wired up when the endpoint does not pick one.
#[derive(Debug, Default)]
pub struct DefaultContainer;

impl Container for DefaultContainer {
    fn name(&self) -> &str {
        "default"
    }
}

/// A fluent builder for configuring and starting a [`Host`].
#[must_use = "builders do nothing unless you call .start()"]
#[derive(Debug)]
pub struct HostBuilder<'p> {
    settings: HostSettings,
    publisher: &'p ConfigurationPublisher,
    install_logger: bool,
}

impl<'p> HostBuilder<'p> {
    pub fn settings(mut self, settings: HostSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Publishes into `publisher` instead of the process-wide one.
    pub fn publisher<'q>(self, publisher: &'q ConfigurationPublisher) -> HostBuilder<'q> {
        HostBuilder { settings: self.settings, publisher, install_logger: self.install_logger }
    }

    /// Whether the host installs its own logger when the endpoint does not configure
    /// logging itself. On by default.
    pub const fn install_logger(mut self, enabled: bool) -> Self {
        self.install_logger = enabled;
        self
    }

    /// Resolves `E`, publishes its configuration and runs the bootstrap steps.
    ///
    /// # Process
    /// 1. Builds the capability registry from the host settings
    /// 2. Resolves and publishes the endpoint configuration
    /// 3. Sets up logging (the endpoint's own, or the host logger) and replays diagnostics
    /// 4. Runs the endpoint's custom initialization
    /// 5. Materializes the container and logs the bootstrap plan
    /// 6. Runs the startup action
    /// 7. Builds and starts the endpoint to run
    ///
    /// # Errors
    /// Returns an error if the settings are invalid, resolution fails, a configuration is
    /// already published, or the host logger cannot be installed.
    pub fn start<E: ConfigureThisEndpoint>(self) -> Result<Host> {
        let registry = CapabilityRegistry::standard(&self.settings)
            .context("Host settings do not produce a valid capability registry")?;
        let config = bootstrap::<E>(&registry, self.publisher)
            .context("Failed to resolve the endpoint configuration")?;

        let logger = self.init_logging(&config)?;
        for diagnostic in &config.diagnostics {
            warn!(contract = %diagnostic.contract, "{}", diagnostic.message);
        }

        if let Some(init) = &config.custom_initialization {
            debug!("Running custom initialization");
            init.call();
        }

        let container = materialize(&config);
        log_plan(&config, container.as_ref());

        if let Some(action) = &config.startup_action {
            debug!("Running startup action");
            action.call();
        }

        let endpoint = config.run.map(|run| {
            info!(endpoint = %run.type_ref(), "Starting endpoint");
            let endpoint = run.build();
            endpoint.start();
            endpoint
        });

        info!(endpoint = config.endpoint_name(), "Host started");
        Ok(Host { config, container, endpoint, _logger: logger })
    }

    fn init_logging(&self, config: &EffectiveConfiguration) -> Result<Option<Logger>> {
        if let Some(configure) = &config.custom_logging {
            configure.call();
            debug!("Endpoint configured logging itself");
            return Ok(None);
        }
        if !self.install_logger {
            return Ok(None);
        }

        let logger = Logger::builder(config.endpoint_name())
            .settings(&self.settings.logging, config.logging_level)
            .init()
            .context("Failed to install the host logger")?;
        Ok(Some(logger))
    }
}

/// A started endpoint host.
///
/// Dropping it stops the running endpoint.
#[must_use = "dropping the host stops the endpoint"]
#[derive(Debug)]
pub struct Host {
    config: PublishedHandle,
    container: Arc<dyn Container>,
    endpoint: Option<Box<dyn MessageEndpoint>>,
    _logger: Option<Logger>,
}

impl Host {
    /// A builder publishing into the process-wide publisher, with default settings.
    pub fn builder() -> HostBuilder<'static> {
        HostBuilder {
            settings: HostSettings::default(),
            publisher: ConfigurationPublisher::global(),
            install_logger: true,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &PublishedHandle {
        &self.config
    }

    #[must_use]
    pub fn container(&self) -> &dyn Container {
        self.container.as_ref()
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Stops the running endpoint, if any.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(endpoint) = self.endpoint.take() {
            info!(endpoint = self.config.endpoint_name(), "Stopping endpoint");
            endpoint.stop();
        }
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        self.stop();
    }
}

fn materialize(config: &EffectiveConfiguration) -> Arc<dyn Container> {
    match &config.container {
        ContainerKind::Selected(selected) => selected.materialize(),
        ContainerKind::Default => Arc::new(DefaultContainer),
    }
}

fn log_plan(config: &EffectiveConfiguration, container: &dyn Container) {
    info!(
        endpoint = config.endpoint_name(),
        container = container.name(),
        serialization = %config.serialization,
        xml_namespace = %config.xml_namespace,
        persistence = %config.persistence,
        scan = ?config.scan,
        ordering = ?config.handler_ordering,
        "Bootstrap plan"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_domain::SerializationChoice;
    use courier_kernel::capability::Capabilities;
    use courier_kernel::capability::contracts::{
        MyOwnLoggingConfiguration, MyOwnSerialization, StartupAction, ToRun,
        ToUseXmlSerialization, WantCustomInitialization,
    };
    use courier_kernel::domain::Hook;
    use std::sync::Mutex;

    static STEPS: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

    fn record(step: &'static str) {
        STEPS.lock().unwrap().push(step);
    }

    #[derive(Debug, Default)]
    struct Listener;

    impl MessageEndpoint for Listener {
        fn start(&self) {
            record("start");
        }

        fn stop(&self) {
            record("stop");
        }
    }

    struct Ordered;

    impl MyOwnLoggingConfiguration for Ordered {
        fn configure_logging(&self) {
            record("logging");
        }
    }

    impl WantCustomInitialization for Ordered {
        fn init(&self) {
            record("init");
        }
    }

    impl StartupAction for Ordered {
        fn startup_action(&self) -> Hook {
            Hook::new(|| record("startup"))
        }
    }

    impl ToRun<Listener> for Ordered {}

    impl ConfigureThisEndpoint for Ordered {
        fn create() -> Self {
            Self
        }

        fn declare(capabilities: &mut Capabilities<Self>) {
            capabilities
                .my_own_logging()
                .custom_initialization()
                .startup_action()
                .to_run::<Listener>();
        }
    }

    struct Conflicted;

    impl MyOwnSerialization for Conflicted {}
    impl ToUseXmlSerialization for Conflicted {}
    impl WantCustomInitialization for Conflicted {
        fn init(&self) {}
    }

    impl ConfigureThisEndpoint for Conflicted {
        fn create() -> Self {
            Self
        }

        fn declare(capabilities: &mut Capabilities<Self>) {
            capabilities.my_own_serialization().xml_serialization().custom_initialization();
        }
    }

    struct Quiet;

    impl ConfigureThisEndpoint for Quiet {
        fn create() -> Self {
            Self
        }

        fn declare(_: &mut Capabilities<Self>) {}
    }

    #[test]
    fn bootstrap_steps_run_in_order() {
        let publisher = ConfigurationPublisher::new();
        let host = Host::builder().publisher(&publisher).start::<Ordered>().unwrap();
        assert!(host.is_running());
        host.shutdown();

        assert_eq!(*STEPS.lock().unwrap(), ["logging", "init", "startup", "start", "stop"]);
        assert!(publisher.is_published());
    }

    #[test]
    fn defaults_use_the_default_container() {
        let publisher = ConfigurationPublisher::new();
        let host = Host::builder()
            .publisher(&publisher)
            .install_logger(false)
            .start::<Quiet>()
            .unwrap();

        assert_eq!(host.container().name(), "default");
        assert!(!host.is_running());
        assert_eq!(host.config().serialization, SerializationChoice::FrameworkDefault);
        assert!(host.config().same_as(&publisher.current().unwrap()));
    }

    #[test]
    fn conflicts_stop_the_host_before_publication() {
        let publisher = ConfigurationPublisher::new();
        let err = Host::builder()
            .publisher(&publisher)
            .install_logger(false)
            .start::<Conflicted>()
            .unwrap_err();

        assert!(format!("{err:#}").contains("Capability conflict"), "{err:#}");
        assert!(!publisher.is_published());
    }

    #[test]
    fn second_start_on_one_publisher_fails() {
        let publisher = ConfigurationPublisher::new();
        let _first = Host::builder()
            .publisher(&publisher)
            .install_logger(false)
            .start::<Quiet>()
            .unwrap();

        let err = Host::builder()
            .publisher(&publisher)
            .install_logger(false)
            .start::<Quiet>()
            .unwrap_err();
        assert!(format!("{err:#}").contains("already published"), "{err:#}");
    }
}
