use anyhow::Context;
use courier_host::Host;
use courier_kernel::config::load_config;
use courier_kernel::prelude::*;
use tracing::info;

/// Message type scanned by the demo endpoint.
#[allow(dead_code)]
struct Ping;

#[derive(Debug, Default)]
struct Heartbeat;

impl MessageEndpoint for Heartbeat {
    fn start(&self) {
        info!("Heartbeat endpoint listening");
    }

    fn stop(&self) {
        info!("Heartbeat endpoint stopped");
    }
}

#[derive(Default, Endpoint)]
#[endpoint(
    EndpointName,
    TypesToScan,
    ToUseXmlSerialization,
    XmlSerializationNamespace,
    WantCustomInitialization,
    StartupAction,
    ToRun<Heartbeat>
)]
struct DemoEndpoint;

impl EndpointName for DemoEndpoint {
    fn endpoint_name(&self) -> String {
        "courier-demo".to_owned()
    }
}

impl TypesToScan for DemoEndpoint {
    fn types_to_scan(&self) -> Vec<TypeRef> {
        vec![TypeRef::of::<Ping>()]
    }
}

impl ToUseXmlSerialization for DemoEndpoint {}

impl XmlSerializationNamespace for DemoEndpoint {
    fn namespace(&self) -> String {
        "urn:courier:demo".to_owned()
    }
}

impl WantCustomInitialization for DemoEndpoint {
    fn init(&self) {
        info!("Demo endpoint initializing");
    }
}

impl StartupAction for DemoEndpoint {
    fn startup_action(&self) -> Hook {
        Hook::new(|| info!("Demo startup action ran"))
    }
}

impl ToRun<Heartbeat> for DemoEndpoint {}

fn main() -> anyhow::Result<()> {
    let settings: HostSettings = load_config(std::env::args().nth(1))
        .context("Critical: host settings are malformed")?;

    Host::builder().settings(settings).start::<DemoEndpoint>()?.shutdown();
    Ok(())
}
