use courier_kernel::capability::{CapabilityRegistry, Violation, resolve};
use courier_kernel::domain::{
    ContainerKind, ContractId, EndpointNameOverride, GroupId, HostSettingsInner, Resolution,
    ScanSourceKind,
};
use courier_kernel::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn registry() -> CapabilityRegistry {
    CapabilityRegistry::standard(&HostSettings::default()).unwrap()
}

#[derive(Debug, Default)]
struct StructureMap;

impl Container for StructureMap {
    fn name(&self) -> &str {
        "structure-map"
    }
}

struct PlaceOrder;

#[derive(Default, Endpoint)]
#[endpoint(EndpointName)]
struct Orders;

impl EndpointName for Orders {
    fn endpoint_name(&self) -> String {
        "OrdersEndpoint".to_owned()
    }
}

#[test]
fn explicit_name_with_framework_defaults() {
    let config = resolve::<Orders>(&registry()).unwrap();

    assert_eq!(config.endpoint_name, EndpointNameOverride::Explicit("OrdersEndpoint".to_owned()));
    assert_eq!(config.endpoint_name(), "OrdersEndpoint");
    assert_eq!(config.serialization, SerializationChoice::FrameworkDefault);
    assert_eq!(config.container, ContainerKind::Default);
    assert_eq!(config.resolved_contracts().ids().collect::<Vec<_>>(), vec![ContractId::EndpointName]);
}

#[derive(Default, Endpoint)]
#[endpoint(MyOwnSerialization, ToUseXmlSerialization, WantCustomInitialization)]
struct Confused;

impl MyOwnSerialization for Confused {}
impl ToUseXmlSerialization for Confused {}
impl WantCustomInitialization for Confused {
    fn init(&self) {}
}

#[test]
fn two_serializers_conflict() {
    let err = resolve::<Confused>(&registry()).unwrap_err();

    let ResolveError::Conflict { violations, .. } = &err else {
        panic!("expected conflict, got {err:?}");
    };
    assert_eq!(
        violations.as_slice(),
        &[Violation::Exclusive {
            group: GroupId::SerializationGroup,
            offending: vec![ContractId::ToUseXmlSerialization, ContractId::MyOwnSerialization],
        }]
    );
    let message = err.to_string();
    assert!(message.contains("MyOwnSerialization"), "{message}");
    assert!(message.contains("ToUseXmlSerialization"), "{message}");
}

#[derive(Default, Endpoint)]
#[endpoint(TypesToScan, AssembliesToScan)]
struct Scanner;

impl TypesToScan for Scanner {
    fn types_to_scan(&self) -> Vec<TypeRef> {
        vec![TypeRef::of::<PlaceOrder>()]
    }
}

impl AssembliesToScan for Scanner {
    fn assemblies_to_scan(&self) -> Vec<String> {
        vec!["Orders.Messages".to_owned()]
    }
}

#[test]
fn types_win_over_assemblies() {
    let config = resolve::<Scanner>(&registry()).unwrap();

    assert_eq!(config.scan, ScanSource::Types(vec![TypeRef::of::<PlaceOrder>()]));
    assert!(matches!(
        config.resolution(ContractId::AssembliesToScan),
        Some(Resolution::Shadowed { winner: ContractId::TypesToScan, .. })
    ));
    assert!(config.diagnostics.iter().any(|d| d.contract == ContractId::AssembliesToScan));
}

#[test]
fn configured_precedence_is_honoured() {
    let settings = HostSettings::new(HostSettingsInner {
        scan_precedence: vec![
            ScanSourceKind::Assemblies,
            ScanSourceKind::Types,
            ScanSourceKind::Directory,
        ],
        ..HostSettingsInner::default()
    });
    let registry = CapabilityRegistry::standard(&settings).unwrap();
    let config = resolve::<Scanner>(&registry).unwrap();

    assert_eq!(config.scan, ScanSource::Assemblies(vec!["Orders.Messages".to_owned()]));
    assert!(matches!(
        config.resolution(ContractId::TypesToScan),
        Some(Resolution::Shadowed { winner: ContractId::AssembliesToScan, .. })
    ));
}

#[derive(Default, Endpoint)]
struct Bare;

#[test]
fn nothing_declared_resolves_to_defaults() {
    let config = resolve::<Bare>(&registry()).unwrap();

    assert_eq!(config.endpoint_name(), "Bare");
    assert_eq!(config.scan, ScanSource::Directory(PathBuf::from(".")));
    assert_eq!(config.serialization, SerializationChoice::FrameworkDefault);
    assert_eq!(config.persistence, PersistenceChoice::FrameworkDefault);
    assert_eq!(config.logging_level, Severity::Info);
    assert!(config.run.is_none());
    assert!(config.startup_action.is_none());
    assert!(config.diagnostics.is_empty());
    assert!(config.resolved_contracts().is_empty());
}

static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

#[derive(Endpoint)]
#[endpoint(EndpointName, LoggingLevel, StartupAction)]
struct Counted;

impl Default for Counted {
    fn default() -> Self {
        CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
        Self
    }
}

impl EndpointName for Counted {
    fn endpoint_name(&self) -> String {
        "counted".to_owned()
    }
}

impl LoggingLevel for Counted {
    fn level(&self) -> Severity {
        Severity::Debug
    }
}

impl StartupAction for Counted {
    fn startup_action(&self) -> Hook {
        Hook::new(|| {})
    }
}

#[test]
fn endpoint_is_constructed_once_per_run() {
    let before = CONSTRUCTED.load(Ordering::SeqCst);
    let config = resolve::<Counted>(&registry()).unwrap();

    assert_eq!(CONSTRUCTED.load(Ordering::SeqCst) - before, 1);
    assert_eq!(config.logging_level, Severity::Debug);
    assert!(config.startup_action.is_some());
}

static INITIALIZED: AtomicUsize = AtomicUsize::new(0);

#[derive(Default, Endpoint)]
#[endpoint(MyOwnSerialization, MyOwnSagaPersistence, MyOwnLoggingConfiguration)]
struct SelfConfigured;

impl WantCustomInitialization for SelfConfigured {
    fn init(&self) {
        INITIALIZED.fetch_add(1, Ordering::SeqCst);
    }
}

impl MyOwnSerialization for SelfConfigured {}
impl MyOwnSagaPersistence for SelfConfigured {}

impl MyOwnLoggingConfiguration for SelfConfigured {
    fn configure_logging(&self) {}
}

#[test]
fn own_serialization_brings_its_initialization() {
    let config = resolve::<SelfConfigured>(&registry()).unwrap();

    assert_eq!(config.serialization, SerializationChoice::Custom);
    assert_eq!(config.persistence, PersistenceChoice::Custom);
    assert!(config.resolution(ContractId::WantCustomInitialization).is_some_and(Resolution::is_resolved));
    assert!(config.custom_logging_configured());

    let init = config.custom_initialization.as_ref().unwrap();
    let before = INITIALIZED.load(Ordering::SeqCst);
    init.call();
    assert_eq!(INITIALIZED.load(Ordering::SeqCst) - before, 1);
}

#[derive(Default, Endpoint)]
#[endpoint(XmlSerializationNamespace)]
struct NamespaceOnly;

impl XmlSerializationNamespace for NamespaceOnly {
    fn namespace(&self) -> String {
        "urn:orders".to_owned()
    }
}

#[test]
fn advisory_dependency_suppresses_the_dependent() {
    let config = resolve::<NamespaceOnly>(&registry()).unwrap();

    assert_eq!(config.xml_namespace, "http://tempuri.net");
    assert!(matches!(
        config.resolution(ContractId::XmlSerializationNamespace),
        Some(Resolution::Suppressed { missing: ContractId::ToUseXmlSerialization, .. })
    ));
    assert_eq!(config.diagnostics.len(), 1);
}

#[derive(Default, Endpoint)]
#[endpoint(ToUseXmlSerialization, XmlSerializationNamespace)]
struct XmlOrders;

impl ToUseXmlSerialization for XmlOrders {}

impl XmlSerializationNamespace for XmlOrders {
    fn namespace(&self) -> String {
        "urn:orders".to_owned()
    }
}

#[test]
fn xml_namespace_applies_with_xml_serialization() {
    let config = resolve::<XmlOrders>(&registry()).unwrap();

    assert_eq!(config.serialization, SerializationChoice::Xml);
    assert_eq!(config.xml_namespace, "urn:orders");
}

#[derive(Default, Endpoint)]
#[endpoint(ProbeDirectory)]
struct Faulty;

impl ProbeDirectory for Faulty {
    fn probe_directory(&self) -> PathBuf {
        panic!("plugins directory is not mounted")
    }
}

#[test]
fn panicking_accessor_names_the_contract() {
    let err = resolve::<Faulty>(&registry()).unwrap_err();

    assert!(matches!(
        err,
        ResolveError::Probe { contract: Some(ContractId::ProbeDirectory), .. }
    ));
    assert!(err.to_string().contains("plugins directory is not mounted"), "{err}");
}

#[derive(Default, Endpoint)]
#[endpoint(AssembliesToScan)]
struct BlankAssembly;

impl AssembliesToScan for BlankAssembly {
    fn assemblies_to_scan(&self) -> Vec<String> {
        vec!["Orders".to_owned(), "  ".to_owned()]
    }
}

#[test]
fn unusable_value_is_a_probe_error() {
    let err = resolve::<BlankAssembly>(&registry()).unwrap_err();

    assert!(matches!(
        err,
        ResolveError::Probe { contract: Some(ContractId::AssembliesToScan), .. }
    ));
    assert!(err.to_string().contains("position 1"), "{err}");
}

#[derive(Default, Endpoint)]
#[endpoint(ContainerTypeToUse<StructureMap>, ToRun<Listener>, MessageHandlerOrdering)]
struct Wired;

impl ContainerTypeToUse<StructureMap> for Wired {}
impl ToRun<Listener> for Wired {}

impl MessageHandlerOrdering for Wired {
    fn specify_order(&self, order: &mut Order) {
        order.specify_first::<PlaceOrder>().then::<StructureMap>();
    }
}

#[derive(Debug, Default)]
struct Listener;

impl MessageEndpoint for Listener {
    fn start(&self) {}
}

#[test]
fn generic_contracts_carry_their_type_argument() {
    let config = resolve::<Wired>(&registry()).unwrap();

    let ContainerKind::Selected(container) = &config.container else {
        panic!("expected a selected container");
    };
    assert_eq!(container.type_ref(), TypeRef::of::<StructureMap>());
    assert_eq!(container.materialize().name(), "structure-map");
    assert_eq!(config.run.map(|run| run.type_ref()), Some(TypeRef::of::<Listener>()));
    assert_eq!(
        config.handler_ordering,
        courier_kernel::domain::HandlerOrdering::Ordered(vec![
            TypeRef::of::<PlaceOrder>(),
            TypeRef::of::<StructureMap>(),
        ])
    );
}

#[derive(Endpoint)]
#[endpoint(ContainerInstanceToUse)]
struct Prebuilt {
    container: Arc<StructureMap>,
}

impl Default for Prebuilt {
    fn default() -> Self {
        Self { container: Arc::new(StructureMap) }
    }
}

impl ContainerInstanceToUse for Prebuilt {
    type Container = StructureMap;

    fn container_instance(&self) -> Arc<StructureMap> {
        Arc::clone(&self.container)
    }
}

#[test]
fn container_instance_is_used_as_is() {
    let config = resolve::<Prebuilt>(&registry()).unwrap();

    let ContainerKind::Selected(container) = &config.container else {
        panic!("expected a selected container");
    };
    assert!(matches!(container, courier_kernel::domain::ContainerRef::Instance { .. }));
    assert_eq!(container.type_ref(), TypeRef::of::<StructureMap>());
}

#[test]
fn resolution_is_deterministic() {
    let registry = registry();
    let first = resolve::<Scanner>(&registry).unwrap();
    let second = resolve::<Scanner>(&registry).unwrap();

    assert_eq!(first.resolutions, second.resolutions);
    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(first.scan, second.scan);
}
