use crate::capability::contracts::{
    AssembliesToScan, ContainerInstanceToUse, ContainerTypeToUse, EndpointName, LoggingLevel,
    MessageHandlerOrdering, MyOwnLoggingConfiguration, MyOwnSagaPersistence, MyOwnSerialization,
    ProbeDirectory, StartupAction, ToRun, ToUseNHibernateSubscriptionStorage,
    ToUseXmlSerialization, TypesToScan, WantCustomInitialization, XmlSerializationNamespace,
};
use courier_domain::{
    CapabilityValue, Container, ContainerRef, ContractId, EndpointType, Hook, MessageEndpoint,
    Order,
};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Reads one capability value from a live endpoint instance.
///
/// An `Err` carries the reason the returned value is unusable.
pub type Extractor<E> = fn(&Arc<E>) -> Result<CapabilityValue, Cow<'static, str>>;

/// The entry-point type an integrator hands to the host.
///
/// `declare` lists the capability contracts the type satisfies. Use `#[derive(Endpoint)]`
/// to generate this impl from an attribute list.
pub trait ConfigureThisEndpoint: Send + Sync + Sized + 'static {
    /// Builds the instance every accessor is read from during one resolution run.
    fn create() -> Self;

    fn declare(capabilities: &mut Capabilities<Self>);
}

/// One declared contract and the accessor that extracts its value.
pub struct Declared<E> {
    pub contract: ContractId,
    pub extract: Extractor<E>,
}

impl<E> fmt::Debug for Declared<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declared").field("contract", &self.contract).finish_non_exhaustive()
    }
}

/// The capability list an endpoint type declares.
///
/// Every method is bounded by the matching contract trait, so a declaration only compiles
/// when the endpoint type structurally satisfies the contract.
pub struct Capabilities<E> {
    declared: Vec<Declared<E>>,
    implied_initialization: bool,
}

impl<E> Default for Capabilities<E> {
    fn default() -> Self {
        Self { declared: Vec::new(), implied_initialization: false }
    }
}

impl<E> fmt::Debug for Capabilities<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.declared.iter().map(|d| d.contract)).finish()
    }
}

impl<E: ConfigureThisEndpoint> Capabilities<E> {
    /// Collects the list `E` declares.
    #[must_use]
    pub fn of() -> Self {
        let mut capabilities = Self::default();
        E::declare(&mut capabilities);
        capabilities
    }

    /// Declared contracts in declaration order (repeats included).
    pub fn contracts(&self) -> impl Iterator<Item = ContractId> + '_ {
        self.declared.iter().map(|d| d.contract)
    }

    pub(crate) fn into_declared(self) -> Vec<Declared<E>> {
        self.declared
    }

    fn push(&mut self, contract: ContractId, extract: Extractor<E>) -> &mut Self {
        self.declared.push(Declared { contract, extract });
        self
    }

    fn marker(&mut self, contract: ContractId) -> &mut Self {
        self.push(contract, |_| Ok(CapabilityValue::Present))
    }

    fn declares(&self, contract: ContractId) -> bool {
        self.declared.iter().any(|d| d.contract == contract)
    }

    /// Records the initialization hook a self-configuring contract relies on.
    ///
    /// An explicit `custom_initialization` declaration later on takes this entry over
    /// instead of counting as a repeat.
    fn imply_initialization(&mut self) -> &mut Self
    where
        E: WantCustomInitialization,
    {
        if !self.declares(ContractId::WantCustomInitialization) {
            self.custom_initialization();
            self.implied_initialization = true;
        }
        self
    }

    pub fn endpoint_name(&mut self) -> &mut Self
    where
        E: EndpointName,
    {
        self.push(ContractId::EndpointName, |e| {
            let name = e.endpoint_name();
            if name.trim().is_empty() {
                return Err("endpoint name must not be blank".into());
            }
            Ok(CapabilityValue::Text(name))
        })
    }

    pub fn types_to_scan(&mut self) -> &mut Self
    where
        E: TypesToScan,
    {
        self.push(ContractId::TypesToScan, |e| Ok(CapabilityValue::Types(e.types_to_scan())))
    }

    pub fn assemblies_to_scan(&mut self) -> &mut Self
    where
        E: AssembliesToScan,
    {
        self.push(ContractId::AssembliesToScan, |e| {
            let names = e.assemblies_to_scan();
            if let Some(blank) = names.iter().position(|n| n.trim().is_empty()) {
                return Err(format!("assembly name at position {blank} is blank").into());
            }
            Ok(CapabilityValue::Names(names))
        })
    }

    pub fn probe_directory(&mut self) -> &mut Self
    where
        E: ProbeDirectory,
    {
        self.push(ContractId::ProbeDirectory, |e| {
            let path = e.probe_directory();
            if path.as_os_str().is_empty() {
                return Err("probe directory must not be empty".into());
            }
            Ok(CapabilityValue::Path(path))
        })
    }

    pub fn startup_action(&mut self) -> &mut Self
    where
        E: StartupAction,
    {
        self.push(ContractId::StartupAction, |e| Ok(CapabilityValue::Hook(e.startup_action())))
    }

    /// Declares `ContainerTypeToUse<C>`; the value is the type `C`, built on demand.
    pub fn container_type<C: Container + Default>(&mut self) -> &mut Self
    where
        E: ContainerTypeToUse<C>,
    {
        self.push(ContractId::ContainerTypeToUse, |_| {
            Ok(CapabilityValue::Container(ContainerRef::of_type::<C>()))
        })
    }

    pub fn container_instance(&mut self) -> &mut Self
    where
        E: ContainerInstanceToUse,
    {
        self.push(ContractId::ContainerInstanceToUse, |e| {
            Ok(CapabilityValue::Container(ContainerRef::instance(e.container_instance())))
        })
    }

    /// Declares `ToRun<T>`; the value is the endpoint type `T`, not an instance.
    pub fn to_run<T: MessageEndpoint + Default>(&mut self) -> &mut Self
    where
        E: ToRun<T>,
    {
        self.push(ContractId::ToRun, |_| Ok(CapabilityValue::Endpoint(EndpointType::of::<T>())))
    }

    pub fn xml_serialization(&mut self) -> &mut Self
    where
        E: ToUseXmlSerialization,
    {
        self.marker(ContractId::ToUseXmlSerialization)
    }

    pub fn xml_namespace(&mut self) -> &mut Self
    where
        E: XmlSerializationNamespace,
    {
        self.push(ContractId::XmlSerializationNamespace, |e| {
            let namespace = e.namespace();
            if namespace.trim().is_empty() {
                return Err("XML namespace must not be blank".into());
            }
            Ok(CapabilityValue::Text(namespace))
        })
    }

    /// Also declares `WantCustomInitialization`, which every `MyOwnSerialization` implements.
    pub fn my_own_serialization(&mut self) -> &mut Self
    where
        E: MyOwnSerialization,
    {
        self.marker(ContractId::MyOwnSerialization).imply_initialization()
    }

    /// Also declares `WantCustomInitialization`, which every `MyOwnSagaPersistence` implements.
    pub fn my_own_saga_persistence(&mut self) -> &mut Self
    where
        E: MyOwnSagaPersistence,
    {
        self.marker(ContractId::MyOwnSagaPersistence).imply_initialization()
    }

    pub fn custom_initialization(&mut self) -> &mut Self
    where
        E: WantCustomInitialization,
    {
        if std::mem::take(&mut self.implied_initialization) {
            return self;
        }
        self.push(ContractId::WantCustomInitialization, |e| {
            let endpoint = Arc::clone(e);
            Ok(CapabilityValue::Hook(Hook::new(move || endpoint.init())))
        })
    }

    pub fn my_own_logging(&mut self) -> &mut Self
    where
        E: MyOwnLoggingConfiguration,
    {
        self.push(ContractId::MyOwnLoggingConfiguration, |e| {
            let endpoint = Arc::clone(e);
            Ok(CapabilityValue::Hook(Hook::new(move || endpoint.configure_logging())))
        })
    }

    pub fn logging_level(&mut self) -> &mut Self
    where
        E: LoggingLevel,
    {
        self.push(ContractId::LoggingLevel, |e| Ok(CapabilityValue::Severity(e.level())))
    }

    pub fn handler_ordering(&mut self) -> &mut Self
    where
        E: MessageHandlerOrdering,
    {
        self.push(ContractId::MessageHandlerOrdering, |e| {
            let mut order = Order::default();
            e.specify_order(&mut order);
            if let Some(duplicate) = order.first_duplicate() {
                return Err(format!("handler {duplicate} is ordered more than once").into());
            }
            Ok(CapabilityValue::Ordering(order.into_ordering()))
        })
    }

    pub fn nhibernate_subscription_storage(&mut self) -> &mut Self
    where
        E: ToUseNHibernateSubscriptionStorage,
    {
        self.marker(ContractId::ToUseNHibernateSubscriptionStorage)
    }
}
