use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// The closed catalog of capability contracts an endpoint type may satisfy.
///
/// Declaration order is significant: registries, validators and diagnostics iterate
/// contracts in this order so every report is deterministic.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
pub enum ContractId {
    EndpointName,
    TypesToScan,
    AssembliesToScan,
    ProbeDirectory,
    StartupAction,
    ContainerTypeToUse,
    ContainerInstanceToUse,
    ToRun,
    ToUseXmlSerialization,
    XmlSerializationNamespace,
    MyOwnSerialization,
    MyOwnSagaPersistence,
    WantCustomInitialization,
    MyOwnLoggingConfiguration,
    LoggingLevel,
    MessageHandlerOrdering,
    ToUseNHibernateSubscriptionStorage,
}

/// How a contract is expressed on the candidate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractShape {
    /// Exposes an accessor whose result is the capability value.
    Value,
    /// Carries no accessor; presence is the whole signal.
    Marker,
    /// Generic marker whose type argument is the payload.
    TypeArgument,
}

/// The payload variant a contract supplies when detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Present,
    Text,
    Path,
    Types,
    Names,
    Container,
    Endpoint,
    Severity,
    Ordering,
    Hook,
}

impl ContractId {
    #[must_use]
    pub const fn shape(self) -> ContractShape {
        match self {
            Self::ContainerTypeToUse | Self::ToRun => ContractShape::TypeArgument,
            Self::ToUseXmlSerialization
            | Self::MyOwnSerialization
            | Self::MyOwnSagaPersistence
            | Self::ToUseNHibernateSubscriptionStorage => ContractShape::Marker,
            _ => ContractShape::Value,
        }
    }

    #[must_use]
    pub const fn value_kind(self) -> ValueKind {
        match self {
            Self::EndpointName | Self::XmlSerializationNamespace => ValueKind::Text,
            Self::TypesToScan => ValueKind::Types,
            Self::AssembliesToScan => ValueKind::Names,
            Self::ProbeDirectory => ValueKind::Path,
            Self::StartupAction
            | Self::WantCustomInitialization
            | Self::MyOwnLoggingConfiguration => ValueKind::Hook,
            Self::ContainerTypeToUse | Self::ContainerInstanceToUse => ValueKind::Container,
            Self::ToRun => ValueKind::Endpoint,
            Self::LoggingLevel => ValueKind::Severity,
            Self::MessageHandlerOrdering => ValueKind::Ordering,
            Self::ToUseXmlSerialization
            | Self::MyOwnSerialization
            | Self::MyOwnSagaPersistence
            | Self::ToUseNHibernateSubscriptionStorage => ValueKind::Present,
        }
    }

    /// The bit this contract occupies inside a [`ContractSet`].
    #[must_use]
    pub const fn bit(self) -> ContractSet {
        ContractSet::from_bits_retain(1 << self as u32)
    }
}

bitflags! {
    /// A compact set of contract identifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
    pub struct ContractSet: u32 {
        const ENDPOINT_NAME = 1 << ContractId::EndpointName as u32;
        const TYPES_TO_SCAN = 1 << ContractId::TypesToScan as u32;
        const ASSEMBLIES_TO_SCAN = 1 << ContractId::AssembliesToScan as u32;
        const PROBE_DIRECTORY = 1 << ContractId::ProbeDirectory as u32;
        const STARTUP_ACTION = 1 << ContractId::StartupAction as u32;
        const CONTAINER_TYPE = 1 << ContractId::ContainerTypeToUse as u32;
        const CONTAINER_INSTANCE = 1 << ContractId::ContainerInstanceToUse as u32;
        const TO_RUN = 1 << ContractId::ToRun as u32;
        const XML_SERIALIZATION = 1 << ContractId::ToUseXmlSerialization as u32;
        const XML_NAMESPACE = 1 << ContractId::XmlSerializationNamespace as u32;
        const OWN_SERIALIZATION = 1 << ContractId::MyOwnSerialization as u32;
        const OWN_SAGA_PERSISTENCE = 1 << ContractId::MyOwnSagaPersistence as u32;
        const CUSTOM_INITIALIZATION = 1 << ContractId::WantCustomInitialization as u32;
        const OWN_LOGGING = 1 << ContractId::MyOwnLoggingConfiguration as u32;
        const LOGGING_LEVEL = 1 << ContractId::LoggingLevel as u32;
        const HANDLER_ORDERING = 1 << ContractId::MessageHandlerOrdering as u32;
        const NHIBERNATE_SUBSCRIPTIONS = 1 << ContractId::ToUseNHibernateSubscriptionStorage as u32;
    }
}

impl ContractSet {
    /// Returns `true` when `id` is a member of the set.
    #[must_use]
    pub const fn has(self, id: ContractId) -> bool {
        self.contains(id.bit())
    }

    /// Member identifiers in declaration order.
    pub fn ids(self) -> impl Iterator<Item = ContractId> {
        <ContractId as strum::IntoEnumIterator>::iter().filter(move |id| self.has(*id))
    }
}

impl From<ContractId> for ContractSet {
    fn from(id: ContractId) -> Self {
        id.bit()
    }
}

impl FromIterator<ContractId> for ContractSet {
    fn from_iter<I: IntoIterator<Item = ContractId>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, id| set | id.bit())
    }
}

impl Serialize for ContractSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.ids())
    }
}

impl<'de> Deserialize<'de> for ContractSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ids = Vec::<ContractId>::deserialize(deserializer)?;
        Ok(ids.into_iter().collect())
    }
}

/// Named rule groups declared by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display)]
pub enum GroupId {
    SerializationGroup,
    PersistenceGroup,
    ContainerGroup,
    ScanningGroup,
}
