use crate::error::ResolveError;
use courier_domain::config::ScanSourceKind;
use courier_domain::{
    CapabilityValue, ContractId, ContractSet, GroupId, HandlerOrdering, HostSettings,
};
use fxhash::FxHashMap;
use strum::IntoEnumIterator;
use tracing::debug;

/// What a contract resolves to when the endpoint does not supply it.
#[derive(Debug, Clone, PartialEq)]
pub enum ContractDefault {
    Value(CapabilityValue),
    /// Absent unless detected.
    Unset,
    /// Member of an exclusion group; absence of every member selects the group's fallback.
    GroupFallback(GroupId),
}

/// A registered capability contract.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityContract {
    pub id: ContractId,
    pub default: ContractDefault,
}

impl CapabilityContract {
    #[must_use]
    pub const fn unset(id: ContractId) -> Self {
        Self { id, default: ContractDefault::Unset }
    }

    #[must_use]
    pub fn with_default(id: ContractId, value: impl Into<CapabilityValue>) -> Self {
        Self { id, default: ContractDefault::Value(value.into()) }
    }

    #[must_use]
    pub const fn in_group(id: ContractId, group: GroupId) -> Self {
        Self { id, default: ContractDefault::GroupFallback(group) }
    }

    /// The registry default, when it is a concrete value.
    #[must_use]
    pub const fn default_value(&self) -> Option<&CapabilityValue> {
        match &self.default {
            ContractDefault::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// Contracts of which at most one may be detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionGroup {
    pub id: GroupId,
    pub members: ContractSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strength {
    /// Unmet: the dependent is ignored with a diagnostic.
    Advisory,
    /// Unmet: resolution fails.
    Hard,
}

/// `dependent` only takes effect together with `required`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub dependent: ContractId,
    pub required: ContractId,
    pub strength: Strength,
}

/// Contracts that may coexist; the first detected one in `order` wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecedenceGroup {
    pub id: GroupId,
    pub order: Vec<ContractId>,
}

/// The catalog of recognized contracts and the rules between them.
///
/// Built once during startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    contracts: FxHashMap<ContractId, CapabilityContract>,
    exclusions: Vec<ExclusionGroup>,
    dependencies: Vec<Dependency>,
    precedence: Vec<PrecedenceGroup>,
}

impl CapabilityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog, with defaults taken from the host settings.
    ///
    /// # Errors
    /// Returns [`ResolveError::InvalidSettings`] if `scan_precedence` does not list every
    /// scanning source exactly once.
    pub fn standard(settings: &HostSettings) -> Result<Self, ResolveError> {
        use ContractId::{
            AssembliesToScan, ContainerInstanceToUse, ContainerTypeToUse, EndpointName,
            LoggingLevel, MessageHandlerOrdering, MyOwnLoggingConfiguration, MyOwnSagaPersistence,
            MyOwnSerialization, ProbeDirectory, StartupAction, ToRun,
            ToUseNHibernateSubscriptionStorage, ToUseXmlSerialization, TypesToScan,
            WantCustomInitialization, XmlSerializationNamespace,
        };

        let scan_order = scan_order(&settings.scan_precedence)?;
        let mut registry = Self::new();

        for id in [EndpointName, TypesToScan, AssembliesToScan, StartupAction, ToRun] {
            registry.register(CapabilityContract::unset(id))?;
        }
        for id in [WantCustomInitialization, MyOwnLoggingConfiguration] {
            registry.register(CapabilityContract::unset(id))?;
        }
        registry.register(CapabilityContract::with_default(
            ProbeDirectory,
            settings.base_directory.clone(),
        ))?;
        registry.register(CapabilityContract::with_default(
            XmlSerializationNamespace,
            settings.xml_namespace.clone(),
        ))?;
        registry.register(CapabilityContract::with_default(LoggingLevel, settings.logging.level))?;
        registry.register(CapabilityContract::with_default(
            MessageHandlerOrdering,
            CapabilityValue::Ordering(HandlerOrdering::Unordered),
        ))?;

        let groups = [
            (GroupId::SerializationGroup, [MyOwnSerialization, ToUseXmlSerialization]),
            (GroupId::PersistenceGroup, [MyOwnSagaPersistence, ToUseNHibernateSubscriptionStorage]),
            (GroupId::ContainerGroup, [ContainerTypeToUse, ContainerInstanceToUse]),
        ];
        for (group, members) in groups {
            for id in members {
                registry.register(CapabilityContract::in_group(id, group))?;
            }
            registry.exclude(ExclusionGroup { id: group, members: members.into_iter().collect() })?;
        }

        registry.require(Dependency {
            dependent: XmlSerializationNamespace,
            required: ToUseXmlSerialization,
            strength: Strength::Advisory,
        })?;
        for dependent in [MyOwnSerialization, MyOwnSagaPersistence] {
            registry.require(Dependency {
                dependent,
                required: WantCustomInitialization,
                strength: Strength::Hard,
            })?;
        }

        registry.precede(PrecedenceGroup { id: GroupId::ScanningGroup, order: scan_order })?;

        debug!(contracts = registry.contracts.len(), "Capability registry built");
        Ok(registry)
    }

    /// Adds a contract definition.
    ///
    /// # Errors
    /// Returns [`ResolveError::DuplicateContract`] if the identifier is already registered.
    pub fn register(&mut self, contract: CapabilityContract) -> Result<&mut Self, ResolveError> {
        if self.contracts.contains_key(&contract.id) {
            return Err(ResolveError::DuplicateContract { contract: contract.id, context: None });
        }
        self.contracts.insert(contract.id, contract);
        Ok(self)
    }

    /// Declares a mutual-exclusion group.
    ///
    /// # Errors
    /// Returns [`ResolveError::UnknownContract`] if a member is not registered.
    pub fn exclude(&mut self, group: ExclusionGroup) -> Result<&mut Self, ResolveError> {
        self.ensure_registered(group.members.ids(), "Declaring exclusion group")?;
        self.exclusions.push(group);
        Ok(self)
    }

    /// Declares a dependency edge.
    ///
    /// # Errors
    /// Returns [`ResolveError::UnknownContract`] if either end is not registered.
    pub fn require(&mut self, dependency: Dependency) -> Result<&mut Self, ResolveError> {
        self.ensure_registered([dependency.dependent, dependency.required], "Declaring dependency")?;
        self.dependencies.push(dependency);
        Ok(self)
    }

    /// Declares a precedence group.
    ///
    /// # Errors
    /// Returns [`ResolveError::UnknownContract`] if a member is not registered.
    pub fn precede(&mut self, group: PrecedenceGroup) -> Result<&mut Self, ResolveError> {
        self.ensure_registered(group.order.iter().copied(), "Declaring precedence group")?;
        self.precedence.push(group);
        Ok(self)
    }

    #[must_use]
    pub fn contract(&self, id: ContractId) -> Option<&CapabilityContract> {
        self.contracts.get(&id)
    }

    #[must_use]
    pub fn is_registered(&self, id: ContractId) -> bool {
        self.contracts.contains_key(&id)
    }

    #[must_use]
    pub fn registered(&self) -> ContractSet {
        self.contracts.keys().copied().collect()
    }

    /// Registered contracts in [`ContractId`] order.
    pub fn contracts(&self) -> impl Iterator<Item = &CapabilityContract> {
        ContractId::iter().filter_map(|id| self.contracts.get(&id))
    }

    #[must_use]
    pub fn exclusion_groups(&self) -> &[ExclusionGroup] {
        &self.exclusions
    }

    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    #[must_use]
    pub fn precedence_groups(&self) -> &[PrecedenceGroup] {
        &self.precedence
    }

    fn ensure_registered(
        &self,
        ids: impl IntoIterator<Item = ContractId>,
        context: &'static str,
    ) -> Result<(), ResolveError> {
        match ids.into_iter().find(|id| !self.is_registered(*id)) {
            Some(contract) => {
                Err(ResolveError::UnknownContract { contract, context: Some(context.into()) })
            },
            None => Ok(()),
        }
    }
}

fn scan_order(precedence: &[ScanSourceKind]) -> Result<Vec<ContractId>, ResolveError> {
    let complete = ScanSourceKind::iter().all(|kind| precedence.contains(&kind));
    if !complete || precedence.len() != ScanSourceKind::iter().count() {
        let listed = precedence.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        return Err(ResolveError::InvalidSettings {
            message: format!(
                "scan_precedence must list types, assemblies and directory exactly once, got [{listed}]"
            )
            .into(),
            context: None,
        });
    }
    Ok(precedence.iter().map(|kind| kind.contract()).collect())
}
