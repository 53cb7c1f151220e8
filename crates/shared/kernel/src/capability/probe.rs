use crate::capability::candidate::{Capabilities, ConfigureThisEndpoint};
use crate::capability::registry::CapabilityRegistry;
use crate::error::ResolveError;
use courier_domain::{CapabilityValue, ContractId, ContractSet};
use std::any::Any;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// A contract found on the endpoint, paired with the value read from it.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedCapability {
    pub contract: ContractId,
    pub value: CapabilityValue,
}

impl DetectedCapability {
    #[must_use]
    pub fn new(contract: ContractId, value: impl Into<CapabilityValue>) -> Self {
        Self { contract, value: value.into() }
    }

    /// A marker contract: present, no value.
    #[must_use]
    pub const fn marker(contract: ContractId) -> Self {
        Self { contract, value: CapabilityValue::Present }
    }
}

/// The detected set of one resolution run, keyed and ordered by contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectedCapabilities {
    entries: BTreeMap<ContractId, DetectedCapability>,
}

impl DetectedCapabilities {
    /// Adds a capability, returning the one it replaced.
    pub fn insert(&mut self, capability: DetectedCapability) -> Option<DetectedCapability> {
        self.entries.insert(capability.contract, capability)
    }

    #[must_use]
    pub fn get(&self, contract: ContractId) -> Option<&DetectedCapability> {
        self.entries.get(&contract)
    }

    #[must_use]
    pub fn contains(&self, contract: ContractId) -> bool {
        self.entries.contains_key(&contract)
    }

    #[must_use]
    pub fn contracts(&self) -> ContractSet {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectedCapability> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<DetectedCapability> for DetectedCapabilities {
    fn from_iter<I: IntoIterator<Item = DetectedCapability>>(iter: I) -> Self {
        let mut detected = Self::default();
        for capability in iter {
            detected.insert(capability);
        }
        detected
    }
}

/// Builds the endpoint instance shared by every extraction of one run.
///
/// # Errors
/// Returns [`ResolveError::Probe`] without a contract if construction panics.
pub fn construct<E: ConfigureThisEndpoint>() -> Result<Arc<E>, ResolveError> {
    catch_unwind(E::create)
        .map(Arc::new)
        .map_err(|payload| ResolveError::probe(None, panic_message(payload.as_ref())))
}

/// Constructs `E` once and detects its capabilities.
///
/// # Errors
/// See [`detect_instance`].
pub fn detect<E: ConfigureThisEndpoint>(
    registry: &CapabilityRegistry,
) -> Result<DetectedCapabilities, ResolveError> {
    let instance = construct::<E>()?;
    detect_instance(&instance, registry)
}

/// Detects which registered contracts `instance` declares and reads their values.
///
/// Declared contracts the registry does not know are skipped.
///
/// # Errors
/// Returns [`ResolveError::Probe`] naming the contract when an accessor panics or returns
/// an unusable value, or when a contract is declared more than once.
#[instrument(skip_all, fields(endpoint = std::any::type_name::<E>()))]
pub fn detect_instance<E: ConfigureThisEndpoint>(
    instance: &Arc<E>,
    registry: &CapabilityRegistry,
) -> Result<DetectedCapabilities, ResolveError> {
    let declared = catch_unwind(Capabilities::<E>::of)
        .map_err(|payload| ResolveError::probe(None, panic_message(payload.as_ref())))?
        .into_declared();

    let mut detected = DetectedCapabilities::default();
    for declaration in declared {
        let contract = declaration.contract;
        if !registry.is_registered(contract) {
            trace!(%contract, "Skipping contract unknown to the registry");
            continue;
        }
        if detected.contains(contract) {
            return Err(ResolveError::probe(Some(contract), "contract is declared more than once"));
        }

        let extract = declaration.extract;
        let value = catch_unwind(AssertUnwindSafe(|| extract(instance)))
            .map_err(|payload| ResolveError::probe(Some(contract), panic_message(payload.as_ref())))?
            .map_err(|message| ResolveError::probe(Some(contract), message))?;

        debug!(%contract, kind = ?value.kind(), "Capability detected");
        detected.insert(DetectedCapability { contract, value });
    }

    Ok(detected)
}

fn panic_message(payload: &(dyn Any + Send)) -> Cow<'static, str> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Cow::Owned(format!("panicked: {message}"))
    } else if let Some(message) = payload.downcast_ref::<String>() {
        Cow::Owned(format!("panicked: {message}"))
    } else {
        Cow::Borrowed("panicked")
    }
}
