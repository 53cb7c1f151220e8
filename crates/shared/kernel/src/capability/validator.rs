use crate::capability::probe::DetectedCapabilities;
use crate::capability::registry::{CapabilityRegistry, Strength};
use crate::error::ResolveError;
use courier_domain::{ContractId, GroupId};
use std::fmt;
use tracing::{instrument, warn};

/// One broken cross-contract rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Violation {
    /// More than one member of an exclusion group was detected.
    Exclusive { group: GroupId, offending: Vec<ContractId> },
    /// A hard dependency's required contract is missing.
    MissingRequirement { dependent: ContractId, required: ContractId },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclusive { group, offending } => {
                let names = offending.iter().map(AsRef::<str>::as_ref).collect::<Vec<&str>>();
                write!(f, "{group} allows one of [{}]", names.join(", "))
            },
            Self::MissingRequirement { dependent, required } => {
                write!(f, "{dependent} requires {required}")
            },
        }
    }
}

/// Every violation found in one validation pass, in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    #[must_use]
    pub fn as_slice(&self) -> &[Violation] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Collects all rule violations of `detected` against `registry`.
///
/// Exclusive groups come first (by group), then missing requirements (by dependent).
/// Advisory dependencies never produce a violation.
#[must_use]
pub fn violations(detected: &DetectedCapabilities, registry: &CapabilityRegistry) -> Violations {
    let present = detected.contracts();

    let exclusive = registry.exclusion_groups().iter().filter_map(|group| {
        let hit = group.members & present;
        (hit.bits().count_ones() > 1)
            .then(|| Violation::Exclusive { group: group.id, offending: hit.ids().collect() })
    });

    let missing = registry
        .dependencies()
        .iter()
        .filter(|dep| dep.strength == Strength::Hard)
        .filter(|dep| present.has(dep.dependent) && !present.has(dep.required))
        .map(|dep| Violation::MissingRequirement {
            dependent: dep.dependent,
            required: dep.required,
        });

    let mut found: Vec<Violation> = exclusive.chain(missing).collect();
    found.sort();
    found.dedup();
    Violations(found)
}

/// Checks the detected set against the registry's exclusion and dependency rules.
///
/// # Errors
/// Returns [`ResolveError::Conflict`] listing every violated group and pair.
#[instrument(skip_all, fields(detected = detected.len()))]
pub fn validate(
    detected: &DetectedCapabilities,
    registry: &CapabilityRegistry,
) -> Result<(), ResolveError> {
    let violations = violations(detected, registry);
    if violations.is_empty() {
        return Ok(());
    }
    warn!(count = violations.len(), "Capability conflict: {violations}");
    Err(ResolveError::Conflict { violations, context: None })
}
