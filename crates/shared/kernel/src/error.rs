use crate::capability::Violations;
use courier_domain::ContractId;
use std::borrow::Cow;

/// Errors raised while resolving and publishing the endpoint configuration.
///
/// All of them are fatal for host startup: the inputs do not change between attempts.
#[courier_derive::courier_error]
pub enum ResolveError {
    /// A contract was registered twice while building the registry.
    #[error("Duplicate contract{}: {contract}", format_context(.context))]
    DuplicateContract { contract: ContractId, context: Option<Cow<'static, str>> },

    /// A rule references a contract the registry does not know.
    #[error("Unknown contract{}: {contract}", format_context(.context))]
    UnknownContract { contract: ContractId, context: Option<Cow<'static, str>> },

    /// Operator settings cannot produce a valid registry.
    #[error("Invalid host settings{}: {message}", format_context(.context))]
    InvalidSettings { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Constructing the endpoint or reading one of its accessors failed.
    #[error("Probe failed for {}{}: {message}", contract_label(.contract), format_context(.context))]
    Probe {
        contract: Option<ContractId>,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// Mutually exclusive capabilities, or an unmet hard dependency.
    #[error("Capability conflict{}: {violations}", format_context(.context))]
    Conflict { violations: Violations, context: Option<Cow<'static, str>> },

    /// `publish` was called after a configuration was already published.
    #[error("Configuration already published{}", format_context(.context))]
    AlreadyPublished { context: Option<Cow<'static, str>> },

    /// The configuration was read before it was published.
    #[error("Configuration not published{}", format_context(.context))]
    NotPublished { context: Option<Cow<'static, str>> },
}

impl ResolveError {
    pub(crate) fn probe(contract: Option<ContractId>, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Probe { contract, message: message.into(), context: None }
    }
}

#[allow(clippy::ref_option)]
fn contract_label(contract: &Option<ContractId>) -> Cow<'static, str> {
    contract.map_or(Cow::Borrowed("endpoint construction"), |id| Cow::Owned(id.to_string()))
}
