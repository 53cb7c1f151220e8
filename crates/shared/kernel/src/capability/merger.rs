use crate::capability::probe::DetectedCapabilities;
use crate::capability::registry::{CapabilityContract, CapabilityRegistry, ContractDefault};
use courier_domain::config::DEFAULT_XML_NAMESPACE;
use courier_domain::{
    CapabilityValue, ContainerKind, ContractId, Diagnostic, EffectiveConfiguration,
    EffectiveConfigurationInner, EndpointNameOverride, HandlerOrdering, Hook, PersistenceChoice,
    Resolution, ScanSource, SerializationChoice, Severity, TypeRef,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, instrument, warn};

type Resolutions = BTreeMap<ContractId, Resolution>;

/// Combines a validated detected set with registry defaults into the effective configuration.
///
/// Never fails: validation already rejected conflicts. Detected values of the wrong kind,
/// unmet advisory dependencies and outranked scanning sources end up as diagnostics.
#[instrument(skip_all, fields(endpoint = %endpoint))]
#[must_use]
pub fn merge(
    detected: &DetectedCapabilities,
    registry: &CapabilityRegistry,
    endpoint: TypeRef,
) -> EffectiveConfiguration {
    let mut diagnostics = Vec::new();
    let mut resolutions: Resolutions = registry
        .contracts()
        .map(|contract| (contract.id, initial(contract, detected, &mut diagnostics)))
        .collect();

    suppress_unmet(&mut resolutions, registry, &mut diagnostics);
    shadow_outranked(&mut resolutions, registry, &mut diagnostics);

    let detected_value = |id: ContractId| match resolutions.get(&id) {
        Some(Resolution::Detected(value)) => Some(value),
        _ => None,
    };
    let effective_value = |id: ContractId| resolutions.get(&id).and_then(Resolution::effective_value);
    let hook = |id: ContractId| match detected_value(id) {
        Some(CapabilityValue::Hook(hook)) => Some(Hook::clone(hook)),
        _ => None,
    };

    let endpoint_name = match detected_value(ContractId::EndpointName) {
        Some(CapabilityValue::Text(name)) => EndpointNameOverride::Explicit(name.clone()),
        _ => EndpointNameOverride::TypeName,
    };

    let scan = if let Some(CapabilityValue::Types(types)) = detected_value(ContractId::TypesToScan) {
        ScanSource::Types(types.clone())
    } else if let Some(CapabilityValue::Names(names)) =
        detected_value(ContractId::AssembliesToScan)
    {
        ScanSource::Assemblies(names.clone())
    } else if let Some(CapabilityValue::Path(path)) = effective_value(ContractId::ProbeDirectory) {
        ScanSource::Directory(path.clone())
    } else {
        ScanSource::Directory(PathBuf::from("."))
    };

    let serialization = if detected_value(ContractId::ToUseXmlSerialization).is_some() {
        SerializationChoice::Xml
    } else if detected_value(ContractId::MyOwnSerialization).is_some() {
        SerializationChoice::Custom
    } else {
        SerializationChoice::FrameworkDefault
    };

    let xml_namespace = effective_value(ContractId::XmlSerializationNamespace)
        .and_then(CapabilityValue::as_text)
        .unwrap_or(DEFAULT_XML_NAMESPACE)
        .to_owned();

    let container = [ContractId::ContainerTypeToUse, ContractId::ContainerInstanceToUse]
        .into_iter()
        .find_map(|id| match detected_value(id) {
            Some(CapabilityValue::Container(selected)) => {
                Some(ContainerKind::Selected(selected.clone()))
            },
            _ => None,
        })
        .unwrap_or_default();

    let persistence = if detected_value(ContractId::MyOwnSagaPersistence).is_some() {
        PersistenceChoice::Custom
    } else if detected_value(ContractId::ToUseNHibernateSubscriptionStorage).is_some() {
        PersistenceChoice::NHibernate
    } else {
        PersistenceChoice::FrameworkDefault
    };

    let logging_level = match effective_value(ContractId::LoggingLevel) {
        Some(CapabilityValue::Severity(level)) => *level,
        _ => Severity::default(),
    };

    let handler_ordering = match effective_value(ContractId::MessageHandlerOrdering) {
        Some(CapabilityValue::Ordering(ordering)) => ordering.clone(),
        _ => HandlerOrdering::Unordered,
    };

    let run = match detected_value(ContractId::ToRun) {
        Some(CapabilityValue::Endpoint(endpoint_type)) => Some(*endpoint_type),
        _ => None,
    };

    let custom_logging = hook(ContractId::MyOwnLoggingConfiguration);
    let startup_action = hook(ContractId::StartupAction);
    let custom_initialization = hook(ContractId::WantCustomInitialization);

    let inner = EffectiveConfigurationInner {
        endpoint,
        endpoint_name,
        scan,
        serialization,
        xml_namespace,
        container,
        persistence,
        logging_level,
        custom_logging,
        handler_ordering,
        startup_action,
        custom_initialization,
        run,
        resolutions,
        diagnostics,
    };

    debug!(
        serialization = %inner.serialization,
        persistence = %inner.persistence,
        diagnostics = inner.diagnostics.len(),
        "Configuration merged"
    );
    EffectiveConfiguration::new(inner)
}

fn initial(
    contract: &CapabilityContract,
    detected: &DetectedCapabilities,
    diagnostics: &mut Vec<Diagnostic>,
) -> Resolution {
    let Some(capability) = detected.get(contract.id) else {
        return fallback(contract);
    };

    let expected = contract.id.value_kind();
    let found = capability.value.kind();
    if found == expected {
        return Resolution::Detected(capability.value.clone());
    }

    warn!(contract = %contract.id, ?expected, ?found, "Ignoring capability value of the wrong kind");
    diagnostics.push(Diagnostic {
        contract: contract.id,
        message: format!("value of kind {found:?} ignored, expected {expected:?}"),
    });
    fallback(contract)
}

fn fallback(contract: &CapabilityContract) -> Resolution {
    match &contract.default {
        ContractDefault::Value(value) => Resolution::Default(value.clone()),
        ContractDefault::Unset => Resolution::Unset,
        ContractDefault::GroupFallback(group) => Resolution::Fallback(*group),
    }
}

/// Demotes detected contracts whose required contract is not in effect.
///
/// Repeats until stable, so suppression propagates along dependency chains.
fn suppress_unmet(
    resolutions: &mut Resolutions,
    registry: &CapabilityRegistry,
    diagnostics: &mut Vec<Diagnostic>,
) {
    loop {
        let unmet = registry.dependencies().iter().find(|dep| {
            resolutions.get(&dep.dependent).is_some_and(Resolution::is_resolved)
                && !resolutions.get(&dep.required).is_some_and(Resolution::is_resolved)
        });
        let Some(dep) = unmet.copied() else {
            break;
        };

        if let Some(entry) = resolutions.get_mut(&dep.dependent)
            && let Resolution::Detected(value) = &*entry
        {
            *entry = Resolution::Suppressed { value: value.clone(), missing: dep.required };
        }
        debug!(dependent = %dep.dependent, required = %dep.required, "Capability suppressed");
        diagnostics.push(Diagnostic {
            contract: dep.dependent,
            message: format!("ignored: requires {}, which is not in effect", dep.required),
        });
    }
}

/// Within each precedence group, keeps the first detected contract and shadows the rest.
fn shadow_outranked(
    resolutions: &mut Resolutions,
    registry: &CapabilityRegistry,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for group in registry.precedence_groups() {
        let mut winner = None;
        for &id in &group.order {
            let Some(entry) = resolutions.get_mut(&id) else {
                continue;
            };
            let Resolution::Detected(value) = &*entry else {
                continue;
            };
            match winner {
                None => winner = Some(id),
                Some(winner) => {
                    *entry = Resolution::Shadowed { value: value.clone(), winner };
                    diagnostics.push(Diagnostic {
                        contract: id,
                        message: format!("recorded but unused: {winner} takes precedence"),
                    });
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::probe::DetectedCapability;
    use courier_domain::{GroupId, HostSettings};

    struct OrdersEndpoint;
    struct PlaceOrder;

    fn registry() -> CapabilityRegistry {
        CapabilityRegistry::standard(&HostSettings::default()).unwrap()
    }

    fn merged(capabilities: Vec<DetectedCapability>) -> EffectiveConfiguration {
        let detected = capabilities.into_iter().collect();
        merge(&detected, &registry(), TypeRef::of::<OrdersEndpoint>())
    }

    #[test]
    fn empty_detection_yields_defaults() {
        let config = merged(vec![]);

        assert_eq!(config.resolutions.len(), 17);
        assert_eq!(config.endpoint_name(), "OrdersEndpoint");
        assert_eq!(config.serialization, SerializationChoice::FrameworkDefault);
        assert_eq!(config.persistence, PersistenceChoice::FrameworkDefault);
        assert_eq!(config.container, ContainerKind::Default);
        assert_eq!(config.scan, ScanSource::Directory(PathBuf::from(".")));
        assert_eq!(config.xml_namespace, DEFAULT_XML_NAMESPACE);
        assert_eq!(config.logging_level, Severity::Info);
        assert!(config.diagnostics.is_empty());
        assert!(config.resolved_contracts().is_empty());
        assert_eq!(
            config.resolution(ContractId::MyOwnSerialization),
            Some(&Resolution::Fallback(GroupId::SerializationGroup))
        );
        assert_eq!(config.resolution(ContractId::EndpointName), Some(&Resolution::Unset));
    }

    #[test]
    fn detected_values_take_effect() {
        let config = merged(vec![
            DetectedCapability::new(ContractId::EndpointName, "Orders"),
            DetectedCapability::marker(ContractId::ToUseXmlSerialization),
            DetectedCapability::new(ContractId::XmlSerializationNamespace, "urn:orders"),
            DetectedCapability::new(ContractId::LoggingLevel, Severity::Warn),
        ]);

        assert_eq!(config.endpoint_name, EndpointNameOverride::Explicit("Orders".to_owned()));
        assert_eq!(config.serialization, SerializationChoice::Xml);
        assert_eq!(config.xml_namespace, "urn:orders");
        assert_eq!(config.logging_level, Severity::Warn);
        assert!(config.diagnostics.is_empty());
    }

    #[test]
    fn types_outrank_assemblies() {
        let config = merged(vec![
            DetectedCapability::new(
                ContractId::TypesToScan,
                CapabilityValue::Types(vec![TypeRef::of::<PlaceOrder>()]),
            ),
            DetectedCapability::new(
                ContractId::AssembliesToScan,
                CapabilityValue::Names(vec!["Orders.Messages".to_owned()]),
            ),
        ]);

        assert_eq!(config.scan, ScanSource::Types(vec![TypeRef::of::<PlaceOrder>()]));
        assert!(matches!(
            config.resolution(ContractId::AssembliesToScan),
            Some(Resolution::Shadowed { winner: ContractId::TypesToScan, .. })
        ));
        assert_eq!(config.diagnostics.len(), 1);
        assert_eq!(config.diagnostics[0].contract, ContractId::AssembliesToScan);
    }

    #[test]
    fn namespace_without_xml_serialization_is_suppressed() {
        let config = merged(vec![DetectedCapability::new(
            ContractId::XmlSerializationNamespace,
            "urn:orders",
        )]);

        assert_eq!(config.xml_namespace, DEFAULT_XML_NAMESPACE);
        assert_eq!(
            config.resolution(ContractId::XmlSerializationNamespace),
            Some(&Resolution::Suppressed {
                value: CapabilityValue::from("urn:orders"),
                missing: ContractId::ToUseXmlSerialization,
            })
        );
        assert_eq!(config.diagnostics.len(), 1);
    }

    #[test]
    fn wrong_kind_falls_back_with_a_diagnostic() {
        let config = merged(vec![DetectedCapability::new(ContractId::LoggingLevel, "loud")]);

        assert_eq!(config.logging_level, Severity::Info);
        assert!(matches!(config.resolution(ContractId::LoggingLevel), Some(Resolution::Default(_))));
        assert_eq!(config.diagnostics.len(), 1);
        assert!(config.diagnostics[0].message.contains("Text"));
    }

    #[test]
    fn hooks_are_carried_over() {
        let config = merged(vec![
            DetectedCapability::new(ContractId::StartupAction, CapabilityValue::Hook(Hook::new(|| {}))),
            DetectedCapability::marker(ContractId::MyOwnSagaPersistence),
            DetectedCapability::new(
                ContractId::WantCustomInitialization,
                CapabilityValue::Hook(Hook::new(|| {})),
            ),
        ]);

        assert!(config.startup_action.is_some());
        assert!(config.custom_initialization.is_some());
        assert!(!config.custom_logging_configured());
        assert_eq!(config.persistence, PersistenceChoice::Custom);
    }
}
