use courier_kernel::capability::{
    CapabilityRegistry, DetectedCapabilities, DetectedCapability, merge, violations,
};
use courier_kernel::domain::{ContractId, HostSettings, TypeRef};
use proptest::prelude::*;
use proptest::sample::subsequence;
use strum::IntoEnumIterator;

struct Probed;

fn registry() -> CapabilityRegistry {
    CapabilityRegistry::standard(&HostSettings::default()).unwrap()
}

fn all_contracts() -> Vec<ContractId> {
    ContractId::iter().collect()
}

fn detected(ids: &[ContractId]) -> DetectedCapabilities {
    ids.iter().map(|id| DetectedCapability::marker(*id)).collect()
}

proptest! {
    #[test]
    fn violations_ignore_detection_order(
        ids in subsequence(all_contracts(), 0..=8).prop_shuffle()
    ) {
        let registry = registry();
        let mut reversed = ids.clone();
        reversed.reverse();

        prop_assert_eq!(
            violations(&detected(&ids), &registry),
            violations(&detected(&reversed), &registry)
        );
    }

    #[test]
    fn merge_covers_every_registered_contract(
        ids in subsequence(all_contracts(), 0..=8)
    ) {
        let registry = registry();
        let config = merge(&detected(&ids), &registry, TypeRef::of::<Probed>());

        prop_assert_eq!(config.resolutions.len(), registry.contracts().count());
        prop_assert!(config.resolved_contracts().ids().all(|id| ids.contains(&id)));
    }

    #[test]
    fn merge_is_repeatable(ids in subsequence(all_contracts(), 0..=8)) {
        let registry = registry();
        let set = detected(&ids);
        let first = merge(&set, &registry, TypeRef::of::<Probed>());
        let second = merge(&set, &registry, TypeRef::of::<Probed>());

        prop_assert_eq!(&first.resolutions, &second.resolutions);
        prop_assert_eq!(&first.diagnostics, &second.diagnostics);
    }
}
