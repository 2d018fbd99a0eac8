//! Property-based tests for the topology manager.
//!
//! Random sequences of owner mutations must always leave the host graph as a
//! single head-to-tail path that matches the manager's stage set, with one
//! stage per live slot sized by its family.

use proptest::prelude::*;

use eqchain::host::SoftwareHost;
use eqchain::model::{ChainSettings, FilterFamily, SlotSetting, SLOT_COUNT};
use eqchain::TopologyManager;

#[derive(Debug, Clone)]
enum Mutation {
    Family(usize, FilterFamily),
    Bypass(usize, bool),
    Frequency(usize, f32),
    Q(usize, f32),
    Gain(usize, f32),
    Apply(usize, SlotSetting),
}

fn family() -> impl Strategy<Value = FilterFamily> {
    prop_oneof![
        1 => Just(FilterFamily::Inactive),
        4 => prop::sample::select(FilterFamily::ALL.to_vec()),
    ]
}

fn slot_setting() -> impl Strategy<Value = SlotSetting> {
    (family(), 20.0f32..20000.0, 0.1f32..10.0, -18.0f32..18.0, any::<bool>()).prop_map(
        |(family, frequency, q, gain, bypassed)| SlotSetting {
            family,
            frequency,
            q,
            gain,
            bypassed,
        },
    )
}

fn mutation() -> impl Strategy<Value = Mutation> {
    let slot = 0..SLOT_COUNT;
    prop_oneof![
        4 => (slot.clone(), family()).prop_map(|(i, f)| Mutation::Family(i, f)),
        3 => (slot.clone(), any::<bool>()).prop_map(|(i, b)| Mutation::Bypass(i, b)),
        1 => (slot.clone(), 20.0f32..20000.0).prop_map(|(i, f)| Mutation::Frequency(i, f)),
        1 => (slot.clone(), 0.1f32..10.0).prop_map(|(i, q)| Mutation::Q(i, q)),
        1 => (slot.clone(), -18.0f32..18.0).prop_map(|(i, g)| Mutation::Gain(i, g)),
        2 => (slot, slot_setting()).prop_map(|(i, s)| Mutation::Apply(i, s)),
    ]
}

fn run(chain: &mut TopologyManager<SoftwareHost>, mutation: &Mutation) {
    let result = match *mutation {
        Mutation::Family(i, f) => chain.set_family(i, f),
        Mutation::Bypass(i, b) => chain.set_bypass(i, b),
        Mutation::Frequency(i, f) => chain.set_frequency(i, f),
        Mutation::Q(i, q) => chain.set_q(i, q),
        Mutation::Gain(i, g) => chain.set_gain(i, g),
        Mutation::Apply(i, s) => chain.apply(i, s),
    };
    assert!(result.is_ok(), "{:?} failed: {:?}", mutation, result);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// After every mutation the host holds exactly one path, it is the
    /// manager's signal path, and no section is leaked.
    #[test]
    fn graph_stays_a_single_path(
        mutations in prop::collection::vec(mutation(), 1..40),
    ) {
        let host = SoftwareHost::default();
        let (head, tail) = (host.head(), host.tail());
        let mut chain = TopologyManager::new(host, head, tail, ChainSettings::default());

        for mutation in &mutations {
            run(&mut chain, mutation);

            prop_assert_eq!(chain.host().path(), Some(chain.signal_path()));
            let staged: usize = chain.state().stages().iter().map(|s| s.len()).sum();
            prop_assert_eq!(chain.host().live_sections(), staged);
            prop_assert_eq!(chain.host().edge_count(), staged + 1);
        }
    }

    /// A slot has a stage exactly when it is live, sized by its family, and
    /// every section carries the slot's current tuning.
    #[test]
    fn stages_follow_settings(
        mutations in prop::collection::vec(mutation(), 1..40),
    ) {
        let host = SoftwareHost::default();
        let (head, tail) = (host.head(), host.tail());
        let mut chain = TopologyManager::new(host, head, tail, ChainSettings::empty());

        for mutation in &mutations {
            run(&mut chain, mutation);
        }

        for (slot, setting) in chain.settings().iter().enumerate() {
            match chain.stage_sections(slot) {
                Some(sections) => {
                    prop_assert!(setting.is_live());
                    prop_assert_eq!(sections.len(), setting.family.section_count());
                    for &node in sections {
                        let params = chain.host().section(node).unwrap();
                        prop_assert_eq!(Some(params.kind), setting.family.concrete_kind());
                        prop_assert_eq!(params.frequency, setting.frequency);
                        prop_assert_eq!(params.q, setting.q);
                        prop_assert_eq!(params.gain, setting.gain);
                    }
                }
                None => prop_assert!(!setting.is_live()),
            }
        }
    }

    /// Rebuilding from the final settings yields the same shape as the
    /// incrementally rewired chain.
    #[test]
    fn incremental_matches_fresh_build(
        mutations in prop::collection::vec(mutation(), 1..30),
    ) {
        let host = SoftwareHost::default();
        let (head, tail) = (host.head(), host.tail());
        let mut chain = TopologyManager::new(host, head, tail, ChainSettings::default());
        for mutation in &mutations {
            run(&mut chain, mutation);
        }

        let fresh_host = SoftwareHost::default();
        let (head, tail) = (fresh_host.head(), fresh_host.tail());
        let fresh = TopologyManager::new(fresh_host, head, tail, *chain.settings());

        prop_assert_eq!(chain.active_slots(), fresh.active_slots());
        for slot in chain.active_slots() {
            prop_assert_eq!(
                chain.stage_sections(slot).map(|s| s.len()),
                fresh.stage_sections(slot).map(|s| s.len())
            );
        }
    }
}
