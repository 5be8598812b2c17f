use proptest::prelude::*;
use vanguard::army::{next_mode, ArmyMode, CommandFsm, FsmInputs, RecordingSink, TacticalCommander, TickObservation};
use vanguard::core::{ArmyConfig, ClusterStrategy, Position, StructureId, ThreatConfig, UnitId};
use vanguard::intel::{classify_severity, ThreatClusterer};
use vanguard::units::{FriendlyStructure, FriendlyUnit, ObservedUnit, UnitCatalog, UnitKind};

fn hostiles_strategy() -> impl Strategy<Value = Vec<(f32, f32, u32)>> {
    prop::collection::vec((0.0f32..3000.0, 0.0f32..3000.0, 1u32..9), 0..40)
}

fn build_hostiles(raw: &[(f32, f32, u32)]) -> Vec<ObservedUnit> {
    raw.iter()
        .enumerate()
        .map(|(i, &(x, y, supply))| ObservedUnit {
            id: UnitId(i as u32 + 1),
            kind: UnitKind::Zergling,
            category: Default::default(),
            position: Position::new(x, y),
            hit_points: 35,
            max_hit_points: 35,
            supply,
        })
        .collect()
}

fn mode_strategy() -> impl Strategy<Value = ArmyMode> {
    prop_oneof![
        Just(ArmyMode::Rallying),
        Just(ArmyMode::Defending),
        Just(ArmyMode::Attacking),
        Just(ArmyMode::Retreating),
    ]
}

fn inputs_strategy() -> impl Strategy<Value = FsmInputs> {
    (0u32..120, any::<bool>(), prop::option::of(any::<bool>())).prop_map(|(army_supply, under_attack, arrived_at_rally)| {
        FsmInputs {
            army_supply,
            under_attack,
            arrived_at_rally,
        }
    })
}

// Every clustering is a partition of the input with a consistent supply total
proptest! {
    #[test]
    fn test_clusters_partition_hostiles(
        raw in hostiles_strategy(),
        radius in 50.0f32..600.0,
        transitive in any::<bool>(),
    ) {
        let hostiles = build_hostiles(&raw);
        let strategy = if transitive { ClusterStrategy::Transitive } else { ClusterStrategy::SeedRadius };
        let clusters = ThreatClusterer::new(radius, strategy).cluster(&hostiles);

        let mut seen: Vec<UnitId> = clusters.iter().flat_map(|c| c.members().iter().copied()).collect();
        seen.sort();
        let mut expected: Vec<UnitId> = hostiles.iter().map(|h| h.id).collect();
        expected.sort();
        prop_assert_eq!(seen, expected);

        for cluster in &clusters {
            prop_assert!(!cluster.is_empty());
            let supply: u32 = hostiles
                .iter()
                .filter(|h| cluster.members().contains(&h.id))
                .map(|h| h.supply)
                .sum();
            prop_assert_eq!(cluster.total_supply(), supply);
        }
    }

    #[test]
    fn test_seed_clusters_stay_within_radius_of_seed(
        raw in hostiles_strategy(),
        radius in 50.0f32..600.0,
    ) {
        let hostiles = build_hostiles(&raw);
        let clusters = ThreatClusterer::new(radius, ClusterStrategy::SeedRadius).cluster(&hostiles);
        for cluster in &clusters {
            let position = |id: UnitId| hostiles.iter().find(|h| h.id == id).map(|h| h.position);
            let seed = position(cluster.members()[0]).unwrap();
            for id in cluster.members() {
                prop_assert!(position(*id).unwrap().distance(&seed) <= radius);
            }
        }
    }
}

// Severity never drops as a cluster grows in size or supply
proptest! {
    #[test]
    fn test_severity_monotone_in_size(count in 1usize..40, extra in 0usize..10, supply in 0u32..80) {
        let config = ThreatConfig::default();
        let smaller = classify_severity(count, supply, &config);
        let larger = classify_severity(count + extra, supply, &config);
        prop_assert!(larger >= smaller);
    }

    #[test]
    fn test_severity_monotone_in_supply(count in 1usize..40, supply in 0u32..80, extra in 0u32..40) {
        let config = ThreatConfig::default();
        prop_assert!(classify_severity(count, supply + extra, &config) >= classify_severity(count, supply, &config));
    }

    #[test]
    fn test_small_clusters_ignore_supply(count in 1usize..=6, supply in 0u32..200) {
        let config = ThreatConfig::default();
        prop_assert_eq!(classify_severity(count, supply, &config), classify_severity(count, 0, &config));
    }
}

// The state machine follows the transition table and its safety rules
proptest! {
    #[test]
    fn test_fsm_copies_follow_the_same_path(
        history in prop::collection::vec(inputs_strategy(), 1..30),
        split in 0usize..30,
    ) {
        let mut first = CommandFsm::new(ArmyConfig::default());
        // Diverge mid-history: the clone must carry all the state it needs
        let split = split.min(history.len());
        for inputs in &history[..split] {
            first.evaluate(*inputs);
        }
        let mut second = first.clone();
        for inputs in &history[split..] {
            let a = first.evaluate(*inputs);
            let b = second.evaluate(*inputs);
            prop_assert_eq!(a, b);
            prop_assert_eq!(first.state(), second.state());
        }
        // The final mode is the table folded over the whole history
        let mut replay = ArmyMode::default();
        for inputs in &history {
            replay = next_mode(replay, *inputs, &ArmyConfig::default());
        }
        prop_assert_eq!(first.mode(), replay);
    }

    #[test]
    fn test_never_attacks_while_under_attack(mode in mode_strategy(), mut inputs in inputs_strategy()) {
        inputs.under_attack = true;
        let next = next_mode(mode, inputs, &ArmyConfig::default());
        prop_assert_ne!(next, ArmyMode::Attacking);
        prop_assert_ne!(next, ArmyMode::Rallying);
    }

    #[test]
    fn test_retreat_needs_known_rally(mode in mode_strategy(), mut inputs in inputs_strategy()) {
        inputs.arrived_at_rally = None;
        let next = next_mode(mode, inputs, &ArmyConfig::default());
        if mode == ArmyMode::Retreating {
            prop_assert_eq!(next, ArmyMode::Retreating);
        }
    }
}

// Two commanders fed the same ticks plan the same intents
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_commander_replays_identically(
        raw in hostiles_strategy(),
        army_size in 1u32..15,
        ticks in 1u64..20,
    ) {
        let catalog = UnitCatalog::bundled().unwrap();
        let structures = vec![FriendlyStructure::new(StructureId(1), UnitKind::Nexus, Position::new(500.0, 500.0))];
        let army: Vec<FriendlyUnit> = (0..army_size)
            .map(|i| FriendlyUnit::from_catalog(&catalog, UnitId(1000 + i), UnitKind::Dragoon, Position::new(600.0 + i as f32 * 20.0, 900.0)))
            .collect();
        let hostiles = build_hostiles(&raw);

        let mut first = TacticalCommander::with_defaults().unwrap();
        let mut second = first.clone();
        for tick in 0..ticks {
            let obs = TickObservation::new(tick, &army, &structures, &hostiles);
            let mut sink_a = RecordingSink::new();
            let mut sink_b = RecordingSink::new();
            let report_a = first.process_tick(&obs, &mut sink_a);
            let report_b = second.process_tick(&obs, &mut sink_b);
            prop_assert_eq!(report_a, report_b);
            prop_assert_eq!(sink_a.issued, sink_b.issued);
        }
        prop_assert_eq!(first.status(), second.status());
    }
}
