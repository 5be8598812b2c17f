//! Tactical commander - the per-tick pipeline
//!
//! Observation in, intents out:
//! cluster hostiles → build the threat registry → evaluate the state machine
//! → execute the current mode → dispatch through a [`CommandSink`].

use serde::Serialize;

use crate::army::context::TickObservation;
use crate::army::executor::MicroExecutor;
use crate::army::fsm::{ArmyMode, ArmyState, CommandFsm, Transition};
use crate::army::intents::{CommandSink, UnitIntent};
use crate::army::micro::CombatMicro;
use crate::core::config::TacticsConfig;
use crate::core::error::Result;
use crate::core::types::{Position, StructureId, Tick};
use crate::intel::{threat_candidates, SightingLog, ThreatClusterer, ThreatRegistry, ThreatSeverity};
use crate::units::catalog::UnitCatalog;

/// Everything decided in one tick, before dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct TickPlan {
    pub tick: Tick,
    pub transition: Option<Transition>,
    pub intents: Vec<UnitIntent>,
}

/// Outcome of a dispatched tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: Tick,
    pub mode: ArmyMode,
    pub transition: Option<Transition>,
    pub issued: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatSummary {
    pub severity: ThreatSeverity,
    pub centroid: Position,
    pub units: usize,
    pub supply: u32,
    pub nearest_structure: StructureId,
    pub structure_distance: f32,
}

/// Snapshot of the commander for status displays and runner output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArmyStatus {
    pub tick: Tick,
    pub mode: ArmyMode,
    pub description: String,
    pub rally_point: Option<Position>,
    pub attack_target: Option<Position>,
    pub army_supply: u32,
    pub threats: Vec<ThreatSummary>,
    pub total_threatening_supply: u32,
    pub pull_workers: bool,
}

#[derive(Debug, Clone)]
pub struct TacticalCommander {
    catalog: UnitCatalog,
    clusterer: ThreatClusterer,
    fsm: CommandFsm,
    executor: MicroExecutor,
    micro: CombatMicro,
    sightings: SightingLog,
    registry: ThreatRegistry,
    config: TacticsConfig,
    last_tick: Tick,
    last_supply: u32,
}

impl TacticalCommander {
    pub fn new(config: TacticsConfig, catalog: UnitCatalog) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            clusterer: ThreatClusterer::from_config(&config.threat),
            fsm: CommandFsm::new(config.army.clone()),
            executor: MicroExecutor::new(config.army.clone()),
            micro: CombatMicro::new(config.micro.clone()),
            sightings: SightingLog::new(),
            registry: ThreatRegistry::empty(&config.threat),
            catalog,
            config,
            last_tick: 0,
            last_supply: 0,
        })
    }

    /// Commander with default tuning and the bundled unit catalog
    pub fn with_defaults() -> Result<Self> {
        Self::new(TacticsConfig::default(), UnitCatalog::bundled()?)
    }

    pub fn mode(&self) -> ArmyMode {
        self.fsm.mode()
    }

    pub fn army_state(&self) -> &ArmyState {
        self.fsm.state()
    }

    /// Threat registry built on the most recent tick
    pub fn registry(&self) -> &ThreatRegistry {
        &self.registry
    }

    pub fn sightings(&self) -> &SightingLog {
        &self.sightings
    }

    /// A threat was seen on this tile within the sighting memory
    pub fn recently_threatened(&self, position: Position) -> bool {
        self.sightings.has_recent_activity(
            position.tile(),
            self.last_tick,
            self.config.threat.sighting_memory,
        )
    }

    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &TacticsConfig {
        &self.config
    }

    /// Decide this tick's intents without dispatching them
    pub fn plan_tick(&mut self, obs: &TickObservation) -> TickPlan {
        self.fsm.update_rally_point(obs.structures, &self.catalog);

        let candidates = threat_candidates(obs.hostiles);
        let clusters = self.clusterer.cluster(&candidates);
        self.registry = ThreatRegistry::build(clusters, obs.structures, &self.config.threat, obs.tick);
        self.sightings.record(&self.registry, obs.tick);
        self.sightings
            .forget_older_than(obs.tick, self.config.threat.sighting_memory);

        let army_supply = obs.army_supply();
        let inputs = self
            .fsm
            .inputs(obs.army, army_supply, self.registry.is_under_attack());
        let transition = self.fsm.evaluate(inputs);

        let execution = self.executor.execute(
            self.fsm.state(),
            obs,
            &self.registry,
            &mut self.micro,
            &self.catalog,
        );
        if let Some(target) = execution.attack_target {
            self.fsm.record_attack_target(target);
        }

        self.last_tick = obs.tick;
        self.last_supply = army_supply;

        TickPlan {
            tick: obs.tick,
            transition,
            intents: execution.plan.into_intents(),
        }
    }

    /// Plan the tick and hand every intent to `sink`
    ///
    /// A rejected intent is logged and counted; the rest of the army still
    /// gets its orders.
    pub fn process_tick(&mut self, obs: &TickObservation, sink: &mut dyn CommandSink) -> TickReport {
        let plan = self.plan_tick(obs);

        let mut issued = 0;
        let mut rejected = 0;
        for intent in &plan.intents {
            match sink.issue(intent) {
                Ok(()) => issued += 1,
                Err(e) => {
                    tracing::warn!("Intent {:?} for {:?} rejected: {}", intent.kind, intent.unit, e);
                    rejected += 1;
                }
            }
        }

        TickReport {
            tick: plan.tick,
            mode: self.mode(),
            transition: plan.transition,
            issued,
            rejected,
        }
    }

    pub fn status(&self) -> ArmyStatus {
        let state = self.fsm.state();
        ArmyStatus {
            tick: self.last_tick,
            mode: state.mode,
            description: state.mode.description(),
            rally_point: state.rally_point,
            attack_target: state.attack_target,
            army_supply: self.last_supply,
            threats: self
                .registry
                .active_threats()
                .iter()
                .map(|t| ThreatSummary {
                    severity: t.severity,
                    centroid: t.centroid,
                    units: t.members.len(),
                    supply: t.supply,
                    nearest_structure: t.nearest_structure,
                    structure_distance: t.structure_distance,
                })
                .collect(),
            total_threatening_supply: self.registry.total_threatening_supply(),
            pull_workers: self.registry.should_pull_workers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::army::intents::{IntentKind, RecordingSink};
    use crate::core::types::UnitId;
    use crate::units::catalog::UnitKind;
    use crate::units::observed::{FriendlyStructure, FriendlyUnit, ObservedUnit};

    fn commander() -> TacticalCommander {
        TacticalCommander::with_defaults().unwrap()
    }

    fn base() -> Vec<FriendlyStructure> {
        vec![FriendlyStructure::new(StructureId(1), UnitKind::Nexus, Position::new(0.0, 0.0))]
    }

    fn army(count: u32, x: f32) -> Vec<FriendlyUnit> {
        let catalog = UnitCatalog::bundled().unwrap();
        (0..count)
            .map(|i| FriendlyUnit::from_catalog(&catalog, UnitId(i + 1), UnitKind::Zealot, Position::new(x, i as f32 * 10.0)))
            .collect()
    }

    fn zerglings(count: u32, x: f32) -> Vec<ObservedUnit> {
        let catalog = UnitCatalog::bundled().unwrap();
        (0..count)
            .map(|i| {
                ObservedUnit::from_catalog(&catalog, UnitId(100 + i), UnitKind::Zergling, Position::new(x, i as f32 * 5.0), 35)
            })
            .collect()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = TacticsConfig::default();
        config.micro.refresh_interval = 0;
        assert!(TacticalCommander::new(config, UnitCatalog::bundled().unwrap()).is_err());
    }

    #[test]
    fn test_quiet_tick_rallies_stragglers() {
        let mut cmd = commander();
        let structures = base();
        let army = army(2, 1000.0);
        let obs = TickObservation::new(1, &army, &structures, &[]);

        let plan = cmd.plan_tick(&obs);
        assert_eq!(plan.transition, None);
        assert_eq!(cmd.mode(), ArmyMode::Rallying);
        assert_eq!(plan.intents.len(), 2);
        assert!(plan
            .intents
            .iter()
            .all(|i| i.kind == IntentKind::AttackMove(Position::new(0.0, 0.0))));
    }

    #[test]
    fn test_raid_switches_to_defending_and_engages() {
        let mut cmd = commander();
        let structures = base();
        let army = army(3, 50.0);
        let raiders = zerglings(4, 200.0);
        let obs = TickObservation::new(1, &army, &structures, &raiders);

        let plan = cmd.plan_tick(&obs);
        assert_eq!(
            plan.transition,
            Some(Transition {
                from: ArmyMode::Rallying,
                to: ArmyMode::Defending
            })
        );
        assert!(cmd.registry().is_under_attack());
        assert_eq!(cmd.sightings().len(), 1);
        let centroid = cmd.registry().active_threats()[0].centroid;
        assert!(cmd.recently_threatened(centroid));
        assert!(!cmd.recently_threatened(Position::new(3000.0, 3000.0)));
        assert!(plan
            .intents
            .iter()
            .all(|i| matches!(i.kind, IntentKind::AttackUnit(_))));
    }

    #[test]
    fn test_process_tick_isolates_rejections() {
        let mut cmd = commander();
        let structures = base();
        let army = army(3, 1000.0);
        let obs = TickObservation::new(1, &army, &structures, &[]);
        let mut sink = RecordingSink::rejecting([UnitId(2)]);

        let report = cmd.process_tick(&obs, &mut sink);
        assert_eq!(report.issued, 2);
        assert_eq!(report.rejected, 1);
        assert!(sink.intent_for(UnitId(1)).is_some());
        assert!(sink.intent_for(UnitId(3)).is_some());
    }

    #[test]
    fn test_status_reflects_last_tick() {
        let mut cmd = commander();
        let structures = base();
        let army = army(3, 50.0);
        let raiders = zerglings(4, 200.0);
        cmd.plan_tick(&TickObservation::new(7, &army, &structures, &raiders));

        let status = cmd.status();
        assert_eq!(status.tick, 7);
        assert_eq!(status.mode, ArmyMode::Defending);
        assert_eq!(status.description, "Defending base");
        assert_eq!(status.army_supply, 12);
        assert_eq!(status.threats.len(), 1);
        assert_eq!(status.threats[0].units, 4);
        assert_eq!(status.total_threatening_supply, 4);
        assert!(status.pull_workers);

        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"mode\":\"Defending\""));
    }
}
