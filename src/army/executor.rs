//! Turns the army mode into unit intents
//!
//! Reads [`ArmyState`] but never writes it; a newly chosen attack target is
//! handed back to the caller for the state machine to record.

use crate::army::context::TickObservation;
use crate::army::fsm::{ArmyMode, ArmyState};
use crate::army::intents::{IntentKind, IntentPlan};
use crate::army::micro::CombatMicro;
use crate::core::config::ArmyConfig;
use crate::core::types::Position;
use crate::intel::registry::ThreatRegistry;
use crate::units::catalog::UnitCatalog;

/// Result of one executor pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Execution {
    pub plan: IntentPlan,
    /// Attack destination picked this tick, if any
    pub attack_target: Option<Position>,
}

#[derive(Debug, Clone)]
pub struct MicroExecutor {
    config: ArmyConfig,
}

impl MicroExecutor {
    pub fn new(config: ArmyConfig) -> Self {
        Self { config }
    }

    pub fn execute(
        &self,
        state: &ArmyState,
        obs: &TickObservation,
        registry: &ThreatRegistry,
        micro: &mut CombatMicro,
        catalog: &UnitCatalog,
    ) -> Execution {
        let mut execution = Execution::default();
        match state.mode {
            ArmyMode::Rallying => self.rally(state, obs, &mut execution.plan),
            ArmyMode::Defending => self.defend(state, obs, registry, micro, catalog, &mut execution.plan),
            ArmyMode::Attacking => {
                execution.attack_target = self.attack(state, obs, micro, catalog, &mut execution.plan)
            }
            ArmyMode::Retreating => self.retreat(state, obs, &mut execution.plan),
        }
        execution
    }

    /// Attack-move stragglers back to the rally point
    fn rally(&self, state: &ArmyState, obs: &TickObservation, plan: &mut IntentPlan) {
        let Some(rally) = state.rally_point else {
            return;
        };
        for unit in obs.army {
            if unit.position.distance(&rally) > self.config.arrival_distance
                && !unit.is_moving()
                && !unit.is_attacking()
            {
                plan.assign(unit.id, IntentKind::AttackMove(rally));
            }
        }
    }

    fn defend(
        &self,
        state: &ArmyState,
        obs: &TickObservation,
        registry: &ThreatRegistry,
        micro: &mut CombatMicro,
        catalog: &UnitCatalog,
        plan: &mut IntentPlan,
    ) {
        let Some(defense) = registry.defense_position() else {
            return;
        };

        let targets = obs.engage_targets();
        if !targets.is_empty() {
            micro.execute(obs.army, &targets, state.rally_point, catalog, obs.tick, plan);
            return;
        }

        for unit in obs.army {
            if unit.position.distance(&defense) > self.config.defense_proximity {
                plan.assign(unit.id, IntentKind::AttackMove(defense));
            }
        }
    }

    /// Fight what we see, else head for the enemy base, else search
    fn attack(
        &self,
        state: &ArmyState,
        obs: &TickObservation,
        micro: &mut CombatMicro,
        catalog: &UnitCatalog,
        plan: &mut IntentPlan,
    ) -> Option<Position> {
        let targets = obs.engage_targets();
        if !targets.is_empty() {
            micro.execute(obs.army, &targets, state.rally_point, catalog, obs.tick, plan);
            return None;
        }

        let target = obs
            .enemy_base
            .or_else(|| self.exploration_target(obs))
            .or(state.attack_target)?;

        let reissue = obs.tick % self.config.attack_reissue_interval == 0;
        for unit in obs.army {
            if unit.is_idle() || reissue {
                plan.assign(unit.id, IntentKind::AttackMove(target));
            }
        }
        Some(target)
    }

    /// Cycle through unexplored start locations, one per exploration period
    pub fn exploration_target(&self, obs: &TickObservation) -> Option<Position> {
        let starts = obs.unexplored_starts;
        if starts.is_empty() {
            return None;
        }
        let idx = (obs.tick / self.config.exploration_period) as usize % starts.len();
        Some(starts[idx])
    }

    /// Plain move home, never attack-move
    fn retreat(&self, state: &ArmyState, obs: &TickObservation, plan: &mut IntentPlan) {
        let Some(rally) = state.rally_point else {
            return;
        };
        for unit in obs.army {
            plan.assign(unit.id, IntentKind::Move(rally));
        }
    }
}
