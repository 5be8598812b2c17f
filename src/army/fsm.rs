//! Army command state machine
//!
//! The army is always in exactly one mode. Modes change only through
//! [`next_mode`], evaluated once per tick, and at most one transition
//! happens per tick. The supply thresholds on either side of each edge
//! differ so the army doesn't flap between modes.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::config::ArmyConfig;
use crate::core::types::Position;
use crate::units::catalog::UnitCatalog;
use crate::units::observed::{FriendlyStructure, FriendlyUnit};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArmyMode {
    #[default]
    #[display(fmt = "Rallying at base")]
    Rallying,
    #[display(fmt = "Defending base")]
    Defending,
    #[display(fmt = "Attacking enemy")]
    Attacking,
    #[display(fmt = "Retreating")]
    Retreating,
}

impl ArmyMode {
    pub fn description(&self) -> String {
        self.to_string()
    }
}

/// Inputs the transition table looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsmInputs {
    pub army_supply: u32,
    pub under_attack: bool,
    /// Every army unit is within arrival distance of the rally point;
    /// `None` while the rally point is unknown
    pub arrived_at_rally: Option<bool>,
}

/// The transition table
///
/// Pure: identical inputs always give the same mode.
pub fn next_mode(mode: ArmyMode, inputs: FsmInputs, config: &ArmyConfig) -> ArmyMode {
    let FsmInputs {
        army_supply,
        under_attack,
        arrived_at_rally,
    } = inputs;

    match mode {
        ArmyMode::Rallying => {
            if army_supply >= config.attack_supply && !under_attack {
                ArmyMode::Attacking
            } else if under_attack {
                ArmyMode::Defending
            } else {
                mode
            }
        }
        ArmyMode::Attacking => {
            if under_attack {
                ArmyMode::Defending
            } else if army_supply < config.retreat_supply * 2 {
                ArmyMode::Retreating
            } else {
                mode
            }
        }
        ArmyMode::Defending => {
            if under_attack {
                mode
            } else if army_supply < config.rally_supply {
                ArmyMode::Rallying
            } else {
                ArmyMode::Attacking
            }
        }
        ArmyMode::Retreating => match arrived_at_rally {
            // Home while the base is being hit: defend rather than idle
            Some(true) if under_attack => ArmyMode::Defending,
            Some(true) => ArmyMode::Rallying,
            _ => mode,
        },
    }
}

/// State that persists for the whole match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmyState {
    pub mode: ArmyMode,
    pub rally_point: Option<Position>,
    pub attack_target: Option<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: ArmyMode,
    pub to: ArmyMode,
}

/// Sole owner and writer of [`ArmyState`]
#[derive(Debug, Clone)]
pub struct CommandFsm {
    state: ArmyState,
    config: ArmyConfig,
}

impl CommandFsm {
    pub fn new(config: ArmyConfig) -> Self {
        Self {
            state: ArmyState::default(),
            config,
        }
    }

    pub fn state(&self) -> &ArmyState {
        &self.state
    }

    pub fn mode(&self) -> ArmyMode {
        self.state.mode
    }

    /// Rally at the first completed resource depot, if any
    pub fn update_rally_point(&mut self, structures: &[FriendlyStructure], catalog: &UnitCatalog) {
        if let Some(base) = structures
            .iter()
            .find(|s| s.completed && catalog.is_resource_depot(s.kind))
        {
            self.state.rally_point = Some(base.position);
        }
    }

    /// Remember where the army was last sent to attack
    pub fn record_attack_target(&mut self, target: Position) {
        self.state.attack_target = Some(target);
    }

    pub fn inputs(&self, army: &[FriendlyUnit], army_supply: u32, under_attack: bool) -> FsmInputs {
        let arrived_at_rally = self.state.rally_point.map(|rally| {
            army.iter()
                .all(|u| u.position.distance(&rally) < self.config.arrival_distance)
        });
        FsmInputs {
            army_supply,
            under_attack,
            arrived_at_rally,
        }
    }

    /// Apply the transition table once
    pub fn evaluate(&mut self, inputs: FsmInputs) -> Option<Transition> {
        let from = self.state.mode;
        let to = next_mode(from, inputs, &self.config);
        if from == to {
            return None;
        }

        tracing::info!(
            "Army mode {:?} -> {:?} (supply {}, under attack: {})",
            from,
            to,
            inputs.army_supply,
            inputs.under_attack
        );
        self.state.mode = to;
        Some(Transition { from, to })
    }
}
