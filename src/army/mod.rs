//! Army command: the mode state machine, per-mode execution and combat micro
//!
//! Architecture:
//! - CommandFsm owns ArmyState and decides the mode each tick
//! - MicroExecutor turns the mode into unit intents
//! - CombatMicro handles kiting, focus fire and damaged-unit retreat
//! - CommandSink is the seam to the simulation

pub mod commander;
pub mod context;
pub mod executor;
pub mod fsm;
pub mod intents;
pub mod micro;

pub use commander::{ArmyStatus, TacticalCommander, ThreatSummary, TickPlan, TickReport};
pub use context::TickObservation;
pub use executor::{Execution, MicroExecutor};
pub use fsm::{next_mode, ArmyMode, ArmyState, CommandFsm, FsmInputs, Transition};
pub use intents::{CommandSink, IntentKind, IntentPlan, RecordingSink, UnitIntent};
pub use micro::{CombatMicro, UnitMicroState};
