//! Vanguard - tactical decision core for an autonomous strategy-game agent
//!
//! Each tick the agent hands the [`army::TacticalCommander`] what it can see;
//! the commander clusters hostiles into threats, picks an army mode and
//! returns per-unit intents.

pub mod army;
pub mod core;
pub mod intel;
pub mod units;
