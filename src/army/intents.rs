//! Unit intents and the seam through which they reach the simulation
//!
//! Intents are idempotent: issuing the same intent again on the next tick
//! is harmless.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TacticsError};
use crate::core::types::{Position, UnitId};

/// What a unit is told to do
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IntentKind {
    /// Move, fighting anything met on the way
    AttackMove(Position),
    /// Attack a specific hostile unit
    AttackUnit(UnitId),
    /// Move without engaging
    Move(Position),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitIntent {
    pub unit: UnitId,
    pub kind: IntentKind,
}

/// Intents for one tick, at most one per unit
///
/// A later assignment to the same unit replaces the earlier one, the same
/// way a newer order replaces an older one in the simulation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntentPlan {
    intents: Vec<UnitIntent>,
}

impl IntentPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, unit: UnitId, kind: IntentKind) {
        match self.intents.iter_mut().find(|i| i.unit == unit) {
            Some(existing) => existing.kind = kind,
            None => self.intents.push(UnitIntent { unit, kind }),
        }
    }

    pub fn get(&self, unit: UnitId) -> Option<IntentKind> {
        self.intents.iter().find(|i| i.unit == unit).map(|i| i.kind)
    }

    pub fn intents(&self) -> &[UnitIntent] {
        &self.intents
    }

    pub fn into_intents(self) -> Vec<UnitIntent> {
        self.intents
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

/// Receiver of unit intents, implemented by the simulation adapter
pub trait CommandSink {
    /// Hand one intent to the simulation
    ///
    /// An error affects only this unit; the caller keeps dispatching.
    fn issue(&mut self, intent: &UnitIntent) -> Result<()>;
}

/// Sink that keeps every accepted intent, optionally refusing some units
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub issued: Vec<UnitIntent>,
    rejected_units: AHashSet<UnitId>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that fails every intent addressed to one of `units`
    pub fn rejecting(units: impl IntoIterator<Item = UnitId>) -> Self {
        Self {
            issued: Vec::new(),
            rejected_units: units.into_iter().collect(),
        }
    }

    pub fn intent_for(&self, unit: UnitId) -> Option<IntentKind> {
        self.issued.iter().rev().find(|i| i.unit == unit).map(|i| i.kind)
    }
}

impl CommandSink for RecordingSink {
    fn issue(&mut self, intent: &UnitIntent) -> Result<()> {
        if self.rejected_units.contains(&intent.unit) {
            return Err(TacticsError::CommandRejected {
                unit: intent.unit,
                reason: "unit does not accept orders".to_string(),
            });
        }
        self.issued.push(*intent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_assignment_replaces_earlier() {
        let mut plan = IntentPlan::new();
        plan.assign(UnitId(1), IntentKind::Move(Position::new(1.0, 1.0)));
        plan.assign(UnitId(2), IntentKind::AttackUnit(UnitId(9)));
        plan.assign(UnitId(1), IntentKind::AttackUnit(UnitId(9)));

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.get(UnitId(1)), Some(IntentKind::AttackUnit(UnitId(9))));
        // First-assignment order is preserved
        assert_eq!(plan.intents()[0].unit, UnitId(1));
    }

    #[test]
    fn test_recording_sink_rejects_listed_units() {
        let mut sink = RecordingSink::rejecting([UnitId(3)]);
        let ok = UnitIntent { unit: UnitId(1), kind: IntentKind::Move(Position::default()) };
        let bad = UnitIntent { unit: UnitId(3), kind: IntentKind::Move(Position::default()) };

        assert!(sink.issue(&ok).is_ok());
        assert!(matches!(sink.issue(&bad), Err(TacticsError::CommandRejected { .. })));
        assert_eq!(sink.issued.len(), 1);
        assert_eq!(sink.intent_for(UnitId(1)), Some(IntentKind::Move(Position::default())));
        assert_eq!(sink.intent_for(UnitId(3)), None);
    }
}
