//! Everything the tactical core sees in one tick
//!
//! Built fresh each tick from the roster and visibility collaborators.

use crate::core::types::{Position, Tick};
use crate::units::observed::{total_supply, FriendlyStructure, FriendlyUnit, ObservedUnit};

pub struct TickObservation<'a> {
    pub tick: Tick,
    /// Our combat units
    pub army: &'a [FriendlyUnit],
    pub structures: &'a [FriendlyStructure],
    /// Currently visible hostile units of every category
    pub hostiles: &'a [ObservedUnit],
    /// Last known enemy main base, if scouted
    pub enemy_base: Option<Position>,
    /// Start locations that could still hold the enemy
    pub unexplored_starts: &'a [Position],
}

impl<'a> TickObservation<'a> {
    pub fn new(
        tick: Tick,
        army: &'a [FriendlyUnit],
        structures: &'a [FriendlyStructure],
        hostiles: &'a [ObservedUnit],
    ) -> Self {
        Self {
            tick,
            army,
            structures,
            hostiles,
            enemy_base: None,
            unexplored_starts: &[],
        }
    }

    pub fn with_enemy_base(mut self, base: Option<Position>) -> Self {
        self.enemy_base = base;
        self
    }

    pub fn with_unexplored_starts(mut self, starts: &'a [Position]) -> Self {
        self.unexplored_starts = starts;
        self
    }

    pub fn army_supply(&self) -> u32 {
        total_supply(self.army)
    }

    /// Hostiles worth shooting at: alive combat units and workers
    ///
    /// Workers stay in so focus fire can pick them first. Structures and
    /// passive units (overlords, larvae, observers) never pull the army in.
    pub fn engage_targets(&self) -> Vec<&'a ObservedUnit> {
        self.hostiles
            .iter()
            .filter(|u| u.is_alive() && !u.is_structure() && !u.is_passive())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UnitId;
    use crate::units::catalog::{UnitCatalog, UnitKind};

    #[test]
    fn test_engage_targets_skip_passive_structures_and_dead() {
        let catalog = UnitCatalog::bundled().unwrap();
        let seen = |id: u32, kind: UnitKind, hp: u32| {
            ObservedUnit::from_catalog(&catalog, UnitId(id), kind, Position::default(), hp)
        };
        let hostiles = vec![
            seen(1, UnitKind::Zergling, 35),
            seen(2, UnitKind::Drone, 40),
            seen(3, UnitKind::Overlord, 200),
            seen(4, UnitKind::Larva, 25),
            seen(5, UnitKind::Observer, 40),
            seen(6, UnitKind::Hatchery, 1250),
            seen(7, UnitKind::Zergling, 0),
        ];
        let obs = TickObservation::new(1, &[], &[], &hostiles);

        let ids: Vec<UnitId> = obs.engage_targets().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![UnitId(1), UnitId(2)]);
    }
}
