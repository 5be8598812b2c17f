//! Per-tick unit snapshots supplied by the observation and roster collaborators
//!
//! Nothing here outlives the tick it was built for.

use serde::{Deserialize, Serialize};

use crate::core::types::{Position, StructureId, UnitId};
use crate::units::catalog::{UnitCatalog, UnitCategory, UnitKind};

/// A currently visible hostile unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedUnit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub category: UnitCategory,
    pub position: Position,
    pub hit_points: u32,
    pub max_hit_points: u32,
    pub supply: u32,
}

impl ObservedUnit {
    /// Snapshot with category, max hit points and supply taken from the catalog
    pub fn from_catalog(
        catalog: &UnitCatalog,
        id: UnitId,
        kind: UnitKind,
        position: Position,
        hit_points: u32,
    ) -> Self {
        let data = catalog.data(kind);
        Self {
            id,
            kind,
            category: data.category,
            position,
            hit_points,
            max_hit_points: data.max_hit_points,
            supply: data.supply,
        }
    }

    pub fn is_worker(&self) -> bool {
        self.category == UnitCategory::Worker
    }

    pub fn is_structure(&self) -> bool {
        self.category == UnitCategory::Structure
    }

    pub fn is_passive(&self) -> bool {
        self.category == UnitCategory::Passive
    }

    /// Combat units only: the set the threat clusterer works on
    pub fn is_threat_candidate(&self) -> bool {
        self.category == UnitCategory::Combat
    }

    pub fn is_alive(&self) -> bool {
        self.hit_points > 0
    }

    /// Below `fraction` of max hit points
    pub fn is_damaged(&self, fraction: f32) -> bool {
        (self.hit_points as f32) < self.max_hit_points as f32 * fraction
    }
}

/// What a friendly unit is currently doing, as reported by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Idle,
    Moving,
    Attacking,
}

/// A unit of our own combat force
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendlyUnit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub position: Position,
    pub hit_points: u32,
    pub max_hit_points: u32,
    pub supply: u32,
    pub order: OrderStatus,
}

impl FriendlyUnit {
    /// Idle, full-health unit with properties taken from the catalog
    pub fn from_catalog(catalog: &UnitCatalog, id: UnitId, kind: UnitKind, position: Position) -> Self {
        let data = catalog.data(kind);
        Self {
            id,
            kind,
            position,
            hit_points: data.max_hit_points,
            max_hit_points: data.max_hit_points,
            supply: data.supply,
            order: OrderStatus::Idle,
        }
    }

    pub fn with_hit_points(mut self, hit_points: u32) -> Self {
        self.hit_points = hit_points;
        self
    }

    pub fn with_order(mut self, order: OrderStatus) -> Self {
        self.order = order;
        self
    }

    pub fn is_idle(&self) -> bool {
        self.order == OrderStatus::Idle
    }

    pub fn is_moving(&self) -> bool {
        self.order == OrderStatus::Moving
    }

    pub fn is_attacking(&self) -> bool {
        self.order == OrderStatus::Attacking
    }
}

/// A friendly structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendlyStructure {
    pub id: StructureId,
    pub kind: UnitKind,
    pub position: Position,
    pub completed: bool,
}

impl FriendlyStructure {
    pub fn new(id: StructureId, kind: UnitKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            completed: true,
        }
    }

    pub fn under_construction(mut self) -> Self {
        self.completed = false;
        self
    }
}

/// Total supply of a set of friendly units
pub fn total_supply(units: &[FriendlyUnit]) -> u32 {
    units.iter().map(|u| u.supply).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> UnitCatalog {
        UnitCatalog::bundled().unwrap()
    }

    #[test]
    fn test_observed_from_catalog() {
        let unit = ObservedUnit::from_catalog(
            &catalog(),
            UnitId(1),
            UnitKind::Zealot,
            Position::new(10.0, 10.0),
            40,
        );
        assert_eq!(unit.max_hit_points, 100);
        assert_eq!(unit.supply, 4);
        assert!(unit.is_threat_candidate());
        assert!(unit.is_damaged(0.5));
        assert!(!unit.is_damaged(0.3));
    }

    #[test]
    fn test_workers_and_structures_are_not_threat_candidates() {
        let c = catalog();
        let probe = ObservedUnit::from_catalog(&c, UnitId(1), UnitKind::Probe, Position::default(), 20);
        let nexus = ObservedUnit::from_catalog(&c, UnitId(2), UnitKind::Nexus, Position::default(), 750);
        let overlord =
            ObservedUnit::from_catalog(&c, UnitId(3), UnitKind::Overlord, Position::default(), 200);
        assert!(probe.is_worker());
        assert!(nexus.is_structure());
        assert!(!probe.is_threat_candidate());
        assert!(!nexus.is_threat_candidate());
        assert!(!overlord.is_threat_candidate());
        assert!(overlord.is_passive());
        assert!(!probe.is_passive());
    }

    #[test]
    fn test_friendly_with_hit_points_keeps_maximum() {
        let marine = FriendlyUnit::from_catalog(&catalog(), UnitId(5), UnitKind::Marine, Position::default())
            .with_hit_points(10);
        assert_eq!(marine.hit_points, 10);
        assert_eq!(marine.max_hit_points, 40);
        assert!(marine.is_idle());
    }

    #[test]
    fn test_total_supply() {
        let c = catalog();
        let army = vec![
            FriendlyUnit::from_catalog(&c, UnitId(1), UnitKind::Marine, Position::default()),
            FriendlyUnit::from_catalog(&c, UnitId(2), UnitKind::SiegeTankTankMode, Position::default()),
        ];
        assert_eq!(total_supply(&army), 6);
        assert_eq!(total_supply(&[]), 0);
    }
}
