//! Memory of where threats were last seen
//!
//! Unlike the threat registry this persists across ticks. It is advisory
//! only: the commander state machine never reads it.

use ahash::AHashMap;

use crate::core::types::{Tick, TilePosition};
use crate::intel::registry::ThreatRegistry;

#[derive(Debug, Clone, Default)]
pub struct SightingLog {
    last_seen: AHashMap<TilePosition, Tick>,
}

impl SightingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the tile under every active threat's centroid
    pub fn record(&mut self, registry: &ThreatRegistry, tick: Tick) {
        for threat in registry.active_threats() {
            self.last_seen.insert(threat.centroid.tile(), tick);
        }
    }

    pub fn last_seen(&self, tile: TilePosition) -> Option<Tick> {
        self.last_seen.get(&tile).copied()
    }

    /// Threat seen on `tile` less than `window` ticks before `now`
    pub fn has_recent_activity(&self, tile: TilePosition, now: Tick, window: Tick) -> bool {
        self.last_seen(tile)
            .map(|seen| now.saturating_sub(seen) < window)
            .unwrap_or(false)
    }

    /// Drop tiles not seen within `window` ticks of `now`
    pub fn forget_older_than(&mut self, now: Tick, window: Tick) {
        self.last_seen.retain(|_, seen| now.saturating_sub(*seen) < window);
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ThreatConfig;
    use crate::core::types::{Position, StructureId, UnitId};
    use crate::intel::cluster::cluster_by_seed;
    use crate::units::catalog::{UnitCategory, UnitKind};
    use crate::units::observed::{FriendlyStructure, ObservedUnit};

    fn registry_with_threat_at(x: f32, y: f32, tick: Tick) -> ThreatRegistry {
        let config = ThreatConfig::default();
        let unit = ObservedUnit {
            id: UnitId(1),
            kind: UnitKind::Zergling,
            category: UnitCategory::Combat,
            position: Position::new(x, y),
            hit_points: 35,
            max_hit_points: 35,
            supply: 1,
        };
        let structures = vec![FriendlyStructure::new(StructureId(1), UnitKind::Hatchery, Position::default())];
        ThreatRegistry::build(cluster_by_seed(&[unit], 300.0), &structures, &config, tick)
    }

    #[test]
    fn test_records_threat_tiles() {
        let mut log = SightingLog::new();
        log.record(&registry_with_threat_at(100.0, 40.0, 10), 10);

        let tile = Position::new(100.0, 40.0).tile();
        assert_eq!(log.last_seen(tile), Some(10));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_recent_activity_window() {
        let mut log = SightingLog::new();
        log.record(&registry_with_threat_at(100.0, 40.0, 10), 10);
        let tile = Position::new(100.0, 40.0).tile();

        assert!(log.has_recent_activity(tile, 500, 1200));
        assert!(!log.has_recent_activity(tile, 1210, 1200));
        assert!(!log.has_recent_activity(TilePosition::new(99, 99), 20, 1200));
    }

    #[test]
    fn test_forget_old_sightings() {
        let mut log = SightingLog::new();
        log.record(&registry_with_threat_at(100.0, 40.0, 10), 10);
        log.record(&registry_with_threat_at(400.0, 40.0, 900), 900);
        assert_eq!(log.len(), 2);

        log.forget_older_than(1300, 1200);
        assert_eq!(log.len(), 1);
        assert_eq!(log.last_seen(Position::new(400.0, 40.0).tile()), Some(900));
    }

    #[test]
    fn test_empty_registry_records_nothing() {
        let mut log = SightingLog::new();
        log.record(&ThreatRegistry::empty(&ThreatConfig::default()), 5);
        assert!(log.is_empty());
    }
}
