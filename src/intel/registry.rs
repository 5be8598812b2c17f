//! Per-tick registry of hostile clusters threatening our structures
//!
//! The registry is an immutable snapshot: built once from the tick's
//! clusters, then only queried. Nothing carries over to the next tick.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::config::ThreatConfig;
use crate::core::types::{Position, StructureId, Tick, UnitId};
use crate::intel::cluster::UnitCluster;
use crate::units::observed::FriendlyStructure;

/// Ordinal danger of a hostile cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ThreatSeverity {
    Scouting,
    Harassment,
    Attack,
    AllIn,
}

/// Classify a cluster by member count and aggregate supply
///
/// Non-decreasing in both arguments when the other is held fixed.
pub fn classify_severity(member_count: usize, supply: u32, config: &ThreatConfig) -> ThreatSeverity {
    if member_count <= config.scouting_max {
        ThreatSeverity::Scouting
    } else if member_count <= config.harassment_max {
        ThreatSeverity::Harassment
    } else if member_count <= config.attack_max || supply <= config.attack_max_supply {
        ThreatSeverity::Attack
    } else {
        ThreatSeverity::AllIn
    }
}

/// A hostile cluster close enough to one of our structures to matter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatCluster {
    pub members: Vec<UnitId>,
    pub centroid: Position,
    pub supply: u32,
    pub severity: ThreatSeverity,
    pub nearest_structure: StructureId,
    pub structure_distance: f32,
    pub formed_at: Tick,
}

/// Active threats for a single tick
#[derive(Debug, Clone)]
pub struct ThreatRegistry {
    threats: Vec<ThreatCluster>,
    detection_range: f32,
    pull_workers_max_supply: u32,
}

impl ThreatRegistry {
    /// Registry with no active threats
    pub fn empty(config: &ThreatConfig) -> Self {
        Self {
            threats: Vec::new(),
            detection_range: config.detection_range,
            pull_workers_max_supply: config.pull_workers_max_supply,
        }
    }

    /// Keep the clusters within detection range of a friendly structure
    pub fn build(
        clusters: Vec<UnitCluster>,
        structures: &[FriendlyStructure],
        config: &ThreatConfig,
        tick: Tick,
    ) -> Self {
        let mut registry = Self::empty(config);

        for cluster in clusters {
            let Some((structure, distance)) = nearest_structure(structures, cluster.centroid()) else {
                continue;
            };
            if distance >= config.detection_range {
                continue;
            }

            let severity = classify_severity(cluster.len(), cluster.total_supply(), config);
            tracing::debug!(
                "Threat {:?}: {} units, supply {}, {:.0} from structure {:?}",
                severity,
                cluster.len(),
                cluster.total_supply(),
                distance,
                structure.id
            );

            registry.threats.push(ThreatCluster {
                members: cluster.members().to_vec(),
                centroid: cluster.centroid(),
                supply: cluster.total_supply(),
                severity,
                nearest_structure: structure.id,
                structure_distance: distance,
                formed_at: tick,
            });
        }

        registry
    }

    pub fn active_threats(&self) -> &[ThreatCluster] {
        &self.threats
    }

    pub fn has_threats(&self) -> bool {
        !self.threats.is_empty()
    }

    /// Any active threat of harassment severity or worse
    pub fn is_under_attack(&self) -> bool {
        self.threats
            .iter()
            .any(|t| t.severity >= ThreatSeverity::Harassment)
    }

    /// Highest severity threat, ties broken by highest supply, then by
    /// registration order
    pub fn most_serious_threat(&self) -> Option<&ThreatCluster> {
        self.threats.iter().reduce(|best, t| {
            if (t.severity, t.supply) > (best.severity, best.supply) {
                t
            } else {
                best
            }
        })
    }

    /// Where the army should defend, if anywhere
    pub fn defense_position(&self) -> Option<Position> {
        self.most_serious_threat().map(|t| t.centroid)
    }

    /// Workers join the defense only against small harassment
    pub fn should_pull_workers(&self) -> bool {
        self.threats.iter().any(|t| {
            t.severity == ThreatSeverity::Harassment && t.supply < self.pull_workers_max_supply
        })
    }

    pub fn total_threatening_supply(&self) -> u32 {
        self.threats.iter().map(|t| t.supply).sum()
    }

    /// Worst severity among threats within detection range of `position`
    pub fn threat_level_at(&self, position: Position) -> Option<ThreatSeverity> {
        self.threats
            .iter()
            .filter(|t| t.centroid.distance(&position) < self.detection_range)
            .map(|t| t.severity)
            .max()
    }
}

/// Nearest structure to a position, first one wins on ties
fn nearest_structure(structures: &[FriendlyStructure], position: Position) -> Option<(&FriendlyStructure, f32)> {
    structures
        .iter()
        .map(|s| (s, s.position.distance(&position)))
        .min_by_key(|(_, d)| OrderedFloat(*d))
}
