//! Threat intelligence: clustering visible hostiles and ranking the danger
//! they pose to our structures
//!
//! Pipeline per tick: visible hostiles → [`threat_candidates`] →
//! [`ThreatClusterer`] → [`ThreatRegistry`].

pub mod cluster;
pub mod registry;
pub mod sightings;

pub use cluster::{cluster_by_seed, cluster_transitive, ThreatClusterer, UnitCluster};
pub use registry::{classify_severity, ThreatCluster, ThreatRegistry, ThreatSeverity};
pub use sightings::SightingLog;

use crate::units::observed::ObservedUnit;

/// Visible hostiles that can threaten us: no workers, structures or
/// passive units
pub fn threat_candidates(hostiles: &[ObservedUnit]) -> Vec<ObservedUnit> {
    hostiles
        .iter()
        .filter(|u| u.is_threat_candidate() && u.is_alive())
        .cloned()
        .collect()
}
