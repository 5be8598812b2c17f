//! Tactical configuration with documented constants
//!
//! Threat bands, army supply thresholds and micro timings live here so a
//! TOML file can retune them without touching the pipeline. Distances are
//! in world units (one map tile = 32 units), durations in ticks.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Result, TacticsError};
use crate::core::types::Tick;

/// How hostile units are grouped into clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStrategy {
    /// Greedy grouping measured from each seed only; order-dependent
    #[default]
    SeedRadius,
    /// Connected components of the radius graph; order-independent
    Transitive,
}

/// Threat detection and severity classification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatConfig {
    /// Radius within which hostile units join a cluster
    pub cluster_radius: f32,

    /// Clustering rule, see [`ClusterStrategy`]
    pub cluster_strategy: ClusterStrategy,

    /// A cluster is a threat only if its centroid is closer than this
    /// to one of our structures
    pub detection_range: f32,

    /// Clusters with at most this many members are scouting parties
    pub scouting_max: usize,

    /// Clusters with at most this many members are harassment
    pub harassment_max: usize,

    /// Clusters with at most this many members are attacks
    pub attack_max: usize,

    /// Larger clusters whose supply stays at or below this are still
    /// classified as attacks rather than all-ins
    pub attack_max_supply: u32,

    /// Workers are pulled only against harassment below this supply
    ///
    /// Pulling workers into a fight the army can't win loses the economy
    /// as well as the fight.
    pub pull_workers_max_supply: u32,

    /// How long a sighting keeps a tile flagged as recently active
    pub sighting_memory: Tick,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            cluster_radius: 300.0,
            cluster_strategy: ClusterStrategy::SeedRadius,
            detection_range: 800.0,
            scouting_max: 2,
            harassment_max: 6,
            attack_max: 15,
            attack_max_supply: 30,
            pull_workers_max_supply: 20,
            sighting_memory: 1200,
        }
    }
}

/// Army-level thresholds driving the commander state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmyConfig {
    /// Army supply needed to leave the rally point and attack
    pub attack_supply: u32,

    /// Attacking armies below twice this supply fall back
    pub retreat_supply: u32,

    /// After a defense, armies at or above this supply go on the attack
    pub rally_supply: u32,

    /// Distance to the rally point at which a unit counts as arrived
    pub arrival_distance: f32,

    /// Defenders stop closing in once this near the defense position
    pub defense_proximity: f32,

    /// Attack orders are re-issued to every unit on ticks divisible by this
    ///
    /// Recovers units whose orders got stuck. Pure tuning; any positive
    /// value is correct.
    pub attack_reissue_interval: Tick,

    /// Ticks spent on each unexplored start location while searching
    pub exploration_period: Tick,
}

impl Default for ArmyConfig {
    fn default() -> Self {
        Self {
            attack_supply: 40,
            retreat_supply: 10,
            rally_supply: 20,
            arrival_distance: 300.0,
            defense_proximity: 200.0,
            attack_reissue_interval: 50,
            exploration_period: 2000,
        }
    }
}

/// Per-unit combat micro
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MicroConfig {
    /// Units whose ground weapon reaches further than this are ranged
    pub ranged_threshold: f32,

    /// Slack added to weapon range when looking for kiting targets
    pub kite_range_buffer: f32,

    /// How far a kiting unit steps back while its weapon cools down
    pub kite_retreat_distance: f32,

    /// Approximate weapon cooldown in ticks
    pub weapon_cooldown: Tick,

    /// Ticks-since-attack assumed for units that never attacked
    pub never_attacked_ticks: Tick,

    /// Focus-fire targets are refreshed on ticks divisible by this
    pub refresh_interval: Tick,

    /// Units below this percentage of max hit points pull back
    pub retreat_hp_percent: u32,

    /// Hostiles below this fraction of max hit points count as damaged
    pub damaged_fraction: f32,
}

impl Default for MicroConfig {
    fn default() -> Self {
        Self {
            ranged_threshold: 64.0,
            kite_range_buffer: 32.0,
            kite_retreat_distance: 64.0,
            weapon_cooldown: 15,
            never_attacked_ticks: 1000,
            refresh_interval: 24,
            retreat_hp_percent: 30,
            damaged_fraction: 0.5,
        }
    }
}

/// Complete tactical configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TacticsConfig {
    #[serde(default)]
    pub threat: ThreatConfig,
    #[serde(default)]
    pub army: ArmyConfig,
    #[serde(default)]
    pub micro: MicroConfig,
}

impl TacticsConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: TacticsConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let t = &self.threat;
        if t.cluster_radius <= 0.0 || t.detection_range <= 0.0 {
            return Err(invalid("cluster_radius and detection_range must be positive"));
        }

        // Severity bounds should be ordered
        if !(t.scouting_max < t.harassment_max && t.harassment_max < t.attack_max) {
            return Err(invalid(format!(
                "severity bounds must increase: scouting_max ({}) < harassment_max ({}) < attack_max ({})",
                t.scouting_max, t.harassment_max, t.attack_max
            )));
        }

        let a = &self.army;
        if a.arrival_distance <= 0.0 || a.defense_proximity <= 0.0 {
            return Err(invalid("arrival_distance and defense_proximity must be positive"));
        }
        if a.attack_reissue_interval == 0 || a.exploration_period == 0 {
            return Err(invalid("attack_reissue_interval and exploration_period must be non-zero"));
        }

        let m = &self.micro;
        if m.refresh_interval == 0 {
            return Err(invalid("refresh_interval must be non-zero"));
        }
        if m.retreat_hp_percent > 100 {
            return Err(invalid(format!(
                "retreat_hp_percent ({}) must be within 0..=100",
                m.retreat_hp_percent
            )));
        }
        if !(0.0..=1.0).contains(&m.damaged_fraction) {
            return Err(invalid("damaged_fraction must be within 0.0..=1.0"));
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> TacticsError {
    TacticsError::InvalidConfig(msg.into())
}

/// Load configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<TacticsConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    TacticsConfig::from_toml_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TacticsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let config = TacticsConfig::from_toml_str(
            r#"
[threat]
cluster_radius = 250.0
cluster_strategy = "transitive"

[army]
attack_supply = 60
"#,
        )
        .expect("partial config should parse");

        assert_eq!(config.threat.cluster_radius, 250.0);
        assert_eq!(config.threat.cluster_strategy, ClusterStrategy::Transitive);
        assert_eq!(config.threat.detection_range, 800.0);
        assert_eq!(config.army.attack_supply, 60);
        assert_eq!(config.army.retreat_supply, 10);
        assert_eq!(config.micro.weapon_cooldown, 15);
    }

    #[test]
    fn test_unordered_severity_bounds_rejected() {
        let mut config = TacticsConfig::default();
        config.threat.harassment_max = 20;
        assert!(matches!(config.validate(), Err(TacticsError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = TacticsConfig::default();
        config.micro.refresh_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retreat_percent_out_of_range_rejected() {
        let mut config = TacticsConfig::default();
        config.micro.retreat_hp_percent = 150;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = TacticsConfig::from_toml_str("[threat\ncluster_radius = ");
        assert!(matches!(result, Err(TacticsError::TomlError(_))));
    }

    #[test]
    fn test_load_bundled_config() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/tactics.toml");
        let config = load_config(path).expect("bundled config should load");
        assert_eq!(config.army.attack_supply, 40);
    }
}
