//! Unit types and their static properties
//!
//! Every question the tactical core asks about a unit type (is it a worker,
//! how far does it shoot, what does it cost) is answered from this table.
//! The table is loaded once from `data/unit_catalog.toml`.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Result, TacticsError};

const BUNDLED_CATALOG: &str = include_str!("../../data/unit_catalog.toml");

/// Type of unit as reported by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    // Workers
    Scv,
    Probe,
    Drone,

    // Terran
    Marine,
    Firebat,
    Medic,
    Vulture,
    SiegeTankTankMode,
    SiegeTankSiegeMode,
    Goliath,
    Wraith,

    // Protoss
    Zealot,
    Dragoon,
    HighTemplar,
    DarkTemplar,
    Reaver,
    Archon,

    // Zerg
    Zergling,
    Hydralisk,
    Lurker,
    Mutalisk,
    Ultralisk,
    Defiler,

    // Passive
    Overlord,
    Larva,
    Observer,

    // Structures
    CommandCenter,
    Bunker,
    MissileTurret,
    Nexus,
    PhotonCannon,
    Hatchery,
    SunkenColony,
    SporeColony,
}

impl UnitKind {
    pub const ALL: [UnitKind; 34] = [
        UnitKind::Scv,
        UnitKind::Probe,
        UnitKind::Drone,
        UnitKind::Marine,
        UnitKind::Firebat,
        UnitKind::Medic,
        UnitKind::Vulture,
        UnitKind::SiegeTankTankMode,
        UnitKind::SiegeTankSiegeMode,
        UnitKind::Goliath,
        UnitKind::Wraith,
        UnitKind::Zealot,
        UnitKind::Dragoon,
        UnitKind::HighTemplar,
        UnitKind::DarkTemplar,
        UnitKind::Reaver,
        UnitKind::Archon,
        UnitKind::Zergling,
        UnitKind::Hydralisk,
        UnitKind::Lurker,
        UnitKind::Mutalisk,
        UnitKind::Ultralisk,
        UnitKind::Defiler,
        UnitKind::Overlord,
        UnitKind::Larva,
        UnitKind::Observer,
        UnitKind::CommandCenter,
        UnitKind::Bunker,
        UnitKind::MissileTurret,
        UnitKind::Nexus,
        UnitKind::PhotonCannon,
        UnitKind::Hatchery,
        UnitKind::SunkenColony,
        UnitKind::SporeColony,
    ];
}

/// Broad role of a unit type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitCategory {
    Worker,
    #[default]
    Combat,
    /// Units that never threaten anything (overlords, larvae, observers)
    Passive,
    Structure,
}

/// Static properties of a unit type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitTypeData {
    pub category: UnitCategory,
    pub max_hit_points: u32,
    pub supply: u32,
    /// Maximum ground weapon range, zero for unarmed types
    pub ground_range: f32,
    /// Priority focus-fire target (siege units, casters)
    pub high_value: bool,
    pub resource_depot: bool,
}

impl UnitTypeData {
    /// Entry used for kinds missing from a partial catalog
    pub const UNKNOWN: UnitTypeData = UnitTypeData {
        category: UnitCategory::Combat,
        max_hit_points: 0,
        supply: 0,
        ground_range: 0.0,
        high_value: false,
        resource_depot: false,
    };
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    kind: UnitKind,
    category: UnitCategory,
    max_hit_points: u32,
    supply: u32,
    #[serde(default)]
    ground_range: f32,
    #[serde(default)]
    high_value: bool,
    #[serde(default)]
    resource_depot: bool,
}

impl CatalogEntry {
    fn into_pair(self) -> (UnitKind, UnitTypeData) {
        (
            self.kind,
            UnitTypeData {
                category: self.category,
                max_hit_points: self.max_hit_points,
                supply: self.supply,
                ground_range: self.ground_range,
                high_value: self.high_value,
                resource_depot: self.resource_depot,
            },
        )
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    unit: Vec<CatalogEntry>,
}

/// Lookup table from unit kind to static properties
#[derive(Debug, Clone)]
pub struct UnitCatalog {
    entries: AHashMap<UnitKind, UnitTypeData>,
}

impl UnitCatalog {
    /// Catalog compiled into the binary
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_CATALOG)
    }

    /// Load a catalog from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Parse a complete catalog: every kind exactly once
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(contents)?;
        let catalog = Self::from_entries(file.unit.into_iter().map(CatalogEntry::into_pair))?;

        let missing: Vec<_> = UnitKind::ALL
            .iter()
            .filter(|k| !catalog.entries.contains_key(*k))
            .collect();
        if !missing.is_empty() {
            return Err(TacticsError::InvalidCatalog(format!(
                "missing unit kinds: {:?}",
                missing
            )));
        }

        Ok(catalog)
    }

    /// Build a (possibly partial) catalog; duplicate kinds are rejected
    pub fn from_entries(entries: impl IntoIterator<Item = (UnitKind, UnitTypeData)>) -> Result<Self> {
        let mut map = AHashMap::new();
        let mut seen = AHashSet::new();
        for (kind, data) in entries {
            if !seen.insert(kind) {
                return Err(TacticsError::InvalidCatalog(format!(
                    "duplicate unit kind: {:?}",
                    kind
                )));
            }
            map.insert(kind, data);
        }
        Ok(Self { entries: map })
    }

    pub fn get(&self, kind: UnitKind) -> Option<&UnitTypeData> {
        self.entries.get(&kind)
    }

    /// Properties of a kind, zeroed when the kind is absent
    pub fn data(&self, kind: UnitKind) -> UnitTypeData {
        self.get(kind).copied().unwrap_or(UnitTypeData::UNKNOWN)
    }

    pub fn category(&self, kind: UnitKind) -> UnitCategory {
        self.data(kind).category
    }

    pub fn is_worker(&self, kind: UnitKind) -> bool {
        self.category(kind) == UnitCategory::Worker
    }

    pub fn ground_range(&self, kind: UnitKind) -> f32 {
        self.data(kind).ground_range
    }

    pub fn is_high_value(&self, kind: UnitKind) -> bool {
        self.data(kind).high_value
    }

    pub fn is_resource_depot(&self, kind: UnitKind) -> bool {
        self.data(kind).resource_depot
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
