pub mod config;
pub mod error;
pub mod types;

pub use config::{load_config, ArmyConfig, ClusterStrategy, MicroConfig, TacticsConfig, ThreatConfig};
pub use error::{Result, TacticsError};
pub use types::{Position, StructureId, Tick, TilePosition, UnitId, TILE_SIZE};
