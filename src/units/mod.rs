//! Unit content table and per-tick unit snapshots

pub mod catalog;
pub mod observed;

pub use catalog::{UnitCatalog, UnitCategory, UnitKind, UnitTypeData};
pub use observed::{total_supply, FriendlyStructure, FriendlyUnit, ObservedUnit, OrderStatus};
