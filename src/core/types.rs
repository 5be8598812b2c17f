//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Side length of a map tile in world units
pub const TILE_SIZE: f32 = 32.0;

/// Identity of a unit as assigned by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Identity of a friendly structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureId(pub u32);

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// 2D position in world units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0001 {
            Self { x: self.x / len, y: self.y / len }
        } else {
            Self::default()
        }
    }

    /// Mean of a set of positions, `None` when empty
    pub fn centroid<I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = Position>,
    {
        let (sum, count) = positions
            .into_iter()
            .fold((Position::default(), 0usize), |(acc, n), p| (acc + p, n + 1));
        if count == 0 {
            None
        } else {
            Some(sum * (1.0 / count as f32))
        }
    }

    /// Map tile containing this position
    pub fn tile(&self) -> TilePosition {
        TilePosition {
            x: (self.x / TILE_SIZE).floor() as i32,
            y: (self.y / TILE_SIZE).floor() as i32,
        }
    }
}

impl std::ops::Add for Position {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for Position {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Mul<f32> for Position {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

/// Tile coordinate on the map grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePosition {
    pub x: i32,
    pub y: i32,
}

impl TilePosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World position of the tile's top-left corner
    pub fn to_position(&self) -> Position {
        Position::new(self.x as f32 * TILE_SIZE, self.y as f32 * TILE_SIZE)
    }
}
