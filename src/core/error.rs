use thiserror::Error;

use crate::core::types::UnitId;

#[derive(Error, Debug)]
pub enum TacticsError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid unit catalog: {0}")]
    InvalidCatalog(String),

    #[error("Command rejected for unit {unit:?}: {reason}")]
    CommandRejected { unit: UnitId, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TacticsError>;
