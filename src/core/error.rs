use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SocietyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Snapshot not found: {}", .0.display())]
    SnapshotNotFound(PathBuf),

    #[error("Snapshot schema version {found} is not supported (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },

    #[error("Invariant violated on day {day}: {detail}")]
    InvariantViolation { day: u64, detail: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SocietyError>;
