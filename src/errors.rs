use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    #[error("Config file not found at path: {path}")]
    ConfigFileNotFound { path: PathBuf },

    #[error("Unknown rule preset: '{name}'")]
    UnknownPreset { name: String },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // Board construction errors
    #[error("Invalid board dimensions {width}x{height}: both sides must be positive")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Board {width}x{height} exceeds 32-bit cell addressing")]
    IndexOverflow { width: u32, height: u32 },

    #[error("Cell index {index} out of range (cell count {cell_count})")]
    CellOutOfRange { index: usize, cell_count: usize },

    #[error("Coordinate ({x}, {y}) outside {width}x{height} board")]
    CoordOutOfRange {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    // Rule errors
    #[error("Invalid terrain rule '{name}': {reason}")]
    InvalidRule { name: String, reason: String },

    #[error("Too many terrain rules ({count}); at most 255 paint layers are addressable")]
    TooManyRules { count: usize },
}

/// Result type alias for all operations
pub type BoardResult<T> = Result<T, BoardError>;
