//! Error types for botsim

use thiserror::Error;

/// The main error type for simulator operations
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Unknown device type: {0}")]
    UnknownDeviceType(String),

    #[error("Unknown device class: {0}")]
    UnknownDeviceClass(String),

    #[error("Unknown interactor class: {0}")]
    UnknownInteractorClass(String),

    #[error("Failed to parse {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("Duplicate object key: {0}")]
    DuplicateKey(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Body not found: {0}")]
    BodyNotFound(String),

    #[error("Invalid value for field {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

/// Result type alias for simulator operations
pub type Result<T> = std::result::Result<T, SimError>;

impl From<toml::de::Error> for SimError {
    fn from(err: toml::de::Error) -> Self {
        SimError::TomlParseError(err.to_string())
    }
}
