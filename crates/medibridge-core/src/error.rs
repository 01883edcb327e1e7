use thiserror::Error;

/// Top-level error type for the MediBridge system.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for
/// MediBridgeError` (or the reverse) so that the `?` operator works
/// seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MediBridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for MediBridgeError {
    fn from(err: toml::de::Error) -> Self {
        MediBridgeError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MediBridgeError {
    fn from(err: toml::ser::Error) -> Self {
        MediBridgeError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MediBridgeError {
    fn from(err: serde_json::Error) -> Self {
        MediBridgeError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for MediBridge operations.
pub type Result<T> = std::result::Result<T, MediBridgeError>;
