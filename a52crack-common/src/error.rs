//! Error types for a52crack

use thiserror::Error;

/// Error types for the a52crack workspace.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed caller input (wrong-length key, frame id or codeword).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File and network I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Dictionary store missing, truncated or otherwise unusable.
    #[error("Dictionary store error: {0}")]
    Dictionary(String),
}
