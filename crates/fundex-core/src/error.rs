//! Error types for the fundex-core library.

use thiserror::Error;

/// Main error type for the fundex library.
#[derive(Error, Debug)]
pub enum FundexError {
    /// Holdings extraction error.
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Layout configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while locating and extracting holdings.
///
/// Section location is the only hard failure per document; every other
/// anomaly degrades to a null field or a recorded issue.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// No page matched any configured schedule header.
    #[error("schedule of investments section not found ({pages_searched} pages searched)")]
    SectionNotFound { pages_searched: usize },
}

/// Errors related to layout configuration handling.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config violates a structural invariant.
    #[error("invalid layout config `{id}`: {reason}")]
    Invalid { id: String, reason: String },

    /// Failed to read a config file.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to deserialize a config document.
    #[error("failed to parse config {path}: {reason}")]
    Parse { path: String, reason: String },

    /// The file extension is not a supported config format.
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for the fundex library.
pub type Result<T> = std::result::Result<T, FundexError>;
