use crate::normalizer::NormalizeError;
use thiserror::Error;

/// Errors that can occur while cleaning input or touching either store
#[derive(Error, Debug)]
pub enum SpiceboxError {
    /// A named recipe, ingredient, spice or link does not exist
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness rule would be violated (duplicate name or duplicate link)
    #[error("{0}")]
    AlreadyExists(String),

    /// Input failed schema validation after cleaning
    #[error("{0}")]
    InvalidStructure(String),

    /// A cleaner failed unexpectedly while normalizing a record
    #[error("Normalization failed: {0}")]
    NormalizationFailed(String),

    /// Underlying SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Malformed JSON payload
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error (import files, database paths)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A store connection lock was poisoned by a panicking request
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A blocking store task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Background(String),
}

impl SpiceboxError {
    pub fn not_found(what: impl Into<String>) -> Self {
        SpiceboxError::NotFound(what.into())
    }

    pub fn already_exists(what: impl Into<String>) -> Self {
        SpiceboxError::AlreadyExists(what.into())
    }

    pub fn invalid(what: impl Into<String>) -> Self {
        SpiceboxError::InvalidStructure(what.into())
    }

    /// Short machine-readable kind, used in logs and bulk import reports
    pub fn kind(&self) -> &'static str {
        match self {
            SpiceboxError::NotFound(_) => "not_found",
            SpiceboxError::AlreadyExists(_) => "already_exists",
            SpiceboxError::InvalidStructure(_) => "invalid_structure",
            SpiceboxError::NormalizationFailed(_) => "normalization_failed",
            SpiceboxError::Database(_) => "database",
            SpiceboxError::Config(_) => "config",
            SpiceboxError::Json(_) => "json",
            SpiceboxError::Io(_) => "io",
            SpiceboxError::StoreUnavailable(_) => "store_unavailable",
            SpiceboxError::Background(_) => "background",
        }
    }
}

impl From<NormalizeError> for SpiceboxError {
    fn from(err: NormalizeError) -> Self {
        SpiceboxError::NormalizationFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpiceboxError>;
