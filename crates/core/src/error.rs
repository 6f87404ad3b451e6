//! Error types for SiteQA.
//!
//! One enum covers the whole failure taxonomy of the service: configuration,
//! crawl snapshot availability, vector index reachability, generation, request
//! validation, crawling, prompts, I/O and serialization.

use thiserror::Error;

/// Unified error type for SiteQA.
///
/// All fallible functions return `Result<T, AppError>`. Messages are meant to
/// be shown to users as-is, so they never carry stack traces or internal ids.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid configuration (e.g. chunk overlap >= chunk size). Fatal.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The crawl snapshot is missing, unreadable or malformed.
    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    /// The completion capability failed or timed out.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The vector index or embedding backend could not be reached.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A request carried invalid arguments.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Crawler errors
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
