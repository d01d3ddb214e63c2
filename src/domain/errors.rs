//! Domain errors for the Thicket search engine.

use thiserror::Error;

/// Domain-level errors that can occur while running a search.
///
/// Oracle failures never surface here: every component that talks to the
/// oracle recovers locally with its own fallback.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid search parameters: {0}")]
    InvalidParameters(String),

    #[error("Cannot search without steps: the decomposition is empty")]
    EmptyDecomposition,

    #[error("Search cancelled after {solutions_discarded} partial solution(s) were discarded")]
    Cancelled { solutions_discarded: usize },

    #[error("Report persistence failed: {0}")]
    ReportFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result alias used across the domain and service layers.
pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for DomainError {
    fn from(err: serde_yaml::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::ReportFailed(err.to_string())
    }
}
