//! Oracle port
//!
//! The oracle is the external text-completion service every reasoning step
//! talks to. It is stateless: each call carries its full prompt and sampling
//! settings. Services never branch on the failure kind; they only need to
//! know that a call failed so they can substitute their fallback.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Why a completion is being requested.
///
/// Used for structured logging and for routing scripted responses in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallPurpose {
    Decomposition,
    Generation,
    Evaluation,
    Synthesis,
}

impl fmt::Display for CallPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Decomposition => "decomposition",
            Self::Generation => "generation",
            Self::Evaluation => "evaluation",
            Self::Synthesis => "synthesis",
        };
        f.write_str(name)
    }
}

/// A single completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub purpose: CallPurpose,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl CompletionRequest {
    pub const DEFAULT_MAX_TOKENS: u32 = 1000;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(purpose: CallPurpose, prompt: impl Into<String>) -> Self {
        Self {
            purpose,
            prompt: prompt.into(),
            temperature: 0.7,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Health status of the oracle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Reachable and serving at least one model
    Healthy,

    /// Reachable but listing no models, or failing to list them
    Degraded,

    /// Not reachable
    Unavailable,
}

/// Failure kinds of an oracle call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("Oracle call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("Oracle returned HTTP {status}: {body}")]
    ProtocolError { status: u16, body: String },

    #[error("Unexpected oracle failure: {0}")]
    Unexpected(String),
}

impl OracleError {
    /// Whether retrying the same call may succeed.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::ConnectionRefused(_) => true,
            Self::ProtocolError { status, .. } => *status == 429 || *status >= 500,
            Self::Unexpected(_) => false,
        }
    }

    /// Whether the backend could not be reached at all.
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::ConnectionRefused(_))
    }
}

/// Text-completion backend.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Backend type name.
    fn name(&self) -> &'static str;

    /// Model id completions are requested from.
    fn model(&self) -> &str;

    /// Complete `request.prompt`, honouring its temperature, token limit and timeout.
    async fn complete(&self, request: CompletionRequest) -> Result<String, OracleError>;

    /// Ids of the models the backend serves.
    async fn list_models(&self) -> Result<Vec<String>, OracleError>;

    /// Availability check performed before a search begins. Only an
    /// unreachable backend is an error; a failed listing is `Degraded`.
    async fn health_check(&self) -> Result<HealthStatus, OracleError> {
        match self.list_models().await {
            Ok(models) if models.is_empty() => Ok(HealthStatus::Degraded),
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) if e.is_unreachable() => Err(e),
            Err(_) => Ok(HealthStatus::Degraded),
        }
    }
}
