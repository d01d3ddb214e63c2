//! Subcommand implementations.

pub mod check;
pub mod config;
pub mod init;
pub mod solve;

use anyhow::{Context, Result};
use tracing::warn;

use crate::adapters::oracle::OpenAiCompatOracle;
use crate::domain::models::Config;
use crate::domain::ports::{HealthStatus, Oracle};

/// Outcome of the availability check, with the models it listed.
#[derive(Debug)]
pub struct Availability {
    pub status: HealthStatus,
    pub models: Vec<String>,
}

/// Availability check run before any search. An unreachable oracle is the
/// only fatal precondition of a solve; a failed model listing only warns.
pub async fn ensure_available(oracle: &dyn Oracle, base_url: &str) -> Result<Availability> {
    match oracle.list_models().await {
        Ok(models) if models.is_empty() => {
            warn!(base_url, "oracle is reachable but lists no models");
            Ok(Availability {
                status: HealthStatus::Degraded,
                models,
            })
        }
        Ok(models) => Ok(Availability {
            status: HealthStatus::Healthy,
            models,
        }),
        Err(e) if e.is_unreachable() => {
            Err(e).with_context(|| format!("Oracle at {base_url} is unavailable"))
        }
        Err(e) => {
            warn!(base_url, error = %e, "could not list models, continuing");
            Ok(Availability {
                status: HealthStatus::Degraded,
                models: Vec::new(),
            })
        }
    }
}

/// Build the HTTP oracle, check it is reachable and select its model.
pub async fn connect_oracle(config: &Config) -> Result<OpenAiCompatOracle> {
    let oracle = OpenAiCompatOracle::new(&config.oracle, &config.retry, &config.rate_limit)
        .context("Failed to create oracle client")?;
    let availability = ensure_available(&oracle, &config.oracle.base_url).await?;
    Ok(oracle.select_model(&availability.models))
}
