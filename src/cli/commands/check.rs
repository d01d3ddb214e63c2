//! Implementation of the `thicket check` command.

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;

use super::ensure_available;
use crate::adapters::oracle::OpenAiCompatOracle;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::Config;
use crate::domain::ports::{HealthStatus, Oracle};

#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub base_url: String,
    pub status: HealthStatus,
    pub selected_model: String,
    pub models: Vec<String>,
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        let status = match self.status {
            HealthStatus::Healthy => style("healthy").green().bold(),
            HealthStatus::Degraded => style("degraded").yellow().bold(),
            HealthStatus::Unavailable => style("unavailable").red().bold(),
        };
        let mut lines = vec![
            format!("Oracle: {}", self.base_url),
            format!("Status: {status}"),
            format!("Model:  {}", self.selected_model),
        ];
        if self.models.is_empty() {
            lines.push("\nThe server lists no models.".to_string());
        } else {
            lines.push(String::new());
            lines.push(TableFormatter::new().format_models(&self.models, &self.selected_model));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let base_url = config.oracle.base_url.clone();
    let oracle = OpenAiCompatOracle::new(&config.oracle, &config.retry, &config.rate_limit)
        .context("Failed to create oracle client")?;

    let availability = ensure_available(&oracle, &base_url).await?;
    let oracle = oracle.select_model(&availability.models);

    output(
        &CheckOutput {
            base_url,
            status: availability.status,
            selected_model: oracle.model().to_string(),
            models: availability.models,
        },
        json_mode,
    );
    Ok(())
}
