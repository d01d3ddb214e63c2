//! Implementation of the `thicket config` command.

use anyhow::Result;
use serde::Serialize;

use crate::adapters::oracle::openai_compat::redact;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

/// The merged configuration after defaults, files and environment.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ConfigOutput(pub Config);

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.0)
            .unwrap_or_default()
            .trim_end()
            .to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.0).unwrap_or_default()
    }
}

pub fn execute(mut config: Config, json_mode: bool) -> Result<()> {
    // Printed output never carries the full key.
    config.oracle.api_key = config.oracle.api_key.as_deref().map(redact);
    output(&ConfigOutput(config), json_mode);
    Ok(())
}
