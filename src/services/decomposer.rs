//! Problem decomposition into ordered steps.
//!
//! One oracle call asks for 3-4 named steps in a line-oriented format. The
//! response is parsed leniently; when the call fails or no step header can be
//! found, the fixed three-step default is returned instead. Decomposition
//! therefore always yields at least one step.

use regex::Regex;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::{Problem, Step};
use crate::domain::ports::{CallPurpose, CompletionRequest, Oracle};
use crate::services::prompts;

static STEP_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^step\s+\d+\s*(?:[:.)\-]\s*(.*))?$").expect("step header pattern is valid")
});
static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^description\s*:\s*(.*)$").expect("description pattern is valid")
});
static DETERMINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^determine\s*:\s*(.*)$").expect("determine pattern is valid")
});

/// Sampling settings for the decomposition call.
#[derive(Debug, Clone)]
pub struct DecomposerSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    /// Keep at most this many steps.
    pub max_steps: Option<usize>,
}

impl Default for DecomposerSettings {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: CompletionRequest::DEFAULT_MAX_TOKENS,
            timeout: CompletionRequest::DEFAULT_TIMEOUT,
            max_steps: None,
        }
    }
}

/// Splits a problem into the steps the search walks through.
pub struct ProblemDecomposer {
    oracle: Arc<dyn Oracle>,
    settings: DecomposerSettings,
}

impl ProblemDecomposer {
    pub fn new(oracle: Arc<dyn Oracle>, settings: DecomposerSettings) -> Self {
        Self { oracle, settings }
    }

    /// Decompose `problem` into at least one step.
    #[instrument(skip(self, problem), fields(purpose = %CallPurpose::Decomposition))]
    pub async fn decompose(&self, problem: &Problem) -> Vec<Step> {
        let request =
            CompletionRequest::new(CallPurpose::Decomposition, prompts::decomposition(problem))
                .with_temperature(self.settings.temperature)
                .with_max_tokens(self.settings.max_tokens)
                .with_timeout(self.settings.timeout);

        let steps = match self.oracle.complete(request).await {
            Ok(response) => parse_steps(&response).unwrap_or_else(|| {
                warn!("decomposition response held no step markers, using default steps");
                default_steps()
            }),
            Err(e) => {
                warn!(error = %e, "decomposition call failed, using default steps");
                default_steps()
            }
        };

        let steps = self.truncate(steps);
        info!(step_count = steps.len(), "problem decomposed");
        steps
    }

    fn truncate(&self, mut steps: Vec<Step>) -> Vec<Step> {
        if let Some(max_steps) = self.settings.max_steps {
            if max_steps > 0 && steps.len() > max_steps {
                debug!(from = steps.len(), to = max_steps, "truncating decomposition");
                steps.truncate(max_steps);
            }
        }
        steps
    }
}

/// The fixed decomposition used whenever the oracle gives nothing usable.
pub fn default_steps() -> Vec<Step> {
    vec![
        Step::new(
            0,
            "Understand problem",
            "Analyse the problem until it is fully understood",
            "What is given and what is asked",
        ),
        Step::new(
            1,
            "Plan approach",
            "Decide which method to use to solve the problem",
            "The method that will be applied",
        ),
        Step::new(
            2,
            "Execute solution",
            "Apply the chosen method step by step",
            "The final answer",
        ),
    ]
}

/// Parse `STEP n: name` blocks with optional `Description:` and `Determine:`
/// lines. Returns `None` when no step header is present.
///
/// Markdown decoration (`**`, `#`, list bullets) around a line is ignored.
/// Ordinals are assigned by position, not taken from the numbers in the text.
pub fn parse_steps(response: &str) -> Option<Vec<Step>> {
    let mut steps: Vec<Step> = Vec::new();
    let mut current: Option<Step> = None;

    for raw in response.lines() {
        let line = raw
            .trim()
            .trim_start_matches(['#', '*', '-', '>', ' '])
            .replace("**", "");
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = STEP_HEADER.captures(line) {
            if let Some(done) = current.take() {
                steps.push(done);
            }
            let ordinal = steps.len();
            let name = caps.get(1).map_or("", |m| m.as_str()).trim();
            let name = if name.is_empty() {
                format!("Step {}", ordinal + 1)
            } else {
                name.to_string()
            };
            current = Some(Step::new(ordinal, name, "", ""));
        } else if let Some(step) = current.as_mut() {
            if let Some(caps) = DESCRIPTION.captures(line) {
                if step.description.is_empty() {
                    step.description = caps[1].trim().to_string();
                }
            } else if let Some(caps) = DETERMINE.captures(line) {
                step.target = caps[1].trim().to_string();
            }
        }
    }

    if let Some(done) = current {
        steps.push(done);
    }

    if steps.is_empty() {
        None
    } else {
        Some(steps)
    }
}
