//! Candidate thought generation.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::domain::models::{Problem, Step, Thought, Trajectory};
use crate::domain::ports::{CallPurpose, CompletionRequest, Oracle};
use crate::services::prompts;

/// Text stored in place of a thought when the oracle call fails.
pub const GENERATION_FAILED: &str = "No thought could be generated because of an error.";

/// Token limit and timeout for generation calls. The temperature is chosen
/// per branch by the search strategy.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            max_tokens: CompletionRequest::DEFAULT_MAX_TOKENS,
            timeout: CompletionRequest::DEFAULT_TIMEOUT,
        }
    }
}

/// Produces one candidate thought per call.
pub struct ThoughtGenerator {
    oracle: Arc<dyn Oracle>,
    settings: GeneratorSettings,
}

impl ThoughtGenerator {
    pub fn new(oracle: Arc<dyn Oracle>, settings: GeneratorSettings) -> Self {
        Self { oracle, settings }
    }

    /// Generate a thought for `step` that extends `trajectory`.
    ///
    /// Never fails: an oracle failure yields a thought holding
    /// [`GENERATION_FAILED`], which the search treats like any other text.
    #[instrument(skip_all, fields(step = step.ordinal, temperature = %temperature))]
    pub async fn generate(
        &self,
        problem: &Problem,
        steps: &[Step],
        step: &Step,
        trajectory: &Trajectory,
        temperature: f32,
    ) -> Thought {
        let thoughts = trajectory.thoughts();
        let history = prompts::pair_with_steps(steps, &thoughts);
        let request = CompletionRequest::new(
            CallPurpose::Generation,
            prompts::generation(problem, step, &history),
        )
        .with_temperature(temperature)
        .with_max_tokens(self.settings.max_tokens)
        .with_timeout(self.settings.timeout);

        match self.oracle.complete(request).await {
            Ok(text) => {
                debug!(chars = text.len(), "thought generated");
                Thought {
                    step_ordinal: step.ordinal,
                    text: text.trim().to_string(),
                    temperature,
                    generation_failed: false,
                }
            }
            Err(e) => {
                warn!(error = %e, "thought generation failed, using placeholder");
                Thought {
                    step_ordinal: step.ordinal,
                    text: GENERATION_FAILED.to_string(),
                    temperature,
                    generation_failed: true,
                }
            }
        }
    }
}
