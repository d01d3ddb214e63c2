//! Trajectory evaluation with lenient score extraction.
//!
//! The score is the first integer in the response. A `/10` or `out of 10`
//! suffix right after it marks the score as structured and is stripped from
//! the justification along with any leading `Score:` label. A response
//! without an integer gets the neutral score.
//!
//! Whatever is found is clamped to `[1, 10]`. Evaluation never fails; an
//! oracle error also yields the neutral score.

use regex::Regex;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::domain::models::{Evaluation, Problem, Score, ScoreSource, Step, Thought};
use crate::domain::ports::{CallPurpose, CompletionRequest, Oracle};
use crate::services::prompts;

/// Justification recorded when the oracle call fails.
pub const EVALUATION_FAILED: &str = "Could not be evaluated because of an error.";

// ASCII digits only: `str::parse` rejects other Unicode decimal digits.
static FIRST_INTEGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+)(\s*/\s*10\b|\s*out\s+of\s+10\b)?")
        .expect("integer pattern is valid")
});
static LEADING_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\**\s*(?:(?:score|rating)\s*[:=]?\s*\**\s*)?[0-9]+(?:\s*/\s*10)?\**[:.\-\s]*")
        .expect("leading score pattern is valid")
});

/// Sampling settings for evaluation calls.
#[derive(Debug, Clone)]
pub struct EvaluatorSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: CompletionRequest::DEFAULT_MAX_TOKENS,
            timeout: CompletionRequest::DEFAULT_TIMEOUT,
        }
    }
}

/// Rates partial and complete trajectories.
pub struct ThoughtEvaluator {
    oracle: Arc<dyn Oracle>,
    settings: EvaluatorSettings,
}

impl ThoughtEvaluator {
    pub fn new(oracle: Arc<dyn Oracle>, settings: EvaluatorSettings) -> Self {
        Self { oracle, settings }
    }

    /// Score the trajectory made of `thoughts`.
    ///
    /// The trajectory is final when it has one thought per step.
    /// `previous_score` is included in the prompt as a reference when given.
    #[instrument(skip_all, fields(depth = thoughts.len(), previous = ?previous_score.map(Score::value)))]
    pub async fn evaluate(
        &self,
        problem: &Problem,
        steps: &[Step],
        thoughts: &[&Thought],
        previous_score: Option<Score>,
    ) -> Evaluation {
        let is_final = thoughts.len() == steps.len();
        let history = prompts::pair_with_steps(steps, thoughts);
        let request = CompletionRequest::new(
            CallPurpose::Evaluation,
            prompts::evaluation(problem, &history, is_final, previous_score),
        )
        .with_temperature(self.settings.temperature)
        .with_max_tokens(self.settings.max_tokens)
        .with_timeout(self.settings.timeout);

        match self.oracle.complete(request).await {
            Ok(response) => {
                let evaluation = parse_evaluation(&response);
                if evaluation.source == ScoreSource::NoInteger {
                    warn!("evaluation response held no score, using neutral score");
                }
                debug!(
                    score = evaluation.score.value(),
                    source = ?evaluation.source,
                    is_final,
                    "trajectory evaluated"
                );
                evaluation
            }
            Err(e) => {
                warn!(error = %e, "evaluation call failed, using neutral score");
                Evaluation::new(Score::NEUTRAL, EVALUATION_FAILED, ScoreSource::OracleFailure)
            }
        }
    }
}

/// Extract a score and justification from a free-text evaluation.
pub fn parse_evaluation(response: &str) -> Evaluation {
    let text = response.trim();

    if let Some(caps) = FIRST_INTEGER.captures(text) {
        let source = if caps.get(2).is_some() {
            ScoreSource::Structured
        } else {
            ScoreSource::FirstInteger
        };
        return Evaluation::new(clamp_digits(&caps[1]), justification(text), source);
    }

    let justification = if text.is_empty() {
        "No score was given; neutral score assigned.".to_string()
    } else {
        format!("No score was given; neutral score assigned. {text}")
    };
    Evaluation::new(Score::NEUTRAL, justification, ScoreSource::NoInteger)
}

/// Digit runs too long for an i64 saturate to the maximum score.
fn clamp_digits(digits: &str) -> Score {
    Score::clamped(digits.parse::<i64>().unwrap_or(i64::MAX))
}

fn justification(text: &str) -> String {
    LEADING_SCORE.replace(text, "").trim().to_string()
}
