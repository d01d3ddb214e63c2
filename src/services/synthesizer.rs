//! Final narrative for the best solution.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::domain::models::{Problem, Solution, Step};
use crate::domain::ports::{CallPurpose, CompletionRequest, Oracle};
use crate::services::prompts;

/// Narrative returned when the synthesis call fails.
pub const SYNTHESIS_FAILED: &str = "The solution could not be synthesized because of an error.";

#[derive(Debug, Clone)]
pub struct SynthesizerSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Synthesis reads the whole trajectory, so it gets a longer timeout.
    pub timeout: Duration,
}

impl Default for SynthesizerSettings {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: CompletionRequest::DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(90),
        }
    }
}

/// Condenses a solution into approach, final answer and key insight.
pub struct Synthesizer {
    oracle: Arc<dyn Oracle>,
    settings: SynthesizerSettings,
}

impl Synthesizer {
    pub fn new(oracle: Arc<dyn Oracle>, settings: SynthesizerSettings) -> Self {
        Self { oracle, settings }
    }

    #[instrument(skip_all, fields(score = solution.score().value()))]
    pub async fn synthesize(
        &self,
        problem: &Problem,
        steps: &[Step],
        solution: &Solution,
    ) -> String {
        let request = CompletionRequest::new(
            CallPurpose::Synthesis,
            prompts::synthesis(problem, steps, solution),
        )
        .with_temperature(self.settings.temperature)
        .with_max_tokens(self.settings.max_tokens)
        .with_timeout(self.settings.timeout);

        match self.oracle.complete(request).await {
            Ok(text) => {
                info!("solution synthesized");
                text.trim().to_string()
            }
            Err(e) => {
                warn!(error = %e, "synthesis failed, using placeholder");
                SYNTHESIS_FAILED.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::oracle::MockOracle;
    use crate::domain::models::{
        Evaluation, Score, ScoreSource, Thought, Trajectory, TrajectoryEntry,
    };
    use crate::domain::ports::OracleError;

    fn solution() -> Solution {
        let trajectory = Trajectory::empty().extend(TrajectoryEntry::new(
            Thought {
                step_ordinal: 0,
                text: "apply n(n-1)/2 = 10".into(),
                temperature: 0.7,
                generation_failed: false,
            },
            Evaluation::new(Score::from(9u8), "correct", ScoreSource::FirstInteger),
        ));
        Solution::new(
            trajectory,
            Evaluation::new(Score::from(9u8), "correct", ScoreSource::FirstInteger),
            0,
        )
    }

    #[tokio::test]
    async fn test_synthesize_uses_long_timeout() {
        let oracle = Arc::new(MockOracle::constant(" There are 10 handshakes. "));
        let synthesizer = Synthesizer::new(oracle.clone(), SynthesizerSettings::default());
        let steps = vec![Step::new(0, "Count", "", "")];

        let text = synthesizer
            .synthesize(&Problem::new("handshakes"), &steps, &solution())
            .await;

        assert_eq!(text, "There are 10 handshakes.");
        let request = &oracle.requests()[0];
        assert_eq!(request.purpose, CallPurpose::Synthesis);
        assert_eq!(request.timeout, Duration::from_secs(90));
        assert!(request.prompt.contains("Evaluation: 9/10"));
    }

    #[tokio::test]
    async fn test_synthesize_returns_placeholder_on_failure() {
        let oracle = Arc::new(MockOracle::failing(OracleError::Unexpected("eof".into())));
        let synthesizer = Synthesizer::new(oracle, SynthesizerSettings::default());
        let text = synthesizer
            .synthesize(&Problem::new("p"), &[Step::new(0, "Count", "", "")], &solution())
            .await;
        assert_eq!(text, SYNTHESIS_FAILED);
    }
}
