//! Problem → steps → search → synthesis.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Config, Problem, SearchStrategy, SolveOutcome};
use crate::domain::ports::Oracle;
use crate::services::decomposer::{DecomposerSettings, ProblemDecomposer};
use crate::services::evaluator::{EvaluatorSettings, ThoughtEvaluator};
use crate::services::generator::{GeneratorSettings, ThoughtGenerator};
use crate::services::search_engine::SearchEngine;
use crate::services::synthesizer::{Synthesizer, SynthesizerSettings};

/// Narrative used when a search produced no solution to synthesize.
pub const NO_SOLUTION: &str = "No solution was found.";

/// Chains decomposition, search and synthesis for one problem.
pub struct ReasoningPipeline {
    decomposer: ProblemDecomposer,
    engine: SearchEngine,
    synthesizer: Synthesizer,
}

impl ReasoningPipeline {
    pub fn new(
        decomposer: ProblemDecomposer,
        engine: SearchEngine,
        synthesizer: Synthesizer,
    ) -> Self {
        Self {
            decomposer,
            engine,
            synthesizer,
        }
    }

    /// Wire every component to `oracle` with the settings in `config`.
    pub fn from_config(oracle: Arc<dyn Oracle>, config: &Config) -> Self {
        let timeout = Duration::from_secs(config.oracle.timeout_secs);
        let max_tokens = config.oracle.max_tokens;

        let decomposer = ProblemDecomposer::new(
            oracle.clone(),
            DecomposerSettings {
                temperature: config.reasoning.decomposition_temperature,
                max_tokens,
                timeout,
                max_steps: config.reasoning.max_steps,
            },
        );
        let generator = ThoughtGenerator::new(
            oracle.clone(),
            GeneratorSettings {
                max_tokens,
                timeout,
            },
        );
        let evaluator = ThoughtEvaluator::new(
            oracle.clone(),
            EvaluatorSettings {
                temperature: config.reasoning.evaluation_temperature,
                max_tokens,
                timeout,
            },
        );
        let synthesizer = Synthesizer::new(
            oracle,
            SynthesizerSettings {
                temperature: config.reasoning.synthesis_temperature,
                max_tokens,
                timeout: Duration::from_secs(config.oracle.synthesis_timeout_secs),
            },
        );

        Self::new(
            decomposer,
            SearchEngine::new(generator, evaluator, config.search.max_concurrency),
            synthesizer,
        )
    }

    /// Solve `problem` with `strategy`.
    ///
    /// Fails only on invalid input or cancellation; every oracle failure is
    /// absorbed by the component that made the call.
    #[instrument(skip_all, fields(strategy = %strategy.kind()))]
    pub async fn solve(
        &self,
        problem: Problem,
        strategy: SearchStrategy,
        cancel: &CancellationToken,
    ) -> DomainResult<SolveOutcome> {
        if problem.is_blank() {
            return Err(DomainError::InvalidParameters(
                "problem statement is empty".to_string(),
            ));
        }
        strategy.validate()?;

        let steps = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(DomainError::Cancelled { solutions_discarded: 0 });
            }
            steps = self.decomposer.decompose(&problem) => steps,
        };
        info!(steps = steps.len(), "decomposition ready");

        let result = self.engine.search(&problem, &steps, &strategy, cancel).await?;

        let synthesis = match result.best() {
            Some(best) => tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Err(DomainError::Cancelled { solutions_discarded: result.len() })
                }
                text = self.synthesizer.synthesize(&problem, &steps, best) => text,
            },
            None => NO_SOLUTION.to_string(),
        };

        Ok(SolveOutcome {
            problem,
            strategy,
            steps,
            result,
            synthesis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::oracle::MockOracle;
    use crate::domain::ports::{CallPurpose, CompletionRequest};

    #[tokio::test]
    async fn test_solve_runs_every_stage() {
        let oracle = Arc::new(MockOracle::new(|request: &CompletionRequest| {
            Ok(match request.purpose {
                CallPurpose::Decomposition => "STEP 1: Count pairs\nDescription: pairs".to_string(),
                CallPurpose::Generation => "apply n(n-1)/2 = 10".to_string(),
                CallPurpose::Evaluation => "9".to_string(),
                CallPurpose::Synthesis => "Ten handshakes.".to_string(),
            })
        }));
        let pipeline = ReasoningPipeline::from_config(oracle.clone(), &Config::default());

        let outcome = pipeline
            .solve(
                Problem::new("5 people shake hands"),
                SearchStrategy::breadth_first(1, 1),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.steps.len(), 1);
        assert_eq!(outcome.result.len(), 1);
        assert_eq!(outcome.synthesis, "Ten handshakes.");
        assert_eq!(oracle.count(CallPurpose::Synthesis), 1);
    }

    #[tokio::test]
    async fn test_solve_rejects_blank_problem() {
        let pipeline =
            ReasoningPipeline::from_config(Arc::new(MockOracle::constant("x")), &Config::default());
        let result = pipeline
            .solve(
                Problem::new("   "),
                SearchStrategy::breadth_first(1, 1),
                &CancellationToken::new(),
            )
            .await;
        assert!(matches!(result, Err(DomainError::InvalidParameters(_))));
    }
}
