//! Common test utilities for integration tests
//!
//! Shared builders for search engines and scripted oracles.

#![allow(dead_code)]

use std::sync::Arc;
use thicket::domain::models::Step;
use thicket::domain::ports::{CallPurpose, CompletionRequest, Oracle};
use thicket::services::{EvaluatorSettings, GeneratorSettings};
use thicket::{MockOracle, SearchEngine, ThoughtEvaluator, ThoughtGenerator};

/// `count` steps named "Step 1", "Step 2", ...
pub fn steps(count: usize) -> Vec<Step> {
    (0..count)
        .map(|i| Step::new(i, format!("Step {}", i + 1), "", ""))
        .collect()
}

/// Search engine with default generator and evaluator settings.
pub fn engine(oracle: Arc<dyn Oracle>, max_concurrency: usize) -> SearchEngine {
    SearchEngine::new(
        ThoughtGenerator::new(oracle.clone(), GeneratorSettings::default()),
        ThoughtEvaluator::new(oracle, EvaluatorSettings::default()),
        max_concurrency,
    )
}

/// Oracle answering every evaluation with `evaluation` and every other call
/// with a thought naming its temperature.
pub fn scripted(evaluation: &'static str) -> Arc<MockOracle> {
    Arc::new(MockOracle::new(move |request: &CompletionRequest| {
        Ok(match request.purpose {
            CallPurpose::Evaluation => evaluation.to_string(),
            _ => format!("thought at {:.2}", request.temperature),
        })
    }))
}
