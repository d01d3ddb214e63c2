//! Reasoning services
//!
//! Each service owns one kind of oracle call and its fallback; the search
//! engine and pipeline compose them.

pub mod decomposer;
pub mod evaluator;
pub mod generator;
pub mod pipeline;
pub mod prompts;
pub mod search_engine;
pub mod synthesizer;

pub use decomposer::{default_steps, parse_steps, DecomposerSettings, ProblemDecomposer};
pub use evaluator::{parse_evaluation, EvaluatorSettings, ThoughtEvaluator, EVALUATION_FAILED};
pub use generator::{GeneratorSettings, ThoughtGenerator, GENERATION_FAILED};
pub use pipeline::{ReasoningPipeline, NO_SOLUTION};
pub use search_engine::SearchEngine;
pub use synthesizer::{Synthesizer, SynthesizerSettings, SYNTHESIS_FAILED};
