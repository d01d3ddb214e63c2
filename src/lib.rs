//! Thicket - guided tree-of-thought search
//!
//! A problem is decomposed into ordered steps by a text-completion oracle.
//! Candidate thoughts are generated for every step, scored by the same
//! oracle, and explored breadth-first or depth-first with a beam. The ranked
//! solutions are synthesized into a final narrative.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, ports (`Oracle`, `ReportSink`) and errors
//! - **Service Layer** (`services`): decomposition, generation, evaluation, search, synthesis
//! - **Adapters** (`adapters`): HTTP and scripted oracles, report files
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use thicket::{Config, MockOracle, Problem, ReasoningPipeline, SearchStrategy};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> thicket::DomainResult<()> {
//! let oracle = Arc::new(MockOracle::constant("7/10"));
//! let pipeline = ReasoningPipeline::from_config(oracle, &Config::default());
//! let outcome = pipeline
//!     .solve(
//!         Problem::new("How many handshakes among 5 people?"),
//!         SearchStrategy::breadth_first(3, 2),
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//! println!("{}", outcome.synthesis);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::oracle::{MockOracle, OpenAiCompatOracle};
pub use adapters::report::FileReportSink;
pub use domain::models::{
    Config, Evaluation, Problem, Score, SearchReport, SearchResult, SearchStats, SearchStrategy,
    Solution, SolveOutcome, Step, StrategyKind, Thought, Trajectory,
};
pub use domain::ports::{CallPurpose, CompletionRequest, Oracle, OracleError, ReportSink};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    ProblemDecomposer, ReasoningPipeline, SearchEngine, Synthesizer, ThoughtEvaluator,
    ThoughtGenerator,
};
