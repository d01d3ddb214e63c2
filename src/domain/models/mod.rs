pub mod config;
pub mod problem;
pub mod report;
pub mod solution;
pub mod strategy;
pub mod trajectory;

pub use config::{
    Config, LoggingConfig, OracleConfig, RateLimitConfig, ReasoningConfig, ReportConfig,
    ReportFormat, RetryConfig, SearchConfig,
};
pub use problem::{Problem, Step};
pub use report::{ReportedSolution, ReportedStep, SearchReport, SolveOutcome};
pub use solution::{SearchResult, SearchStats, Solution};
pub use strategy::{SearchStrategy, StrategyKind, TemperatureSchedule, MAX_TEMPERATURE};
pub use trajectory::{Evaluation, Score, ScoreSource, Thought, Trajectory, TrajectoryEntry};
