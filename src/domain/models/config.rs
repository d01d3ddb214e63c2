use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::strategy::{SearchStrategy, StrategyKind, TemperatureSchedule};

/// Main configuration structure for Thicket
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Text-completion endpoint configuration
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Retry policy for transient oracle failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Rate limiting applied to oracle calls
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Sampling settings for decomposition, evaluation and synthesis
    #[serde(default)]
    pub reasoning: ReasoningConfig,

    /// Default search strategy and parameters
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Result report configuration
    #[serde(default)]
    pub report: ReportConfig,
}

/// OpenAI-compatible completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OracleConfig {
    /// Base URL, without the trailing `/completions`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model id; when unset the first model the server lists is used
    #[serde(default)]
    pub model: Option<String>,

    /// Optional bearer token
    #[serde(default)]
    pub api_key: Option<String>,

    /// Timeout for a single completion call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout for the synthesis call, in seconds
    #[serde(default = "default_synthesis_timeout_secs")]
    pub synthesis_timeout_secs: u64,

    /// Timeout for the availability check, in seconds
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,

    /// Token limit for every completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_base_url() -> String {
    "http://localhost:1234/v1".to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_synthesis_timeout_secs() -> u64 {
    90
}

const fn default_health_timeout_secs() -> u64 {
    10
}

const fn default_max_tokens() -> u32 {
    1000
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            synthesis_timeout_secs: default_synthesis_timeout_secs(),
            health_timeout_secs: default_health_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt (0 disables retries)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_initial_backoff_ms() -> u64 {
    500
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RateLimitConfig {
    /// Requests per second allowed
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Burst size for token bucket
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

const fn default_requests_per_second() -> f64 {
    10.0
}

const fn default_burst_size() -> u32 {
    10
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

/// Sampling settings for the calls that are not branch-specific
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReasoningConfig {
    #[serde(default = "default_low_temperature")]
    pub decomposition_temperature: f32,

    #[serde(default = "default_low_temperature")]
    pub evaluation_temperature: f32,

    #[serde(default = "default_low_temperature")]
    pub synthesis_temperature: f32,

    /// Upper bound on the number of decomposed steps (unset keeps them all)
    #[serde(default)]
    pub max_steps: Option<usize>,
}

const fn default_low_temperature() -> f32 {
    0.3
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            decomposition_temperature: default_low_temperature(),
            evaluation_temperature: default_low_temperature(),
            synthesis_temperature: default_low_temperature(),
            max_steps: None,
        }
    }
}

/// Default search parameters, overridable per run from the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchConfig {
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Breadth-first: number of solutions to collect
    #[serde(default = "default_amplitude")]
    pub amplitude: usize,

    /// Breadth-first: thoughts per step
    #[serde(default = "default_bfs_branching_factor")]
    pub bfs_branching_factor: usize,

    /// Beam: thoughts per step
    #[serde(default = "default_beam_branching_factor")]
    pub beam_branching_factor: usize,

    /// Beam: children kept per node
    #[serde(default = "default_beam_width")]
    pub beam_width: usize,

    /// Branches generated and evaluated concurrently within one node
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[serde(default = "default_bfs_schedule")]
    pub bfs_temperature: TemperatureSchedule,

    #[serde(default = "default_beam_schedule")]
    pub beam_temperature: TemperatureSchedule,
}

const fn default_amplitude() -> usize {
    3
}

const fn default_bfs_branching_factor() -> usize {
    2
}

const fn default_beam_branching_factor() -> usize {
    3
}

const fn default_beam_width() -> usize {
    2
}

const fn default_max_concurrency() -> usize {
    1
}

const fn default_bfs_schedule() -> TemperatureSchedule {
    TemperatureSchedule::BREADTH_FIRST
}

const fn default_beam_schedule() -> TemperatureSchedule {
    TemperatureSchedule::DEPTH_FIRST_BEAM
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            amplitude: default_amplitude(),
            bfs_branching_factor: default_bfs_branching_factor(),
            beam_branching_factor: default_beam_branching_factor(),
            beam_width: default_beam_width(),
            max_concurrency: default_max_concurrency(),
            bfs_temperature: default_bfs_schedule(),
            beam_temperature: default_beam_schedule(),
        }
    }
}

impl SearchConfig {
    /// Build the strategy of the given kind from the configured parameters.
    pub const fn strategy_for(&self, kind: StrategyKind) -> SearchStrategy {
        match kind {
            StrategyKind::BreadthFirst => SearchStrategy::BreadthFirst {
                amplitude: self.amplitude,
                branching_factor: self.bfs_branching_factor,
                schedule: self.bfs_temperature,
            },
            StrategyKind::DepthFirstBeam => SearchStrategy::DepthFirstBeam {
                branching_factor: self.beam_branching_factor,
                beam_width: self.beam_width,
                schedule: self.beam_temperature,
            },
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling JSON log files (unset logs to stderr only)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Serialization format of persisted reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Yaml,
}

impl ReportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// Result report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportConfig {
    /// Write a report after every solve
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory reports are written to
    #[serde(default = "default_report_dir")]
    pub directory: PathBuf,

    #[serde(default)]
    pub format: ReportFormat,

    /// Number of ranked solutions included
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

const fn default_true() -> bool {
    true
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("thicket_results")
}

const fn default_top_n() -> usize {
    3
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            directory: default_report_dir(),
            format: ReportFormat::default(),
            top_n: default_top_n(),
        }
    }
}
