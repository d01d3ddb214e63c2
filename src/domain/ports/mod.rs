//! Port trait definitions (Hexagonal Architecture)
//!
//! - Oracle: text-completion backend used by every reasoning service
//! - ReportSink: destination for structured run reports

pub mod oracle;
pub mod report_sink;

pub use oracle::{CallPurpose, CompletionRequest, HealthStatus, Oracle, OracleError};
pub use report_sink::ReportSink;
