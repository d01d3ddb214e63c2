//! Infrastructure layer module
//!
//! - Configuration management (figment: defaults, YAML files, environment)
//! - Logging infrastructure (tracing)

pub mod config;
pub mod logging;
