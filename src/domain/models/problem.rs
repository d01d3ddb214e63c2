//! Problem statement and decomposed steps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable problem statement, created once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Problem(String);

impl Problem {
    pub fn new(statement: impl Into<String>) -> Self {
        Self(statement.into().trim().to_string())
    }

    pub fn statement(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One step of a decomposed problem.
///
/// `ordinal` is the zero-based position in the step sequence; it doubles as
/// the search depth at which thoughts for this step are generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub ordinal: usize,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// What the step must determine.
    #[serde(default)]
    pub target: String,
}

impl Step {
    pub fn new(
        ordinal: usize,
        name: impl Into<String>,
        description: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            ordinal,
            name: name.into(),
            description: description.into(),
            target: target.into(),
        }
    }

    /// One-based label used in prompts and reports ("STEP 2: Plan approach").
    pub fn label(&self) -> String {
        format!("STEP {}: {}", self.ordinal + 1, self.name)
    }
}
