//! Search strategies and their parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{DomainError, DomainResult};

/// Highest sampling temperature a schedule will hand out.
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Per-branch temperature: `base + increment * branch`, capped at [`MAX_TEMPERATURE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSchedule {
    pub base: f32,
    pub increment: f32,
}

impl TemperatureSchedule {
    pub const BREADTH_FIRST: Self = Self {
        base: 0.7,
        increment: 0.1,
    };

    pub const DEPTH_FIRST_BEAM: Self = Self {
        base: 0.6,
        increment: 0.15,
    };

    #[allow(clippy::cast_precision_loss)]
    pub fn temperature_for(&self, branch: usize) -> f32 {
        let raw = (branch as f32).mul_add(self.increment, self.base);
        raw.clamp(0.0, MAX_TEMPERATURE)
    }
}

/// Which algorithm to run, without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    #[default]
    BreadthFirst,
    DepthFirstBeam,
}

impl StrategyKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BreadthFirst => "breadth-first",
            Self::DepthFirstBeam => "depth-first-beam",
        }
    }

    /// Short tag used in report file names.
    pub const fn file_tag(self) -> &'static str {
        match self {
            Self::BreadthFirst => "bfs",
            Self::DepthFirstBeam => "beam",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breadth-first" | "bfs" => Ok(Self::BreadthFirst),
            "depth-first-beam" | "beam" | "dfs" => Ok(Self::DepthFirstBeam),
            other => Err(DomainError::InvalidParameters(format!(
                "unknown strategy '{other}', expected breadth-first or depth-first-beam"
            ))),
        }
    }
}

/// A fully parameterised search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// Exhaustive FIFO expansion that stops after `amplitude` solutions.
    BreadthFirst {
        amplitude: usize,
        branching_factor: usize,
        schedule: TemperatureSchedule,
    },
    /// Depth-first descent keeping the best `beam_width` children per node.
    DepthFirstBeam {
        branching_factor: usize,
        beam_width: usize,
        schedule: TemperatureSchedule,
    },
}

impl SearchStrategy {
    pub const fn breadth_first(amplitude: usize, branching_factor: usize) -> Self {
        Self::BreadthFirst {
            amplitude,
            branching_factor,
            schedule: TemperatureSchedule::BREADTH_FIRST,
        }
    }

    pub const fn depth_first_beam(branching_factor: usize, beam_width: usize) -> Self {
        Self::DepthFirstBeam {
            branching_factor,
            beam_width,
            schedule: TemperatureSchedule::DEPTH_FIRST_BEAM,
        }
    }

    #[must_use]
    pub const fn with_schedule(self, schedule: TemperatureSchedule) -> Self {
        match self {
            Self::BreadthFirst {
                amplitude,
                branching_factor,
                ..
            } => Self::BreadthFirst {
                amplitude,
                branching_factor,
                schedule,
            },
            Self::DepthFirstBeam {
                branching_factor,
                beam_width,
                ..
            } => Self::DepthFirstBeam {
                branching_factor,
                beam_width,
                schedule,
            },
        }
    }

    pub const fn kind(&self) -> StrategyKind {
        match self {
            Self::BreadthFirst { .. } => StrategyKind::BreadthFirst,
            Self::DepthFirstBeam { .. } => StrategyKind::DepthFirstBeam,
        }
    }

    pub const fn branching_factor(&self) -> usize {
        match self {
            Self::BreadthFirst {
                branching_factor, ..
            }
            | Self::DepthFirstBeam {
                branching_factor, ..
            } => *branching_factor,
        }
    }

    pub const fn schedule(&self) -> TemperatureSchedule {
        match self {
            Self::BreadthFirst { schedule, .. } | Self::DepthFirstBeam { schedule, .. } => {
                *schedule
            }
        }
    }

    /// Reject parameters no search can run with.
    ///
    /// A beam wider than the branching factor is accepted here and clamped by
    /// the search engine.
    pub fn validate(&self) -> DomainResult<()> {
        if self.branching_factor() == 0 {
            return Err(DomainError::InvalidParameters(
                "branching_factor must be at least 1".to_string(),
            ));
        }
        match self {
            Self::BreadthFirst { amplitude: 0, .. } => Err(DomainError::InvalidParameters(
                "amplitude must be at least 1".to_string(),
            )),
            Self::DepthFirstBeam { beam_width: 0, .. } => Err(DomainError::InvalidParameters(
                "beam_width must be at least 1".to_string(),
            )),
            _ => {
                let schedule = self.schedule();
                if !(0.0..=MAX_TEMPERATURE).contains(&schedule.base) || schedule.increment < 0.0 {
                    return Err(DomainError::InvalidParameters(format!(
                        "temperature schedule out of range: base {} increment {}",
                        schedule.base, schedule.increment
                    )));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BreadthFirst {
                amplitude,
                branching_factor,
                ..
            } => write!(
                f,
                "breadth-first (amplitude {amplitude}, branching factor {branching_factor})"
            ),
            Self::DepthFirstBeam {
                branching_factor,
                beam_width,
                ..
            } => write!(
                f,
                "depth-first-beam (branching factor {branching_factor}, beam width {beam_width})"
            ),
        }
    }
}
