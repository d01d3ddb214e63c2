//! Complete solutions and the ranked result of a search.

use serde::{Deserialize, Serialize};

use super::trajectory::{Evaluation, Score, Trajectory};

/// A terminal trajectory together with its final evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub trajectory: Trajectory,
    pub evaluation: Evaluation,
    /// Order in which the search recorded this solution (0-based).
    pub discovery_index: usize,
}

impl Solution {
    pub fn new(trajectory: Trajectory, evaluation: Evaluation, discovery_index: usize) -> Self {
        Self {
            trajectory,
            evaluation,
            discovery_index,
        }
    }

    pub fn score(&self) -> Score {
        self.evaluation.score
    }

    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }
}

/// Counters collected while a search runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Non-terminal nodes whose children were generated.
    pub nodes_expanded: usize,
    pub thoughts_generated: usize,
    pub evaluations: usize,
    /// Thoughts that hold the failure sentinel instead of oracle output.
    pub generation_failures: usize,
    /// Evaluations that fell back to the neutral score.
    pub evaluation_fallbacks: usize,
    /// Children discarded by beam pruning.
    pub branches_pruned: usize,
}

/// Solutions ordered by score descending, ties in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    solutions: Vec<Solution>,
    pub stats: SearchStats,
}

impl SearchResult {
    /// Rank `solutions` by score. The sort is stable, so equal scores keep
    /// the order in which they were discovered.
    pub fn ranked(mut solutions: Vec<Solution>, stats: SearchStats) -> Self {
        solutions.sort_by_key(|solution| solution.discovery_index);
        solutions.sort_by(|a, b| b.score().cmp(&a.score()));
        Self { solutions, stats }
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn into_solutions(self) -> Vec<Solution> {
        self.solutions
    }

    pub fn best(&self) -> Option<&Solution> {
        self.solutions.first()
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }
}
