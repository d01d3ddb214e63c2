//! Outcome of a full run and the structured report persisted from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::problem::{Problem, Step};
use super::solution::{SearchResult, SearchStats};
use super::strategy::SearchStrategy;

/// Everything one `solve` run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveOutcome {
    pub problem: Problem,
    pub strategy: SearchStrategy,
    pub steps: Vec<Step>,
    pub result: SearchResult,
    /// Narrative for the best solution, or the placeholder when synthesis failed.
    pub synthesis: String,
}

/// One step of a reported solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedStep {
    pub ordinal: usize,
    pub step_name: String,
    pub thought: String,
    pub score: u8,
    pub justification: String,
}

/// One ranked solution in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedSolution {
    /// 1-based rank.
    pub rank: usize,
    pub score: u8,
    pub final_justification: String,
    pub discovery_index: usize,
    pub steps: Vec<ReportedStep>,
}

/// Structured report of a run, suitable for JSON or YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub problem: String,
    pub strategy: SearchStrategy,
    pub model: String,
    pub steps: Vec<Step>,
    /// Number of solutions the search produced; `solutions` may hold fewer.
    pub total_solutions: usize,
    pub solutions: Vec<ReportedSolution>,
    pub synthesis: String,
    pub stats: SearchStats,
}

impl SearchReport {
    /// Build a report holding the `top_n` best solutions of `outcome`.
    pub fn from_outcome(outcome: &SolveOutcome, top_n: usize, model: impl Into<String>) -> Self {
        let solutions = outcome
            .result
            .solutions()
            .iter()
            .take(top_n)
            .enumerate()
            .map(|(index, solution)| ReportedSolution {
                rank: index + 1,
                score: solution.score().value(),
                final_justification: solution.evaluation.justification.clone(),
                discovery_index: solution.discovery_index,
                steps: solution
                    .trajectory
                    .entries()
                    .into_iter()
                    .map(|entry| ReportedStep {
                        ordinal: entry.step_ordinal(),
                        step_name: outcome
                            .steps
                            .get(entry.step_ordinal())
                            .map(|step| step.name.clone())
                            .unwrap_or_default(),
                        thought: entry.thought.text.clone(),
                        score: entry.score().value(),
                        justification: entry.justification().to_string(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            problem: outcome.problem.statement().to_string(),
            strategy: outcome.strategy,
            model: model.into(),
            steps: outcome.steps.clone(),
            total_solutions: outcome.result.len(),
            solutions,
            synthesis: outcome.synthesis.clone(),
            stats: outcome.result.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::solution::Solution;
    use crate::domain::models::trajectory::{
        Evaluation, Score, ScoreSource, Thought, Trajectory, TrajectoryEntry,
    };

    fn outcome_with_scores(scores: &[u8]) -> SolveOutcome {
        let steps = vec![Step::new(0, "Count pairs", "", "")];
        let solutions = scores
            .iter()
            .enumerate()
            .map(|(index, score)| {
                let trajectory = Trajectory::empty().extend(TrajectoryEntry::new(
                    Thought {
                        step_ordinal: 0,
                        text: format!("thought {index}"),
                        temperature: 0.7,
                        generation_failed: false,
                    },
                    Evaluation::new(Score::from(*score), "step ok", ScoreSource::FirstInteger),
                ));
                Solution::new(
                    trajectory,
                    Evaluation::new(Score::from(*score), "final ok", ScoreSource::Structured),
                    index,
                )
            })
            .collect();

        SolveOutcome {
            problem: Problem::new("How many handshakes among 5 people?"),
            strategy: SearchStrategy::breadth_first(3, 2),
            steps,
            result: SearchResult::ranked(solutions, SearchStats::default()),
            synthesis: "Ten handshakes.".to_string(),
        }
    }

    #[test]
    fn test_report_keeps_top_n_in_rank_order() {
        let outcome = outcome_with_scores(&[4, 9, 7, 8]);
        let report = SearchReport::from_outcome(&outcome, 3, "local model");

        assert_eq!(report.total_solutions, 4);
        assert_eq!(report.solutions.len(), 3);
        let scores: Vec<u8> = report.solutions.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![9, 8, 7]);
        assert_eq!(report.solutions[0].rank, 1);
        assert_eq!(report.solutions[0].steps[0].step_name, "Count pairs");
        assert_eq!(report.solutions[0].steps[0].thought, "thought 1");
        assert_eq!(report.model, "local model");
    }

    #[test]
    fn test_report_serializes_to_yaml() {
        let report = SearchReport::from_outcome(&outcome_with_scores(&[6]), 3, "m");
        let yaml = serde_yaml::to_string(&report).unwrap();
        assert!(yaml.contains("synthesis: Ten handshakes."));
        assert!(yaml.contains("strategy: breadth-first"));
    }
}
