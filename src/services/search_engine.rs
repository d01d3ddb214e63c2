//! Tree-of-thought search over decomposed steps.
//!
//! Two strategies share the same node expansion: for a trajectory of depth
//! `d`, generate `branching_factor` thoughts for step `d` (temperature rising
//! with the branch index), evaluate each child immediately and return the
//! children in branch order.
//!
//! - Breadth-first keeps a FIFO frontier, never prunes, and stops once
//!   `amplitude` solutions have been recorded.
//! - Depth-first beam keeps an explicit stack, sorts each node's children by
//!   score (stable) and descends into the best `beam_width` of them in the
//!   same order natural recursion would.
//!
//! A trajectory's depth is its length, so the frontier and the stack hold
//! trajectories only. Branches of one node may be generated and evaluated
//! concurrently up to `max_concurrency`; results are always consumed in
//! branch order, so completion order never affects ranking.

use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Evaluation, Problem, Score, SearchResult, SearchStats, SearchStrategy, Solution, Step,
    TemperatureSchedule, Trajectory, TrajectoryEntry,
};
use crate::services::evaluator::ThoughtEvaluator;
use crate::services::generator::ThoughtGenerator;

/// Drives the generator and evaluator through a search strategy.
pub struct SearchEngine {
    generator: ThoughtGenerator,
    evaluator: ThoughtEvaluator,
    max_concurrency: usize,
}

impl SearchEngine {
    /// `max_concurrency` bounds the branches of a single node processed at
    /// once; values below 1 are treated as 1.
    pub fn new(
        generator: ThoughtGenerator,
        evaluator: ThoughtEvaluator,
        max_concurrency: usize,
    ) -> Self {
        Self {
            generator,
            evaluator,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Run `strategy` over `steps` and return the ranked solutions.
    ///
    /// Cancelling `cancel` aborts the run; solutions found so far are
    /// discarded and [`DomainError::Cancelled`] is returned.
    #[instrument(skip_all, fields(strategy = %strategy.kind(), steps = steps.len()))]
    pub async fn search(
        &self,
        problem: &Problem,
        steps: &[Step],
        strategy: &SearchStrategy,
        cancel: &CancellationToken,
    ) -> DomainResult<SearchResult> {
        strategy.validate()?;
        if steps.is_empty() {
            return Err(DomainError::EmptyDecomposition);
        }

        let run = RunContext {
            generator: &self.generator,
            evaluator: &self.evaluator,
            problem,
            steps,
            cancel,
            max_concurrency: self.max_concurrency,
        };

        info!(%strategy, "search started");
        let state = match *strategy {
            SearchStrategy::BreadthFirst {
                amplitude,
                branching_factor,
                schedule,
            } => run.breadth_first(amplitude, branching_factor, schedule).await?,
            SearchStrategy::DepthFirstBeam {
                branching_factor,
                beam_width,
                schedule,
            } => {
                let effective = if beam_width > branching_factor {
                    warn!(
                        beam_width,
                        branching_factor, "beam width exceeds branching factor, clamping"
                    );
                    branching_factor
                } else {
                    beam_width
                };
                run.depth_first_beam(branching_factor, effective, schedule)
                    .await?
            }
        };

        let result = SearchResult::ranked(state.solutions, state.stats);
        info!(
            solutions = result.len(),
            best_score = result.best().map(|s| s.score().value()),
            nodes_expanded = result.stats.nodes_expanded,
            evaluations = result.stats.evaluations,
            "search finished"
        );
        Ok(result)
    }
}

/// Read-only inputs of one run.
struct RunContext<'a> {
    generator: &'a ThoughtGenerator,
    evaluator: &'a ThoughtEvaluator,
    problem: &'a Problem,
    steps: &'a [Step],
    cancel: &'a CancellationToken,
    max_concurrency: usize,
}

/// Mutable state owned exclusively by one run.
#[derive(Default)]
struct RunState {
    stats: SearchStats,
    solutions: Vec<Solution>,
}

impl RunState {
    fn cancelled(&self) -> DomainError {
        DomainError::Cancelled {
            solutions_discarded: self.solutions.len(),
        }
    }

    fn record_expansion(&mut self, children: &[Trajectory]) {
        self.stats.nodes_expanded += 1;
        for entry in children.iter().filter_map(Trajectory::last) {
            self.stats.thoughts_generated += 1;
            self.stats.evaluations += 1;
            if entry.thought.generation_failed {
                self.stats.generation_failures += 1;
            }
            if entry.evaluation.source.is_fallback() {
                self.stats.evaluation_fallbacks += 1;
            }
        }
    }

    fn record_solution(&mut self, trajectory: Trajectory, evaluation: Evaluation) {
        self.stats.evaluations += 1;
        if evaluation.source.is_fallback() {
            self.stats.evaluation_fallbacks += 1;
        }
        let discovery_index = self.solutions.len();
        info!(
            discovery_index,
            score = evaluation.score.value(),
            "solution recorded"
        );
        self.solutions
            .push(Solution::new(trajectory, evaluation, discovery_index));
    }
}

impl RunContext<'_> {
    async fn breadth_first(
        &self,
        amplitude: usize,
        branching_factor: usize,
        schedule: TemperatureSchedule,
    ) -> DomainResult<RunState> {
        let mut state = RunState::default();
        let mut frontier = VecDeque::from([Trajectory::empty()]);

        while state.solutions.len() < amplitude {
            let Some(node) = frontier.pop_front() else {
                break;
            };
            if self.cancel.is_cancelled() {
                return Err(state.cancelled());
            }

            if self.is_terminal(&node) {
                let evaluation = self.guard(&state, self.evaluate_terminal(&node)).await?;
                state.record_solution(node, evaluation);
                continue;
            }

            let children = self
                .guard(&state, self.expand(&node, branching_factor, schedule))
                .await?;
            state.record_expansion(&children);
            frontier.extend(children);
        }

        Ok(state)
    }

    async fn depth_first_beam(
        &self,
        branching_factor: usize,
        beam_width: usize,
        schedule: TemperatureSchedule,
    ) -> DomainResult<RunState> {
        let mut state = RunState::default();
        let mut stack = vec![Trajectory::empty()];

        while let Some(node) = stack.pop() {
            if self.cancel.is_cancelled() {
                return Err(state.cancelled());
            }

            if self.is_terminal(&node) {
                let evaluation = self.guard(&state, self.evaluate_terminal(&node)).await?;
                state.record_solution(node, evaluation);
                continue;
            }

            let mut children = self
                .guard(&state, self.expand(&node, branching_factor, schedule))
                .await?;
            state.record_expansion(&children);

            children.sort_by(|a, b| b.last_score().cmp(&a.last_score()));
            let kept = beam_width.min(children.len());
            let pruned = children.len() - kept;
            state.stats.branches_pruned += pruned;
            children.truncate(kept);
            let kept_scores: Vec<u8> = children
                .iter()
                .filter_map(Trajectory::last_score)
                .map(Score::value)
                .collect();
            debug!(depth = node.len(), kept, pruned, ?kept_scores, "beam pruned");

            // Reversed so the best child is popped first.
            stack.extend(children.into_iter().rev());
        }

        Ok(state)
    }

    fn is_terminal(&self, trajectory: &Trajectory) -> bool {
        trajectory.len() >= self.steps.len()
    }

    /// Run `future` unless the run is cancelled first.
    async fn guard<F: Future>(&self, state: &RunState, future: F) -> DomainResult<F::Output> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(state.cancelled()),
            output = future => Ok(output),
        }
    }

    /// Generate and evaluate `branching_factor` children of `parent`, in branch order.
    async fn expand(
        &self,
        parent: &Trajectory,
        branching_factor: usize,
        schedule: TemperatureSchedule,
    ) -> Vec<Trajectory> {
        let step = &self.steps[parent.len()];
        debug!(depth = parent.len(), step = %step.name, branching_factor, "expanding node");

        stream::iter(0..branching_factor)
            .map(|branch| self.branch(parent, step, branch, schedule.temperature_for(branch)))
            .buffered(self.max_concurrency)
            .collect()
            .await
    }

    async fn branch(
        &self,
        parent: &Trajectory,
        step: &Step,
        branch: usize,
        temperature: f32,
    ) -> Trajectory {
        let thought = self
            .generator
            .generate(self.problem, self.steps, step, parent, temperature)
            .await;

        let mut thoughts = parent.thoughts();
        thoughts.push(&thought);
        let evaluation = self
            .evaluator
            .evaluate(self.problem, self.steps, &thoughts, parent.last_score())
            .await;

        debug!(
            depth = parent.len(),
            branch,
            temperature,
            score = evaluation.score.value(),
            "branch evaluated"
        );
        parent.extend(TrajectoryEntry::new(thought, evaluation))
    }

    async fn evaluate_terminal(&self, trajectory: &Trajectory) -> Evaluation {
        let thoughts = trajectory.thoughts();
        self.evaluator
            .evaluate(self.problem, self.steps, &thoughts, None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::oracle::MockOracle;
    use crate::domain::ports::{CallPurpose, CompletionRequest, Oracle};
    use crate::services::evaluator::EvaluatorSettings;
    use crate::services::generator::GeneratorSettings;
    use std::sync::Arc;

    fn engine(oracle: Arc<dyn Oracle>, max_concurrency: usize) -> SearchEngine {
        SearchEngine::new(
            ThoughtGenerator::new(oracle.clone(), GeneratorSettings::default()),
            ThoughtEvaluator::new(oracle, EvaluatorSettings::default()),
            max_concurrency,
        )
    }

    fn steps(count: usize) -> Vec<Step> {
        (0..count)
            .map(|i| Step::new(i, format!("Step {i}"), "", ""))
            .collect()
    }

    fn scripted() -> Arc<MockOracle> {
        Arc::new(MockOracle::new(|request: &CompletionRequest| {
            Ok(match request.purpose {
                CallPurpose::Evaluation => "7".to_string(),
                _ => format!("thought at {:.2}", request.temperature),
            })
        }))
    }

    #[tokio::test]
    async fn test_rejects_empty_steps() {
        let result = engine(scripted(), 1)
            .search(
                &Problem::new("p"),
                &[],
                &SearchStrategy::breadth_first(1, 1),
                &CancellationToken::new(),
            )
            .await;
        assert!(matches!(result, Err(DomainError::EmptyDecomposition)));
    }

    #[tokio::test]
    async fn test_rejects_zero_branching() {
        let result = engine(scripted(), 1)
            .search(
                &Problem::new("p"),
                &steps(1),
                &SearchStrategy::depth_first_beam(0, 1),
                &CancellationToken::new(),
            )
            .await;
        assert!(matches!(result, Err(DomainError::InvalidParameters(_))));
    }

    #[tokio::test]
    async fn test_breadth_first_uses_escalating_temperatures() {
        let oracle = scripted();
        let result = engine(oracle.clone(), 1)
            .search(
                &Problem::new("p"),
                &steps(1),
                &SearchStrategy::breadth_first(3, 3),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.len(), 3);
        let temperatures: Vec<f32> = oracle
            .requests()
            .into_iter()
            .filter(|r| r.purpose == CallPurpose::Generation)
            .map(|r| r.temperature)
            .collect();
        assert_eq!(temperatures.len(), 3);
        assert!((temperatures[0] - 0.7).abs() < 1e-6);
        assert!((temperatures[1] - 0.8).abs() < 1e-6);
        assert!((temperatures[2] - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_beam_wider_than_branching_is_clamped() {
        let result = engine(scripted(), 1)
            .search(
                &Problem::new("p"),
                &steps(2),
                &SearchStrategy::depth_first_beam(2, 5),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(result.stats.branches_pruned, 0);
    }

    #[tokio::test]
    async fn test_beam_counts_pruned_branches() {
        let result = engine(scripted(), 1)
            .search(
                &Problem::new("p"),
                &steps(2),
                &SearchStrategy::depth_first_beam(3, 1),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.stats.nodes_expanded, 2);
        assert_eq!(result.stats.thoughts_generated, 6);
        assert_eq!(result.stats.branches_pruned, 4);
        // 6 child evaluations plus 1 terminal evaluation.
        assert_eq!(result.stats.evaluations, 7);
    }

    #[tokio::test]
    async fn test_concurrent_branches_keep_branch_order() {
        let result = engine(scripted(), 4)
            .search(
                &Problem::new("p"),
                &steps(1),
                &SearchStrategy::breadth_first(4, 4),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let texts: Vec<String> = result
            .solutions()
            .iter()
            .map(|s| s.trajectory.thoughts()[0].text.clone())
            .collect();
        assert_eq!(
            texts,
            vec![
                "thought at 0.70",
                "thought at 0.80",
                "thought at 0.90",
                "thought at 1.00"
            ]
        );
    }

    #[tokio::test]
    async fn test_pre_cancelled_search_returns_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = engine(scripted(), 1)
            .search(
                &Problem::new("p"),
                &steps(2),
                &SearchStrategy::breadth_first(2, 2),
                &cancel,
            )
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Cancelled {
                solutions_discarded: 0
            })
        ));
    }
}
