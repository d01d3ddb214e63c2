//! Prompt templates for every oracle call.

use std::fmt::Write as _;

use crate::domain::models::{Problem, Score, Solution, Step, Thought};

/// Pair each thought with the step it was generated for, in step order.
/// Thoughts whose ordinal has no matching step are skipped.
pub fn pair_with_steps<'a>(
    steps: &'a [Step],
    thoughts: &[&'a Thought],
) -> Vec<(&'a Step, &'a Thought)> {
    thoughts
        .iter()
        .filter_map(|thought| steps.get(thought.step_ordinal).map(|step| (step, *thought)))
        .collect()
}

/// Ask for 3-4 named steps in the line-oriented `STEP n:` format.
pub fn decomposition(problem: &Problem) -> String {
    format!(
        r"I need to break the following problem into 3-4 key steps to solve it:

{problem}

Identify the main steps needed to solve this problem.
For each step, provide:
1. A short name for the step
2. A description of the step
3. What information must be determined in that step

Output format:
STEP 1: [Step name]
Description: [Step description]
Determine: [What needs to be found]

STEP 2: [Step name]
...and so on.
"
    )
}

/// Ask for one thought for `step`, given the thoughts chosen so far.
pub fn generation(problem: &Problem, step: &Step, history: &[(&Step, &Thought)]) -> String {
    let mut context = String::new();
    if !history.is_empty() {
        context.push_str("Previous steps:\n");
        for (prior_step, thought) in history {
            let _ = writeln!(context, "{}", prior_step.label());
            let _ = writeln!(context, "Thought: {}\n", thought.text);
        }
    }
    let target = if step.target.is_empty() {
        String::new()
    } else {
        format!("\nWhat to determine: {}", step.target)
    };

    format!(
        r#"You are solving this problem: "{problem}"

{context}
You are now at step: {name}
Step description: {description}{target}

Generate a detailed thought for this step. Consider different approaches and reason step by step.
Your thought must be consistent with the previous steps (if any) and must move toward the solution.

Your thought for this step:
"#,
        name = step.name,
        description = step.description,
    )
}

/// Ask for a 1-10 rating of a partial or complete trajectory.
pub fn evaluation(
    problem: &Problem,
    history: &[(&Step, &Thought)],
    is_final: bool,
    previous_score: Option<Score>,
) -> String {
    let mut transcript = String::new();
    for (step, thought) in history {
        let _ = writeln!(transcript, "{}", step.label());
        let _ = writeln!(transcript, "Thought: {}\n", thought.text);
    }

    let previous = previous_score
        .map(|score| format!("\nThe previous evaluation was: {}/10.", score.value()))
        .unwrap_or_default();
    let kind = if is_final { "final" } else { "intermediate" };

    format!(
        r#"You are evaluating a line of reasoning for this problem:
"{problem}"

Here is the thought history:
{transcript}
{previous}

Rate the quality and effectiveness of these {kind} thoughts on a scale from 1 to 10,
where 10 is excellent (flawless reasoning that leads to the correct solution)
and 1 is very poor (wrong reasoning or reasoning that leads to incorrect conclusions).

Consider:
- Mathematical and logical accuracy
- Clarity of reasoning
- Progress toward the solution
- Coherence between steps

Give the numeric score first, then a brief justification.
"#
    )
}

/// Ask for a short narrative of the best solution.
pub fn synthesis(problem: &Problem, steps: &[Step], solution: &Solution) -> String {
    let mut transcript = String::new();
    for entry in solution.trajectory.entries() {
        let label = steps
            .get(entry.step_ordinal())
            .map_or_else(|| format!("STEP {}", entry.step_ordinal() + 1), Step::label);
        let _ = writeln!(transcript, "{label}");
        let _ = writeln!(transcript, "Thought: {}", entry.thought.text);
        let _ = writeln!(transcript, "Evaluation: {}\n", entry.score());
    }

    format!(
        r#"You solved the following problem using the Tree of Thoughts method:
"{problem}"

Here is the step-by-step solution process you produced:
{transcript}
Synthesize this solution in a clear and concise form:
1. Summarize the overall approach
2. State the final answer clearly and directly
3. Highlight any key insight or concept that was applied

Your synthesis should make sense to someone who has not seen the whole reasoning process.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thought(ordinal: usize, text: &str) -> Thought {
        Thought {
            step_ordinal: ordinal,
            text: text.to_string(),
            temperature: 0.7,
            generation_failed: false,
        }
    }

    #[test]
    fn test_generation_prompt_embeds_history() {
        let problem = Problem::new("How many handshakes?");
        let steps = [
            Step::new(0, "Understand", "Read it", ""),
            Step::new(1, "Count", "Count pairs", ""),
        ];
        let first = thought(0, "Five people shake hands once.");
        let prompt = generation(&problem, &steps[1], &[(&steps[0], &first)]);

        assert!(prompt.contains("Previous steps:"));
        assert!(prompt.contains("STEP 1: Understand"));
        assert!(prompt.contains("Thought: Five people shake hands once."));
        assert!(prompt.contains("You are now at step: Count"));
    }

    #[test]
    fn test_generation_prompt_without_history() {
        let problem = Problem::new("p");
        let step = Step::new(0, "Understand", "Read it", "");
        assert!(!generation(&problem, &step, &[]).contains("Previous steps:"));
    }

    #[test]
    fn test_generation_prompt_states_step_target() {
        let problem = Problem::new("How many handshakes?");
        let step = Step::new(0, "Count", "Count pairs", "the number of handshakes");
        let prompt = generation(&problem, &step, &[]);
        assert!(prompt.contains(
            "Step description: Count pairs\nWhat to determine: the number of handshakes"
        ));

        let untargeted = Step::new(0, "Count", "Count pairs", "");
        assert!(!generation(&problem, &untargeted, &[]).contains("What to determine"));
    }

    #[test]
    fn test_evaluation_prompt_marks_final_and_previous_score() {
        let problem = Problem::new("p");
        let step = Step::new(0, "Count", "", "");
        let t = thought(0, "ten");

        let final_prompt = evaluation(&problem, &[(&step, &t)], true, None);
        assert!(final_prompt.contains("these final thoughts"));
        assert!(!final_prompt.contains("previous evaluation"));

        let partial = evaluation(&problem, &[(&step, &t)], false, Some(Score::from(7u8)));
        assert!(partial.contains("these intermediate thoughts"));
        assert!(partial.contains("The previous evaluation was: 7/10."));
    }
}
