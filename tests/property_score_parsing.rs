//! Property tests for score extraction and search shape.

mod common;

use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

use thicket::domain::models::ScoreSource;
use thicket::services::parse_evaluation;
use thicket::{Problem, Score, SearchStrategy};

proptest! {
    /// Property: any response parses to a score in [1, 10]
    #[test]
    fn prop_score_always_in_range(response in "\\PC{0,200}") {
        let evaluation = parse_evaluation(&response);
        let score = evaluation.score.value();
        prop_assert!((Score::MIN..=Score::MAX).contains(&score));
    }

    /// Property: numbers far outside the range are clamped, never rejected
    #[test]
    fn prop_out_of_range_numbers_clamp(n in 0u64..1_000_000, label in prop_oneof![Just("Score: "), Just("Rating "), Just("")]) {
        let evaluation = parse_evaluation(&format!("{label}{n}"));
        let expected = n.clamp(u64::from(Score::MIN), u64::from(Score::MAX));
        prop_assert_eq!(u64::from(evaluation.score.value()), expected);
    }

    /// Property: digit-free text parses to exactly the neutral score
    #[test]
    fn prop_digit_free_is_neutral(response in "[^0-9]{0,200}") {
        let evaluation = parse_evaluation(&response);
        prop_assert_eq!(evaluation.score, Score::NEUTRAL);
        prop_assert_eq!(evaluation.source, ScoreSource::NoInteger);
    }

    /// Property: the first integer is the score, whatever labelled score follows
    #[test]
    fn prop_first_integer_wins(first in 0u64..1_000, later in 1u8..=10) {
        let evaluation = parse_evaluation(&format!("Step {first} looks fine. Score: {later}/10"));
        let expected = first.clamp(u64::from(Score::MIN), u64::from(Score::MAX));
        prop_assert_eq!(u64::from(evaluation.score.value()), expected);
        prop_assert_eq!(evaluation.source, ScoreSource::FirstInteger);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: breadth-first with amplitude >= b^d returns b^d full-length solutions
    #[test]
    fn prop_breadth_first_shape(b in 1usize..=3, d in 1usize..=3) {
        let leaves = b.pow(u32::try_from(d).unwrap());
        let result = tokio_test::block_on(common::engine(common::scripted("7"), 2).search(
            &Problem::new("p"),
            &common::steps(d),
            &SearchStrategy::breadth_first(leaves + 1, b),
            &CancellationToken::new(),
        ))
        .unwrap();

        prop_assert_eq!(result.len(), leaves);
        prop_assert!(result.solutions().iter().all(|s| s.len() == d));
    }

    /// Property: breadth-first never records more than amplitude solutions
    #[test]
    fn prop_breadth_first_respects_amplitude(amplitude in 1usize..=5, b in 1usize..=3, d in 1usize..=3) {
        let leaves = b.pow(u32::try_from(d).unwrap());
        let result = tokio_test::block_on(common::engine(common::scripted("7"), 1).search(
            &Problem::new("p"),
            &common::steps(d),
            &SearchStrategy::breadth_first(amplitude, b),
            &CancellationToken::new(),
        ))
        .unwrap();

        prop_assert_eq!(result.len(), amplitude.min(leaves));
    }

    /// Property: depth-first-beam with k <= b returns exactly k^d solutions, ranked
    #[test]
    fn prop_beam_shape((b, k) in (1usize..=3).prop_flat_map(|b| (Just(b), 1..=b)), d in 1usize..=3) {
        let result = tokio_test::block_on(common::engine(common::scripted("Score: 6"), 1).search(
            &Problem::new("p"),
            &common::steps(d),
            &SearchStrategy::depth_first_beam(b, k),
            &CancellationToken::new(),
        ))
        .unwrap();

        prop_assert_eq!(result.len(), k.pow(u32::try_from(d).unwrap()));
        let scores: Vec<Score> = result.solutions().iter().map(|s| s.score()).collect();
        prop_assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
    }
}
