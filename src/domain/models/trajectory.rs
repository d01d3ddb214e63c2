//! Thoughts, scores and the append-only trajectory they form.
//!
//! A [`Trajectory`] is a persistent linked list: extending it allocates one new
//! node that points at the parent's head, so siblings share their common
//! prefix and a parent is never mutated by its children.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Candidate reasoning text generated for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thought {
    pub step_ordinal: usize,
    pub text: String,
    /// Sampling temperature the thought was generated with.
    pub temperature: f32,
    /// Set when the oracle failed and `text` holds the failure sentinel.
    /// Only used for statistics; the search treats the text like any other.
    #[serde(default)]
    pub generation_failed: bool,
}

/// Integer quality score, always within `[Score::MIN, Score::MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Score substituted whenever no usable number is available.
    pub const NEUTRAL: Self = Self(5);

    /// Clamp any integer into the valid range.
    pub fn clamped(raw: i64) -> Self {
        let clamped = raw.clamp(i64::from(Self::MIN), i64::from(Self::MAX));
        // The clamp above guarantees the value fits in a u8.
        Self(u8::try_from(clamped).unwrap_or(Self::MAX))
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for Score {
    fn from(value: u8) -> Self {
        Self::clamped(i64::from(value))
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/10", self.0)
    }
}

/// How an evaluation's score was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// A labelled or "n/10" score was found.
    Structured,
    /// The first integer in the response was used.
    FirstInteger,
    /// The response held no integer; the neutral score was substituted.
    NoInteger,
    /// The oracle call failed; the neutral score was substituted.
    OracleFailure,
}

impl ScoreSource {
    /// True when the score is the neutral substitute rather than a parsed value.
    pub const fn is_fallback(self) -> bool {
        matches!(self, Self::NoInteger | Self::OracleFailure)
    }
}

/// Score plus free-text justification for one trajectory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: Score,
    pub justification: String,
    pub source: ScoreSource,
}

impl Evaluation {
    pub fn new(score: Score, justification: impl Into<String>, source: ScoreSource) -> Self {
        Self {
            score,
            justification: justification.into(),
            source,
        }
    }
}

/// One scored step of a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryEntry {
    pub thought: Thought,
    pub evaluation: Evaluation,
}

impl TrajectoryEntry {
    pub fn new(thought: Thought, evaluation: Evaluation) -> Self {
        Self {
            thought,
            evaluation,
        }
    }

    pub fn step_ordinal(&self) -> usize {
        self.thought.step_ordinal
    }

    pub fn score(&self) -> Score {
        self.evaluation.score
    }

    pub fn justification(&self) -> &str {
        &self.evaluation.justification
    }
}

#[derive(Debug)]
struct Node {
    entry: TrajectoryEntry,
    parent: Option<Arc<Node>>,
}

/// Ordered, append-only sequence of scored thoughts.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    head: Option<Arc<Node>>,
    len: usize,
}

impl Trajectory {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return a new trajectory with `entry` appended; `self` is unchanged.
    pub fn extend(&self, entry: TrajectoryEntry) -> Self {
        debug_assert_eq!(
            entry.step_ordinal(),
            self.len,
            "entries must be appended in step order"
        );
        Self {
            head: Some(Arc::new(Node {
                entry,
                parent: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// The trajectory without its last entry.
    pub fn parent(&self) -> Option<Self> {
        self.head.as_ref().map(|node| Self {
            head: node.parent.clone(),
            len: self.len - 1,
        })
    }

    pub fn last(&self) -> Option<&TrajectoryEntry> {
        self.head.as_deref().map(|node| &node.entry)
    }

    pub fn last_score(&self) -> Option<Score> {
        self.last().map(TrajectoryEntry::score)
    }

    /// Entries in step order.
    pub fn entries(&self) -> Vec<&TrajectoryEntry> {
        let mut entries = Vec::with_capacity(self.len);
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            entries.push(&node.entry);
            cursor = node.parent.as_deref();
        }
        entries.reverse();
        entries
    }

    /// Thoughts in step order.
    pub fn thoughts(&self) -> Vec<&Thought> {
        self.entries().into_iter().map(|entry| &entry.thought).collect()
    }

    /// True when both trajectories point at the same node for their first
    /// `prefix_len` entries, i.e. the prefix is shared rather than copied.
    pub fn shares_prefix_with(&self, other: &Self, prefix_len: usize) -> bool {
        match (self.ancestor_at(prefix_len), other.ancestor_at(prefix_len)) {
            (Some(Some(a)), Some(Some(b))) => Arc::ptr_eq(&a, &b),
            (Some(None), Some(None)) => true,
            _ => false,
        }
    }

    /// Head node of the ancestor with exactly `len` entries.
    fn ancestor_at(&self, len: usize) -> Option<Option<Arc<Node>>> {
        if len > self.len {
            return None;
        }
        let mut cursor = self.head.clone();
        for _ in len..self.len {
            cursor = cursor.and_then(|node| node.parent.clone());
        }
        Some(cursor)
    }
}

impl PartialEq for Trajectory {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.entries() == other.entries()
    }
}

impl Serialize for Trajectory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries())
    }
}

impl<'de> Deserialize<'de> for Trajectory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<TrajectoryEntry>::deserialize(deserializer)?;
        let mut trajectory = Self::empty();
        for entry in entries {
            if entry.step_ordinal() != trajectory.len {
                return Err(serde::de::Error::custom(format!(
                    "trajectory entry for step {} found at position {}",
                    entry.step_ordinal(),
                    trajectory.len
                )));
            }
            trajectory = trajectory.extend(entry);
        }
        Ok(trajectory)
    }
}
