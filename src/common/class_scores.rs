use std::fmt::Debug;
use std::hash::Hash;
use serde::{Deserialize, Serialize};

/// Anything a detector may use to name a class.
pub trait ClassLabel: Clone + Eq + Hash + Debug + Send + Sync {}

impl<T> ClassLabel for T where T: Clone + Eq + Hash + Debug + Send + Sync {}

/// Per-class confidence map of a single detection.
///
/// Iteration yields labels in insertion order. That order matters: the first detection seen by
/// the alignment engine fixes the column order of every detection matrix in the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassScores<L> {
    entries: Vec<(L, f32)>,
}

impl<L> Default for ClassScores<L> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<L: ClassLabel> ClassScores<L> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the score of `label`, keeping its original position if it was already present.
    pub fn insert(&mut self, label: L, score: f32) {
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = score,
            None => self.entries.push((label, score)),
        }
    }

    pub fn with_score(mut self, label: L, score: f32) -> Self {
        self.insert(label, score);
        self
    }

    pub fn get(&self, label: &L) -> Option<f32> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, s)| *s)
    }

    pub fn labels(&self) -> impl Iterator<Item = &L> {
        self.entries.iter().map(|(l, _)| l)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&L, f32)> {
        self.entries.iter().map(|(l, s)| (l, *s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<L: ClassLabel> FromIterator<(L, f32)> for ClassScores<L> {
    fn from_iter<I: IntoIterator<Item = (L, f32)>>(iter: I) -> Self {
        let mut scores = ClassScores::new();
        for (label, score) in iter {
            scores.insert(label, score);
        }
        scores
    }
}

impl<L: ClassLabel, const N: usize> From<[(L, f32); N]> for ClassScores<L> {
    fn from(entries: [(L, f32); N]) -> Self {
        entries.into_iter().collect()
    }
}
