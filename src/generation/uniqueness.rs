use crate::generation::dna::Dna;
use std::collections::HashSet;

/// Normalized DNA of every item accepted in a run
///
/// Only grows. Callers that want a fresh run create a new tracker.
#[derive(Debug, Default)]
pub struct UniquenessTracker {
    seen: HashSet<String>,
}

impl UniquenessTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no accepted item shares this DNA's normalized form
    pub fn is_unique(&self, dna: &Dna) -> bool {
        !self.seen.contains(&dna.normalized())
    }

    /// Remember this DNA's normalized form
    ///
    /// Returns `false` if it was already present.
    pub fn record(&mut self, dna: &Dna) -> bool {
        self.seen.insert(dna.normalized())
    }

    /// Number of distinct normalized DNA values recorded
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Whether the given normalized DNA was recorded
    pub fn contains_normalized(&self, normalized: &str) -> bool {
        self.seen.contains(normalized)
    }
}
