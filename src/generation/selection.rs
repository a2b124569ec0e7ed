use crate::catalog::element::Element;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Position selected by cumulative weights for a given draw
///
/// Subtracts each weight from `draw` in order and returns the first index
/// where the remainder goes negative. `draw` must be below the weight total;
/// larger draws return `None`.
pub fn weighted_index(weights: &[u32], draw: u64) -> Option<usize> {
    let mut remainder = draw;
    for (i, &weight) in weights.iter().enumerate() {
        let weight = u64::from(weight);
        if remainder < weight {
            return Some(i);
        }
        remainder -= weight;
    }
    None
}

/// Seeded random selector for reproducible stochastic choices
///
/// Draws exactly once per [`select`](Self::select) call, so a composition
/// pass consumes one value per layer.
pub struct WeightedSelector {
    rng: StdRng,
}

impl WeightedSelector {
    /// Create a deterministic selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Pick one candidate with probability proportional to its weight
    ///
    /// Candidates keep their load-time ids; the returned reference is one of
    /// the inputs, never a position in the filtered list. Returns `None` for
    /// an empty candidate list.
    pub fn select<'a>(&mut self, candidates: &[&'a Element]) -> Option<&'a Element> {
        let total: u64 = candidates.iter().map(|e| u64::from(e.weight)).sum();
        if total == 0 {
            return None;
        }

        let draw = self.rng.random_range(0..total);
        let weights: Vec<u32> = candidates.iter().map(|e| e.weight).collect();
        weighted_index(&weights, draw).and_then(|i| candidates.get(i).copied())
    }

    /// Shuffle a slice in place using the same random stream
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}
