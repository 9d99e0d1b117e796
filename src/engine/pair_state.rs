use super::types::{PairKey, PlayerName};
use std::collections::HashMap;

/// Owns the chemistry adjustment and shared-match count for every unordered
/// teammate pair. The adjustment is the deviation of the pair's combined
/// performance from the sum of their individual ratings.
#[derive(Clone, Debug)]
pub struct PairRatings {
    adjustments: HashMap<PairKey, f64>,
    match_counts: HashMap<PairKey, u32>,
    pairwise_factor: f64,
}

impl PairRatings {
    pub fn new(pairwise_factor: f64) -> Self {
        Self {
            adjustments: HashMap::new(),
            match_counts: HashMap::new(),
            pairwise_factor,
        }
    }

    pub fn adjustment(&self, p1: &PlayerName, p2: &PlayerName) -> f64 {
        self.adjustments
            .get(&PairKey::new(p1, p2))
            .copied()
            .unwrap_or(0.)
    }

    pub fn match_count(&self, p1: &PlayerName, p2: &PlayerName) -> u32 {
        self.match_counts
            .get(&PairKey::new(p1, p2))
            .copied()
            .unwrap_or(0)
    }

    pub fn apply_delta(&mut self, p1: &PlayerName, p2: &PlayerName, delta: f64) {
        *self.adjustments.entry(PairKey::new(p1, p2)).or_insert(0.) += delta;
    }

    pub fn increment_match_count(&mut self, p1: &PlayerName, p2: &PlayerName) {
        *self.match_counts.entry(PairKey::new(p1, p2)).or_insert(0) += 1;
    }

    /// The pair's K budget: the mean of the two individual K-factors, scaled
    /// by the pairwise weighting factor. Zero factor disables chemistry.
    pub fn combined_k_factor(&self, k1: f64, k2: f64) -> f64 {
        self.pairwise_factor * 0.5 * (k1 + k2)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, f64)> {
        self.adjustments.iter().map(|(key, &adj)| (key, adj))
    }

    pub fn pair_match_count(&self, key: &PairKey) -> u32 {
        self.match_counts.get(key).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_adjustment_is_symmetric_in_player_order() {
        let mut pairs = PairRatings::new(0.5);
        let alice = PlayerName::new("Alice");
        let bob = PlayerName::new("Bob");
        pairs.apply_delta(&alice, &bob, 7.5);
        assert_eq!(pairs.adjustment(&bob, &alice), 7.5);
        pairs.increment_match_count(&bob, &alice);
        assert_eq!(pairs.match_count(&alice, &bob), 1);
    }

    #[test]
    fn test_unknown_pairs_default_to_zero() {
        let pairs = PairRatings::new(0.5);
        let alice = PlayerName::new("Alice");
        let bob = PlayerName::new("Bob");
        assert_eq!(pairs.adjustment(&alice, &bob), 0.);
        assert_eq!(pairs.match_count(&alice, &bob), 0);
    }

    #[test]
    fn test_combined_k_factor_scaling() {
        let pairs = PairRatings::new(0.5);
        assert_eq!(pairs.combined_k_factor(40., 20.), 15.);
        let disabled = PairRatings::new(0.);
        assert_eq!(disabled.combined_k_factor(40., 20.), 0.);
    }
}
