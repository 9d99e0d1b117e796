use super::types::PlayerName;
use crate::models::WinProbabilityModel;
use std::collections::BTreeMap;

/// Outcome of the rating-change calculation for one match, before anything
/// is applied to the stores.
#[derive(Clone, Debug)]
pub struct RatingChanges {
    pub expected_win_probability: f64,
    pub base_change: f64,
    pub player_changes: BTreeMap<PlayerName, f64>,
    pub winner_pairwise_change: f64,
    pub loser_pairwise_change: f64,
}

// Splits +base across a side's two players and its pair adjustment, each
// share proportional to its K contribution. The final share is taken as a
// remainder so the three always sum to exactly base.
fn split_side(base: f64, k0: f64, k1: f64, pair_k: f64) -> (f64, f64, f64) {
    let total_k = k0 + k1 + pair_k;
    let d0 = k0 / total_k * base;
    if pair_k == 0. {
        (d0, base - d0, 0.)
    } else {
        let d1 = k1 / total_k * base;
        (d0, d1, base - d0 - d1)
    }
}

/// Computes the symmetric rating transfer for one match. `winner` and `loser`
/// must each hold exactly two players; effective ratings already include each
/// side's pair adjustment.
pub fn calculate_changes(
    winner: &[PlayerName],
    loser: &[PlayerName],
    winner_rating: f64,
    loser_rating: f64,
    k_factor: impl Fn(&PlayerName) -> f64,
    winner_pair_k: f64,
    loser_pair_k: f64,
    model: &dyn WinProbabilityModel,
) -> RatingChanges {
    let winner_ks = [k_factor(&winner[0]), k_factor(&winner[1])];
    let loser_ks = [k_factor(&loser[0]), k_factor(&loser[1])];

    let winner_total_k = winner_ks[0] + winner_ks[1] + winner_pair_k;
    let loser_total_k = loser_ks[0] + loser_ks[1] + loser_pair_k;
    let average_k = 0.5 * (winner_total_k + loser_total_k);

    let expected_win_probability = model.win_probability(winner_rating, loser_rating);
    let base_change = average_k * (1. - expected_win_probability);

    let (w0, w1, winner_pairwise_change) =
        split_side(base_change, winner_ks[0], winner_ks[1], winner_pair_k);
    let (l0, l1, loser_pair_share) =
        split_side(base_change, loser_ks[0], loser_ks[1], loser_pair_k);

    let mut player_changes = BTreeMap::new();
    player_changes.insert(winner[0].clone(), w0);
    player_changes.insert(winner[1].clone(), w1);
    player_changes.insert(loser[0].clone(), -l0);
    player_changes.insert(loser[1].clone(), -l1);

    RatingChanges {
        expected_win_probability,
        base_change,
        player_changes,
        winner_pairwise_change,
        loser_pairwise_change: -loser_pair_share,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::Logistic;
    use proptest::prelude::*;

    fn team(a: &str, b: &str) -> Vec<PlayerName> {
        vec![PlayerName::new(a), PlayerName::new(b)]
    }

    fn side_sum(changes: &RatingChanges, side: &[PlayerName]) -> f64 {
        side.iter().map(|p| changes.player_changes[p]).sum()
    }

    #[test]
    fn test_even_match_transfers_half_the_average_k() {
        let changes = calculate_changes(
            &team("A", "B"),
            &team("C", "D"),
            2000.,
            2000.,
            |_| 16.,
            0.,
            0.,
            &Logistic::default(),
        );
        assert_eq!(changes.expected_win_probability, 0.5);
        assert!((changes.base_change - 16.).abs() < 1e-12);
        assert!((changes.player_changes[&PlayerName::new("A")] - 8.).abs() < 1e-12);
        assert!((changes.player_changes[&PlayerName::new("C")] + 8.).abs() < 1e-12);
    }

    #[test]
    fn test_deltas_sum_exactly_without_pairwise() {
        let changes = calculate_changes(
            &team("A", "B"),
            &team("C", "D"),
            1132.7,
            1019.3,
            |p| if p.as_str() == "A" { 40. } else { 20. },
            0.,
            0.,
            &Logistic::default(),
        );
        assert!((side_sum(&changes, &team("A", "B")) - changes.base_change).abs() < 1e-12);
        assert!((side_sum(&changes, &team("C", "D")) + changes.base_change).abs() < 1e-12);
        assert_eq!(changes.winner_pairwise_change, 0.);
        assert_eq!(changes.loser_pairwise_change, 0.);
    }

    #[test]
    fn test_high_k_player_absorbs_larger_share() {
        let changes = calculate_changes(
            &team("Rookie", "Veteran"),
            &team("C", "D"),
            1000.,
            1000.,
            |p| if p.as_str() == "Rookie" { 40. } else { 20. },
            0.,
            0.,
            &Logistic::default(),
        );
        let rookie = changes.player_changes[&PlayerName::new("Rookie")];
        let veteran = changes.player_changes[&PlayerName::new("Veteran")];
        assert!((rookie - 2. * veteran).abs() < 1e-9);
    }

    #[test]
    fn test_pairwise_share_is_k_weighted() {
        let changes = calculate_changes(
            &team("A", "B"),
            &team("C", "D"),
            1000.,
            1000.,
            |_| 20.,
            10.,
            10.,
            &Logistic::default(),
        );
        // total K per side 50, base = 25; pair share = 10/50 * 25 = 5
        assert!((changes.base_change - 25.).abs() < 1e-12);
        assert!((changes.winner_pairwise_change - 5.).abs() < 1e-12);
        // Symmetric K composition makes the pair deltas zero-sum
        assert_eq!(
            changes.winner_pairwise_change,
            -changes.loser_pairwise_change
        );
    }

    #[test]
    fn test_side_totals_include_pairwise_share() {
        let changes = calculate_changes(
            &team("A", "B"),
            &team("C", "D"),
            1210.,
            980.,
            |p| if p.as_str() == "C" { 40. } else { 20. },
            8.,
            12.,
            &Logistic::default(),
        );
        let win_total = side_sum(&changes, &team("A", "B")) + changes.winner_pairwise_change;
        let lose_total = side_sum(&changes, &team("C", "D")) + changes.loser_pairwise_change;
        assert!((win_total - changes.base_change).abs() < 1e-12);
        assert!((lose_total + changes.base_change).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_rating_transfer_is_zero_sum(
            winner_rating in 0f64..4000.,
            loser_rating in 0f64..4000.,
            k0 in 1f64..100.,
            k1 in 1f64..100.,
            pair_factor in 0f64..2.,
        ) {
            let winner = team("A", "B");
            let loser = team("C", "D");
            let pair_k = pair_factor * 0.5 * (k0 + k1);
            let changes = calculate_changes(
                &winner,
                &loser,
                winner_rating,
                loser_rating,
                |p| if p.as_str() < "C" { k0 } else { k1 },
                pair_k,
                pair_k,
                &Logistic::default(),
            );
            let p = changes.expected_win_probability;
            prop_assert!(p > 0. && p < 1.);
            let win_total = side_sum(&changes, &winner) + changes.winner_pairwise_change;
            let lose_total = side_sum(&changes, &loser) + changes.loser_pairwise_change;
            prop_assert!((win_total - changes.base_change).abs() < 1e-9);
            prop_assert!((lose_total + changes.base_change).abs() < 1e-9);
        }
    }
}
