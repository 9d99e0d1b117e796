//! Enumerates candidate 2v2 splits of a player pool and ranks them by how
//! even the matchup would be, chemistry included.

use crate::engine::{PlayerName, RatingEngine};
use itertools::Itertools;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct Matchup {
    pub team1: [PlayerName; 2],
    pub team2: [PlayerName; 2],
    pub team1_rating: f64,
    pub team2_rating: f64,
    pub rating_difference: f64,
    pub team1_win_probability: f64,
}

/// All matchups between disjoint pairs drawn from `players`, sorted with the
/// most balanced first. Team ratings include each pair's chemistry
/// adjustment, and win probabilities come from the engine's configured model.
pub fn find_balanced_matchups(engine: &RatingEngine, players: &[PlayerName]) -> Vec<Matchup> {
    let pairs: Vec<(&PlayerName, &PlayerName)> = players.iter().tuple_combinations().collect();

    let mut matchups: Vec<Matchup> = pairs
        .iter()
        .tuple_combinations()
        .filter(|&(&(a1, a2), &(b1, b2))| a1 != b1 && a1 != b2 && a2 != b1 && a2 != b2)
        .map(|(&(a1, a2), &(b1, b2))| {
            let team1_rating = engine.combined_rating_with_chemistry(a1, a2);
            let team2_rating = engine.combined_rating_with_chemistry(b1, b2);
            Matchup {
                team1: [a1.clone(), a2.clone()],
                team2: [b1.clone(), b2.clone()],
                team1_rating,
                team2_rating,
                rating_difference: (team1_rating - team2_rating).abs(),
                team1_win_probability: engine.win_probability(team1_rating, team2_rating),
            }
        })
        .collect();

    matchups.sort_by(|a, b| {
        a.rating_difference
            .partial_cmp(&b.rating_difference)
            .expect("NaN is unordered")
    });
    matchups
}
