use crate::data_processing::write_slice_to_file;
use crate::engine::{PairKey, PlayerName, RatingEngine};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct PlayerSummary {
    pub rank: usize,
    pub rating: f64,
    pub num_matches: u32,
    pub handle: PlayerName,
}

#[derive(Clone, Debug, Serialize)]
pub struct PairSummary {
    pub rank: usize,
    pub adjustment: f64,
    pub num_matches: u32,
    pub pair: PairKey,
}

pub fn make_leaderboard(engine: &RatingEngine) -> Vec<PlayerSummary> {
    let mut rows: Vec<PlayerSummary> = engine
        .players()
        .map(|(handle, rating)| PlayerSummary {
            rank: 0,
            rating,
            num_matches: engine.match_count(handle),
            handle: handle.clone(),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .expect("NaN is unordered")
            .then_with(|| a.handle.cmp(&b.handle))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

/// Ranks teammate pairs by chemistry, best synergy first.
pub fn make_pair_leaderboard(engine: &RatingEngine) -> Vec<PairSummary> {
    let mut rows: Vec<PairSummary> = engine
        .pairs()
        .map(|(pair, adjustment)| PairSummary {
            rank: 0,
            adjustment,
            num_matches: engine.pair_match_count_by_key(pair),
            pair: pair.clone(),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.adjustment
            .partial_cmp(&a.adjustment)
            .expect("NaN is unordered")
            .then_with(|| a.pair.cmp(&b.pair))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

pub fn log_ratings(engine: &RatingEngine) {
    let players = make_leaderboard(engine);
    let pairs = make_pair_leaderboard(engine);

    let mean_rating =
        players.iter().map(|row| row.rating).sum::<f64>() / players.len().max(1) as f64;
    tracing::info!("Mean rating = {:.1}", mean_rating);
    tracing::info!(
        "Average calibration loss = {:.4} over {} matches",
        engine.average_calibration_loss(),
        engine.matches_processed()
    );
    for row in &players {
        tracing::info!(
            "{:3} {:7.1} ({:3} matches) {}",
            row.rank,
            row.rating,
            row.num_matches,
            row.handle
        );
    }
    for row in &pairs {
        tracing::info!(
            "{:3} {:+7.1} ({:3} together) {}",
            row.rank,
            row.adjustment,
            row.num_matches,
            row.pair
        );
    }
}

pub fn print_ratings(engine: &RatingEngine, dir: impl AsRef<std::path::Path>) {
    log_ratings(engine);
    let dir = dir.as_ref();
    write_slice_to_file(&make_leaderboard(engine), dir.join("all_players.csv"));
    write_slice_to_file(&make_pair_leaderboard(engine), dir.join("all_pairs.csv"));
}
