//! Read-only calibration diagnostics over a sequence of match analyses.
//! These are pure functions of history and never touch engine state.

use crate::engine::{MatchAnalysis, PlayerName};
use serde::Serialize;
use std::collections::BTreeMap;

/// Players with fewer matches than this are too noisy to judge.
const MIN_CALIBRATION_MATCHES: u32 = 6;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct CalibrationBucket {
    pub min_prob: f64,
    pub max_prob: f64,
    pub predicted_win_rate: f64,
    pub observed_win_rate: f64,
    pub count: usize,
}

/// Partitions [0.5, 1.0] into equal-width buckets and compares the mean
/// predicted probability against the observed win rate in each. Every match
/// contributes two mirrored points: the winner's probability labeled as a
/// win, and its complement labeled as a loss. Buckets are returned from most
/// to least confident; empty buckets are dropped.
pub fn calibration_buckets(
    analyses: &[MatchAnalysis],
    num_buckets: usize,
) -> Vec<CalibrationBucket> {
    let bucket_size = 0.5 / num_buckets as f64;
    let mut data_points = Vec::with_capacity(2 * analyses.len());
    for analysis in analyses {
        data_points.push((analysis.expected_win_probability, true));
        data_points.push((1. - analysis.expected_win_probability, false));
    }

    let mut buckets = Vec::new();
    for i in (0..num_buckets).rev() {
        let min_prob = 0.5 + i as f64 * bucket_size;
        let max_prob = 0.5 + (i + 1) as f64 * bucket_size;
        let in_bucket = |&&(p, _): &&(f64, bool)| {
            (p >= min_prob && p < max_prob) || (i + 1 == num_buckets && p == 1.)
        };

        let count = data_points.iter().filter(in_bucket).count();
        if count == 0 {
            continue;
        }
        let predicted: f64 = data_points.iter().filter(in_bucket).map(|&(p, _)| p).sum();
        let wins = data_points.iter().filter(in_bucket).filter(|&&(_, won)| won).count();
        buckets.push(CalibrationBucket {
            min_prob,
            max_prob,
            predicted_win_rate: predicted / count as f64,
            observed_win_rate: wins as f64 / count as f64,
            count,
        });
    }
    buckets
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Two-sided Wilson score interval around an observed win count, expressed
/// in wins rather than proportions. The z-score is fixed per nominal
/// confidence level: 1.645 at 90%, 2.576 at 99%, 1.96 otherwise.
pub fn wilson_interval(wins: f64, trials: u32, confidence: f64) -> ConfidenceInterval {
    if trials == 0 {
        return ConfidenceInterval { lower: 0., upper: 0. };
    }
    let z = if confidence == 0.90 {
        1.645
    } else if confidence == 0.99 {
        2.576
    } else {
        1.96
    };

    let n = trials as f64;
    let proportion = wins / n;
    let denominator = 1. + z * z / n;
    let center = (proportion + z * z / (2. * n)) / denominator;
    let margin = (z / denominator)
        * (proportion * (1. - proportion) / n + z * z / (4. * n * n)).sqrt();

    ConfidenceInterval {
        lower: (center - margin).max(0.) * n,
        upper: (center + margin).min(1.) * n,
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerCalibration {
    pub player: PlayerName,
    pub expected_wins: f64,
    pub actual_wins: u32,
    pub total_matches: u32,
    pub ci90: ConfidenceInterval,
    pub ci99: ConfidenceInterval,
}

/// Credits each winner with the predicted probability in expected wins and
/// one actual win, each loser with the complement and none, then reports
/// Wilson bounds per player. Players with small samples are filtered out.
pub fn player_calibration(analyses: &[MatchAnalysis]) -> Vec<PlayerCalibration> {
    let mut tallies: BTreeMap<&PlayerName, (f64, u32, u32)> = BTreeMap::new();
    for analysis in analyses {
        let p = analysis.expected_win_probability;
        for player in &analysis.win_team {
            let tally = tallies.entry(player).or_insert((0., 0, 0));
            tally.0 += p;
            tally.1 += 1;
            tally.2 += 1;
        }
        for player in &analysis.lose_team {
            let tally = tallies.entry(player).or_insert((0., 0, 0));
            tally.0 += 1. - p;
            tally.2 += 1;
        }
    }

    tallies
        .into_iter()
        .filter(|&(_, (_, _, total))| total >= MIN_CALIBRATION_MATCHES)
        .map(|(player, (expected_wins, actual_wins, total_matches))| PlayerCalibration {
            player: player.clone(),
            expected_wins,
            actual_wins,
            total_matches,
            ci90: wilson_interval(actual_wins as f64, total_matches, 0.90),
            ci99: wilson_interval(actual_wins as f64, total_matches, 0.99),
        })
        .collect()
}
