mod changes;
mod pair_state;
mod player_state;
mod types;

pub use changes::{RatingChanges, calculate_changes};
pub use pair_state::PairRatings;
pub use player_state::{PlayerRatings, PlayerStateConfig};
pub use types::{AdjustmentEvent, EngineError, Match, MatchAnalysis, PairKey, PlayerName};

use crate::models::{WinProbabilityModel, get_model_by_name};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

fn pairwise_factor_default() -> f64 {
    0.5
}

fn model_default() -> String {
    "logistic".to_string()
}

/// Full engine configuration. All knobs are explicit so an engine carries no
/// process-wide state and can be reconstructed bit-identically for replay.
#[derive(Clone, Debug, Deserialize)]
pub struct EngineConfig {
    #[serde(flatten)]
    pub players: PlayerStateConfig,
    #[serde(default = "pairwise_factor_default")]
    pub pairwise_factor: f64,
    #[serde(default = "model_default")]
    pub model: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            players: PlayerStateConfig::default(),
            pairwise_factor: pairwise_factor_default(),
            model: model_default(),
        }
    }
}

impl EngineConfig {
    /// The pre-pairwise, pre-seed configuration this system originally ran
    /// with: everyone starts at 1000 and shares a flat K of 32.
    pub fn legacy() -> Self {
        Self {
            players: PlayerStateConfig {
                initial_rating: 1000.,
                high_k: 32.,
                normal_k: 32.,
                high_k_match_count: 0,
                redistribution_threshold: 0,
                seeds: HashMap::new(),
            },
            pairwise_factor: 0.,
            model: model_default(),
        }
    }

    pub fn with_seeds(mut self, seeds: &[(&str, f64)]) -> Self {
        self.players.seeds = seeds.iter().map(|&(name, elo)| (name.into(), elo)).collect();
        self
    }
}

/// Sequential rating engine for a chronologically ordered 2v2 match stream.
/// Exclusively owns its player and pair stores; ratings after match N+1
/// depend on the state left behind by match N.
pub struct RatingEngine {
    players: PlayerRatings,
    pairs: PairRatings,
    model: Box<dyn WinProbabilityModel + Send>,
    calibration_loss: f64,
    matches_processed: usize,
}

impl RatingEngine {
    pub fn new(config: EngineConfig) -> Result<Self, String> {
        let model = get_model_by_name(&config.model)?;
        Ok(Self {
            players: PlayerRatings::new(config.players),
            pairs: PairRatings::new(config.pairwise_factor),
            model,
            calibration_loss: 0.,
            matches_processed: 0,
        })
    }

    pub fn rating(&self, player: &PlayerName) -> f64 {
        self.players.rating(player)
    }

    pub fn match_count(&self, player: &PlayerName) -> u32 {
        self.players.match_count(player)
    }

    pub fn pairwise_adjustment(&self, p1: &PlayerName, p2: &PlayerName) -> f64 {
        self.pairs.adjustment(p1, p2)
    }

    pub fn pair_match_count(&self, p1: &PlayerName, p2: &PlayerName) -> u32 {
        self.pairs.match_count(p1, p2)
    }

    pub fn combined_rating(&self, team: &[PlayerName]) -> f64 {
        team.iter().map(|p| self.players.rating(p)).sum()
    }

    /// A team's effective strength: the sum of individual ratings plus the
    /// pair's chemistry adjustment.
    pub fn combined_rating_with_chemistry(&self, p1: &PlayerName, p2: &PlayerName) -> f64 {
        self.players.rating(p1) + self.players.rating(p2) + self.pairs.adjustment(p1, p2)
    }

    pub fn win_probability(&self, rating_a: f64, rating_b: f64) -> f64 {
        self.model.win_probability(rating_a, rating_b)
    }

    /// Cumulative -ln(p) over every winner probability predicted so far.
    pub fn calibration_loss(&self) -> f64 {
        self.calibration_loss
    }

    /// Average cross-entropy per processed match; lower is better-calibrated.
    pub fn average_calibration_loss(&self) -> f64 {
        if self.matches_processed == 0 {
            0.
        } else {
            self.calibration_loss / self.matches_processed as f64
        }
    }

    pub fn matches_processed(&self) -> usize {
        self.matches_processed
    }

    pub fn players(&self) -> impl Iterator<Item = (&PlayerName, f64)> {
        self.players.iter()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&PairKey, f64)> {
        self.pairs.iter()
    }

    pub fn pair_match_count_by_key(&self, key: &PairKey) -> u32 {
        self.pairs.pair_match_count(key)
    }

    fn validate(game: &Match) -> Result<(), EngineError> {
        if game.winner.len() != 2 || game.loser.len() != 2 {
            return Err(EngineError::TeamSize {
                winners: game.winner.len(),
                losers: game.loser.len(),
            });
        }
        let all = [&game.winner[0], &game.winner[1], &game.loser[0], &game.loser[1]];
        for (i, player) in all.iter().enumerate() {
            if all[..i].contains(player) {
                return Err(EngineError::DuplicatePlayer((*player).clone()));
            }
        }
        Ok(())
    }

    /// Processes one match and returns its audit record. Validation happens
    /// strictly before any store mutation, so a rejected match leaves the
    /// engine untouched.
    pub fn analyze_match(&mut self, game: &Match) -> Result<MatchAnalysis, EngineError> {
        Self::validate(game)?;
        let (w0, w1) = (&game.winner[0], &game.winner[1]);
        let (l0, l1) = (&game.loser[0], &game.loser[1]);

        let adjustment = self
            .players
            .before_match_hook(game.winner.iter().chain(&game.loser).cloned());

        let winner_rating = self.combined_rating_with_chemistry(w0, w1);
        let loser_rating = self.combined_rating_with_chemistry(l0, l1);

        let winner_pair_k = self
            .pairs
            .combined_k_factor(self.players.k_factor(w0), self.players.k_factor(w1));
        let loser_pair_k = self
            .pairs
            .combined_k_factor(self.players.k_factor(l0), self.players.k_factor(l1));

        let changes = calculate_changes(
            &game.winner,
            &game.loser,
            winner_rating,
            loser_rating,
            |p| self.players.k_factor(p),
            winner_pair_k,
            loser_pair_k,
            self.model.as_ref(),
        );

        self.calibration_loss += -changes.expected_win_probability.ln();

        let before_elos: BTreeMap<PlayerName, f64> = game
            .winner
            .iter()
            .chain(&game.loser)
            .map(|p| (p.clone(), self.players.rating(p)))
            .collect();
        let mut before_pairwise = BTreeMap::new();
        before_pairwise.insert(PairKey::new(w0, w1), self.pairs.adjustment(w0, w1));
        before_pairwise.insert(PairKey::new(l0, l1), self.pairs.adjustment(l0, l1));

        for (player, &delta) in &changes.player_changes {
            self.players.apply_delta(player, delta);
            self.players.increment_match_count(player);
        }
        self.pairs.apply_delta(w0, w1, changes.winner_pairwise_change);
        self.pairs.apply_delta(l0, l1, changes.loser_pairwise_change);
        self.pairs.increment_match_count(w0, w1);
        self.pairs.increment_match_count(l0, l1);

        self.matches_processed += 1;

        Ok(MatchAnalysis {
            win_team: game.winner.clone(),
            lose_team: game.loser.clone(),
            expected_win_probability: changes.expected_win_probability,
            before_elos,
            before_pairwise,
            player_changes: changes.player_changes,
            winner_pairwise_change: changes.winner_pairwise_change,
            loser_pairwise_change: changes.loser_pairwise_change,
            adjustment,
        })
    }
}

/// Replays a chronological match list through a fresh engine, collecting the
/// audit record of every match. Validation errors propagate to the caller.
pub fn replay_matches(
    config: EngineConfig,
    matches: &[Match],
) -> Result<(RatingEngine, Vec<MatchAnalysis>), String> {
    let mut engine = RatingEngine::new(config)?;
    let mut analyses = Vec::with_capacity(matches.len());
    for game in matches {
        let analysis = engine
            .analyze_match(game)
            .map_err(|err| format!("match {}: {}", analyses.len(), err))?;
        analyses.push(analysis);
    }
    Ok((engine, analyses))
}
