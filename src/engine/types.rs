use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Opaque player identifier. Storage keys are case-sensitive; only the seed
/// table is matched case-insensitively, via [`PlayerName::seed_key`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn seed_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PlayerName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Canonical identifier for an unordered pair of teammates: the two names
/// joined in lexicographic order, so `PairKey::new(a, b) == PairKey::new(b, a)`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairKey(String);

impl PairKey {
    pub fn new(p1: &PlayerName, p2: &PlayerName) -> Self {
        if p1 <= p2 {
            Self(format!("{}:{}", p1, p2))
        } else {
            Self(format!("{}:{}", p2, p1))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One played 2v2 contest. Both teams must name exactly two distinct players
/// with no overlap between sides; `RatingEngine::analyze_match` rejects
/// anything else before touching any state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Match {
    pub winner: Vec<PlayerName>,
    pub loser: Vec<PlayerName>,
}

impl Match {
    pub fn new(winner: [&str; 2], loser: [&str; 2]) -> Self {
        Self {
            winner: winner.iter().map(|&name| PlayerName::new(name)).collect(),
            loser: loser.iter().map(|&name| PlayerName::new(name)).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum EngineError {
    #[error("each team must have exactly 2 players, got {winners} vs {losers}")]
    TeamSize { winners: usize, losers: usize },
    #[error("player {0} appears more than once in the match")]
    DuplicatePlayer(PlayerName),
}

/// Players whose ratings were shifted to absorb one or more seed injections,
/// with the total rating mass moved away from them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentEvent {
    pub players: BTreeSet<PlayerName>,
    pub adjustment: f64,
}

/// Immutable audit record for one processed match. Snapshots are taken after
/// the seed hook but before any deltas are applied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchAnalysis {
    pub win_team: Vec<PlayerName>,
    pub lose_team: Vec<PlayerName>,
    pub expected_win_probability: f64,
    pub before_elos: BTreeMap<PlayerName, f64>,
    pub before_pairwise: BTreeMap<PairKey, f64>,
    pub player_changes: BTreeMap<PlayerName, f64>,
    pub winner_pairwise_change: f64,
    pub loser_pairwise_change: f64,
    pub adjustment: Option<AdjustmentEvent>,
}
