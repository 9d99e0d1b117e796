use super::types::{AdjustmentEvent, PlayerName};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

fn initial_rating_default() -> f64 {
    500.
}

fn high_k_default() -> f64 {
    40.
}

fn normal_k_default() -> f64 {
    20.
}

fn high_k_match_count_default() -> u32 {
    10
}

fn redistribution_threshold_default() -> u32 {
    10
}

/// Tuning knobs for the per-player store. The seed table maps lowercased
/// names to starting ratings and is consulted only the first time a name is
/// seen.
#[derive(Clone, Debug, Deserialize)]
pub struct PlayerStateConfig {
    #[serde(default = "initial_rating_default")]
    pub initial_rating: f64,
    #[serde(default = "high_k_default")]
    pub high_k: f64,
    #[serde(default = "normal_k_default")]
    pub normal_k: f64,
    #[serde(default = "high_k_match_count_default")]
    pub high_k_match_count: u32,
    #[serde(default = "redistribution_threshold_default")]
    pub redistribution_threshold: u32,
    #[serde(default)]
    pub seeds: HashMap<String, f64>,
}

impl Default for PlayerStateConfig {
    fn default() -> Self {
        Self {
            initial_rating: initial_rating_default(),
            high_k: high_k_default(),
            normal_k: normal_k_default(),
            high_k_match_count: high_k_match_count_default(),
            redistribution_threshold: redistribution_threshold_default(),
            seeds: HashMap::new(),
        }
    }
}

impl PlayerStateConfig {
    fn seed_for(&self, player: &PlayerName) -> Option<f64> {
        self.seeds.get(&player.seed_key()).copied()
    }
}

/// Owns every player's current rating and cumulative match count.
#[derive(Clone, Debug)]
pub struct PlayerRatings {
    ratings: HashMap<PlayerName, f64>,
    match_counts: HashMap<PlayerName, u32>,
    config: PlayerStateConfig,
}

impl PlayerRatings {
    pub fn new(mut config: PlayerStateConfig) -> Self {
        config.seeds = std::mem::take(&mut config.seeds)
            .into_iter()
            .map(|(name, seed)| (name.to_lowercase(), seed))
            .collect();
        Self {
            ratings: HashMap::new(),
            match_counts: HashMap::new(),
            config,
        }
    }

    pub fn rating(&self, player: &PlayerName) -> f64 {
        self.ratings
            .get(player)
            .copied()
            .unwrap_or(self.config.initial_rating)
    }

    pub fn match_count(&self, player: &PlayerName) -> u32 {
        self.match_counts.get(player).copied().unwrap_or(0)
    }

    /// Seeded players are assumed already calibrated and never get the high
    /// K grace period.
    pub fn k_factor(&self, player: &PlayerName) -> f64 {
        if self.config.seed_for(player).is_some() {
            return self.config.normal_k;
        }
        if self.match_count(player) < self.config.high_k_match_count {
            self.config.high_k
        } else {
            self.config.normal_k
        }
    }

    pub fn apply_delta(&mut self, player: &PlayerName, delta: f64) {
        let rating = self
            .ratings
            .entry(player.clone())
            .or_insert(self.config.initial_rating);
        *rating += delta;
    }

    pub fn increment_match_count(&mut self, player: &PlayerName) {
        *self.match_counts.entry(player.clone()).or_insert(0) += 1;
    }

    /// Called once per match, before any rating math, with all four
    /// participants. Injects seed ratings for first appearances and
    /// redistributes the displaced rating mass evenly across established
    /// players, so the total rating supply is conserved.
    pub fn before_match_hook(
        &mut self,
        participants: impl IntoIterator<Item = PlayerName>,
    ) -> Option<AdjustmentEvent> {
        let mut total_adjustment = 0.;
        let mut adjusted_players = BTreeSet::new();
        for player in participants {
            if self.ratings.contains_key(&player) {
                continue;
            }
            tracing::debug!("New player detected: {}", player);
            let Some(seed) = self.config.seed_for(&player) else {
                continue;
            };

            let recipients = self.redistribution_eligible();
            let shift = self.config.initial_rating - seed;
            if recipients.is_empty() {
                tracing::warn!(
                    "Seeding new player {} at {} with nobody eligible to absorb {:.2}",
                    player,
                    seed,
                    shift
                );
            } else {
                let share = shift / recipients.len() as f64;
                for recipient in &recipients {
                    if let Some(rating) = self.ratings.get_mut(recipient) {
                        *rating += share;
                    }
                }
                tracing::info!(
                    "Seeding new player {} at {}; redistributing {:.2} each to {} players",
                    player,
                    seed,
                    share,
                    recipients.len()
                );
                total_adjustment += shift;
                adjusted_players.extend(recipients);
            }
            self.ratings.insert(player, seed);
        }

        (total_adjustment != 0.).then_some(AdjustmentEvent {
            players: adjusted_players,
            adjustment: total_adjustment,
        })
    }

    fn redistribution_eligible(&self) -> Vec<PlayerName> {
        self.ratings
            .keys()
            .filter(|player| self.match_count(player) >= self.config.redistribution_threshold)
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerName, f64)> {
        self.ratings.iter().map(|(player, &rating)| (player, rating))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config_with_seeds(seeds: &[(&str, f64)]) -> PlayerStateConfig {
        PlayerStateConfig {
            redistribution_threshold: 3,
            seeds: seeds.iter().map(|&(name, elo)| (name.into(), elo)).collect(),
            ..PlayerStateConfig::default()
        }
    }

    fn established_player(state: &mut PlayerRatings, name: &str, matches: u32) -> PlayerName {
        let player = PlayerName::new(name);
        state.apply_delta(&player, 0.);
        for _ in 0..matches {
            state.increment_match_count(&player);
        }
        player
    }

    #[test]
    fn test_unknown_players_get_defaults() {
        let state = PlayerRatings::new(PlayerStateConfig::default());
        let nobody = PlayerName::new("Nobody");
        assert_eq!(state.rating(&nobody), 500.);
        assert_eq!(state.match_count(&nobody), 0);
    }

    #[test]
    fn test_k_factor_schedule() {
        let mut state = PlayerRatings::new(PlayerStateConfig {
            high_k: 40.,
            normal_k: 20.,
            high_k_match_count: 2,
            ..PlayerStateConfig::default()
        });
        let rookie = PlayerName::new("Rookie");
        assert_eq!(state.k_factor(&rookie), 40.);
        state.increment_match_count(&rookie);
        state.increment_match_count(&rookie);
        assert_eq!(state.k_factor(&rookie), 20.);
    }

    #[test]
    fn test_seeded_players_skip_high_k() {
        let state = PlayerRatings::new(config_with_seeds(&[("katie", 160.)]));
        assert_eq!(state.k_factor(&PlayerName::new("Katie")), 20.);
        assert_eq!(state.k_factor(&PlayerName::new("Stranger")), 40.);
    }

    #[test]
    fn test_seed_injection_conserves_rating_mass() {
        let mut state = PlayerRatings::new(config_with_seeds(&[("katie", 160.)]));
        let veterans: Vec<PlayerName> = ["Axel", "Lesha", "Simon"]
            .iter()
            .map(|name| established_player(&mut state, name, 5))
            .collect();

        let katie = PlayerName::new("Katie");
        let event = state
            .before_match_hook([katie.clone(), veterans[0].clone()])
            .unwrap();

        assert_eq!(state.rating(&katie), 160.);
        assert_eq!(event.adjustment, 340.);
        assert_eq!(event.players.len(), 3);
        let gained: f64 = veterans.iter().map(|p| state.rating(p) - 500.).sum();
        assert!((gained - 340.).abs() < 1e-9);
        for veteran in &veterans {
            assert!((state.rating(veteran) - 500. - 340. / 3.).abs() < 1e-9);
        }
    }

    #[test]
    fn test_seed_applies_only_on_first_appearance() {
        let mut state = PlayerRatings::new(config_with_seeds(&[("katie", 160.)]));
        let katie = PlayerName::new("Katie");
        // Nobody is eligible to absorb the shift yet, so no event is emitted,
        // but the seed itself still applies.
        assert!(state.before_match_hook([katie.clone()]).is_none());
        assert_eq!(state.rating(&katie), 160.);
        state.apply_delta(&katie, 100.);
        // Already tracked now, so a second hook must not reset her
        assert!(state.before_match_hook([katie.clone()]).is_none());
        assert_eq!(state.rating(&katie), 260.);
    }

    #[test]
    fn test_players_below_threshold_do_not_absorb() {
        let mut state = PlayerRatings::new(config_with_seeds(&[("katie", 160.)]));
        let veteran = established_player(&mut state, "Axel", 5);
        let rookie = established_player(&mut state, "Newbie", 1);

        let event = state.before_match_hook([PlayerName::new("Katie")]).unwrap();
        assert_eq!(event.players.len(), 1);
        assert!((state.rating(&veteran) - 840.).abs() < 1e-9);
        assert_eq!(state.rating(&rookie), 500.);
    }

    #[test]
    fn test_above_average_seed_donates_mass() {
        let mut state = PlayerRatings::new(config_with_seeds(&[("ace", 900.)]));
        let veteran = established_player(&mut state, "Axel", 5);

        let event = state.before_match_hook([PlayerName::new("Ace")]).unwrap();
        assert_eq!(event.adjustment, -400.);
        assert!((state.rating(&veteran) - 100.).abs() < 1e-9);
    }

    #[test]
    fn test_unseeded_newcomer_triggers_no_event() {
        let mut state = PlayerRatings::new(config_with_seeds(&[("katie", 160.)]));
        established_player(&mut state, "Axel", 5);
        assert!(state.before_match_hook([PlayerName::new("Wanderer")]).is_none());
    }

    #[test]
    fn test_multiple_injections_accumulate_into_one_event() {
        let mut state =
            PlayerRatings::new(config_with_seeds(&[("katie", 160.), ("maya", 300.)]));
        established_player(&mut state, "Axel", 5);
        established_player(&mut state, "Lesha", 5);

        let event = state
            .before_match_hook([PlayerName::new("Katie"), PlayerName::new("Maya")])
            .unwrap();
        assert_eq!(event.adjustment, 340. + 200.);
        assert_eq!(event.players.len(), 2);
    }
}
