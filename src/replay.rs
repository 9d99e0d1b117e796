use crate::data_processing::read_matches;
use crate::engine::{EngineConfig, Match, MatchAnalysis, RatingEngine};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct ReplayConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    pub matches_source: String,
    pub output_dir: Option<String>,
}

impl ReplayConfig {
    pub fn from_file(source: impl AsRef<Path>) -> Self {
        // json5 tolerates comments and trailing commas in hand-edited configs
        let raw = std::fs::read_to_string(source).expect("Failed to read replay config file");
        json5::from_str(&raw).expect("Failed to parse replay config as JSON")
    }
}

pub struct Replay {
    pub engine: RatingEngine,
    pub matches: Vec<Match>,
    pub output_dir: Option<String>,
}

pub struct ReplayResults {
    pub engine: RatingEngine,
    pub analyses: Vec<MatchAnalysis>,
    pub secs_elapsed: f64,
}

impl Replay {
    pub fn from_config(config: ReplayConfig) -> Self {
        tracing::info!("Loading replay:\n{:?}", config);
        let engine = RatingEngine::new(config.engine).expect("Invalid engine configuration");
        let matches = read_matches(&config.matches_source).expect("Failed to load match records");
        Self {
            engine,
            matches,
            output_dir: config.output_dir,
        }
    }

    /// Feeds the match list through the engine in order. Malformed records
    /// are logged and skipped; the engine state they would have touched is
    /// left intact.
    pub fn run(mut self) -> ReplayResults {
        let now = std::time::Instant::now();
        let mut analyses = Vec::with_capacity(self.matches.len());
        for (index, game) in self.matches.iter().enumerate() {
            match self.engine.analyze_match(game) {
                Ok(analysis) => analyses.push(analysis),
                Err(err) => tracing::warn!("Skipping match {}: {}", index, err),
            }
        }
        let secs_elapsed = now.elapsed().as_nanos() as f64 * 1e-9;

        ReplayResults {
            engine: self.engine,
            analyses,
            secs_elapsed,
        }
    }
}
