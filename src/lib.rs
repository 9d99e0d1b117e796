//! Elo-style skill estimation for fixed 2v2 matches, with a pairwise
//! "chemistry" adjustment per teammate pair, seed injection for players with
//! externally known skill, and calibration diagnostics over the full audit
//! trail of processed matches.

pub mod analytics;
pub mod data_processing;
pub mod engine;
pub mod matchup;
pub mod models;
pub mod numerical;
pub mod replay;
pub mod summary;
