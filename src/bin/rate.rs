use pair_skill::analytics::{calibration_buckets, player_calibration};
use pair_skill::data_processing::{read_matches, write_slice_to_file};
use pair_skill::engine::{EngineConfig, RatingEngine};
use pair_skill::replay::{Replay, ReplayConfig, ReplayResults};
use pair_skill::summary::{log_ratings, print_ratings};

fn get_replay_from_args(args: &[String]) -> Replay {
    let model = &args[1];
    let source = &args[2];

    if model == "file:" {
        Replay::from_config(ReplayConfig::from_file(source))
    } else {
        let config = EngineConfig {
            model: model.clone(),
            ..EngineConfig::default()
        };
        let engine = RatingEngine::new(config).unwrap();
        let mut matches = read_matches(source).unwrap();
        if let Some(num_matches) = args.get(3).and_then(|s| s.parse().ok()) {
            matches.truncate(num_matches);
        }

        Replay {
            engine,
            matches,
            output_dir: None,
        }
    }
}

/// Replays a full match history and reports ratings plus calibration.
fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 && args.len() != 4 {
        tracing::error!(
            "Usage: {} model_name matches_file [num_matches], or {} file: config_file",
            args[0],
            args[0]
        );
        return;
    }
    let replay = get_replay_from_args(&args);
    let output_dir = replay.output_dir.clone();

    let ReplayResults {
        engine,
        analyses,
        secs_elapsed,
    } = replay.run();
    tracing::info!(
        "Processed {} matches in {} seconds.",
        analyses.len(),
        secs_elapsed
    );

    for bucket in calibration_buckets(&analyses, 10) {
        tracing::info!(
            "p in [{:.2}, {:.2}): predicted {:.3} observed {:.3} over {} outcomes",
            bucket.min_prob,
            bucket.max_prob,
            bucket.predicted_win_rate,
            bucket.observed_win_rate,
            bucket.count
        );
    }
    for stats in player_calibration(&analyses) {
        tracing::info!(
            "{}: {:.1} expected vs {} actual wins in {} matches, 90% CI [{:.1}, {:.1}]",
            stats.player,
            stats.expected_wins,
            stats.actual_wins,
            stats.total_matches,
            stats.ci90.lower,
            stats.ci90.upper
        );
    }

    if let Some(dir) = output_dir {
        let dir = std::path::PathBuf::from(dir);
        std::fs::create_dir_all(&dir).expect("Could not create output directory");
        write_slice_to_file(&analyses, dir.join("match_analyses.json"));
        print_ratings(&engine, &dir);
    } else {
        log_ratings(&engine);
    }
}
