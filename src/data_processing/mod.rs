use crate::engine::{Match, PlayerName};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One row of a spreadsheet-style match export.
#[derive(Serialize, Deserialize)]
struct MatchRecord {
    winner1: String,
    winner2: String,
    loser1: String,
    loser2: String,
}

impl From<MatchRecord> for Match {
    fn from(record: MatchRecord) -> Self {
        let name = |raw: &str| PlayerName::new(raw.trim());
        Match {
            winner: vec![name(&record.winner1), name(&record.winner2)],
            loser: vec![name(&record.loser1), name(&record.loser2)],
        }
    }
}

pub fn read_matches_json(path: impl AsRef<Path>) -> Result<Vec<Match>, String> {
    let raw = std::fs::read_to_string(path.as_ref())
        .map_err(|err| format!("Failed to read {:?}: {}", path.as_ref(), err))?;
    serde_json::from_str(&raw)
        .map_err(|err| format!("Failed to parse {:?} as a match list: {}", path.as_ref(), err))
}

pub fn read_matches_csv(path: impl AsRef<Path>) -> Result<Vec<Match>, String> {
    let mut reader = csv::Reader::from_path(path.as_ref())
        .map_err(|err| format!("Failed to open {:?}: {}", path.as_ref(), err))?;
    reader
        .deserialize()
        .map(|row| {
            row.map(|record: MatchRecord| record.into())
                .map_err(|err| format!("Bad row in {:?}: {}", path.as_ref(), err))
        })
        .collect()
}

/// Reads a chronologically ordered match list, dispatching on the file
/// extension.
pub fn read_matches(path: impl AsRef<Path>) -> Result<Vec<Match>, String> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => read_matches_json(path),
        Some("csv") => read_matches_csv(path),
        _ => Err(format!("{:?}: invalid or missing filename extension", path)),
    }
}

fn write_to_json<T: Serialize + ?Sized>(
    value: &T,
    path: impl AsRef<Path>,
) -> Result<(), &'static str> {
    let rendered = serde_json::to_string_pretty(&value).map_err(|_| "Serialization error")?;
    std::fs::write(path.as_ref(), rendered).map_err(|_| "File writing error")
}

fn write_to_csv<T: Serialize>(values: &[T], path: impl AsRef<Path>) -> Result<(), &'static str> {
    let file = std::fs::File::create(path.as_ref()).map_err(|_| "Output file not found")?;
    let mut writer = csv::Writer::from_writer(file);
    values
        .iter()
        .try_for_each(|val| writer.serialize(val))
        .map_err(|_| "Failed to serialize row")
}

pub fn write_slice_to_file<T: Serialize>(values: &[T], path: impl AsRef<Path>) {
    let path = path.as_ref();
    let write_res = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => write_to_json(values, path),
        Some("csv") => write_to_csv(values, path),
        _ => Err("Invalid or missing filename extension"),
    };
    match write_res {
        Ok(()) => tracing::info!("Wrote {} rows to {:?}", values.len(), path),
        Err(msg) => tracing::error!("Failed write to {:?}: {}", path, msg),
    };
}
