use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use eyre::{Result, WrapErr, bail};
use log::debug;
use serde::Serialize;

/// UTF-8 byte-order mark, expected by spreadsheet apps on the output side
/// and tolerated on the input side.
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read one column from a CSV file, dropping empty cells and deduplicating
/// while preserving first-occurrence order. Errors if the column is absent.
pub fn read_column(path: &Path, column: &str) -> Result<Vec<String>> {
    let file = File::open(path).wrap_err_with(|| format!("opening {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    let index = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == column);
    let Some(index) = index else {
        bail!("input file must contain a '{column}' column");
    };

    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(value) = record.get(index) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if seen.insert(value.to_string()) {
            values.push(value.to_string());
        }
    }

    debug!("read {} unique '{column}' values from {}", values.len(), path.display());
    Ok(values)
}

/// Write rows as UTF-8-with-BOM CSV. The header row is always written, so
/// an empty run still produces a header-only file.
pub fn write_rows<S: Serialize>(path: &Path, headers: &[&str], rows: &[S]) -> Result<()> {
    let mut file = File::create(path).wrap_err_with(|| format!("creating {}", path.display()))?;
    file.write_all(BOM)?;

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    debug!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Timestamped output filename in the working directory, e.g.
/// `video_stats_20260827_153000.csv`.
pub fn timestamped_path(prefix: &str) -> PathBuf {
    PathBuf::from(format!("{prefix}_{}.csv", Local::now().format("%Y%m%d_%H%M%S")))
}
