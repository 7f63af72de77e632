//! JSON-lines replay input.
//!
//! One `{"channel": ..., "value": ..., "timestamp": ...}` object per line.
//! Blank lines and lines starting with `#` are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use contracts::DatapointRecord;
use tracing::debug;

use crate::error::{IngestionError, Result};

/// Read every record of a replay file.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<DatapointRecord>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let records = parse_records(BufReader::new(file))?;
    debug!(path = %path.display(), records = records.len(), "replay file loaded");
    Ok(records)
}

/// Parse records from any buffered reader.
pub fn parse_records(reader: impl BufRead) -> Result<Vec<DatapointRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record = serde_json::from_str(trimmed).map_err(|e| IngestionError::Parse {
            line: index + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}
