//! Request and record-file loading.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Error type for request loading.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("failed to read file: {0}")]
    ReadFile(#[from] io::Error),
    #[error("failed to parse YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("failed to parse JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("failed to parse file (tried YAML and JSON)")]
    ParseFailed,
    #[error("line {line}: {source}")]
    ParseLine {
        line: usize,
        source: serde_json::Error,
    },
    #[error("duplicate record index {0}")]
    DuplicateIndex(u64),
}

/// One text to embed, keyed by a caller-chosen identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub index: u64,
    pub text: String,
}

/// Loads a request from a YAML or JSON file into the provided type.
pub fn load_request<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, RequestError> {
    let data = fs::read(path.as_ref())?;
    parse_request(&data, path.as_ref())
}

/// Parses request data based on file extension or content.
pub fn parse_request<T: DeserializeOwned>(
    data: &[u8],
    path: impl AsRef<Path>,
) -> Result<T, RequestError> {
    match extension(path.as_ref()).as_deref() {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_slice(data)?),
        Some("json") => Ok(serde_json::from_slice(data)?),
        _ => {
            // Try YAML first, then JSON
            if let Ok(v) = serde_yaml::from_slice(data) {
                return Ok(v);
            }
            if let Ok(v) = serde_json::from_slice(data) {
                return Ok(v);
            }
            Err(RequestError::ParseFailed)
        }
    }
}

/// Loads embedding input records.
///
/// `.jsonl` files hold one record per line (blank lines skipped); other
/// files hold a JSON or YAML list of records. Indices must be unique.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>, RequestError> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    let records = match extension(path).as_deref() {
        Some("jsonl") | Some("ndjson") => parse_json_lines(&String::from_utf8_lossy(&data))?,
        _ => parse_request(&data, path)?,
    };
    check_unique(&records)?;
    Ok(records)
}

fn parse_json_lines(text: &str) -> Result<Vec<Record>, RequestError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|source| RequestError::ParseLine {
                line: n + 1,
                source,
            })
        })
        .collect()
}

fn check_unique(records: &[Record]) -> Result<(), RequestError> {
    let mut seen = HashSet::with_capacity(records.len());
    for r in records {
        if !seen.insert(r.index) {
            return Err(RequestError::DuplicateIndex(r.index));
        }
    }
    Ok(())
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}
