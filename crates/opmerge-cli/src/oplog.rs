//! JSON-lines operation logs.
//!
//! Each non-blank line is one `{"op": "...", "payload": ...}` object.

use std::path::Path;

use serde_json::Value;

use opmerge_rules::Entry;

use crate::error::{InputError, InputResult};
use crate::rulebook::WILDCARD;

/// Parse an operation log, oldest line first.
pub fn parse(text: &str) -> InputResult<Vec<Entry<Value>>> {
    let mut entries = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let location = format!("line {}", index + 1);
        let entry: Entry<Value> = serde_json::from_str(line)
            .map_err(|e| InputError::invalid(location.as_str(), e.to_string()))?;
        if entry.op.as_str() == WILDCARD {
            return Err(InputError::invalid(
                location,
                "`*` is reserved for rule wildcards",
            ));
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// Read and parse an operation log file.
pub fn load(path: &Path) -> InputResult<Vec<Entry<Value>>> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}
