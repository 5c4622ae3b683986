//! Structural repair of truncated source files
//!
//! Recorder crashes leave some session files missing their final closing
//! brace. The repair pass appends one when absent and retries the parse.
//! This is lossy best-effort recovery, not validation: a file that still
//! fails to parse is dropped from the corpus without error.

use crate::error::PipelineError;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Read a session file, repairing a missing trailing `}` before parsing.
///
/// Returns `Ok(None)` when the file cannot be parsed as a JSON object even
/// after repair. Only I/O failure propagates.
pub fn read_repaired(path: &Path) -> Result<Option<Map<String, Value>>, PipelineError> {
    let text = fs::read_to_string(path)?;
    Ok(parse_repaired(&text))
}

/// Parse session-file text, appending a closing brace when the trimmed
/// text does not already end with one.
pub fn parse_repaired(text: &str) -> Option<Map<String, Value>> {
    let trimmed = text.trim_end();
    let candidate: std::borrow::Cow<'_, str> = if trimmed.ends_with('}') {
        trimmed.into()
    } else {
        format!("{trimmed}}}").into()
    };

    match serde_json::from_str::<Value>(&candidate) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) | Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_passes_through() {
        let map = parse_repaired(r#"{"2024-04-01 10:00:00": []}"#).unwrap();
        assert!(map.contains_key("2024-04-01 10:00:00"));
    }

    #[test]
    fn test_missing_brace_is_appended() {
        let map = parse_repaired(r#"{"2024-04-01 10:00:00": [{"t1": 1, "t2": 2}]"#).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_trailing_whitespace_before_repair() {
        let map = parse_repaired("{\"2024-04-01 10:00:00\": []\n  \n").unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_unrecoverable_garbage_is_dropped() {
        assert!(parse_repaired("not json at all").is_none());
        assert!(parse_repaired(r#"{"a": ["#).is_none());
    }

    #[test]
    fn test_non_object_top_level_is_dropped() {
        assert!(parse_repaired("[1, 2, 3]").is_none());
        assert!(parse_repaired("42").is_none());
    }
}
