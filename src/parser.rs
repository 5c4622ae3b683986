//! Event extraction from session files
//!
//! A session file is a JSON object mapping a timestamp key (or a
//! non-data placeholder the recorder injects) to a list of blink
//! sub-records. This module filters the keys, coerces the per-blink
//! timestamps, and emits raw [`BlinkEvent`]s in parse order. Ordering and
//! feature derivation are the normalizer's job.

use crate::types::{BlinkEvent, Diagnostic, DiagnosticReason, SESSION_TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::warn;

/// Placeholder keys the recorder writes between sessions; never blink data.
const PLACEHOLDER_PREFIX: &str = "Prompt";
const PLACEHOLDER_BREAKTIME: &str = "Breaktime";

/// Derive the subject id from a session file name: the stem token before
/// the first underscore (the whole stem when there is none).
pub fn subject_id_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.split_once('_') {
        Some((subject, _)) => subject.to_string(),
        None => stem,
    }
}

/// Parse one session file's JSON object into raw blink events.
///
/// Rejected timestamp keys (placeholders or keys that do not parse as
/// `YYYY-MM-DD HH:MM:SS`) are skipped silently with their whole list.
/// A sub-record with a missing or non-coercible `t1`/`t2` is skipped
/// individually and reported as a [`Diagnostic`]; its siblings are still
/// processed. Output order is source order.
pub fn parse_file_events(
    path: &Path,
    object: &Map<String, Value>,
) -> (Vec<BlinkEvent>, Vec<Diagnostic>) {
    let subject_id = subject_id_from_path(path);
    let mut events = Vec::new();
    let mut diagnostics = Vec::new();

    for (key, value) in object {
        let session_start = match accept_timestamp_key(key) {
            Some(ts) => ts,
            None => continue,
        };

        let Some(entries) = value.as_array() else {
            continue;
        };

        for (index, entry) in entries.iter().enumerate() {
            match extract_blink(entry) {
                Ok((t1, t2)) => events.push(BlinkEvent {
                    subject_id: subject_id.clone(),
                    session_start,
                    t1,
                    t2,
                }),
                Err(reason) => {
                    warn!(
                        file = %path.display(),
                        key = %key,
                        index,
                        "skipping blink record: {}",
                        reason.describe()
                    );
                    diagnostics.push(Diagnostic {
                        file: path.to_path_buf(),
                        timestamp_key: key.clone(),
                        record_index: index,
                        reason,
                    });
                }
            }
        }
    }

    (events, diagnostics)
}

/// Accept a timestamp key only if it is not a placeholder and parses as a
/// `YYYY-MM-DD HH:MM:SS` literal.
fn accept_timestamp_key(key: &str) -> Option<NaiveDateTime> {
    if key.starts_with(PLACEHOLDER_PREFIX) || key == PLACEHOLDER_BREAKTIME {
        return None;
    }
    NaiveDateTime::parse_from_str(key, SESSION_TIMESTAMP_FORMAT).ok()
}

fn extract_blink(entry: &Value) -> Result<(i64, i64), DiagnosticReason> {
    let object = entry.as_object().ok_or(DiagnosticReason::NotAnObject)?;
    let t1 = coerce_field(object, "t1")?;
    let t2 = coerce_field(object, "t2")?;
    Ok((t1, t2))
}

fn coerce_field(object: &Map<String, Value>, field: &str) -> Result<i64, DiagnosticReason> {
    let value = object
        .get(field)
        .ok_or_else(|| DiagnosticReason::MissingField(field.to_string()))?;
    coerce_to_millis(value).ok_or_else(|| DiagnosticReason::InvalidField(field.to_string()))
}

/// Lenient integer coercion: JSON integers, finite floats (truncated
/// toward zero), and strings parsing as i64.
fn coerce_to_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
