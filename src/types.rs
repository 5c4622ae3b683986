//! Core types for the blink pipeline
//!
//! This module defines the data structures that flow through each stage of
//! the pipeline: raw blink events, normalized per-event records, the corpus
//! table, and the structured diagnostics channel.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Timestamp-key format used by the recording software for session groups
pub const SESSION_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One raw blink as parsed from a source file, before normalization.
///
/// Ephemeral: constructed during one file's parse and consumed by the
/// normalizer. `t2 >= t1` is intended by the recording software but not
/// validated here.
#[derive(Debug, Clone, PartialEq)]
pub struct BlinkEvent {
    /// Subject identifier, derived from the source file name
    pub subject_id: String,
    /// Wall-clock start of the recording session this blink belongs to
    pub session_start: NaiveDateTime,
    /// Blink onset (ms since epoch)
    pub t1: i64,
    /// Blink offset (ms since epoch)
    pub t2: i64,
}

/// One normalized blink with derived temporal features.
///
/// The durable output unit of the pipeline: immutable once emitted,
/// consumers read columns only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBlinkRecord {
    /// Subject identifier
    pub subject_id: String,
    /// Session start (ms since epoch)
    pub session_epoch_ms: i64,
    /// Session start rendered as `YYYY-MM-DD HH:MM:SS`
    pub session_label: String,
    /// Blink onset (ms since epoch)
    pub t1: i64,
    /// Blink offset (ms since epoch)
    pub t2: i64,
    /// `(t2 - t1) / 1000`
    pub blink_duration_seconds: f64,
    /// Gap between this blink's onset and the previous retained blink's
    /// offset, in seconds. `None` for the first retained blink of a subject.
    pub interblink_duration_seconds: Option<f64>,
    /// Reciprocal of the inter-blink gap. `None` when the gap is undefined
    /// or zero-length (never ±inf).
    pub blink_rate: Option<f64>,
}

/// Reason a blink sub-record was skipped during parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "field")]
pub enum DiagnosticReason {
    /// Required field absent from the sub-record
    MissingField(String),
    /// Field present but not coercible to an integer timestamp
    InvalidField(String),
    /// Sub-record is not a JSON object
    NotAnObject,
}

impl DiagnosticReason {
    pub fn describe(&self) -> String {
        match self {
            DiagnosticReason::MissingField(f) => format!("missing required field `{f}`"),
            DiagnosticReason::InvalidField(f) => format!("field `{f}` is not integer-coercible"),
            DiagnosticReason::NotAnObject => "blink entry is not a JSON object".to_string(),
        }
    }
}

/// One skipped sub-record, surfaced to the operator alongside results
/// rather than printed to the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Source file the sub-record came from
    pub file: PathBuf,
    /// Timestamp key the sub-record was listed under
    pub timestamp_key: String,
    /// Index of the sub-record within its timestamp key's list
    pub record_index: usize,
    /// Why it was skipped
    pub reason: DiagnosticReason,
}

/// The corpus-wide table of normalized blink records.
///
/// Rows are ordered by subject (lexical first-seen order) and ascending
/// onset within each subject. Consumers get column-wise read-only access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusTable {
    records: Vec<NormalizedBlinkRecord>,
}

impl CorpusTable {
    pub fn new(records: Vec<NormalizedBlinkRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[NormalizedBlinkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Subject id column
    pub fn subject_ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.subject_id.as_str())
    }

    /// Blink duration column (seconds)
    pub fn blink_durations(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.blink_duration_seconds)
    }

    /// Inter-blink gap column (seconds, `None` at subject starts)
    pub fn interblink_durations(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.records.iter().map(|r| r.interblink_duration_seconds)
    }

    /// Instantaneous blink rate column
    pub fn blink_rates(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.records.iter().map(|r| r.blink_rate)
    }
}
