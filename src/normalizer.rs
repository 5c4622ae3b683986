//! Event normalization and temporal feature derivation
//!
//! This module turns the unordered raw events of one subject (or one file)
//! into the canonical record sequence:
//! - Duplicate onsets removed (first reading wins)
//! - Events sorted by subject, then onset
//! - Inter-blink gap and instantaneous rate derived in one sequential pass

use crate::types::{BlinkEvent, NormalizedBlinkRecord, SESSION_TIMESTAMP_FORMAT};
use std::collections::HashSet;

const MILLIS_PER_SECOND: f64 = 1000.0;

/// Normalizer for converting raw blink events to normalized records
pub struct Normalizer;

impl Normalizer {
    /// Normalize a batch of raw events.
    ///
    /// Deduplicates by `(subject_id, t1)` keeping the first occurrence in
    /// input order, sorts ascending by `(subject_id, t1)`, then derives
    /// features sequentially. An empty input yields an empty output.
    pub fn normalize(events: Vec<BlinkEvent>) -> Vec<NormalizedBlinkRecord> {
        let retained = dedup_by_onset(events);
        let sorted = sort_by_subject_and_onset(retained);
        derive_features(sorted)
    }
}

/// Keep the first event seen for each `(subject_id, t1)` pair. Duplicate
/// sensor readings share an onset; the first reading wins.
fn dedup_by_onset(events: Vec<BlinkEvent>) -> Vec<BlinkEvent> {
    let mut seen: HashSet<(String, i64)> = HashSet::with_capacity(events.len());
    events
        .into_iter()
        .filter(|event| seen.insert((event.subject_id.clone(), event.t1)))
        .collect()
}

/// Total order for the sequential pass. `t1` is unique per subject after
/// dedup, so the stable sort leaves no ambiguous ties.
fn sort_by_subject_and_onset(mut events: Vec<BlinkEvent>) -> Vec<BlinkEvent> {
    events.sort_by(|a, b| {
        a.subject_id
            .cmp(&b.subject_id)
            .then_with(|| a.t1.cmp(&b.t1))
    });
    events
}

/// Sequential pass carrying the previous record's subject and offset.
///
/// The gap is emitted only when the carried subject matches the current
/// record; the carry state itself always advances, including across a
/// subject boundary.
fn derive_features(events: Vec<BlinkEvent>) -> Vec<NormalizedBlinkRecord> {
    let mut records = Vec::with_capacity(events.len());
    let mut carried: Option<(String, i64)> = None;

    for event in events {
        let interblink = match &carried {
            Some((subject, prev_t2)) if *subject == event.subject_id => {
                Some((event.t1 - prev_t2) as f64 / MILLIS_PER_SECOND)
            }
            _ => None,
        };

        records.push(NormalizedBlinkRecord {
            subject_id: event.subject_id.clone(),
            session_epoch_ms: event.session_start.and_utc().timestamp_millis(),
            session_label: event.session_start.format(SESSION_TIMESTAMP_FORMAT).to_string(),
            t1: event.t1,
            t2: event.t2,
            blink_duration_seconds: blink_duration_seconds(&event),
            interblink_duration_seconds: interblink,
            blink_rate: blink_rate(interblink),
        });

        carried = Some((event.subject_id, event.t2));
    }

    records
}

/// Blink duration in seconds; stateless, per-record
fn blink_duration_seconds(event: &BlinkEvent) -> f64 {
    (event.t2 - event.t1) as f64 / MILLIS_PER_SECOND
}

/// Instantaneous blink rate: reciprocal of the inter-blink gap. A
/// zero-length gap yields `None`, never an infinite rate.
fn blink_rate(interblink_seconds: Option<f64>) -> Option<f64> {
    match interblink_seconds {
        Some(gap) if gap != 0.0 => Some(1.0 / gap),
        _ => None,
    }
}
