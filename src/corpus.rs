//! Corpus traversal and loading
//!
//! A corpus root holds one subdirectory per subject, each with one or more
//! session JSON files named `<subject_id>_*.json`. Traversal is decoupled
//! from processing: [`walk_corpus`] enumerates `(subject_id, file_path)`
//! pairs in lexical order, and [`load_corpus`] feeds them through repair,
//! parsing, and normalization into one concatenated table.
//!
//! Raw events are pooled per subject across all of that subject's files
//! before the normalization pass, so inter-blink gaps span session-file
//! boundaries when two sessions are chronologically adjacent.

use crate::error::PipelineError;
use crate::normalizer::Normalizer;
use crate::parser::{parse_file_events, subject_id_from_path};
use crate::repair::read_repaired;
use crate::types::{BlinkEvent, CorpusTable, Diagnostic};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Result of loading a corpus: the table plus everything that was skipped
/// along the way.
#[derive(Debug, Default)]
pub struct CorpusLoad {
    /// Concatenated normalized records, subjects in lexical first-seen
    /// order, ascending onset within each subject
    pub table: CorpusTable,
    /// Sub-records skipped during parsing, corpus-wide
    pub diagnostics: Vec<Diagnostic>,
    /// Files dropped because they failed to parse even after repair
    pub skipped_files: Vec<PathBuf>,
}

/// Enumerate `(subject_id, file_path)` pairs under a corpus root.
///
/// Subject subdirectories are visited in lexical order and `.json` files
/// in lexical name order within each. The subject id comes from the file
/// name, not the directory name.
pub fn walk_corpus(root: &Path) -> Result<Vec<(String, PathBuf)>, PipelineError> {
    if !root.is_dir() {
        return Err(PipelineError::InvalidRoot(root.to_path_buf()));
    }

    let mut pairs = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        pairs.push((subject_id_from_path(path), path.to_path_buf()));
    }

    Ok(pairs)
}

/// Load a whole corpus into one table.
///
/// Files that cannot be parsed even after repair are dropped from the
/// corpus without failing the batch; only I/O errors propagate. A subject
/// whose files yield no valid blinks contributes zero rows.
pub fn load_corpus(root: &Path) -> Result<CorpusLoad, PipelineError> {
    let mut subject_order: Vec<String> = Vec::new();
    let mut events_by_subject: HashMap<String, Vec<BlinkEvent>> = HashMap::new();
    let mut diagnostics = Vec::new();
    let mut skipped_files = Vec::new();

    for (subject_id, path) in walk_corpus(root)? {
        match read_repaired(&path)? {
            Some(object) => {
                let (events, mut file_diagnostics) = parse_file_events(&path, &object);
                diagnostics.append(&mut file_diagnostics);
                if !events_by_subject.contains_key(&subject_id) {
                    subject_order.push(subject_id.clone());
                }
                events_by_subject.entry(subject_id).or_default().extend(events);
            }
            None => {
                debug!(file = %path.display(), "dropping unparsable session file");
                skipped_files.push(path);
            }
        }
    }

    let mut records = Vec::new();
    for subject_id in subject_order {
        let events = events_by_subject.remove(&subject_id).unwrap_or_default();
        records.extend(Normalizer::normalize(events));
    }

    Ok(CorpusLoad {
        table: CorpusTable::new(records),
        diagnostics,
        skipped_files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(root: &Path, subject_dir: &str, name: &str, contents: &str) {
        let dir = root.join(subject_dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_walk_orders_subjects_then_files_lexically() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "S02", "S02_april.json", "{}");
        write_file(tmp.path(), "S01", "S01_may.json", "{}");
        write_file(tmp.path(), "S01", "S01_april.json", "{}");
        write_file(tmp.path(), "S01", "notes.txt", "ignored");

        let pairs = walk_corpus(tmp.path()).unwrap();
        let names: Vec<String> = pairs
            .iter()
            .map(|(_, p)| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            vec!["S01_april.json", "S01_may.json", "S02_april.json"]
        );
        assert_eq!(pairs[0].0, "S01");
        assert_eq!(pairs[2].0, "S02");
    }

    #[test]
    fn test_walk_rejects_missing_root() {
        let err = walk_corpus(Path::new("/nonexistent/corpus")).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRoot(_)));
    }

    #[test]
    fn test_load_concatenates_subjects() {
        let tmp = TempDir::new().unwrap();
        write_file(
            tmp.path(),
            "S01",
            "S01_april.json",
            r#"{"2024-04-01 10:00:00": [{"t1": 1000, "t2": 1100}, {"t1": 2100, "t2": 2200}]}"#,
        );
        write_file(
            tmp.path(),
            "S02",
            "S02_april.json",
            r#"{"2024-04-02 09:00:00": [{"t1": 500, "t2": 600}]}"#,
        );

        let load = load_corpus(tmp.path()).unwrap();
        assert_eq!(load.table.len(), 3);
        assert!(load.diagnostics.is_empty());
        assert!(load.skipped_files.is_empty());

        let subjects: Vec<&str> = load.table.subject_ids().collect();
        assert_eq!(subjects, vec!["S01", "S01", "S02"]);
        assert_eq!(
            load.table.records()[1].interblink_duration_seconds,
            Some(1.0)
        );
        // First S02 row starts a new subject
        assert_eq!(
            load.table.records()[2].interblink_duration_seconds,
            None
        );
    }

    #[test]
    fn test_gap_spans_session_files_of_one_subject() {
        let tmp = TempDir::new().unwrap();
        write_file(
            tmp.path(),
            "S01",
            "S01_a.json",
            r#"{"2024-04-01 10:00:00": [{"t1": 1000, "t2": 1100}]}"#,
        );
        write_file(
            tmp.path(),
            "S01",
            "S01_b.json",
            r#"{"2024-04-01 11:00:00": [{"t1": 3100, "t2": 3200}]}"#,
        );

        let load = load_corpus(tmp.path()).unwrap();
        assert_eq!(load.table.len(), 2);
        assert_eq!(
            load.table.records()[1].interblink_duration_seconds,
            Some(2.0)
        );
    }

    #[test]
    fn test_unparsable_file_drops_silently() {
        // Scenario: one subject's only file is garbage; the other subject
        // still loads fully and no error is raised
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "S01", "S01_april.json", "%%% not json %%%");
        write_file(
            tmp.path(),
            "S02",
            "S02_april.json",
            r#"{"2024-04-02 09:00:00": [{"t1": 500, "t2": 600}]}"#,
        );

        let load = load_corpus(tmp.path()).unwrap();
        assert_eq!(load.table.len(), 1);
        assert_eq!(load.table.records()[0].subject_id, "S02");
        assert_eq!(load.skipped_files.len(), 1);
        assert!(load.skipped_files[0].ends_with("S01/S01_april.json"));
    }

    #[test]
    fn test_truncated_file_is_repaired() {
        let tmp = TempDir::new().unwrap();
        write_file(
            tmp.path(),
            "S01",
            "S01_april.json",
            r#"{"2024-04-01 10:00:00": [{"t1": 1000, "t2": 1100}]"#,
        );

        let load = load_corpus(tmp.path()).unwrap();
        assert_eq!(load.table.len(), 1);
        assert!(load.skipped_files.is_empty());
    }

    #[test]
    fn test_diagnostics_surface_with_results() {
        let tmp = TempDir::new().unwrap();
        write_file(
            tmp.path(),
            "S01",
            "S01_april.json",
            r#"{"2024-04-01 10:00:00": [{"t1": 1000, "t2": 1100}, {"t2": 9000}]}"#,
        );

        let load = load_corpus(tmp.path()).unwrap();
        assert_eq!(load.table.len(), 1);
        assert_eq!(load.diagnostics.len(), 1);
        assert_eq!(load.diagnostics[0].record_index, 1);
        assert!(load.diagnostics[0].file.ends_with("S01/S01_april.json"));
    }

    #[test]
    fn test_empty_corpus_is_empty_table() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("S01")).unwrap();

        let load = load_corpus(tmp.path()).unwrap();
        assert!(load.table.is_empty());
    }
}
