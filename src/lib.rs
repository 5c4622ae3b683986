//! Blink Corpus - eye-blink event extraction and temporal feature pipeline
//!
//! Turns per-subject blink session logs (timestamped JSON files of blink
//! onset/offset pairs) into one normalized per-event feature table through
//! a deterministic pipeline: structural repair → event parsing →
//! normalization (dedup, sort, feature derivation) → corpus concatenation.
//!
//! ## Modules
//!
//! - **repair**: best-effort fix-up of truncated session files
//! - **parser**: timestamp-key filtering and raw event extraction
//! - **normalizer**: dedup, ordering, and temporal feature derivation
//! - **corpus**: directory traversal and corpus-wide loading

pub mod corpus;
pub mod error;
pub mod normalizer;
pub mod parser;
pub mod repair;
pub mod types;

pub use corpus::{load_corpus, walk_corpus, CorpusLoad};
pub use error::PipelineError;
pub use normalizer::Normalizer;
pub use parser::{parse_file_events, subject_id_from_path};
pub use repair::read_repaired;
pub use types::{BlinkEvent, CorpusTable, Diagnostic, DiagnosticReason, NormalizedBlinkRecord};

/// Crate version embedded in CLI output
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
