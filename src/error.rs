//! Error types for the blink pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can abort corpus processing.
///
/// Everything else recovers locally: unparsable files are dropped from the
/// corpus, placeholder timestamp keys are skipped, and malformed blink
/// sub-records become [`crate::types::Diagnostic`]s.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corpus root is not a directory: {0}")]
    InvalidRoot(PathBuf),
}
