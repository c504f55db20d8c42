//! Render error types.

use std::path::PathBuf;

use thiserror::Error;

/// Rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The PDF document could not be produced.
    #[error("failed to produce PDF document: {0}")]
    Pdf(String),

    /// The output file could not be written.
    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
