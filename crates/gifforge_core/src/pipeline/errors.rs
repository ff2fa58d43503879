//! Error types for the export pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Reasons an export task can stop before producing its destination.
///
/// A missing source for one segment is not represented here: it is a
/// per-segment warning, recovered locally during extraction. Everything
/// in this enum aborts the whole task.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The external tool returned non-zero or could not start.
    #[error("{stage} failed: {detail}")]
    Invocation { stage: String, detail: String },

    /// The tool reported success but the destination file is absent.
    #[error("output file was not created: {}", path.display())]
    OutputMissing { path: PathBuf },

    /// No segment could be turned into an intermediate clip.
    #[error("no video segments could be prepared")]
    NoClips,

    /// Cooperative cancellation was observed. Not a failure; mapped to
    /// the `Cancelled` terminal status.
    #[error("cancelled")]
    Cancelled,

    /// Filesystem error while managing intermediate artifacts.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl ExportError {
    /// Create an invocation failure for a stage.
    pub fn invocation(stage: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Invocation {
            stage: stage.into(),
            detail: detail.into(),
        }
    }

    /// Create an I/O error with operation context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for stage operations.
pub type StageResult<T> = Result<T, ExportError>;
