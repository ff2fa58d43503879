//! Core types for the export pipeline.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{ExportMode, GifExportProfile, Segment};

/// Progress callback: (percentage 0-100, stage description).
///
/// Percentages are monotonically non-decreasing within one task.
pub type ProgressCallback = Box<dyn Fn(u32, &str) + Send + Sync>;

/// One unit of work for the export engine.
///
/// Consumed read-only for the task's lifetime; the engine never mutates
/// segments or the profile.
#[derive(Debug, Clone)]
pub struct GifExportTask {
    /// Path of the ffmpeg executable.
    pub ffmpeg: PathBuf,
    /// Segments to export, in input order.
    pub segments: Vec<Segment>,
    /// Maps each segment's `file_id` to a source path.
    pub file_lookup: HashMap<String, PathBuf>,
    pub profile: GifExportProfile,
    /// Destination GIF path.
    pub output_path: PathBuf,
    pub mode: ExportMode,
    /// Root under which the task's scoped working directory is created;
    /// the system temp directory when unset.
    pub temp_root: Option<PathBuf>,
}

impl GifExportTask {
    /// Create a task with the system temp directory as work root.
    pub fn new(
        ffmpeg: impl Into<PathBuf>,
        segments: Vec<Segment>,
        file_lookup: HashMap<String, PathBuf>,
        profile: GifExportProfile,
        output_path: impl Into<PathBuf>,
        mode: ExportMode,
    ) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            segments,
            file_lookup,
            profile,
            output_path: output_path.into(),
            mode,
            temp_root: None,
        }
    }

    /// Place the task's working directory under the given root.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Total selected duration across all segments, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(Segment::duration).sum()
    }
}

/// Terminal state of a finished task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Succeeded,
    Failed,
    /// User-requested abort; distinct from failure and never reachable
    /// once the task has succeeded.
    Cancelled,
}

/// Produced exactly once per task, at completion or cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub status: ExportStatus,
    /// Output path on success, human-readable failure detail otherwise.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Measured size of the destination file.
    pub size_bytes: u64,
}

impl ExportReport {
    pub fn succeeded(output_path: PathBuf, size_bytes: u64) -> Self {
        Self {
            status: ExportStatus::Succeeded,
            message: output_path.to_string_lossy().to_string(),
            output_path: Some(output_path),
            size_bytes,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ExportStatus::Failed,
            message: message.into(),
            output_path: None,
            size_bytes: 0,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            status: ExportStatus::Cancelled,
            message: "Cancelled".to_string(),
            output_path: None,
            size_bytes: 0,
        }
    }

    pub fn success(&self) -> bool {
        self.status == ExportStatus::Succeeded
    }

    /// Measured size in MB.
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Shared cancellation token.
///
/// Cancellation is one-way and idempotent: once set it stays set, and
/// repeated calls are no-ops. Clones share the same flag.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
