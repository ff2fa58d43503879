//! The GIF export pipeline.
//!
//! One task flows through three strictly sequential stages, each
//! invoking the external transcoding tool:
//!
//! ```text
//! GifExportTask
//!     ├── Stage: ExtractingSegments   (one invocation per segment)
//!     ├── Stage: GeneratingPalette    (one invocation)
//!     └── Stage: ComposingOutput      (one invocation)
//!                  │
//!                  ▼
//!             ExportReport
//! ```
//!
//! Progress and log events are delivered in emission order to a single
//! consumer; cancellation is a shared one-way token polled at stage
//! boundaries and around every diagnostic line.
//!
//! # Example
//!
//! ```ignore
//! use gifforge_core::pipeline::{GifExporter, GifExportTask};
//!
//! let task = GifExportTask::new(ffmpeg, segments, lookup, profile, out, mode);
//! let exporter = GifExporter::new(task, logger)
//!     .with_progress(Box::new(|pct, msg| println!("[{pct:3}%] {msg}")));
//! let cancel = exporter.cancel_token();
//! let report = exporter.run();
//! ```

mod batch;
mod errors;
mod exporter;
mod progress;
mod runner;
mod types;

pub use batch::BatchProcessor;
pub use errors::{ExportError, StageResult};
pub use exporter::GifExporter;
pub use progress::{stage_progress, ExportStage};
pub use runner::{run_tool, RunOutcome};
pub use types::{
    CancelToken, ExportReport, ExportStatus, GifExportTask, ProgressCallback,
};
