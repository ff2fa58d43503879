//! Sequential processing of multiple export tasks.

use std::sync::Arc;

use crate::logging::ExportLogger;

use super::exporter::GifExporter;
use super::types::{CancelToken, ExportReport, GifExportTask};

/// Runs a list of export tasks back to back.
///
/// Tasks share one cancellation token: cancelling stops the current
/// task cooperatively and skips everything after it. Each task still
/// owns its private working directory, so independent processors could
/// run in parallel workers without contention.
#[derive(Default)]
pub struct BatchProcessor {
    cancel: CancelToken,
}

impl BatchProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for cancelling the whole batch.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Process tasks in order, collecting one report per started task.
    ///
    /// `make_logger` is called once per task so each export gets its own
    /// log file.
    pub fn process<F>(&self, tasks: Vec<GifExportTask>, mut make_logger: F) -> Vec<ExportReport>
    where
        F: FnMut(&GifExportTask) -> Arc<ExportLogger>,
    {
        let total = tasks.len();
        let mut reports = Vec::with_capacity(total);

        for (i, task) in tasks.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!("batch cancelled before task {}/{}", i + 1, total);
                break;
            }

            tracing::info!(
                "processing task {}/{}: {}",
                i + 1,
                total,
                task.output_path.display()
            );

            let logger = make_logger(&task);
            let exporter = GifExporter::new(task, logger).with_cancel(self.cancel.clone());
            reports.push(exporter.run());
        }

        reports
    }
}
