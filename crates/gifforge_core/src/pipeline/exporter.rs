//! The three-stage GIF export engine.
//!
//! Stages run strictly in sequence — palette generation needs every
//! extracted clip, and composition needs the palette:
//!
//! ```text
//! ExtractingSegments ──▶ GeneratingPalette ──▶ ComposingOutput
//!        5-25%                  30%                 60-100%
//! ```
//!
//! All intermediate artifacts (clips, palette image, concat lists) live
//! in a scoped temporary directory that is removed when the task ends,
//! on every exit path. The engine is single-use: one `run()` per
//! constructed exporter.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use tempfile::TempDir;

use crate::filters;
use crate::logging::ExportLogger;
use crate::models::Segment;

use super::errors::{ExportError, StageResult};
use super::progress::{stage_progress, ExportStage};
use super::runner::{run_tool, RunOutcome};
use super::types::{CancelToken, ExportReport, ExportStatus, GifExportTask, ProgressCallback};

/// Executes one [`GifExportTask`] on the calling thread or a worker.
pub struct GifExporter {
    task: GifExportTask,
    logger: Arc<ExportLogger>,
    cancel: CancelToken,
    progress: Option<ProgressCallback>,
}

impl GifExporter {
    pub fn new(task: GifExportTask, logger: Arc<ExportLogger>) -> Self {
        Self {
            task,
            logger,
            cancel: CancelToken::new(),
            progress: None,
        }
    }

    /// Attach a progress callback.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Share an externally owned cancellation token.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Handle for cancelling this export from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the task to completion and produce its report.
    pub fn run(self) -> ExportReport {
        self.logger.phase("GIF export");

        let report = match self.execute() {
            Ok(report) => report,
            Err(ExportError::Cancelled) => ExportReport::cancelled(),
            Err(e) => ExportReport::failed(e.to_string()),
        };

        match report.status {
            ExportStatus::Succeeded => {
                self.logger.success(&format!(
                    "Export finished: {} ({})",
                    report.message,
                    crate::estimate::format_size_mb(report.size_mb())
                ));
            }
            ExportStatus::Failed => {
                self.logger.error(&report.message);
                self.logger.show_tail("export");
            }
            ExportStatus::Cancelled => {
                self.logger.warn("Export cancelled");
            }
        }

        report
    }

    /// Run the task on a dedicated worker thread.
    pub fn spawn(self) -> JoinHandle<ExportReport> {
        std::thread::spawn(move || self.run())
    }

    fn execute(&self) -> StageResult<ExportReport> {
        // The scoped work dir carries the cleanup guarantee: dropping it
        // removes clips, palette, and concat lists on every exit path.
        let work_dir = self.create_work_dir()?;

        self.check_cancelled()?;
        self.emit_stage(ExportStage::Preparing);
        let clips = self.extract_segments(work_dir.path())?;

        self.check_cancelled()?;
        self.emit_stage(ExportStage::GeneratingPalette);
        let palette_path = work_dir.path().join("palette.png");
        self.generate_palette(work_dir.path(), &clips, &palette_path)?;

        self.check_cancelled()?;
        self.emit_stage(ExportStage::ComposingOutput);
        self.compose_gif(work_dir.path(), &clips, &palette_path)?;

        if !self.task.output_path.exists() {
            return Err(ExportError::OutputMissing {
                path: self.task.output_path.clone(),
            });
        }
        let size_bytes = fs::metadata(&self.task.output_path)
            .map_err(|e| ExportError::io("read output size", e))?
            .len();

        self.emit_stage(ExportStage::Finished);
        Ok(ExportReport::succeeded(
            self.task.output_path.clone(),
            size_bytes,
        ))
    }

    fn create_work_dir(&self) -> StageResult<TempDir> {
        let builder_result = match &self.task.temp_root {
            Some(root) => {
                fs::create_dir_all(root).map_err(|e| ExportError::io("create temp root", e))?;
                tempfile::Builder::new().prefix("gifforge_").tempdir_in(root)
            }
            None => tempfile::Builder::new().prefix("gifforge_").tempdir(),
        };
        builder_result.map_err(|e| ExportError::io("create work directory", e))
    }

    /// Stage 1: trim each segment into a filtered intermediate clip.
    ///
    /// A missing source path is a warning and the segment is skipped;
    /// any invocation failure aborts the task.
    fn extract_segments(&self, work_dir: &Path) -> StageResult<Vec<PathBuf>> {
        let total = self.task.segments.len();
        let mut clips = Vec::new();

        for (idx, segment) in self.task.segments.iter().enumerate() {
            self.check_cancelled()?;
            self.emit(
                stage_progress(ExportStage::ExtractingSegments, idx, total),
                &format!("Extracting segment {}/{}...", idx + 1, total),
            );

            let Some(source) = self.task.file_lookup.get(&segment.file_id) else {
                self.logger
                    .warn(&format!("Missing source for segment {}", segment.id));
                continue;
            };

            if segment.end < segment.start {
                self.logger.warn(&format!(
                    "Segment {} has end before start; treating as zero-length",
                    segment.id
                ));
            }

            let clip_path = work_dir.join(format!("clip_{:03}.mp4", idx + 1));
            if let Err(e) = self.extract_segment(source, segment, &clip_path) {
                if !matches!(e, ExportError::Cancelled) {
                    self.logger
                        .error(&format!("Failed to extract segment {}: {}", idx + 1, e));
                }
                return Err(e);
            }
            clips.push(clip_path);
        }

        if clips.is_empty() {
            return Err(ExportError::NoClips);
        }
        Ok(clips)
    }

    fn extract_segment(&self, source: &Path, segment: &Segment, clip: &Path) -> StageResult<()> {
        let end = segment.end.max(segment.start);

        let mut args: Vec<String> = vec![
            "-y".to_string(),
            "-ss".to_string(),
            filters::format_timestamp(segment.start),
            "-to".to_string(),
            filters::format_timestamp(end),
            "-i".to_string(),
            source.to_string_lossy().to_string(),
        ];

        if let Some(chain) = filters::segment_filters(&self.task.profile).build() {
            args.push("-vf".to_string());
            args.push(chain);
        }

        // Intermediate clips are re-encoded fast and near-lossless, with
        // audio stripped; palette quality depends on these frames.
        args.extend(
            [
                "-c:v",
                "libx264",
                "-preset",
                "ultrafast",
                "-crf",
                "18",
                "-pix_fmt",
                "yuv420p",
                "-an",
            ]
            .map(String::from),
        );
        args.push(clip.to_string_lossy().to_string());

        self.run_stage("segment extraction", &args)
    }

    /// Stage 2: one palettegen pass over the concatenated clip set.
    fn generate_palette(
        &self,
        work_dir: &Path,
        clips: &[PathBuf],
        palette_path: &Path,
    ) -> StageResult<()> {
        let concat_path = work_dir.join("palette.concat.txt");
        let mut args = vec!["-y".to_string()];
        args.extend(self.input_args(clips, &concat_path)?);
        args.push("-vf".to_string());
        args.push(filters::palettegen_filter(&self.task.profile));
        args.push(palette_path.to_string_lossy().to_string());

        let result = self.run_stage("palette generation", &args);
        if clips.len() > 1 {
            let _ = fs::remove_file(&concat_path);
        }
        result
    }

    /// Stage 3: compose the destination GIF through the palette.
    fn compose_gif(
        &self,
        work_dir: &Path,
        clips: &[PathBuf],
        palette_path: &Path,
    ) -> StageResult<()> {
        let profile = &self.task.profile;
        let concat_path = work_dir.join("gif.concat.txt");

        let mut args = vec!["-y".to_string()];
        args.extend(self.input_args(clips, &concat_path)?);
        args.push("-i".to_string());
        args.push(palette_path.to_string_lossy().to_string());
        args.push("-filter_complex".to_string());
        args.push(filters::composition_graph(profile));

        // Container-level play count; independent of reverse/boomerang.
        args.push("-loop".to_string());
        if profile.loop_count >= 0 {
            args.push(profile.loop_count.to_string());
        } else {
            args.push("-1".to_string());
        }

        if let Some(lossy) = profile.lossy_compression {
            args.push("-lossy".to_string());
            args.push(lossy.to_string());
        }

        args.push(self.task.output_path.to_string_lossy().to_string());

        let result = self.run_stage("GIF creation", &args);
        if clips.len() > 1 {
            let _ = fs::remove_file(&concat_path);
        }
        result
    }

    /// Input arguments for a stage: the single clip directly, or a
    /// concat-list file when several clips feed one invocation.
    fn input_args(&self, clips: &[PathBuf], concat_path: &Path) -> StageResult<Vec<String>> {
        if clips.len() > 1 {
            let mut body = String::new();
            for clip in clips {
                body.push_str(&format!("file '{}'\n", clip.display()));
            }
            fs::write(concat_path, body).map_err(|e| ExportError::io("write concat list", e))?;
            let mut args: Vec<String> = ["-f", "concat", "-safe", "0", "-i"]
                .map(String::from)
                .to_vec();
            args.push(concat_path.to_string_lossy().to_string());
            Ok(args)
        } else {
            Ok(vec![
                "-i".to_string(),
                clips[0].to_string_lossy().to_string(),
            ])
        }
    }

    fn run_stage(&self, stage: &str, args: &[String]) -> StageResult<()> {
        self.logger.command(&format!(
            "{} {}",
            self.task.ffmpeg.display(),
            args.join(" ")
        ));

        match run_tool(&self.task.ffmpeg, args, &self.cancel, |line| {
            self.logger.output_line(line)
        }) {
            RunOutcome::Success => Ok(()),
            RunOutcome::Cancelled => Err(ExportError::Cancelled),
            RunOutcome::Failed(detail) => Err(ExportError::invocation(stage, detail)),
        }
    }

    fn check_cancelled(&self) -> StageResult<()> {
        if self.cancel.is_cancelled() {
            Err(ExportError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn emit(&self, percent: u32, message: &str) {
        self.logger.progress(percent);
        if let Some(callback) = &self.progress {
            callback(percent, message);
        }
    }

    /// Emit a stage's fixed milestone with its label.
    fn emit_stage(&self, stage: ExportStage) {
        let message = match stage {
            ExportStage::Finished => stage.label().to_string(),
            _ => format!("{}...", stage.label()),
        };
        self.emit(stage_progress(stage, 0, 0), &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use crate::models::{ExportMode, GifExportProfile};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Task against a stand-in executable; `true` exits 0 without
    /// creating any files, a missing path cannot be started at all.
    fn make_task(ffmpeg: &str, segment_count: u32, dir: &Path) -> GifExportTask {
        let mut lookup = HashMap::new();
        lookup.insert("src-1".to_string(), dir.join("input.mp4"));
        let segments = (0..segment_count)
            .map(|i| {
                let start = f64::from(i) * 2.0;
                Segment::new("src-1", start, start + 1.0, i)
            })
            .collect();
        GifExportTask::new(
            ffmpeg,
            segments,
            lookup,
            GifExportProfile::default(),
            dir.join("out.gif"),
            ExportMode::MergedSegments,
        )
        .with_temp_root(dir.join("work"))
    }

    fn make_logger(dir: &Path) -> Arc<ExportLogger> {
        let logger =
            ExportLogger::new("test_export", dir.join("logs"), LogConfig::default(), None).unwrap();
        Arc::new(logger)
    }

    fn assert_temp_root_empty(dir: &Path) {
        let entries: Vec<_> = fs::read_dir(dir.join("work"))
            .map(|it| it.flatten().collect())
            .unwrap_or_default();
        assert!(
            entries.is_empty(),
            "work dir should be empty, found {:?}",
            entries
        );
    }

    #[test]
    fn cancel_before_run_yields_cancelled_without_invocations() {
        let dir = tempdir().unwrap();
        // A nonexistent executable would turn any invocation into a
        // failure, so a Cancelled status proves nothing was attempted.
        let task = make_task("/nonexistent/ffmpeg", 2, dir.path());
        let exporter = GifExporter::new(task, make_logger(dir.path()));
        exporter.cancel_token().cancel();

        let report = exporter.run();
        assert_eq!(report.status, ExportStatus::Cancelled);
        assert_temp_root_empty(dir.path());
    }

    #[test]
    fn missing_executable_fails_with_message() {
        let dir = tempdir().unwrap();
        let task = make_task("/nonexistent/ffmpeg", 1, dir.path());
        let report = GifExporter::new(task, make_logger(dir.path())).run();

        assert_eq!(report.status, ExportStatus::Failed);
        assert!(report.message.contains("segment extraction failed"));
        assert!(!report.message.is_empty());
        assert_temp_root_empty(dir.path());
    }

    #[test]
    fn stand_in_tool_reports_output_missing() {
        let dir = tempdir().unwrap();
        // `true` exits 0 for every stage but never writes the output.
        let task = make_task("true", 1, dir.path());
        let report = GifExporter::new(task, make_logger(dir.path())).run();

        assert_eq!(report.status, ExportStatus::Failed);
        assert!(report.message.contains("output file was not created"));
        assert_temp_root_empty(dir.path());
    }

    #[test]
    fn precreated_output_completes_with_measured_size() {
        let dir = tempdir().unwrap();
        let task = make_task("true", 3, dir.path());
        fs::write(&task.output_path, b"GIF89a").unwrap();

        let percents = Arc::new(Mutex::new(Vec::new()));
        let recorder = percents.clone();
        let report = GifExporter::new(task, make_logger(dir.path()))
            .with_progress(Box::new(move |p, _| recorder.lock().unwrap().push(p)))
            .run();

        assert_eq!(report.status, ExportStatus::Succeeded);
        assert_eq!(report.size_bytes, 6);
        assert!(report.output_path.is_some());

        let percents = percents.lock().unwrap();
        assert_eq!(percents.first(), Some(&5));
        assert_eq!(percents.last(), Some(&100));
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_temp_root_empty(dir.path());
    }

    #[test]
    fn cancel_after_extraction_yields_cancelled_and_cleans_up() {
        let dir = tempdir().unwrap();
        let task = make_task("true", 3, dir.path());
        fs::write(&task.output_path, b"GIF89a").unwrap();

        let exporter = GifExporter::new(task, make_logger(dir.path()));
        let cancel = exporter.cancel_token();
        let report = exporter
            .with_progress(Box::new(move |_, message| {
                // Fires on the last extraction emission; cancellation is
                // observed before the palette stage can start.
                if message == "Extracting segment 3/3..." {
                    cancel.cancel();
                }
            }))
            .run();

        assert_eq!(report.status, ExportStatus::Cancelled);
        assert_temp_root_empty(dir.path());
    }

    #[test]
    fn all_sources_missing_fails_without_invocations() {
        let dir = tempdir().unwrap();
        let mut task = make_task("/nonexistent/ffmpeg", 2, dir.path());
        task.file_lookup.clear();

        let report = GifExporter::new(task, make_logger(dir.path())).run();
        // Every segment was skipped with a warning; with nothing to
        // invoke, the task fails before the stand-in tool matters.
        assert_eq!(report.status, ExportStatus::Failed);
        assert!(report.message.contains("no video segments"));
        assert_temp_root_empty(dir.path());
    }

    #[test]
    fn spawned_export_delivers_report() {
        let dir = tempdir().unwrap();
        let task = make_task("true", 1, dir.path());
        fs::write(&task.output_path, b"GIF89a").unwrap();

        let handle = GifExporter::new(task, make_logger(dir.path())).spawn();
        let report = handle.join().unwrap();
        assert_eq!(report.status, ExportStatus::Succeeded);
    }
}
