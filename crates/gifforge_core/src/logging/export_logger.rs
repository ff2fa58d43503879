//! Per-export logger with file and callback output.
//!
//! Each export task gets its own logger. Every line goes to a dedicated
//! log file and, when a callback is attached, to the consumer of the
//! task's log events. Raw tool output is kept in a bounded tail buffer
//! so the last lines before a failure can be replayed.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

struct LoggerState {
    writer: Option<BufWriter<File>>,
    tail: VecDeque<String>,
    last_progress: u32,
}

/// Per-export logger with dual output (file + callback).
pub struct ExportLogger {
    export_name: String,
    log_path: PathBuf,
    config: LogConfig,
    callback: Option<LogCallback>,
    state: Mutex<LoggerState>,
}

impl ExportLogger {
    /// Create a logger writing to `<log_dir>/<export_name>.log`.
    pub fn new(
        export_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let export_name = export_name.into();
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&export_name)));
        let writer = BufWriter::new(File::create(&log_path)?);

        Ok(Self {
            export_name,
            log_path,
            config,
            callback,
            state: Mutex::new(LoggerState {
                writer: Some(writer),
                tail: VecDeque::with_capacity(64),
                last_progress: 0,
            }),
        })
    }

    /// Name of the export this logger belongs to.
    pub fn export_name(&self) -> &str {
        &self.export_name
    }

    /// Path of the log file.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }
        self.output(&self.format_message(message));
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &MessagePrefix::Warning.format(message));
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &MessagePrefix::Error.format(message));
    }

    /// Log an external command about to be executed.
    pub fn command(&self, command: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Command.format(command));
    }

    /// Log a stage marker.
    pub fn phase(&self, name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Phase.format(name));
    }

    pub fn success(&self, message: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Success.format(message));
    }

    /// Log a progress update; filtered to step multiples in compact mode.
    ///
    /// Returns whether the update was logged.
    pub fn progress(&self, percent: u32) -> bool {
        if self.config.compact {
            let mut state = self.state.lock();
            let step = self.config.progress_step.max(1);
            let current_step = (percent / step) * step;
            let last_step = (state.last_progress / step) * step;
            if current_step <= last_step && percent < 100 {
                return false;
            }
            state.last_progress = percent;
        }
        self.log(LogLevel::Info, &format!("Progress: {}%", percent));
        true
    }

    /// Forward one line of raw tool output.
    ///
    /// The line always lands in the tail buffer; in compact mode it is
    /// not written out immediately.
    pub fn output_line(&self, line: &str) {
        {
            let mut state = self.state.lock();
            if state.tail.len() >= self.config.error_tail {
                state.tail.pop_front();
            }
            state.tail.push_back(line.to_string());
        }

        if self.config.compact {
            return;
        }
        self.output(&self.format_message(line));
    }

    /// Replay the tail buffer, typically after a failure.
    pub fn show_tail(&self, header: &str) {
        let lines = self.tail();
        if lines.is_empty() {
            return;
        }
        self.output(&self.format_message(&format!("[{}/tail]", header)));
        for line in &lines {
            self.output(&self.format_message(line));
        }
    }

    /// Current tail buffer contents.
    pub fn tail(&self) -> Vec<String> {
        self.state.lock().tail.iter().cloned().collect()
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(writer) = self.state.lock().writer.as_mut() {
            let _ = writer.flush();
        }
    }

    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
        } else {
            message.to_string()
        }
    }

    fn output(&self, formatted: &str) {
        if let Some(writer) = self.state.lock().writer.as_mut() {
            let _ = writeln!(writer, "{}", formatted);
        }
        if let Some(callback) = &self.callback {
            callback(formatted);
        }
    }
}

impl Drop for ExportLogger {
    fn drop(&mut self) {
        self.flush();
        self.state.lock().writer = None;
    }
}

/// Replace filesystem-hostile characters in an export name.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
