//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML
//! tables, each with serde defaults so a partial file loads cleanly.

use serde::{Deserialize, Serialize};

use crate::models::{DitherMode, GifExportProfile, ScaleAlgorithm};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// External tool locations.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Defaults applied to new export profiles.
    #[serde(default)]
    pub export: ExportSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Build an export profile from the configured defaults.
    pub fn default_profile(&self) -> GifExportProfile {
        let mut profile = GifExportProfile::preset(&self.export.preset);
        profile.fps = self.export.fps;
        profile.colors = self.export.colors;
        profile.dither = self.export.dither;
        profile.scale_filter = self.export.scale_filter;
        profile.loop_count = self.export.loop_count;
        profile
    }
}

/// Output, temp, and log folder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder for finished GIFs.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Root folder for per-task working directories.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for per-export log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Last folder a source file was loaded from.
    #[serde(default)]
    pub last_media_path: String,
}

fn default_output_folder() -> String {
    "gif_output".to_string()
}

fn default_temp_root() -> String {
    ".temp".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
            last_media_path: String::new(),
        }
    }
}

/// Paths of the external executables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
        }
    }
}

/// Defaults for new export profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Name of the preset new profiles start from.
    #[serde(default = "default_preset")]
    pub preset: String,

    #[serde(default = "default_fps")]
    pub fps: u32,

    #[serde(default = "default_colors")]
    pub colors: u16,

    #[serde(default)]
    pub dither: DitherMode,

    #[serde(default)]
    pub scale_filter: ScaleAlgorithm,

    /// 0 = loop forever.
    #[serde(default)]
    pub loop_count: i32,
}

fn default_preset() -> String {
    "Medium (<5MB)".to_string()
}

fn default_fps() -> u32 {
    15
}

fn default_colors() -> u16 {
    256
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            fps: default_fps(),
            colors: default_colors(),
            dither: DitherMode::default(),
            scale_filter: ScaleAlgorithm::default(),
            loop_count: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use the compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of raw output lines kept for the error tail.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
        }
    }
}

impl LoggingSettings {
    /// Convert to a per-export logger configuration.
    pub fn to_log_config(&self) -> crate::logging::LogConfig {
        crate::logging::LogConfig {
            compact: self.compact,
            error_tail: self.error_tail as usize,
            progress_step: self.progress_step,
            ..crate::logging::LogConfig::default()
        }
    }
}
