//! Media-related data structures (probed file info, segments).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Properties of a source file's first video stream, as probed.
///
/// Immutable once probed; the pipeline only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frame rate numerator.
    pub fps_num: u32,
    /// Frame rate denominator.
    pub fps_den: u32,
    /// Duration in seconds.
    pub duration: f64,
    /// Codec name (e.g., "h264").
    pub codec: String,
    /// Pixel format (e.g., "yuv420p").
    pub pix_fmt: String,
    /// Bit rate in bits/second, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u64>,
}

impl MediaInfo {
    /// Frame rate as a float; 0.0 when the denominator is 0.
    pub fn fps(&self) -> f64 {
        if self.fps_den == 0 {
            return 0.0;
        }
        f64::from(self.fps_num) / f64::from(self.fps_den)
    }

    /// Width over height; 0.0 when the height is 0.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        f64::from(self.width) / f64::from(self.height)
    }

    /// One-line summary for display, e.g.
    /// `1280×720 • 29.97 fps • h264 • 1m05s • 3500 kbps`.
    pub fn badge_text(&self) -> String {
        let fps = self.fps();
        let fps_text = if fps > 0.0 {
            format!("{:.2}", fps)
        } else {
            "?".to_string()
        };
        let minutes = (self.duration / 60.0) as u64;
        let seconds = (self.duration % 60.0).round() as u64;
        let bitrate_text = match self.bitrate {
            Some(br) => format!(" • {} kbps", br / 1000),
            None => String::new(),
        };
        format!(
            "{}×{} • {} fps • {} • {}m{:02}s{}",
            self.width, self.height, fps_text, self.codec, minutes, seconds, bitrate_text
        )
    }
}

/// A source file tracked by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Stable identifier used by segments to refer to this file.
    pub id: String,
    /// Filesystem path.
    pub path: PathBuf,
    /// Probe result, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<MediaInfo>,
}

impl MediaFile {
    /// Create a file entry with a generated id and no probe info.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            path: path.into(),
            info: None,
        }
    }
}

/// A bounded time interval of one source, selected for the output.
///
/// Created by the caller before a task is built; never mutated by the
/// engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Unique segment id.
    pub id: String,
    /// Id of the source file this segment cuts from.
    pub file_id: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Global ordering key for merged exports across sources.
    pub order: u32,
}

impl Segment {
    /// Create a new segment with a generated uuid.
    pub fn new(file_id: impl Into<String>, start: f64, end: f64, order: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_id: file_id.into(),
            start,
            end,
            order,
        }
    }

    /// Segment duration in seconds, clamped at zero for inverted bounds.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> MediaInfo {
        MediaInfo {
            width: 1280,
            height: 720,
            fps_num: 30000,
            fps_den: 1001,
            duration: 65.2,
            codec: "h264".to_string(),
            pix_fmt: "yuv420p".to_string(),
            bitrate: Some(3_500_000),
        }
    }

    #[test]
    fn fps_handles_zero_denominator() {
        let mut info = sample_info();
        assert!((info.fps() - 29.97).abs() < 0.01);
        info.fps_den = 0;
        assert_eq!(info.fps(), 0.0);
    }

    #[test]
    fn aspect_ratio_handles_zero_height() {
        let mut info = sample_info();
        assert!((info.aspect_ratio() - 16.0 / 9.0).abs() < 1e-9);
        info.height = 0;
        assert_eq!(info.aspect_ratio(), 0.0);
    }

    #[test]
    fn badge_text_formats_summary() {
        let text = sample_info().badge_text();
        assert_eq!(text, "1280×720 • 29.97 fps • h264 • 1m05s • 3500 kbps");
    }

    #[test]
    fn badge_text_without_bitrate() {
        let mut info = sample_info();
        info.bitrate = None;
        assert!(!info.badge_text().contains("kbps"));
    }

    #[test]
    fn segment_duration_never_negative() {
        let seg = Segment::new("file-1", 10.0, 4.0, 0);
        assert_eq!(seg.duration(), 0.0);
        let seg = Segment::new("file-1", 4.0, 10.0, 0);
        assert_eq!(seg.duration(), 6.0);
        let seg = Segment::new("file-1", 4.0, 4.0, 0);
        assert_eq!(seg.duration(), 0.0);
    }

    #[test]
    fn segments_get_unique_ids() {
        let a = Segment::new("file-1", 0.0, 1.0, 0);
        let b = Segment::new("file-1", 0.0, 1.0, 1);
        assert_ne!(a.id, b.id);
    }
}
