//! Export profile (quality/size/playback parameters) and built-in presets.

use serde::{Deserialize, Serialize};

use super::enums::{DitherMode, ExportMode, ScaleAlgorithm};
use super::overlay::TextOverlay;

/// Complete set of parameters for one GIF export.
///
/// Immutable once a task has been constructed from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GifExportProfile {
    /// Name of the preset this profile was derived from.
    pub preset_name: String,
    pub export_mode: ExportMode,

    /// Target maximum size in MB. Informational only; the engine does
    /// not enforce it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_max_size_mb: Option<f64>,
    /// Target output width in pixels; `None` keeps the source width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Output frame rate.
    pub fps: u32,
    /// Palette size: 32, 64, 128, or 256 colors.
    pub colors: u16,

    pub dither: DitherMode,
    /// Quality 1-100 for lossy GIF compression, where supported.
    pub quality: u8,

    /// 0 = loop forever, negative = play once, positive = repeat N times.
    pub loop_count: i32,
    /// Playback speed, 0.25x to 4x.
    pub speed_multiplier: f64,
    pub reverse: bool,
    /// Play forward then backward.
    pub boomerang: bool,

    /// Refine the palette with diff-based frame statistics.
    pub optimize_palette: bool,
    pub optimize_size: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_overlay: Option<TextOverlay>,

    pub scale_filter: ScaleAlgorithm,
    /// Lossy compression strength (0-200, lower is better quality).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lossy_compression: Option<u32>,
}

impl Default for GifExportProfile {
    fn default() -> Self {
        Self {
            preset_name: "Medium".to_string(),
            export_mode: ExportMode::SingleSegment,
            target_max_size_mb: None,
            width: None,
            fps: 15,
            colors: 256,
            dither: DitherMode::Sierra2_4a,
            quality: 85,
            loop_count: 0,
            speed_multiplier: 1.0,
            reverse: false,
            boomerang: false,
            optimize_palette: true,
            optimize_size: true,
            text_overlay: None,
            scale_filter: ScaleAlgorithm::Lanczos,
            lossy_compression: None,
        }
    }
}

impl GifExportProfile {
    /// Profile named after a built-in preset, or the default profile if
    /// the name is unknown.
    pub fn preset(name: &str) -> Self {
        builtin_presets()
            .into_iter()
            .find(|p| p.preset_name == name)
            .unwrap_or_default()
    }
}

/// The built-in presets, from smallest output to highest quality.
pub fn builtin_presets() -> Vec<GifExportProfile> {
    vec![
        GifExportProfile {
            preset_name: "Tiny (<1MB)".to_string(),
            target_max_size_mb: Some(1.0),
            width: Some(640),
            fps: 10,
            colors: 128,
            lossy_compression: Some(80),
            ..GifExportProfile::default()
        },
        GifExportProfile {
            preset_name: "Small (<2MB)".to_string(),
            target_max_size_mb: Some(2.0),
            width: Some(854),
            fps: 12,
            colors: 256,
            lossy_compression: Some(40),
            ..GifExportProfile::default()
        },
        GifExportProfile {
            preset_name: "Medium (<5MB)".to_string(),
            target_max_size_mb: Some(5.0),
            width: Some(1280),
            fps: 15,
            colors: 256,
            ..GifExportProfile::default()
        },
        GifExportProfile {
            preset_name: "Large (<10MB)".to_string(),
            target_max_size_mb: Some(10.0),
            width: Some(1920),
            fps: 20,
            colors: 256,
            dither: DitherMode::FloydSteinberg,
            ..GifExportProfile::default()
        },
        GifExportProfile {
            preset_name: "High Quality".to_string(),
            width: None,
            fps: 24,
            colors: 256,
            dither: DitherMode::FloydSteinberg,
            ..GifExportProfile::default()
        },
        GifExportProfile {
            preset_name: "Custom".to_string(),
            ..GifExportProfile::default()
        },
    ]
}
