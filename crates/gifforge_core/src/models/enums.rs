//! Core enums used throughout the export pipeline.
//!
//! Every selector the original UI exposed as a free-form string is a
//! closed enum here. Parsing an unrecognized string never fails; it
//! resolves to the documented default of the enum in question.

use serde::{Deserialize, Serialize};

/// How segments map onto output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    /// One segment becomes one GIF.
    #[default]
    SingleSegment,
    /// The entire source file becomes one GIF.
    FullVideo,
    /// Multiple segments are merged into one GIF.
    MergedSegments,
    /// Multiple tasks are processed back to back.
    Batch,
}

impl std::fmt::Display for ExportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportMode::SingleSegment => write!(f, "single segment"),
            ExportMode::FullVideo => write!(f, "full video"),
            ExportMode::MergedSegments => write!(f, "merged segments"),
            ExportMode::Batch => write!(f, "batch"),
        }
    }
}

/// Dithering algorithm used when mapping frames onto the palette.
///
/// The fallback for unrecognized names is `Sierra2_4a`, both here and in
/// the size estimator (which consumes this enum, so the two can never
/// disagree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DitherMode {
    /// No dithering.
    None,
    /// Ordered (Bayer matrix) dithering.
    Bayer,
    /// Sierra-2-4A error diffusion.
    #[default]
    Sierra2_4a,
    /// Floyd-Steinberg error diffusion.
    FloydSteinberg,
}

impl DitherMode {
    /// Configuration-file name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bayer => "bayer",
            Self::Sierra2_4a => "sierra2_4a",
            Self::FloydSteinberg => "floyd_steinberg",
        }
    }

    /// Argument for ffmpeg's `paletteuse=dither=`.
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bayer => "bayer:bayer_scale=5",
            Self::Sierra2_4a => "sierra2_4a",
            Self::FloydSteinberg => "floyd_steinberg",
        }
    }

    /// Typical LZW compression ratio achieved under this mode.
    ///
    /// Used by the size estimator; error diffusion produces noisier
    /// pixel runs than ordered dithering, which compresses differently.
    pub fn compression_ratio(&self) -> f64 {
        match self {
            Self::None => 3.5,
            Self::Bayer => 4.0,
            Self::Sierra2_4a => 4.5,
            Self::FloydSteinberg => 4.0,
        }
    }

    /// Parse a configuration name; unrecognized input yields the default.
    pub fn from_name(name: &str) -> Self {
        match name {
            "none" => Self::None,
            "bayer" => Self::Bayer,
            "sierra2_4a" => Self::Sierra2_4a,
            "floyd_steinberg" => Self::FloydSteinberg,
            _ => Self::default(),
        }
    }

    /// Get all available modes.
    pub fn all() -> &'static [DitherMode] {
        &[
            Self::None,
            Self::Bayer,
            Self::Sierra2_4a,
            Self::FloydSteinberg,
        ]
    }

    /// Create from index (for UI combo boxes).
    pub fn from_index(index: usize) -> Self {
        Self::all().get(index).copied().unwrap_or_default()
    }

    /// Get index of this mode (for UI combo boxes).
    pub fn to_index(&self) -> usize {
        Self::all().iter().position(|m| m == self).unwrap_or(0)
    }
}

impl std::fmt::Display for DitherMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Scaling algorithm passed to ffmpeg's `scale` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleAlgorithm {
    /// Lanczos resampling (best quality, default).
    #[default]
    Lanczos,
    Bicubic,
    Bilinear,
}

impl ScaleAlgorithm {
    /// Argument for the `flags=` option of the scale filter.
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            Self::Lanczos => "lanczos",
            Self::Bicubic => "bicubic",
            Self::Bilinear => "bilinear",
        }
    }

    /// Parse a configuration name; unrecognized input yields the default.
    pub fn from_name(name: &str) -> Self {
        match name {
            "lanczos" => Self::Lanczos,
            "bicubic" => Self::Bicubic,
            "bilinear" => Self::Bilinear,
            _ => Self::default(),
        }
    }

    /// Get all available algorithms.
    pub fn all() -> &'static [ScaleAlgorithm] {
        &[Self::Lanczos, Self::Bicubic, Self::Bilinear]
    }
}

impl std::fmt::Display for ScaleAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ffmpeg_name())
    }
}

/// Anchor preset for the text overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPosition {
    #[default]
    BottomLeft,
    BottomCenter,
    BottomRight,
    CenterLeft,
    Center,
    CenterRight,
    TopLeft,
    TopCenter,
    TopRight,
    /// Explicit pixel coordinates from the overlay's custom_x/custom_y.
    Custom,
}

impl TextPosition {
    /// Get all presets in UI order.
    pub fn all() -> &'static [TextPosition] {
        &[
            Self::BottomLeft,
            Self::BottomCenter,
            Self::BottomRight,
            Self::CenterLeft,
            Self::Center,
            Self::CenterRight,
            Self::TopLeft,
            Self::TopCenter,
            Self::TopRight,
            Self::Custom,
        ]
    }

    /// Create from index (for UI combo boxes).
    pub fn from_index(index: usize) -> Self {
        Self::all().get(index).copied().unwrap_or_default()
    }

    /// Get index of this preset (for UI combo boxes).
    pub fn to_index(&self) -> usize {
        Self::all().iter().position(|p| p == self).unwrap_or(0)
    }
}
