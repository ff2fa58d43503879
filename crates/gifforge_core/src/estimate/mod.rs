//! Predicted output size, computed without touching ffmpeg.
//!
//! The model is a heuristic fit to typical LZW compression behavior,
//! not a guarantee: frames × pixels × palette depth, divided by a
//! per-dither compression ratio, plus 5% structural overhead. It is
//! cheap enough to re-run on every parameter change, which is how the
//! UI-facing live estimate is meant to consume it.

use crate::models::{DitherMode, GifExportProfile, MediaInfo};

const OVERHEAD_FACTOR: f64 = 0.05;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Palette-indexed bits per pixel for a color count.
///
/// Values outside the supported set fall back to 8.
fn bits_per_pixel(colors: u16) -> u32 {
    match colors {
        32 => 5,
        64 => 6,
        128 => 7,
        256 => 8,
        _ => 8,
    }
}

/// Estimate the output size in MB for explicit parameters.
pub fn estimate_gif_size(
    duration_secs: f64,
    width: u32,
    height: u32,
    fps: f64,
    colors: u16,
    dither: DitherMode,
) -> f64 {
    let total_frames = duration_secs * fps;
    let raw_bytes = total_frames
        * f64::from(width)
        * f64::from(height)
        * (f64::from(bits_per_pixel(colors)) / 8.0);

    let compressed = raw_bytes / dither.compression_ratio();
    let with_overhead = compressed * (1.0 + OVERHEAD_FACTOR);

    with_overhead / BYTES_PER_MB
}

/// Estimate the output size for a profile applied to a probed source.
///
/// Resolves the output dimensions (target width with aspect-preserved
/// height), divides the duration by the playback speed, and doubles it
/// when boomerang composition is on.
pub fn estimate_profile_size(
    source: &MediaInfo,
    total_duration_secs: f64,
    profile: &GifExportProfile,
) -> f64 {
    let (width, height) = output_dimensions(source, profile);

    let mut duration = total_duration_secs;
    if profile.speed_multiplier > 0.0 {
        duration /= profile.speed_multiplier;
    }
    if profile.boomerang {
        duration *= 2.0;
    }

    estimate_gif_size(
        duration,
        width,
        height,
        f64::from(profile.fps),
        profile.colors,
        profile.dither,
    )
}

/// Output dimensions after applying the profile's target width.
pub fn output_dimensions(source: &MediaInfo, profile: &GifExportProfile) -> (u32, u32) {
    match profile.width {
        Some(width) if source.width > 0 => {
            let height = (f64::from(width) * f64::from(source.height) / f64::from(source.width))
                .round() as u32;
            (width, height)
        }
        Some(width) => (width, source.height),
        None => (source.width, source.height),
    }
}

/// Format an MB figure for display.
pub fn format_size_mb(size_mb: f64) -> String {
    if size_mb < 0.01 {
        format!("{:.1} KB", size_mb * 1024.0)
    } else if size_mb < 1.0 {
        format!("{:.0} KB", size_mb * 1024.0)
    } else {
        format!("{:.2} MB", size_mb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_720p() -> MediaInfo {
        MediaInfo {
            width: 1280,
            height: 720,
            fps_num: 30,
            fps_den: 1,
            duration: 5.0,
            codec: "h264".to_string(),
            pix_fmt: "yuv420p".to_string(),
            bitrate: None,
        }
    }

    #[test]
    fn known_value() {
        // 50 frames * 640*360 px * 7/8 bytes = 10_080_000 raw bytes;
        // / 3.5 = 2_880_000; * 1.05 = 3_024_000 bytes.
        let mb = estimate_gif_size(5.0, 640, 360, 10.0, 128, DitherMode::None);
        assert!((mb - 3_024_000.0 / (1024.0 * 1024.0)).abs() < 1e-9);
    }

    #[test]
    fn monotonic_in_each_parameter() {
        let base = estimate_gif_size(5.0, 640, 360, 10.0, 128, DitherMode::Bayer);
        assert!(estimate_gif_size(6.0, 640, 360, 10.0, 128, DitherMode::Bayer) > base);
        assert!(estimate_gif_size(5.0, 800, 360, 10.0, 128, DitherMode::Bayer) > base);
        assert!(estimate_gif_size(5.0, 640, 480, 10.0, 128, DitherMode::Bayer) > base);
        assert!(estimate_gif_size(5.0, 640, 360, 15.0, 128, DitherMode::Bayer) > base);
        assert!(estimate_gif_size(5.0, 640, 360, 10.0, 256, DitherMode::Bayer) > base);
    }

    #[test]
    fn palette_steps_are_ordered() {
        let sizes: Vec<f64> = [32, 64, 128, 256]
            .iter()
            .map(|&c| estimate_gif_size(5.0, 640, 360, 10.0, c, DitherMode::Sierra2_4a))
            .collect();
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
        // Unsupported counts fall back to the 256-color depth.
        assert_eq!(
            estimate_gif_size(5.0, 640, 360, 10.0, 100, DitherMode::Sierra2_4a),
            sizes[3]
        );
    }

    #[test]
    fn richer_settings_never_shrink_prediction() {
        // With the fixed ratio table, 128 colors at dither=none and 256
        // colors at floyd_steinberg land on the same prediction; the
        // richer settings must never come out *smaller*.
        let lean = estimate_gif_size(5.0, 640, 360, 10.0, 128, DitherMode::None);
        let rich = estimate_gif_size(5.0, 640, 360, 10.0, 256, DitherMode::FloydSteinberg);
        assert!(lean <= rich);
    }

    #[test]
    fn boomerang_doubles_prediction() {
        let profile = GifExportProfile {
            width: Some(640),
            fps: 10,
            ..GifExportProfile::default()
        };
        let plain = estimate_profile_size(&source_720p(), 5.0, &profile);
        let boom = estimate_profile_size(
            &source_720p(),
            5.0,
            &GifExportProfile {
                boomerang: true,
                ..profile
            },
        );
        assert!((boom - plain * 2.0).abs() < 1e-9);
    }

    #[test]
    fn speed_divides_duration() {
        let profile = GifExportProfile {
            width: Some(640),
            speed_multiplier: 2.0,
            ..GifExportProfile::default()
        };
        let fast = estimate_profile_size(&source_720p(), 5.0, &profile);
        let normal = estimate_profile_size(
            &source_720p(),
            5.0,
            &GifExportProfile {
                speed_multiplier: 1.0,
                ..profile
            },
        );
        assert!((fast - normal / 2.0).abs() < 1e-9);
    }

    #[test]
    fn dimensions_preserve_aspect_ratio() {
        let profile = GifExportProfile {
            width: Some(640),
            ..GifExportProfile::default()
        };
        assert_eq!(output_dimensions(&source_720p(), &profile), (640, 360));

        let native = GifExportProfile {
            width: None,
            ..GifExportProfile::default()
        };
        assert_eq!(output_dimensions(&source_720p(), &native), (1280, 720));
    }

    #[test]
    fn size_formatting_picks_unit() {
        assert_eq!(format_size_mb(0.005), "5.1 KB");
        assert_eq!(format_size_mb(0.5), "512 KB");
        assert_eq!(format_size_mb(2.345), "2.35 MB");
    }
}
