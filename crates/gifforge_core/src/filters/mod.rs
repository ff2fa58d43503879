//! Filter-graph construction for the external transcoding tool.
//!
//! Everything in this module is pure: the same (segment, profile) input
//! always produces the same filter text, and no constructor can fail —
//! at worst a chain degenerates to a no-op.
//!
//! The filter text itself stays a string because it is ffmpeg's own
//! syntax; assembly goes through [`FilterChain`] so clauses are joined
//! with a fixed separator instead of ad hoc formatting.

use crate::models::{GifExportProfile, TextOverlay};

/// Ordered list of filter clauses joined with `,`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterChain {
    clauses: Vec<String>,
}

impl FilterChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause.
    pub fn push(&mut self, clause: impl Into<String>) -> &mut Self {
        self.clauses.push(clause.into());
        self
    }

    /// Number of clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Join clauses into a `-vf` argument; `None` when the chain is empty.
    pub fn build(&self) -> Option<String> {
        if self.clauses.is_empty() {
            None
        } else {
            Some(self.clauses.join(","))
        }
    }
}

/// Per-segment extraction chain: speed, scale, frame rate, text overlay.
///
/// The frame-rate clause is always present; the rest appear only when
/// the profile asks for them.
pub fn segment_filters(profile: &GifExportProfile) -> FilterChain {
    let mut chain = FilterChain::new();

    if profile.speed_multiplier != 1.0 {
        chain.push(format!("setpts={}*PTS", 1.0 / profile.speed_multiplier));
    }

    if let Some(width) = profile.width {
        chain.push(format!(
            "scale={}:-1:flags={}",
            width,
            profile.scale_filter.ffmpeg_name()
        ));
    }

    chain.push(format!("fps={}", profile.fps));

    if let Some(overlay) = &profile.text_overlay {
        if let Some(text_filter) = drawtext_filter(overlay) {
            chain.push(text_filter);
        }
    }

    chain
}

/// Build the drawtext clause for an overlay; `None` when inactive.
pub fn drawtext_filter(overlay: &TextOverlay) -> Option<String> {
    if !overlay.is_active() {
        return None;
    }

    let text = escape_drawtext(&overlay.text);
    let (x, y) = overlay.position_expressions();

    let mut parts = vec![
        format!("text='{}'", text),
        format!("fontsize={}", overlay.font_size),
        format!("fontcolor={}", overlay.font_color),
        format!("x={}", x),
        format!("y={}", y),
    ];

    if !overlay.font_family.is_empty() {
        parts.push(format!("font='{}'", overlay.font_family));
    }

    if overlay.bold {
        parts.push("bold=1".to_string());
    }

    if overlay.outline_enabled {
        parts.push(format!("borderw={}", overlay.outline_width));
        parts.push(format!("bordercolor={}", overlay.outline_color));
    }

    if overlay.background_enabled {
        let alpha = (overlay.background_opacity * 255.0) as u32;
        parts.push("box=1".to_string());
        parts.push(format!(
            "boxcolor={}@{:.2}",
            overlay.background_color,
            f64::from(alpha) / 255.0
        ));
        parts.push(format!("boxborderw={}", overlay.padding_x / 2));
    }

    Some(format!("drawtext={}", parts.join(":")))
}

/// Escape the two characters that are syntactically significant inside
/// a drawtext `text='…'` argument.
fn escape_drawtext(text: &str) -> String {
    text.replace(':', "\\:").replace('\'', "\\'")
}

/// Palette-generation filter for stage 2.
pub fn palettegen_filter(profile: &GifExportProfile) -> String {
    let mut filter = format!("palettegen=max_colors={}", profile.colors);
    if profile.optimize_palette {
        filter.push_str(":stats_mode=diff");
    }
    filter
}

/// Palette-application clause, without stream labels.
pub fn paletteuse_filter(profile: &GifExportProfile) -> String {
    format!("paletteuse=dither={}", profile.dither.ffmpeg_name())
}

/// Full composition graph for stage 3: the clip stream (input 0) and
/// palette stream (input 1) through optional reverse/boomerang shaping
/// into palette application.
pub fn composition_graph(profile: &GifExportProfile) -> String {
    let paletteuse = paletteuse_filter(profile);

    if profile.boomerang {
        // Forward branch concatenated with its own reversal.
        format!(
            "[0:v]split[a][b];[b]reverse[r];[a][r]concat=n=2:v=1[v];[v][1:v]{}",
            paletteuse
        )
    } else if profile.reverse {
        format!("[0:v]reverse[v];[v][1:v]{}", paletteuse)
    } else {
        format!("[0:v][1:v]{}", paletteuse)
    }
}

/// Format seconds as `HH:MM:SS.mmm` for `-ss`/`-to` arguments.
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let hours = (seconds / 3600.0) as u64;
    let minutes = ((seconds % 3600.0) / 60.0) as u64;
    let secs = seconds % 60.0;
    format!("{:02}:{:02}:{:06.3}", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DitherMode, ScaleAlgorithm, TextPosition};

    #[test]
    fn default_profile_yields_frame_rate_only() {
        let chain = segment_filters(&GifExportProfile::default());
        assert_eq!(chain.build().as_deref(), Some("fps=15"));
    }

    #[test]
    fn full_profile_orders_clauses() {
        let profile = GifExportProfile {
            speed_multiplier: 2.0,
            width: Some(640),
            fps: 10,
            scale_filter: ScaleAlgorithm::Lanczos,
            ..GifExportProfile::default()
        };
        assert_eq!(
            segment_filters(&profile).build().as_deref(),
            Some("setpts=0.5*PTS,scale=640:-1:flags=lanczos,fps=10")
        );
    }

    #[test]
    fn building_twice_is_identical() {
        let profile = GifExportProfile {
            speed_multiplier: 1.5,
            width: Some(854),
            reverse: true,
            ..GifExportProfile::default()
        };
        assert_eq!(segment_filters(&profile), segment_filters(&profile));
        assert_eq!(composition_graph(&profile), composition_graph(&profile));
    }

    #[test]
    fn drawtext_escapes_significant_characters() {
        let overlay = TextOverlay {
            enabled: true,
            text: "it's 10:30".to_string(),
            ..TextOverlay::default()
        };
        let filter = drawtext_filter(&overlay).unwrap();
        assert!(filter.contains("text='it\\'s 10\\:30'"));
    }

    #[test]
    fn inactive_overlay_contributes_nothing() {
        let overlay = TextOverlay {
            enabled: false,
            text: "hidden".to_string(),
            ..TextOverlay::default()
        };
        assert!(drawtext_filter(&overlay).is_none());

        let profile = GifExportProfile {
            text_overlay: Some(overlay),
            ..GifExportProfile::default()
        };
        assert_eq!(segment_filters(&profile).build().as_deref(), Some("fps=15"));
    }

    #[test]
    fn drawtext_includes_background_box() {
        let overlay = TextOverlay {
            enabled: true,
            text: "caption".to_string(),
            position: TextPosition::BottomCenter,
            background_enabled: true,
            background_opacity: 0.5,
            ..TextOverlay::default()
        };
        let filter = drawtext_filter(&overlay).unwrap();
        assert!(filter.contains("x=(w-tw)/2"));
        assert!(filter.contains("box=1"));
        assert!(filter.contains("boxcolor=black@0.50"));
        assert!(filter.contains("boxborderw=8"));
    }

    #[test]
    fn palettegen_reflects_optimization() {
        let mut profile = GifExportProfile {
            colors: 128,
            ..GifExportProfile::default()
        };
        assert_eq!(
            palettegen_filter(&profile),
            "palettegen=max_colors=128:stats_mode=diff"
        );
        profile.optimize_palette = false;
        assert_eq!(palettegen_filter(&profile), "palettegen=max_colors=128");
    }

    #[test]
    fn paletteuse_maps_dither_names() {
        let mut profile = GifExportProfile::default();
        assert_eq!(paletteuse_filter(&profile), "paletteuse=dither=sierra2_4a");
        profile.dither = DitherMode::Bayer;
        assert_eq!(
            paletteuse_filter(&profile),
            "paletteuse=dither=bayer:bayer_scale=5"
        );
    }

    #[test]
    fn composition_graph_variants() {
        let mut profile = GifExportProfile::default();
        assert_eq!(
            composition_graph(&profile),
            "[0:v][1:v]paletteuse=dither=sierra2_4a"
        );

        profile.reverse = true;
        assert_eq!(
            composition_graph(&profile),
            "[0:v]reverse[v];[v][1:v]paletteuse=dither=sierra2_4a"
        );

        // Boomerang wins over plain reverse.
        profile.boomerang = true;
        assert_eq!(
            composition_graph(&profile),
            "[0:v]split[a][b];[b]reverse[r];[a][r]concat=n=2:v=1[v];[v][1:v]paletteuse=dither=sierra2_4a"
        );
    }

    #[test]
    fn timestamp_formatting() {
        assert_eq!(format_timestamp(0.0), "00:00:00.000");
        assert_eq!(format_timestamp(3723.5), "01:02:03.500");
        assert_eq!(format_timestamp(-4.0), "00:00:00.000");
    }
}
