//! Text overlay configuration.

use serde::{Deserialize, Serialize};

use super::enums::TextPosition;

/// Text overlay burned into every frame via ffmpeg's drawtext filter.
///
/// When `enabled` is false or `text` is empty, the overlay contributes
/// nothing to any filter graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub enabled: bool,
    pub text: String,
    pub position: TextPosition,
    /// X coordinate in pixels, used only with `TextPosition::Custom`.
    pub custom_x: i32,
    /// Y coordinate in pixels, used only with `TextPosition::Custom`.
    pub custom_y: i32,
    /// Horizontal inset from the anchored edge.
    pub padding_x: u32,
    /// Vertical inset from the anchored edge.
    pub padding_y: u32,
    pub font_size: u32,
    pub font_color: String,
    pub font_family: String,
    pub bold: bool,
    pub outline_enabled: bool,
    pub outline_color: String,
    pub outline_width: u32,
    pub background_enabled: bool,
    pub background_color: String,
    /// Background box opacity, 0.0 to 1.0.
    pub background_opacity: f64,
}

impl Default for TextOverlay {
    fn default() -> Self {
        Self {
            enabled: false,
            text: String::new(),
            position: TextPosition::BottomLeft,
            custom_x: 10,
            custom_y: 10,
            padding_x: 16,
            padding_y: 16,
            font_size: 24,
            font_color: "white".to_string(),
            font_family: "Arial".to_string(),
            bold: false,
            outline_enabled: true,
            outline_color: "black".to_string(),
            outline_width: 2,
            background_enabled: false,
            background_color: "black".to_string(),
            background_opacity: 0.5,
        }
    }
}

impl TextOverlay {
    /// Whether this overlay should appear in a filter graph at all.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.text.is_empty()
    }

    /// Drawtext x/y expressions for the configured anchor.
    ///
    /// The expressions use drawtext's frame (`w`, `h`) and rendered-text
    /// (`tw`, `th`) variables; `Custom` maps to literal pixel
    /// coordinates.
    pub fn position_expressions(&self) -> (String, String) {
        let px = self.padding_x;
        let py = self.padding_y;
        match self.position {
            TextPosition::Custom => (self.custom_x.to_string(), self.custom_y.to_string()),
            TextPosition::BottomLeft => (format!("{px}"), format!("h-th-{py}")),
            TextPosition::BottomCenter => ("(w-tw)/2".to_string(), format!("h-th-{py}")),
            TextPosition::BottomRight => (format!("w-tw-{px}"), format!("h-th-{py}")),
            TextPosition::CenterLeft => (format!("{px}"), "(h-th)/2".to_string()),
            TextPosition::Center => ("(w-tw)/2".to_string(), "(h-th)/2".to_string()),
            TextPosition::CenterRight => (format!("w-tw-{px}"), "(h-th)/2".to_string()),
            TextPosition::TopLeft => (format!("{px}"), format!("{py}")),
            TextPosition::TopCenter => ("(w-tw)/2".to_string(), format!("{py}")),
            TextPosition::TopRight => (format!("w-tw-{px}"), format!("{py}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_when_disabled_or_empty() {
        let mut overlay = TextOverlay::default();
        assert!(!overlay.is_active());
        overlay.enabled = true;
        assert!(!overlay.is_active());
        overlay.text = "hello".to_string();
        assert!(overlay.is_active());
    }

    #[test]
    fn anchor_expressions_cover_all_presets() {
        let mut overlay = TextOverlay::default();

        overlay.position = TextPosition::BottomLeft;
        assert_eq!(
            overlay.position_expressions(),
            ("16".to_string(), "h-th-16".to_string())
        );

        overlay.position = TextPosition::Center;
        assert_eq!(
            overlay.position_expressions(),
            ("(w-tw)/2".to_string(), "(h-th)/2".to_string())
        );

        overlay.position = TextPosition::TopRight;
        assert_eq!(
            overlay.position_expressions(),
            ("w-tw-16".to_string(), "16".to_string())
        );
    }

    #[test]
    fn custom_position_uses_literal_pixels() {
        let overlay = TextOverlay {
            position: TextPosition::Custom,
            custom_x: 42,
            custom_y: 7,
            ..TextOverlay::default()
        };
        assert_eq!(
            overlay.position_expressions(),
            ("42".to_string(), "7".to_string())
        );
    }
}
