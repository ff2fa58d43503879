//! GIF Forge core - video-to-GIF export logic with no UI dependencies.
//!
//! The crate drives an external ffmpeg through a three-stage pipeline
//! (segment extraction, palette generation, palette-constrained
//! composition) and predicts output size ahead of encoding. It can be
//! used by a GUI application or the bundled CLI.

pub mod config;
pub mod estimate;
pub mod filters;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod probe;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
