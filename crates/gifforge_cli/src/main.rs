//! GIF Forge CLI - convert video segments into GIFs from the terminal.
//!
//! Usage:
//!   gifforge probe <PATH>         Show probed media information
//!   gifforge estimate <PATH>      Predict output size for a profile
//!   gifforge export <PATH>        Run the export pipeline
//!   gifforge presets              List built-in export presets

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use gifforge_core::config::ConfigManager;
use gifforge_core::estimate::{estimate_profile_size, format_size_mb};
use gifforge_core::logging::{init_tracing, ExportLogger, LogLevel};
use gifforge_core::models::{
    builtin_presets, DitherMode, ExportMode, GifExportProfile, MediaFile, MediaInfo,
    ScaleAlgorithm, Segment, TextOverlay, TextPosition,
};
use gifforge_core::pipeline::{ExportStatus, GifExporter, GifExportTask};
use gifforge_core::probe::probe_media_info;

#[derive(Parser)]
#[command(
    name = "gifforge",
    about = "Convert video segments into palette-optimized GIFs",
    version
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file
    #[arg(long, global = true, default_value = "gifforge.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show probed media information for a source file
    Probe {
        /// Source video file
        path: PathBuf,

        /// Print the raw probe result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Predict the output size for a profile without encoding
    Estimate {
        /// Source video file
        path: PathBuf,

        /// Segment start in seconds (defaults to 0)
        #[arg(long)]
        start: Option<f64>,

        /// Segment end in seconds (defaults to the source duration)
        #[arg(long)]
        end: Option<f64>,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Export a GIF from a source file
    Export {
        /// Source video file
        path: PathBuf,

        /// Destination GIF path
        #[arg(short, long)]
        output: PathBuf,

        /// Segment start in seconds (omit for the full video)
        #[arg(long)]
        start: Option<f64>,

        /// Segment end in seconds (omit for the full video)
        #[arg(long)]
        end: Option<f64>,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// List the built-in export presets
    Presets,
}

/// Profile options shared by `estimate` and `export`.
#[derive(Args)]
struct ProfileArgs {
    /// Start from a built-in preset by name
    #[arg(long)]
    preset: Option<String>,

    /// Target output width in pixels (omit to keep the source width)
    #[arg(long)]
    width: Option<u32>,

    /// Output frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Palette size: 32, 64, 128, or 256
    #[arg(long)]
    colors: Option<u16>,

    /// Dithering: none, bayer, sierra2_4a, floyd_steinberg
    #[arg(long)]
    dither: Option<String>,

    /// Scaling algorithm: lanczos, bicubic, bilinear
    #[arg(long)]
    scale: Option<String>,

    /// Playback speed multiplier (0.25-4.0)
    #[arg(long)]
    speed: Option<f64>,

    /// Reverse playback
    #[arg(long)]
    reverse: bool,

    /// Play forward then backward
    #[arg(long)]
    boomerang: bool,

    /// Loop count: 0 = forever, -1 = play once, N = repeat N times
    #[arg(long)]
    loops: Option<i32>,

    /// Lossy compression strength (0-200)
    #[arg(long)]
    lossy: Option<u32>,

    /// Burn this text into every frame
    #[arg(long)]
    text: Option<String>,

    /// Text anchor: bottom_left, bottom_center, ..., top_right
    #[arg(long, default_value = "bottom_left")]
    text_position: String,

    /// Text font size
    #[arg(long, default_value = "24")]
    text_size: u32,
}

impl ProfileArgs {
    fn build(&self, defaults: GifExportProfile) -> GifExportProfile {
        let mut profile = match &self.preset {
            Some(name) => GifExportProfile::preset(name),
            None => defaults,
        };

        if self.width.is_some() {
            profile.width = self.width;
        }
        if let Some(fps) = self.fps {
            profile.fps = fps;
        }
        if let Some(colors) = self.colors {
            profile.colors = colors;
        }
        if let Some(dither) = &self.dither {
            profile.dither = DitherMode::from_name(dither);
        }
        if let Some(scale) = &self.scale {
            profile.scale_filter = ScaleAlgorithm::from_name(scale);
        }
        if let Some(speed) = self.speed {
            profile.speed_multiplier = speed;
        }
        if let Some(loops) = self.loops {
            profile.loop_count = loops;
        }
        if self.lossy.is_some() {
            profile.lossy_compression = self.lossy;
        }
        profile.reverse = profile.reverse || self.reverse;
        profile.boomerang = profile.boomerang || self.boomerang;

        if let Some(text) = &self.text {
            profile.text_overlay = Some(TextOverlay {
                enabled: true,
                text: text.clone(),
                position: parse_position(&self.text_position),
                font_size: self.text_size,
                ..TextOverlay::default()
            });
        }

        profile
    }
}

fn parse_position(name: &str) -> TextPosition {
    match name {
        "bottom_left" => TextPosition::BottomLeft,
        "bottom_center" => TextPosition::BottomCenter,
        "bottom_right" => TextPosition::BottomRight,
        "center_left" => TextPosition::CenterLeft,
        "center" => TextPosition::Center,
        "center_right" => TextPosition::CenterRight,
        "top_left" => TextPosition::TopLeft,
        "top_center" => TextPosition::TopCenter,
        "top_right" => TextPosition::TopRight,
        _ => TextPosition::BottomLeft,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    });

    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    match cli.command {
        Commands::Probe { path, json } => cmd_probe(&config, &path, json),
        Commands::Estimate {
            path,
            start,
            end,
            profile,
        } => cmd_estimate(&config, &path, start, end, &profile),
        Commands::Export {
            path,
            output,
            start,
            end,
            profile,
        } => cmd_export(&config, &path, &output, start, end, &profile),
        Commands::Presets => cmd_presets(),
    }
}

fn probe_source(config: &ConfigManager, path: &PathBuf) -> anyhow::Result<MediaInfo> {
    let ffprobe = PathBuf::from(&config.settings().tools.ffprobe);
    probe_media_info(&ffprobe, path).with_context(|| format!("probing {}", path.display()))
}

fn cmd_probe(config: &ConfigManager, path: &PathBuf, json: bool) -> anyhow::Result<()> {
    let info = probe_source(config, path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info.badge_text());
    }
    Ok(())
}

fn cmd_estimate(
    config: &ConfigManager,
    path: &PathBuf,
    start: Option<f64>,
    end: Option<f64>,
    profile_args: &ProfileArgs,
) -> anyhow::Result<()> {
    let info = probe_source(config, path)?;
    let profile = profile_args.build(config.settings().default_profile());

    let start = start.unwrap_or(0.0);
    let end = end.unwrap_or(info.duration);
    let duration = (end - start).max(0.0);

    let size_mb = estimate_profile_size(&info, duration, &profile);
    println!(
        "Estimated size for {:.1}s at {} fps, {} colors, dither {}: {}",
        duration,
        profile.fps,
        profile.colors,
        profile.dither,
        format_size_mb(size_mb)
    );
    if let Some(target) = profile.target_max_size_mb {
        if size_mb > target {
            println!("Warning: estimate exceeds the {:.1} MB preset target", target);
        }
    }
    Ok(())
}

fn cmd_export(
    config: &ConfigManager,
    path: &PathBuf,
    output: &PathBuf,
    start: Option<f64>,
    end: Option<f64>,
    profile_args: &ProfileArgs,
) -> anyhow::Result<()> {
    config.ensure_dirs_exist()?;

    let file = MediaFile::new(path.clone());
    let profile = profile_args.build(config.settings().default_profile());

    let mode = if start.is_none() && end.is_none() {
        ExportMode::FullVideo
    } else {
        ExportMode::SingleSegment
    };

    let end = match end {
        Some(end) => end,
        None => probe_source(config, path)?.duration,
    };
    let segment = Segment::new(&file.id, start.unwrap_or(0.0), end, 0);

    let mut lookup = HashMap::new();
    lookup.insert(file.id.clone(), file.path.clone());

    let task = GifExportTask::new(
        PathBuf::from(&config.settings().tools.ffmpeg),
        vec![segment],
        lookup,
        profile,
        output.clone(),
        mode,
    )
    .with_temp_root(config.temp_root());

    let export_name = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "export".to_string());
    let logger = Arc::new(ExportLogger::new(
        export_name,
        config.logs_folder(),
        config.settings().logging.to_log_config(),
        None,
    )?);

    tracing::debug!("log file: {}", logger.log_path().display());

    let report = GifExporter::new(task, logger)
        .with_progress(Box::new(|percent, message| {
            println!("[{percent:3}%] {message}");
        }))
        .run();

    match report.status {
        ExportStatus::Succeeded => {
            println!(
                "Wrote {} ({})",
                report.message,
                format_size_mb(report.size_mb())
            );
            Ok(())
        }
        ExportStatus::Cancelled => bail!("export cancelled"),
        ExportStatus::Failed => bail!("export failed: {}", report.message),
    }
}

fn cmd_presets() -> anyhow::Result<()> {
    for preset in builtin_presets() {
        let width = preset
            .width
            .map(|w| w.to_string())
            .unwrap_or_else(|| "source".to_string());
        let target = preset
            .target_max_size_mb
            .map(|t| format!("{:.0} MB", t))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<14} width={:<7} fps={:<3} colors={:<4} dither={:<16} target={}",
            preset.preset_name, width, preset.fps, preset.colors, preset.dither, target
        );
    }
    Ok(())
}
