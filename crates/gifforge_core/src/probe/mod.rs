//! Source metadata probing via ffprobe.
//!
//! Probing is an external collaborator: a failure here means "metadata
//! unavailable" and never aborts an in-flight export. A watchdog kills
//! ffprobe if it produces no verdict within [`PROBE_TIMEOUT`].

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use serde_json::Value;
use thiserror::Error;

use crate::models::{MediaFile, MediaInfo};

/// How long a single probe may run before it is killed.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while probing a source file.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to run {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("{tool} exited with code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    #[error("probe timed out after {0:?}")]
    TimedOut(Duration),

    #[error("no video stream found in {0}")]
    NoVideoStream(PathBuf),

    #[error("failed to parse probe output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Probe the first video stream of a media file.
pub fn probe_media_info(ffprobe: &Path, media: &Path) -> ProbeResult<MediaInfo> {
    if !media.exists() {
        return Err(ProbeError::FileNotFound(media.to_path_buf()));
    }

    tracing::debug!("probing {}", media.display());

    let mut child = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_streams",
            "-select_streams",
            "v:0",
            "-show_format",
            "-of",
            "json",
        ])
        .arg(media)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ProbeError::ToolFailed {
            tool: "ffprobe".to_string(),
            message: e.to_string(),
        })?;

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if started.elapsed() > PROBE_TIMEOUT {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ProbeError::TimedOut(PROBE_TIMEOUT));
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                return Err(ProbeError::ToolFailed {
                    tool: "ffprobe".to_string(),
                    message: e.to_string(),
                })
            }
        }
    };

    let mut stdout = Vec::new();
    if let Some(mut pipe) = child.stdout.take() {
        let _ = pipe.read_to_end(&mut stdout);
    }

    if !status.success() {
        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            let _ = pipe.read_to_string(&mut stderr);
        }
        return Err(ProbeError::CommandFailed {
            tool: "ffprobe".to_string(),
            exit_code: status.code().unwrap_or(-1),
            message: stderr.trim().to_string(),
        });
    }

    let json: Value = serde_json::from_slice(&stdout)?;
    parse_media_json(&json, media)
}

/// Probe several sources concurrently, one worker per file.
///
/// Results are keyed by file id, so delivery order does not matter.
pub fn probe_sources(
    ffprobe: &Path,
    files: &[MediaFile],
) -> HashMap<String, ProbeResult<MediaInfo>> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = files
            .iter()
            .map(|file| {
                let id = file.id.clone();
                let handle = scope.spawn(move || probe_media_info(ffprobe, &file.path));
                (id, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(id, handle)| {
                let result = handle.join().unwrap_or_else(|_| {
                    Err(ProbeError::ToolFailed {
                        tool: "ffprobe".to_string(),
                        message: "probe worker panicked".to_string(),
                    })
                });
                (id, result)
            })
            .collect()
    })
}

/// Parse the JSON report from ffprobe into [`MediaInfo`].
fn parse_media_json(json: &Value, media: &Path) -> ProbeResult<MediaInfo> {
    let stream = json
        .get("streams")
        .and_then(|s| s.as_array())
        .and_then(|s| s.first())
        .ok_or_else(|| ProbeError::NoVideoStream(media.to_path_buf()))?;
    let format = json.get("format");

    let (fps_num, fps_den) = stream
        .get("r_frame_rate")
        .and_then(|r| r.as_str())
        .map(parse_rational)
        .unwrap_or((30, 1));

    let width = stream.get("width").and_then(|w| w.as_u64()).unwrap_or(0) as u32;
    let height = stream.get("height").and_then(|h| h.as_u64()).unwrap_or(0) as u32;

    // Prefer the stream duration, falling back to the container's.
    let duration = number_field(Some(stream), "duration")
        .or_else(|| number_field(format, "duration"))
        .unwrap_or(0.0);

    let codec = stream
        .get("codec_name")
        .and_then(|c| c.as_str())
        .unwrap_or("unknown")
        .to_string();
    let pix_fmt = stream
        .get("pix_fmt")
        .and_then(|p| p.as_str())
        .unwrap_or("unknown")
        .to_string();

    let bitrate = number_field(Some(stream), "bit_rate")
        .or_else(|| number_field(format, "bit_rate"))
        .map(|b| b as u64);

    Ok(MediaInfo {
        width,
        height,
        fps_num,
        fps_den,
        duration,
        codec,
        pix_fmt,
        bitrate,
    })
}

/// Read a numeric field that ffprobe reports as either a string or a number.
fn number_field(value: Option<&Value>, key: &str) -> Option<f64> {
    let field = value?.get(key)?;
    field
        .as_str()
        .and_then(|s| s.parse().ok())
        .or_else(|| field.as_f64())
}

/// Parse a frame-rate string like `30000/1001` or a bare `25` into a
/// numerator/denominator pair.
fn parse_rational(rate: &str) -> (u32, u32) {
    if let Some((num, den)) = rate.split_once('/') {
        if let (Ok(n), Ok(d)) = (num.parse(), den.parse()) {
            return (n, d);
        }
    }
    match rate.parse::<f64>() {
        Ok(value) if value > 0.0 => (value as u32, 1),
        _ => (30, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn probe_rejects_missing_file() {
        let result = probe_media_info(Path::new("ffprobe"), Path::new("/nonexistent/clip.mp4"));
        assert!(matches!(result, Err(ProbeError::FileNotFound(_))));
    }

    #[test]
    fn parse_rational_forms() {
        assert_eq!(parse_rational("30000/1001"), (30000, 1001));
        assert_eq!(parse_rational("25"), (25, 1));
        assert_eq!(parse_rational("29.97"), (29, 1));
        assert_eq!(parse_rational("garbage"), (30, 1));
    }

    #[test]
    fn parses_full_stream_report() {
        let json = json!({
            "streams": [{
                "width": 1920,
                "height": 1080,
                "r_frame_rate": "24000/1001",
                "duration": "12.512000",
                "codec_name": "hevc",
                "pix_fmt": "yuv420p10le",
                "bit_rate": "8000000"
            }],
            "format": { "duration": "12.600000" }
        });
        let info = parse_media_json(&json, Path::new("clip.mkv")).unwrap();
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert_eq!((info.fps_num, info.fps_den), (24000, 1001));
        assert!((info.duration - 12.512).abs() < 1e-9);
        assert_eq!(info.codec, "hevc");
        assert_eq!(info.bitrate, Some(8_000_000));
    }

    #[test]
    fn falls_back_to_container_fields() {
        let json = json!({
            "streams": [{
                "width": 640,
                "height": 360,
                "r_frame_rate": "30/1",
                "codec_name": "vp9"
            }],
            "format": { "duration": "4.5", "bit_rate": "500000" }
        });
        let info = parse_media_json(&json, Path::new("clip.webm")).unwrap();
        assert!((info.duration - 4.5).abs() < 1e-9);
        assert_eq!(info.bitrate, Some(500_000));
        assert_eq!(info.pix_fmt, "unknown");
    }

    #[test]
    fn empty_stream_list_is_a_probe_failure() {
        let json = json!({ "streams": [], "format": {} });
        let result = parse_media_json(&json, Path::new("audio.flac"));
        assert!(matches!(result, Err(ProbeError::NoVideoStream(_))));
    }

    #[test]
    fn probe_sources_keys_results_by_id() {
        let files = vec![
            MediaFile::new("/nonexistent/a.mp4"),
            MediaFile::new("/nonexistent/b.mp4"),
        ];
        let results = probe_sources(Path::new("ffprobe"), &files);
        assert_eq!(results.len(), 2);
        for file in &files {
            assert!(matches!(
                results.get(&file.id),
                Some(Err(ProbeError::FileNotFound(_)))
            ));
        }
    }
}
