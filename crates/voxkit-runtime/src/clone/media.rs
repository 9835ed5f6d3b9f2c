//! Reference clip extraction with ffprobe / ffmpeg.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::CloneError;
use crate::tool::run_tool;

/// Shortest usable reference clip, in seconds.
pub const MIN_CLIP_SECS: f64 = 3.0;
/// Longest usable reference clip, in seconds.
pub const MAX_CLIP_SECS: f64 = 30.0;

const PROBE_TIMEOUT: Duration = Duration::from_secs(30);
const EXTRACT_TIMEOUT: Duration = Duration::from_secs(120);

/// Sample rate of extracted reference clips.
pub const CLIP_SAMPLE_RATE: u32 = 22_050;

/// Check a `[start, end)` clip range and return its length.
///
/// Bounds are inclusive: exactly 3 s and exactly 30 s are accepted.
pub fn validate_clip(start: f64, end: f64) -> Result<f64, CloneError> {
    if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
        return Err(CloneError::InvalidRange { start, end });
    }
    let len = end - start;
    if len < MIN_CLIP_SECS {
        return Err(CloneError::ClipTooShort {
            min: MIN_CLIP_SECS,
            actual: len,
        });
    }
    if len > MAX_CLIP_SECS {
        return Err(CloneError::ClipTooLong {
            max: MAX_CLIP_SECS,
            actual: len,
        });
    }
    Ok(len)
}

/// Locations of the ffmpeg tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTools {
    pub ffprobe: PathBuf,
    pub ffmpeg: PathBuf,
}

impl Default for MediaTools {
    fn default() -> Self {
        Self {
            ffprobe: PathBuf::from("ffprobe"),
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

impl MediaTools {
    /// Duration of `media` in seconds.
    pub async fn probe_duration(&self, media: &Path) -> Result<f64, CloneError> {
        let output = run_tool(
            "ffprobe",
            &self.ffprobe,
            [
                OsStr::new("-v"),
                OsStr::new("error"),
                OsStr::new("-show_entries"),
                OsStr::new("format=duration"),
                OsStr::new("-of"),
                OsStr::new("default=noprint_wrappers=1:nokey=1"),
                media.as_os_str(),
            ],
            PROBE_TIMEOUT,
        )
        .await?;

        let raw = output.stdout.trim();
        let duration = raw
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| CloneError::BadDuration(raw.to_string()))?;
        debug!(media = %media.display(), duration, "Probed media duration");
        Ok(duration)
    }

    /// Cut `[start, start + len)` out of `media` as a mono 22.05 kHz WAV.
    pub async fn extract_clip(
        &self,
        media: &Path,
        start: f64,
        len: f64,
        dest: &Path,
    ) -> Result<(), CloneError> {
        let start = format!("{start:.3}");
        let len = format!("{len:.3}");
        let rate = CLIP_SAMPLE_RATE.to_string();
        run_tool(
            "ffmpeg",
            &self.ffmpeg,
            [
                OsStr::new("-y"),
                OsStr::new("-ss"),
                OsStr::new(&start),
                OsStr::new("-t"),
                OsStr::new(&len),
                OsStr::new("-i"),
                media.as_os_str(),
                OsStr::new("-ac"),
                OsStr::new("1"),
                OsStr::new("-ar"),
                OsStr::new(&rate),
                dest.as_os_str(),
            ],
            EXTRACT_TIMEOUT,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_bounds_are_inclusive() {
        assert_eq!(validate_clip(0.0, 3.0).unwrap(), 3.0);
        assert_eq!(validate_clip(10.0, 40.0).unwrap(), 30.0);
        assert!(matches!(
            validate_clip(0.0, 2.9),
            Err(CloneError::ClipTooShort { .. })
        ));
        assert!(matches!(
            validate_clip(0.0, 30.5),
            Err(CloneError::ClipTooLong { .. })
        ));
    }

    #[test]
    fn rejects_inverted_or_negative_ranges() {
        assert!(matches!(
            validate_clip(5.0, 5.0),
            Err(CloneError::InvalidRange { .. })
        ));
        assert!(matches!(
            validate_clip(-1.0, 5.0),
            Err(CloneError::InvalidRange { .. })
        ));
        assert!(matches!(
            validate_clip(0.0, f64::NAN),
            Err(CloneError::InvalidRange { .. })
        ));
    }

    #[tokio::test]
    async fn missing_ffprobe_is_tagged_not_found() {
        let tools = MediaTools {
            ffprobe: PathBuf::from("/nonexistent/voxkit/ffprobe"),
            ffmpeg: PathBuf::from("/nonexistent/voxkit/ffmpeg"),
        };
        let err = tools
            .probe_duration(Path::new("/tmp/whatever.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, CloneError::Tool(e) if e.is_not_found()));
    }
}
