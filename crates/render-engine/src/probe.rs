//! Source metadata queries via ffprobe.

use std::path::Path;

use vid2vert_common::error::{CropError, CropResult};
use vid2vert_crop_model::keyframe::FrameSize;

use crate::command::engine_command;

/// Width and height of the first video stream.
pub async fn probe_dimensions(ffprobe: &Path, source: &Path) -> CropResult<FrameSize> {
    let stdout = run_probe(
        ffprobe,
        &[
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=p=0",
        ],
        source,
        "dimensions",
    )
    .await?;
    let size = parse_dimensions(&stdout)?;
    tracing::debug!(source = %source.display(), frame = %size, "Probed dimensions");
    Ok(size)
}

/// Container duration in seconds.
pub async fn probe_duration(ffprobe: &Path, source: &Path) -> CropResult<f64> {
    let stdout = run_probe(
        ffprobe,
        &[
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ],
        source,
        "duration",
    )
    .await?;
    let duration = parse_duration(&stdout)?;
    tracing::debug!(source = %source.display(), duration_secs = duration, "Probed duration");
    Ok(duration)
}

async fn run_probe(ffprobe: &Path, args: &[&str], source: &Path, what: &str) -> CropResult<String> {
    let output = engine_command(ffprobe)
        .args(args)
        .arg(source)
        .output()
        .await
        .map_err(|e| CropError::probe(format!("Failed to run {}: {e}", ffprobe.display())))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CropError::probe(format!(
            "{what} query for {} failed ({}): {}",
            source.display(),
            output.status,
            stderr.trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|_| CropError::probe(format!("{what} query returned non-UTF-8 output")))
}

/// Parse `width,height` as printed by `-of csv=p=0`.
///
/// Some containers append a trailing separator; extra empty fields are ignored.
pub fn parse_dimensions(output: &str) -> CropResult<FrameSize> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| CropError::probe("dimension query returned no output"))?;

    let mut fields = line.split(',').map(str::trim).filter(|f| !f.is_empty());
    let parse = |field: Option<&str>| {
        field
            .and_then(|f| f.parse::<u32>().ok())
            .ok_or_else(|| CropError::probe(format!("unparseable dimensions: {line:?}")))
    };
    let width = parse(fields.next())?;
    let height = parse(fields.next())?;

    if width == 0 || height == 0 {
        return Err(CropError::probe(format!("video stream reports {width}x{height}")));
    }
    Ok(FrameSize::new(width, height))
}

/// Parse a bare seconds value.
pub fn parse_duration(output: &str) -> CropResult<f64> {
    let trimmed = output.trim();
    match trimmed.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs),
        _ => Err(CropError::probe(format!("unparseable duration: {trimmed:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("1920,1080\n").unwrap(), FrameSize::new(1920, 1080));
        assert_eq!(parse_dimensions("\n640,360,\n").unwrap(), FrameSize::new(640, 360));
    }

    #[test]
    fn test_parse_dimensions_rejects_garbage() {
        for bad in ["", "1920", "1920x1080", "a,b", "0,1080"] {
            let err = parse_dimensions(bad).unwrap_err();
            assert!(matches!(err, CropError::Probe { .. }), "{bad:?}");
        }
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("12.345000\n").unwrap(), 12.345);
        assert_eq!(parse_duration("0").unwrap(), 0.0);
        assert!(parse_duration("N/A").is_err());
        assert!(parse_duration("-3").is_err());
    }

    #[tokio::test]
    async fn test_missing_ffprobe_is_probe_failure() {
        let err = probe_duration(
            Path::new("/nonexistent/vid2vert-ffprobe"),
            Path::new("in.mp4"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CropError::Probe { .. }));
    }
}
