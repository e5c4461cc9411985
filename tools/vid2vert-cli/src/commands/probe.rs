//! Show source video metadata.

use std::path::PathBuf;

use vid2vert_common::config::AppConfig;
use vid2vert_render_engine::probe::{probe_dimensions, probe_duration};

pub async fn run(config: &AppConfig, source: PathBuf, json: bool) -> anyhow::Result<()> {
    let ffprobe = &config.engine.ffprobe;
    let (frame, duration_secs) = tokio::try_join!(
        probe_dimensions(ffprobe, &source),
        probe_duration(ffprobe, &source),
    )?;

    if json {
        let report = serde_json::json!({
            "source": source,
            "width": frame.width,
            "height": frame.height,
            "duration_secs": duration_secs,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Source: {}", source.display());
        println!("  Resolution: {frame}");
        println!("  Duration: {duration_secs:.3}s");
    }

    Ok(())
}
