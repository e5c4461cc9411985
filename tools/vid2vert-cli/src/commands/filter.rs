//! Print the crop filter for a keyframe file without transcoding.

use std::path::PathBuf;

use vid2vert_common::config::AppConfig;
use vid2vert_crop_model::keyframe::{Axis, KeyframeSequence};
use vid2vert_render_engine::probe::probe_dimensions;
use vid2vert_render_engine::{output_path_for, AxisExpr, CropFilterSpec};

pub async fn run(config: &AppConfig, source: PathBuf, keyframes: PathBuf) -> anyhow::Result<()> {
    let mut keyframes = KeyframeSequence::from_json_file(&keyframes)?;
    let output = output_path_for(&source, &config.output.prefix)?;
    let frame = probe_dimensions(&config.engine.ffprobe, &source).await?;

    keyframes.normalize(frame);
    let filter = CropFilterSpec::compile(&keyframes)?;

    println!("Source: {} ({frame})", source.display());
    println!("Output: {}", output.display());
    println!("Keyframes: {}", keyframes.len());
    for axis in Axis::FILTER_ORDER {
        println!("  {axis} = {}", AxisExpr::compile(&keyframes, axis));
    }
    println!();
    println!("{filter}");

    Ok(())
}
