//! Check engine availability.

use vid2vert_common::config::AppConfig;
use vid2vert_render_engine::EngineAvailability;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Vid2Vert Engine Check");
    println!("{}", "=".repeat(50));

    let availability = EngineAvailability::detect(&config.engine);
    report("ffmpeg", &config.engine.ffmpeg, availability.ffmpeg.as_deref());
    report("ffprobe", &config.engine.ffprobe, availability.ffprobe.as_deref());

    println!();
    if availability.is_available() {
        println!("ffmpeg and ffprobe are available. Vid2Vert is ready.");
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Missing executables: {}. Install ffmpeg or set engine paths in the config.",
            availability.missing().join(", ")
        ))
    }
}

fn report(name: &str, configured: &std::path::Path, found: Option<&std::path::Path>) {
    match found {
        Some(path) => println!("[OK] {name}: {}", path.display()),
        None => println!("[MISSING] {name}: {} not found", configured.display()),
    }
}
