//! Vid2Vert CLI — Crop videos along keyframed paths.
//!
//! Usage:
//!   vid2vert crop <SOURCE> --keyframes <FILE>     Crop and transcode a video
//!   vid2vert filter <SOURCE> --keyframes <FILE>   Print the crop filter (dry run)
//!   vid2vert probe <SOURCE>                       Show dimensions and duration
//!   vid2vert check                                Check ffmpeg/ffprobe availability
//!   vid2vert serve <SOURCE>                       Serve a video for preview

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vid2vert_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "vid2vert",
    about = "Turn landscape video into vertical video by cropping along keyframes",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop a video along a keyframed path
    Crop {
        /// Source video
        source: PathBuf,

        /// JSON array of keyframes ({time, x, y, w, h}, coordinates in percent)
        #[arg(short, long)]
        keyframes: PathBuf,

        /// Output file name prefix (overrides the configured prefix)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Print the crop filter and output path without transcoding
    Filter {
        /// Source video
        source: PathBuf,

        /// JSON array of keyframes
        #[arg(short, long)]
        keyframes: PathBuf,
    },

    /// Show a video's dimensions and duration
    Probe {
        /// Source video
        source: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check that ffmpeg and ffprobe can be found
    Check,

    /// Serve a video at /lastVideo for preview
    Serve {
        /// Video to open
        source: PathBuf,

        /// Address to bind (overrides the configured address)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    vid2vert_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Crop {
            source,
            keyframes,
            prefix,
        } => commands::crop::run(&config, source, keyframes, prefix).await,
        Commands::Filter { source, keyframes } => {
            commands::filter::run(&config, source, keyframes).await
        }
        Commands::Probe { source, json } => commands::probe::run(&config, source, json).await,
        Commands::Check => commands::check::run(&config),
        Commands::Serve { source, bind } => commands::serve::run(&config, source, bind).await,
    }
}
