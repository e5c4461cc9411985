//! Serve a video for preview until interrupted.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use vid2vert_common::config::AppConfig;
use vid2vert_crop_model::session::Session;

pub async fn run(config: &AppConfig, source: PathBuf, bind: Option<SocketAddr>) -> anyhow::Result<()> {
    let addr = match bind {
        Some(addr) => addr,
        None => config
            .preview
            .bind
            .parse()
            .with_context(|| format!("Invalid preview.bind address: {}", config.preview.bind))?,
    };

    let session = Session::new();
    let opened = session.open(&source)?;
    println!("Opened: {}", opened.name);
    println!("  Location: {}", opened.location.display());

    let server = vid2vert_preview_server::serve(session, addr).await?;
    println!("Serving at {} (Ctrl-C to stop)", server.url());

    tokio::signal::ctrl_c().await?;
    server.shutdown().await?;
    Ok(())
}
