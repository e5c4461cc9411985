//! Crop a video along a keyframed path.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use vid2vert_common::config::AppConfig;
use vid2vert_crop_model::keyframe::KeyframeSequence;
use vid2vert_render_engine::{
    output_path_for, run_with_policy, EventSink, FailureAction, FailureHandler, JobFailure,
    TranscodeJob,
};

/// Renders progress on a single terminal line.
struct TerminalSink;

impl EventSink for TerminalSink {
    fn progress(&self, percent: f64) {
        print!("\r  Progress: {percent:5.1}%  ");
        let _ = std::io::stdout().flush();
    }

    fn fatal(&self, message: &str) {
        eprintln!("\nError: {message}");
    }
}

pub async fn run(
    config: &AppConfig,
    source: PathBuf,
    keyframes: PathBuf,
    prefix: Option<String>,
) -> anyhow::Result<()> {
    let keyframes = KeyframeSequence::from_json_file(&keyframes)?;
    let prefix = prefix.unwrap_or_else(|| config.output.prefix.clone());

    println!("Cropping: {}", source.display());
    println!("  Output: {}", output_path_for(&source, &prefix)?.display());
    println!("  Keyframes: {}", keyframes.len());

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling");
            let _ = cancel_tx.send(true);
        }
    });

    let job = TranscodeJob::new(source, keyframes.into(), Arc::new(TerminalSink))
        .with_engine(config.engine.clone())
        .with_prefix(prefix)
        .with_cancel(cancel_rx);
    let handler = FailureHandler::new(config.failure_policy);

    match run_with_policy(&job, &handler).await {
        Ok(outcome) => {
            println!(
                "\nCrop complete: {} ({}, {:.1}s)",
                outcome.output.display(),
                outcome.frame,
                outcome.duration_secs
            );
            Ok(())
        }
        Err(failure) => Err(failure_error(failure)),
    }
}

/// Every failure exits non-zero; the message tells the policies apart.
fn failure_error(failure: JobFailure) -> anyhow::Error {
    let context = match failure.action {
        FailureAction::Terminate => "Crop failed, terminating".to_string(),
        _ => format!("Crop failed after {} attempt(s)", failure.attempts),
    };
    anyhow::Error::new(failure).context(context)
}
