//! Supervised crop transcode.
//!
//! A [`TranscodeJob`] walks `Idle → Probing → Running → Succeeded | Failed`.
//! All keyframe work happens before the engine is spawned; while it runs,
//! one task drains the progress stream, one drains diagnostics, and the
//! job itself waits for the exit status.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Child;
use tokio::sync::watch;
use vid2vert_common::config::{EngineConfig, OutputConfig};
use vid2vert_common::error::{CropError, CropResult};
use vid2vert_crop_model::keyframe::{FrameSize, Keyframe, KeyframeSequence};

use crate::command::{engine_command, EngineCommand};
use crate::filter::CropFilterSpec;
use crate::probe::{probe_dimensions, probe_duration};
use crate::progress::{parse_progress_line, percent};
use crate::sink::EventSink;

/// Diagnostic lines kept for the failure message.
const STDERR_TAIL_LINES: usize = 20;

/// Lifecycle of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Probing,
    Running,
    Succeeded,
    Failed(String),
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}

/// What a successful job produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscodeOutcome {
    pub output: PathBuf,
    pub frame: FrameSize,
    pub duration_secs: f64,
}

/// Destination for a cropped copy of `source`: same directory, `prefix`
/// prepended to the file name.
pub fn output_path_for(source: &Path, prefix: &str) -> CropResult<PathBuf> {
    let name = source
        .file_name()
        .ok_or_else(|| CropError::invalid_input(format!("{} has no file name", source.display())))?;

    let mut file_name = std::ffi::OsString::from(prefix);
    file_name.push(name);

    Ok(match source.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    })
}

/// One crop of one source video.
///
/// Keyframes are given in percent of the frame. Each call to
/// [`TranscodeJob::run`] probes, normalizes a fresh copy, and transcodes,
/// so a job can be re-run after a failure.
pub struct TranscodeJob {
    source: PathBuf,
    keyframes: Vec<Keyframe>,
    engine: EngineConfig,
    prefix: String,
    sink: Arc<dyn EventSink>,
    cancel_rx: Option<watch::Receiver<bool>>,
    state: Mutex<JobState>,
}

impl TranscodeJob {
    pub fn new(source: impl Into<PathBuf>, keyframes: Vec<Keyframe>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            source: source.into(),
            keyframes,
            engine: EngineConfig::default(),
            prefix: OutputConfig::default().prefix,
            sink,
            cancel_rx: None,
            state: Mutex::new(JobState::Idle),
        }
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Fail with [`CropError::Cancelled`] once the watched value is `true`,
    /// killing whichever prober or engine is running at the time.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    pub fn state(&self) -> JobState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Run the whole pipeline once.
    pub async fn run(&self) -> CropResult<TranscodeOutcome> {
        self.set_state(JobState::Idle);

        match self.execute().await {
            Ok(outcome) => {
                self.sink.progress(100.0);
                self.set_state(JobState::Succeeded);
                tracing::info!(output = %outcome.output.display(), "Transcode finished");
                Ok(outcome)
            }
            Err(err) => {
                self.set_state(JobState::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    async fn execute(&self) -> CropResult<TranscodeOutcome> {
        let mut keyframes = KeyframeSequence::new(self.keyframes.clone())?;
        let output = output_path_for(&self.source, &self.prefix)?;
        if !self.source.is_file() {
            return Err(CropError::FileNotFound {
                path: self.source.clone(),
            });
        }

        self.set_state(JobState::Probing);
        let probes = async {
            tokio::try_join!(
                probe_dimensions(&self.engine.ffprobe, &self.source),
                probe_duration(&self.engine.ffprobe, &self.source),
            )
        };
        let (frame, duration_secs) = match self.cancel_rx.clone() {
            // Dropping the probe future kills both ffprobe children.
            Some(cancel_rx) => tokio::select! {
                probed = probes => probed?,
                () = cancel_requested(cancel_rx) => {
                    tracing::info!(source = %self.source.display(), "Cancelling while probing");
                    return Err(CropError::Cancelled);
                }
            },
            None => probes.await?,
        };

        keyframes.normalize(frame);
        let filter = CropFilterSpec::compile(&keyframes)?;
        let command = EngineCommand::new(&self.source, &output, filter);

        self.set_state(JobState::Running);
        self.supervise(&command, duration_secs).await?;

        Ok(TranscodeOutcome {
            output,
            frame,
            duration_secs,
        })
    }

    async fn supervise(&self, command: &EngineCommand, duration_secs: f64) -> CropResult<()> {
        let ffmpeg = &self.engine.ffmpeg;
        let args = command.build_args();
        tracing::debug!(program = %ffmpeg.display(), ?args, "Spawning engine");

        let mut child = engine_command(ffmpeg)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CropError::transcode(format!("Failed to start {}: {e}", ffmpeg.display()), None)
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CropError::transcode("engine stdout was not captured", None))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| CropError::transcode("engine stderr was not captured", None))?;

        tracing::info!(
            pid = child.id(),
            source = %command.input.display(),
            output = %command.output.display(),
            duration_secs,
            "Engine started"
        );

        let sink = Arc::clone(&self.sink);
        let progress_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(elapsed_secs) = parse_progress_line(&line) {
                    let pct = percent(elapsed_secs, duration_secs);
                    tracing::info!(percent = pct, elapsed_secs, "Progress");
                    sink.progress(pct);
                }
            }
        });

        let diagnostics_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::debug!(target: "vid2vert::engine", "{line}");
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            tail
        });

        let status = self.wait_for_exit(&mut child).await;

        if progress_task.await.is_err() {
            tracing::warn!("Progress reader task panicked");
        }
        let stderr_tail = diagnostics_task.await.unwrap_or_default();

        let status = status?;
        if status.success() {
            return Ok(());
        }

        let diagnostics = stderr_tail.into_iter().collect::<Vec<_>>().join("\n");
        Err(CropError::transcode(
            format!("{} exited with {status}: {}", ffmpeg.display(), diagnostics.trim()),
            status.code(),
        ))
    }

    async fn wait_for_exit(&self, child: &mut Child) -> CropResult<ExitStatus> {
        let wait_err =
            |e: std::io::Error| CropError::transcode(format!("Failed to wait on engine: {e}"), None);

        let Some(cancel_rx) = self.cancel_rx.clone() else {
            return child.wait().await.map_err(wait_err);
        };

        tokio::select! {
            status = child.wait() => status.map_err(wait_err),
            () = cancel_requested(cancel_rx) => {
                tracing::info!(pid = child.id(), "Cancelling transcode, killing engine");
                if let Err(e) = child.kill().await {
                    tracing::warn!(error = %e, "Failed to kill engine");
                }
                Err(CropError::Cancelled)
            }
        }
    }

    fn set_state(&self, state: JobState) {
        tracing::debug!(source = %self.source.display(), ?state, "Job state");
        self.sink.state_changed(&state);
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }
}

/// Resolves once the watched value is `true`. Never resolves if the sender
/// is dropped first.
async fn cancel_requested(mut cancel_rx: watch::Receiver<bool>) {
    loop {
        if *cancel_rx.borrow_and_update() {
            return;
        }
        if cancel_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
