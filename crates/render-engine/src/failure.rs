//! Failure policy for transcode jobs.

use vid2vert_common::config::FailurePolicy;
use vid2vert_common::error::{CropError, ErrorKind};

use crate::transcode::{TranscodeJob, TranscodeOutcome};

/// What the host should do about a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Run the job again.
    Retry,
    /// Report the error and keep going.
    Surface,
    /// Report the error and shut the host down.
    Terminate,
}

/// Maps errors to actions under a [`FailurePolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureHandler {
    policy: FailurePolicy,
}

impl FailureHandler {
    pub fn new(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Decide how to react to the `attempt`-th failure (1-based).
    ///
    /// Only engine failures are subject to the policy. Bad input and probe
    /// failures would fail the same way again, and a cancellation was
    /// requested by the host, so those are always surfaced.
    pub fn decide(&self, err: &CropError, attempt: u32) -> FailureAction {
        if err.kind() != ErrorKind::TranscodeFailure {
            return FailureAction::Surface;
        }

        match self.policy {
            FailurePolicy::Surface => FailureAction::Surface,
            FailurePolicy::Terminate => FailureAction::Terminate,
            FailurePolicy::Retry { attempts } if attempt <= attempts => FailureAction::Retry,
            FailurePolicy::Retry { .. } => FailureAction::Surface,
        }
    }
}

/// A job that failed for good, with the action the host should take.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct JobFailure {
    #[source]
    pub error: CropError,
    pub action: FailureAction,
    /// Number of times the job was run.
    pub attempts: u32,
}

/// Run `job`, re-running it while the handler says so.
///
/// Before giving up, the error is reported through the job's sink as a
/// fatal event. The process is never exited here; a [`FailureAction::Terminate`]
/// in the returned failure is for the host to act on.
pub async fn run_with_policy(
    job: &TranscodeJob,
    handler: &FailureHandler,
) -> Result<TranscodeOutcome, JobFailure> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let error = match job.run().await {
            Ok(outcome) => return Ok(outcome),
            Err(error) => error,
        };

        let action = handler.decide(&error, attempt);
        tracing::warn!(
            source = %job.source().display(),
            attempt,
            ?action,
            error = %error,
            "Transcode attempt failed"
        );

        if action == FailureAction::Retry {
            continue;
        }

        job.sink().fatal(&error.to_string());
        return Err(JobFailure {
            error,
            action,
            attempts: attempt,
        });
    }
}
