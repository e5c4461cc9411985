//! Vid2Vert Render Engine
//!
//! Turns a keyframed crop timeline into a single ffmpeg crop filter and
//! supervises the ffmpeg process that applies it.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source.mp4 ──┬── probe dimensions ──┐
//!              └── probe duration ────┤
//!                                     │
//! keyframes (%) ── normalize (px) ────┤
//!                                     ├── compile W/H/X/Y expressions
//!                                     │
//!                                     ├── assemble crop=W:H:X:Y
//!                                     ▼
//!                          ffmpeg -vf crop=... ──── progress (stdout)
//!                                     │        └─── diagnostics (stderr)
//!                                     ▼
//!                            cropped_source.mp4
//! ```

pub mod availability;
pub mod command;
pub mod expr;
pub mod failure;
pub mod filter;
pub mod probe;
pub mod progress;
pub mod sink;
pub mod transcode;

pub use availability::EngineAvailability;
pub use expr::{AxisExpr, Segment};
pub use failure::{run_with_policy, FailureAction, FailureHandler, JobFailure};
pub use filter::CropFilterSpec;
pub use sink::{ChannelSink, EventSink, JobEvent, TracingSink};
pub use transcode::{output_path_for, JobState, TranscodeJob, TranscodeOutcome};
