//! Vid2Vert Crop Model
//!
//! Defines the core data contracts for cropping a video along a timeline:
//! - **Keyframes:** Time-stamped crop rectangles authored in percent of the
//!   frame, rewritten to pixels once the source dimensions are known
//! - **Session:** The video currently opened for editing
//!
//! Keyframe coordinates are percentages (`0.0..=100.0`) of the frame width
//! and height until [`KeyframeSequence::normalize`] rewrites them.

pub mod keyframe;
pub mod session;

pub use keyframe::*;
pub use session::*;
