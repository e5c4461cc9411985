//! Crop keyframes and the ordered keyframe timeline.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vid2vert_common::error::{CropError, CropResult};

/// One of the four scalar crop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    W,
    H,
}

impl Axis {
    /// Axes in the order a crop filter consumes them (size before position).
    pub const FILTER_ORDER: [Axis; 4] = [Axis::W, Axis::H, Axis::X, Axis::Y];

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::W => "w",
            Axis::H => "h",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel dimensions of a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A crop rectangle pinned to a point in time.
///
/// `x`/`w` are relative to the frame width and `y`/`h` to the frame height.
/// They start out as percentages and become pixels after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Time in seconds.
    pub time: f64,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width of the crop area.
    pub w: f64,
    /// Height of the crop area.
    pub h: f64,
}

impl Keyframe {
    pub fn new(time: f64, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { time, x, y, w, h }
    }

    /// Value of one crop parameter.
    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::W => self.w,
            Axis::H => self.h,
        }
    }

    fn is_finite(&self) -> bool {
        [self.time, self.x, self.y, self.w, self.h]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// An ordered, non-empty sequence of keyframes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct KeyframeSequence {
    keyframes: Vec<Keyframe>,
}

impl KeyframeSequence {
    /// Wrap an ordered list of keyframes. Fails if the list is empty.
    pub fn new(keyframes: Vec<Keyframe>) -> CropResult<Self> {
        if keyframes.is_empty() {
            return Err(CropError::invalid_input("no keyframes provided"));
        }
        Ok(Self { keyframes })
    }

    /// Read a JSON array of keyframes from disk.
    pub fn from_json_file(path: &Path) -> CropResult<Self> {
        if !path.exists() {
            return Err(CropError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let keyframes: Vec<Keyframe> = serde_json::from_str(&content).map_err(|e| {
            CropError::invalid_input(format!(
                "Failed to parse keyframes {}: {e}",
                path.display()
            ))
        })?;
        Self::new(keyframes)
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Never true; a sequence holds at least one keyframe.
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn as_slice(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Keyframe> {
        self.keyframes.iter()
    }

    pub fn first(&self) -> &Keyframe {
        &self.keyframes[0]
    }

    pub fn last(&self) -> &Keyframe {
        &self.keyframes[self.keyframes.len() - 1]
    }

    /// Rewrite percent coordinates to pixels and pin the timeline to zero.
    ///
    /// Each value becomes `value * dimension / 100`, horizontal values
    /// against `size.width` and vertical ones against `size.height`. The
    /// first keyframe's time is then forced to exactly `0.0`.
    ///
    /// This is not idempotent: a second call scales again. Calling it with
    /// a 100x100 frame leaves the coordinates unchanged.
    pub fn normalize(&mut self, size: FrameSize) {
        let width = size.width as f64;
        let height = size.height as f64;

        for kf in &mut self.keyframes {
            kf.x = kf.x * width / 100.0;
            kf.y = kf.y * height / 100.0;
            kf.w = kf.w * width / 100.0;
            kf.h = kf.h * height / 100.0;
        }
        self.keyframes[0].time = 0.0;

        tracing::debug!(
            keyframes = self.keyframes.len(),
            frame = %size,
            "Normalized keyframes to pixel space"
        );
    }

    /// Check that every value is finite and that times strictly increase.
    ///
    /// Intended for a normalized timeline, where the first time is zero.
    pub fn validate(&self) -> CropResult<()> {
        for (idx, kf) in self.keyframes.iter().enumerate() {
            if !kf.is_finite() {
                return Err(CropError::invalid_input(format!(
                    "keyframe {idx} contains a non-finite value"
                )));
            }
            if kf.time < 0.0 {
                return Err(CropError::invalid_input(format!(
                    "keyframe {idx} has negative time {}",
                    kf.time
                )));
            }
        }

        for (idx, pair) in self.keyframes.windows(2).enumerate() {
            if pair[1].time <= pair[0].time {
                return Err(CropError::invalid_input(format!(
                    "keyframe times must strictly increase: keyframe {} at {}s is not after keyframe {} at {}s",
                    idx + 1,
                    pair[1].time,
                    idx,
                    pair[0].time
                )));
            }
        }

        Ok(())
    }
}

impl TryFrom<Vec<Keyframe>> for KeyframeSequence {
    type Error = CropError;

    fn try_from(keyframes: Vec<Keyframe>) -> Result<Self, Self::Error> {
        Self::new(keyframes)
    }
}

impl From<KeyframeSequence> for Vec<Keyframe> {
    fn from(seq: KeyframeSequence) -> Self {
        seq.keyframes
    }
}

impl<'a> IntoIterator for &'a KeyframeSequence {
    type Item = &'a Keyframe;
    type IntoIter = std::slice::Iter<'a, Keyframe>;

    fn into_iter(self) -> Self::IntoIter {
        self.keyframes.iter()
    }
}
