//! Crop filter assembly.

use std::fmt;

use vid2vert_common::error::CropResult;
use vid2vert_crop_model::keyframe::{Axis, KeyframeSequence};

use crate::expr::AxisExpr;

/// A complete `crop=W:H:X:Y` directive, escaped for use as one `-vf` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropFilterSpec(String);

impl CropFilterSpec {
    /// Combine four already-rendered expressions.
    ///
    /// Commas separate filters in an ffmpeg filter chain, so every comma
    /// inside the expressions is escaped.
    pub fn assemble(w: &str, h: &str, x: &str, y: &str) -> Self {
        let raw = format!("crop={w}:{h}:{x}:{y}");
        Self(escape_filter_separators(&raw))
    }

    /// Validate a normalized sequence and compile all four axes.
    pub fn compile(keyframes: &KeyframeSequence) -> CropResult<Self> {
        keyframes.validate()?;

        let [w, h, x, y] = Axis::FILTER_ORDER.map(|axis| AxisExpr::compile(keyframes, axis));
        let spec = Self::assemble(
            &w.to_string(),
            &h.to_string(),
            &x.to_string(),
            &y.to_string(),
        );

        tracing::debug!(
            keyframes = keyframes.len(),
            filter_len = spec.0.len(),
            "Compiled crop filter"
        );
        Ok(spec)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CropFilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CropFilterSpec {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Escape filter-chain separators inside a single filter directive.
pub fn escape_filter_separators(filter: &str) -> String {
    filter.replace(',', "\\,")
}
