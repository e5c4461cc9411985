//! Piecewise-linear expression compiler.
//!
//! Each crop parameter becomes a function of the frame timestamp `t`,
//! written in ffmpeg's expression grammar as right-nested conditionals:
//!
//! ```text
//! if(lte(t,T1),A0*t+B0,if(lte(t,T2),A1*t+B1,...,TAIL))
//! ```

use std::fmt;

use vid2vert_crop_model::keyframe::{Axis, KeyframeSequence};

/// One linear piece, valid for `t <= until`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub until: f64,
    pub slope: f64,
    pub intercept: f64,
}

impl Segment {
    pub fn value_at(&self, t: f64) -> f64 {
        self.slope * t + self.intercept
    }
}

/// A compiled function of time for one crop parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisExpr {
    axis: Axis,
    segments: Vec<Segment>,
    tail: f64,
}

impl AxisExpr {
    /// Compile one axis of a keyframe sequence.
    ///
    /// Every consecutive keyframe pair contributes a segment ending at the
    /// later keyframe's time. Past the last keyframe the value holds at the
    /// last keyframe's value. Times are expected to strictly increase; see
    /// [`KeyframeSequence::validate`].
    pub fn compile(keyframes: &KeyframeSequence, axis: Axis) -> Self {
        let points = keyframes.as_slice();

        let segments = points
            .windows(2)
            .map(|pair| {
                let (t0, v0) = (pair[0].time, pair[0].axis(axis));
                let (t1, v1) = (pair[1].time, pair[1].axis(axis));
                let slope = (v1 - v0) / (t1 - t0);
                Segment {
                    until: t1,
                    slope,
                    intercept: v0 - slope * t0,
                }
            })
            .collect();

        Self {
            axis,
            segments,
            tail: keyframes.last().axis(axis),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn tail(&self) -> f64 {
        self.tail
    }

    /// True when the expression has no branches.
    pub fn is_constant(&self) -> bool {
        self.segments.is_empty()
    }

    /// Evaluate at time `t` with the same branch semantics ffmpeg applies.
    pub fn evaluate(&self, t: f64) -> f64 {
        self.segments
            .iter()
            .find(|seg| t <= seg.until)
            .map(|seg| seg.value_at(t))
            .unwrap_or(self.tail)
    }
}

impl fmt::Display for AxisExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.segments {
            write!(
                f,
                "if(lte(t,{:.3}),{:.6}*t+{:.6},",
                seg.until, seg.slope, seg.intercept
            )?;
        }
        write!(f, "{:.6}", self.tail)?;
        for _ in &self.segments {
            f.write_str(")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vid2vert_crop_model::keyframe::Keyframe;

    fn sequence(points: &[(f64, f64)]) -> KeyframeSequence {
        KeyframeSequence::new(
            points
                .iter()
                .map(|&(t, x)| Keyframe::new(t, x, 0.0, 100.0, 100.0))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_single_keyframe_is_constant() {
        let expr = AxisExpr::compile(&sequence(&[(0.0, 42.5)]), Axis::X);
        assert!(expr.is_constant());
        assert_eq!(expr.to_string(), "42.500000");
        for t in [0.0, 1.0, 1000.0] {
            assert_eq!(expr.evaluate(t), 42.5);
        }
    }

    #[test]
    fn test_two_keyframes_render() {
        let expr = AxisExpr::compile(&sequence(&[(0.0, 0.0), (5.0, 500.0)]), Axis::X);
        assert_eq!(
            expr.to_string(),
            "if(lte(t,5.000),100.000000*t+0.000000,500.000000)"
        );
    }

    #[test]
    fn test_three_keyframes_nest_in_order() {
        let expr = AxisExpr::compile(
            &sequence(&[(0.0, 0.0), (1.0, 10.0), (3.0, 0.0)]),
            Axis::X,
        );
        assert_eq!(
            expr.to_string(),
            "if(lte(t,1.000),10.000000*t+0.000000,if(lte(t,3.000),-5.000000*t+15.000000,0.000000))"
        );
    }

    #[test]
    fn test_evaluate_between_and_after() {
        let expr = AxisExpr::compile(&sequence(&[(0.0, 0.0), (5.0, 500.0)]), Axis::X);
        assert!((expr.evaluate(2.5) - 250.0).abs() < 1e-9);
        assert_eq!(expr.evaluate(7.0), 500.0);
    }

    #[test]
    fn test_axis_selection() {
        let seq = KeyframeSequence::new(vec![
            Keyframe::new(0.0, 1.0, 2.0, 3.0, 4.0),
            Keyframe::new(2.0, 1.0, 2.0, 3.0, 8.0),
        ])
        .unwrap();

        assert_eq!(AxisExpr::compile(&seq, Axis::Y).evaluate(1.0), 2.0);
        assert!((AxisExpr::compile(&seq, Axis::H).evaluate(1.0) - 6.0).abs() < 1e-9);
    }

    fn increasing_points() -> impl Strategy<Value = Vec<(f64, f64)>> {
        prop::collection::vec((0.01f64..10.0, -2000.0f64..2000.0), 1..12).prop_map(|steps| {
            let mut t = 0.0;
            steps
                .into_iter()
                .enumerate()
                .map(|(idx, (dt, v))| {
                    if idx > 0 {
                        t += dt;
                    }
                    (t, v)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_reproduces_keyframe_values(points in increasing_points()) {
            let expr = AxisExpr::compile(&sequence(&points), Axis::X);
            for &(t, v) in &points {
                prop_assert!((expr.evaluate(t) - v).abs() < 1e-6);
            }
        }

        #[test]
        fn prop_linear_between_keyframes(points in increasing_points(), frac in 0.0f64..1.0) {
            prop_assume!(points.len() >= 2);
            let expr = AxisExpr::compile(&sequence(&points), Axis::X);
            for pair in points.windows(2) {
                let (t0, v0) = pair[0];
                let (t1, v1) = pair[1];
                let t = t0 + frac * (t1 - t0);
                let expected = v0 + (v1 - v0) * (t - t0) / (t1 - t0);
                prop_assert!((expr.evaluate(t) - expected).abs() < 1e-6);
            }
        }

        #[test]
        fn prop_holds_last_value_after_end(points in increasing_points(), extra in 0.001f64..100.0) {
            let expr = AxisExpr::compile(&sequence(&points), Axis::X);
            let (last_t, last_v) = points[points.len() - 1];
            prop_assert_eq!(expr.evaluate(last_t + extra), last_v);
        }
    }
}
