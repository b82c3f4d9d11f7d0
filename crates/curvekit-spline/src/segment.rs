//! Segment views over a reparameterized curve.

use curvekit_core::Tolerance;
use serde::{Deserialize, Serialize};

/// One curve segment's slice of the normalized parameter range.
///
/// Converts between a local segment parameter in [0, 1] and the normalized
/// curve parameter covering the same point. Useful for consumers that walk
/// or branch per segment, and for Bézier curves where segments span three
/// control nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpan {
    /// Index of the segment's first control point.
    pub first_node: usize,
    /// Normalized curve parameter where the segment starts.
    pub start: f64,
    /// Normalized arc length covered by the segment.
    pub length: f64,
}

impl SegmentSpan {
    /// Map a local segment parameter in [0, 1] to a curve parameter.
    pub fn to_curve_param(&self, local: f64) -> f64 {
        self.start + local * self.length
    }

    /// Map a curve parameter to a local segment parameter, clamped to
    /// [0, 1]. Zero-length segments map everything to 0.
    pub fn to_segment_param(&self, param: f64) -> f64 {
        if param < self.start {
            return 0.0;
        }
        if param > self.start + self.length {
            return 1.0;
        }
        if self.length <= 0.0 {
            return 0.0;
        }
        (param - self.start) / self.length
    }

    /// Clamp a curve parameter to this segment's range.
    pub fn clamp_param(&self, param: f64) -> f64 {
        param.clamp(self.start, self.start + self.length)
    }

    /// Whether a curve parameter lies on this segment (endpoints included
    /// within parametric tolerance).
    pub fn contains_param(&self, param: f64, tol: Tolerance) -> bool {
        let end = self.start + self.length;
        if tol.param_eq(param, self.start) || tol.param_eq(param, end) {
            return true;
        }
        param >= self.start && param <= end
    }
}
