//! Curve control points.

use curvekit_core::{CurveError, Result, Validate};
use curvekit_math::{DQuat, Point3};
use serde::{Deserialize, Serialize};

/// A single authored control point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ControlPoint {
    pub position: Point3,
    /// Orientation used by node-rotation interpolation.
    pub rotation: DQuat,
    /// Free scalar channel interpolated alongside positions.
    pub custom_value: f64,
    /// Per-node Hermite tension override; `None` uses the curve tension.
    pub tension: Option<f64>,
}

impl ControlPoint {
    pub fn at(position: Point3) -> Self {
        Self {
            position,
            rotation: DQuat::IDENTITY,
            custom_value: 0.0,
            tension: None,
        }
    }
}

/// An ordered, optionally closed sequence of control points.
///
/// The insertion order is the curve order; index 0 is the curve start.
/// The set carries no derived data: arc-length bookkeeping lives in the
/// evaluator that owns the set, and must be rebuilt after any mutation here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPointSet {
    points: Vec<ControlPoint>,
    closed: bool,
    accuracy: usize,
}

impl ControlPointSet {
    pub const DEFAULT_ACCURACY: usize = 5;

    pub fn new(points: Vec<ControlPoint>, closed: bool, accuracy: usize) -> Self {
        Self {
            points,
            closed,
            accuracy: accuracy.max(1),
        }
    }

    pub fn from_positions(positions: &[Point3], closed: bool, accuracy: usize) -> Self {
        Self::new(
            positions.iter().copied().map(ControlPoint::at).collect(),
            closed,
            accuracy,
        )
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), false, Self::DEFAULT_ACCURACY)
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [ControlPoint] {
        &mut self.points
    }

    /// Replace the whole point list.
    pub fn set_points(&mut self, points: Vec<ControlPoint>) {
        self.points = points;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    /// Arc-length samples per segment. Always at least 1.
    pub fn accuracy(&self) -> usize {
        self.accuracy
    }

    pub fn set_accuracy(&mut self, accuracy: usize) {
        self.accuracy = accuracy.max(1);
    }

    /// Number of leading points actually usable for evaluation.
    ///
    /// Bézier segments consume points in groups of `4 + 3k`; trailing points
    /// that do not complete a segment are ignored (they stay in the editable
    /// list). Every other basis needs at least two points. Returns 0 when
    /// there are not enough points for a single segment.
    pub fn relevant_len(&self, nodes_per_segment: usize) -> usize {
        let n = self.points.len();
        if nodes_per_segment == 3 {
            if n < 4 {
                0
            } else {
                n - (n - 4) % 3
            }
        } else if n < 2 {
            0
        } else {
            n
        }
    }

    /// Resolve a node index plus relative offset against the first `len`
    /// points: wrapped when the curve is closed, clamped to the ends when
    /// open.
    pub fn node_index(index: usize, offset: i32, len: usize, closed: bool) -> usize {
        debug_assert!(len > 0);
        let idx = index as i64 + offset as i64;
        if closed {
            idx.rem_euclid(len as i64) as usize
        } else {
            idx.clamp(0, len as i64 - 1) as usize
        }
    }
}

impl Validate for ControlPointSet {
    fn validate(&self) -> Result<()> {
        for (i, p) in self.points.iter().enumerate() {
            if !p.position.is_finite() {
                return Err(CurveError::InvalidOperation(format!(
                    "control point {} has a non-finite position",
                    i
                )));
            }
            if !p.custom_value.is_finite() {
                return Err(CurveError::InvalidOperation(format!(
                    "control point {} has a non-finite custom value",
                    i
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec3;

    #[test]
    fn test_relevant_len_bezier_trims_leftovers() {
        let set = |n: usize| {
            ControlPointSet::from_positions(
                &(0..n).map(|i| dvec3(i as f64, 0.0, 0.0)).collect::<Vec<_>>(),
                false,
                5,
            )
        };
        assert_eq!(set(3).relevant_len(3), 0);
        assert_eq!(set(4).relevant_len(3), 4);
        assert_eq!(set(5).relevant_len(3), 4);
        assert_eq!(set(6).relevant_len(3), 4);
        assert_eq!(set(7).relevant_len(3), 7);
        assert_eq!(set(9).relevant_len(3), 7);
        assert_eq!(set(10).relevant_len(3), 10);
    }

    #[test]
    fn test_relevant_len_minimum_two() {
        let one = ControlPointSet::from_positions(&[dvec3(0.0, 0.0, 0.0)], false, 5);
        assert_eq!(one.relevant_len(1), 0);
        let two = ControlPointSet::from_positions(&[dvec3(0.0, 0.0, 0.0); 2], false, 5);
        assert_eq!(two.relevant_len(1), 2);
    }

    #[test]
    fn test_node_index_open_clamps() {
        assert_eq!(ControlPointSet::node_index(0, -1, 4, false), 0);
        assert_eq!(ControlPointSet::node_index(3, 2, 4, false), 3);
        assert_eq!(ControlPointSet::node_index(1, 1, 4, false), 2);
    }

    #[test]
    fn test_node_index_closed_wraps() {
        assert_eq!(ControlPointSet::node_index(0, -1, 4, true), 3);
        assert_eq!(ControlPointSet::node_index(3, 2, 4, true), 1);
        assert_eq!(ControlPointSet::node_index(3, 1, 4, true), 0);
    }

    #[test]
    fn test_accuracy_clamped_to_one() {
        let set = ControlPointSet::from_positions(&[dvec3(0.0, 0.0, 0.0); 2], false, 0);
        assert_eq!(set.accuracy(), 1);
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let mut set = ControlPointSet::from_positions(&[dvec3(0.0, 0.0, 0.0); 2], false, 5);
        assert!(set.validate().is_ok());
        set.points_mut()[1].position.x = f64::NAN;
        assert!(set.validate().is_err());
    }
}
