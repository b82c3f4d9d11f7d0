//! Constant-speed curve evaluation.
//!
//! [`CurveEvaluator`] is the public façade: it owns one [`ControlPointSet`],
//! one basis, and the arc-length table binding them, and answers
//! position/tangent/orientation queries for normalized parameters in [0, 1].
//! There is no implicit update loop; every mutating setter rebuilds the
//! table before returning, so evaluation never sees stale data.

use std::cell::Cell;
use std::fmt;

use curvekit_core::Tolerance;
use curvekit_math::{quat, DQuat, Plane3, Point3, Ray3, Vector3};
use serde::{Deserialize, Serialize};

use crate::arc_length::{ArcLengthTable, SegmentParameter};
use crate::basis::{Basis, InterpolationMode};
use crate::points::ControlPointSet;
use crate::segment::SegmentSpan;

/// How orientations along the curve are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationMode {
    /// Always identity.
    None,
    /// Interpolate the control nodes' own rotations (SQUAD for Hermite).
    Node,
    /// Look along the tangent with the curve's up-normal.
    #[default]
    Tangent,
}

/// Recoverable configuration problems surfaced by [`CurveEvaluator::rebuild`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyWarning {
    /// `closed` combined with the Bézier basis; the curve evaluates as open.
    ClosedBezier,
}

impl fmt::Display for TopologyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClosedBezier => {
                write!(f, "auto-close is ignored for Bézier curves; treating the curve as open")
            }
        }
    }
}

/// Last-used 4-point evaluation window.
///
/// Successive queries overwhelmingly land on the same segment (a path
/// follower advances its parameter a little per tick), so the recalculated
/// window is kept until the segment changes.
#[derive(Debug, Clone, Copy)]
struct CachedWindow {
    first_node: usize,
    points: [Vector3; 4],
}

/// Curve evaluation façade bound to one control point set and basis.
#[derive(Debug, Clone)]
pub struct CurveEvaluator {
    points: ControlPointSet,
    mode: InterpolationMode,
    basis: Basis,
    /// Hermite tension applied when a node has no override.
    tension: f64,
    per_node_tension: bool,
    /// Up-vector used by tangent-mode orientations.
    normal: Vector3,
    rotation_mode: RotationMode,
    tolerance: Tolerance,
    table: ArcLengthTable,
    warnings: Vec<TopologyWarning>,
    window: Cell<Option<CachedWindow>>,
}

impl CurveEvaluator {
    pub const DEFAULT_TENSION: f64 = 0.5;

    pub fn new(points: ControlPointSet, mode: InterpolationMode) -> Self {
        let mut evaluator = Self {
            points,
            mode,
            basis: Basis::for_mode(mode),
            tension: Self::DEFAULT_TENSION,
            per_node_tension: false,
            normal: Vector3::Y,
            rotation_mode: RotationMode::default(),
            tolerance: Tolerance::default(),
            table: ArcLengthTable::default(),
            warnings: Vec::new(),
            window: Cell::new(None),
        };
        evaluator.rebuild();
        evaluator
    }

    pub fn from_positions(
        positions: &[Point3],
        mode: InterpolationMode,
        closed: bool,
        accuracy: usize,
    ) -> Self {
        Self::new(
            ControlPointSet::from_positions(positions, closed, accuracy),
            mode,
        )
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    pub fn points(&self) -> &ControlPointSet {
        &self.points
    }

    pub fn mode(&self) -> InterpolationMode {
        self.mode
    }

    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    pub fn tension(&self) -> f64 {
        self.tension
    }

    pub fn up_normal(&self) -> Vector3 {
        self.normal
    }

    pub fn rotation_mode(&self) -> RotationMode {
        self.rotation_mode
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Warnings raised by the last rebuild.
    pub fn warnings(&self) -> &[TopologyWarning] {
        &self.warnings
    }

    /// Replace all control points and rebuild.
    pub fn set_points(&mut self, points: ControlPointSet) -> &[TopologyWarning] {
        self.points = points;
        self.rebuild()
    }

    /// Replace control point positions only and rebuild.
    pub fn set_positions(&mut self, positions: &[Point3]) -> &[TopologyWarning] {
        let closed = self.points.closed();
        let accuracy = self.points.accuracy();
        self.points = ControlPointSet::from_positions(positions, closed, accuracy);
        self.rebuild()
    }

    /// Mutate the point set in place, then rebuild. The closure's changes
    /// are picked up by the forced rebuild, so no stale table survives.
    pub fn edit_points<F>(&mut self, edit: F) -> &[TopologyWarning]
    where
        F: FnOnce(&mut ControlPointSet),
    {
        edit(&mut self.points);
        self.rebuild()
    }

    pub fn set_closed(&mut self, closed: bool) -> &[TopologyWarning] {
        self.points.set_closed(closed);
        self.rebuild()
    }

    pub fn set_accuracy(&mut self, accuracy: usize) -> &[TopologyWarning] {
        self.points.set_accuracy(accuracy);
        self.rebuild()
    }

    pub fn set_mode(&mut self, mode: InterpolationMode) -> &[TopologyWarning] {
        self.mode = mode;
        self.basis = Basis::for_mode(mode);
        self.rebuild()
    }

    /// Install a caller-defined coefficient matrix and node index pattern.
    pub fn set_custom_basis(
        &mut self,
        matrix: [f64; 16],
        offsets: [i32; 4],
    ) -> &[TopologyWarning] {
        self.mode = InterpolationMode::CustomMatrix;
        self.basis = Basis::custom(matrix, offsets);
        self.rebuild()
    }

    pub fn set_tension(&mut self, tension: f64) -> &[TopologyWarning] {
        self.tension = tension;
        self.rebuild()
    }

    pub fn set_per_node_tension(&mut self, enabled: bool) -> &[TopologyWarning] {
        self.per_node_tension = enabled;
        self.rebuild()
    }

    /// Set the up-vector used by tangent-mode orientations. Does not affect
    /// curve geometry, so no rebuild happens.
    pub fn set_up_normal(&mut self, normal: Vector3) {
        self.normal = normal;
    }

    pub fn set_rotation_mode(&mut self, mode: RotationMode) {
        self.rotation_mode = mode;
    }

    // -----------------------------------------------------------------------
    // Topology
    // -----------------------------------------------------------------------

    /// Whether the curve actually evaluates closed: the authored flag, minus
    /// the Bézier exception.
    pub fn is_closed(&self) -> bool {
        self.points.closed() && self.mode != InterpolationMode::Bezier
    }

    fn relevant_len(&self) -> usize {
        self.points.relevant_len(self.mode.nodes_per_segment())
    }

    /// Control node count including the wrap-around node of a closed curve.
    fn control_node_count(&self) -> usize {
        let relevant = self.relevant_len();
        if relevant == 0 {
            0
        } else if self.is_closed() {
            relevant + 1
        } else {
            relevant
        }
    }

    pub fn segment_count(&self) -> usize {
        let nodes = self.control_node_count();
        if nodes == 0 {
            0
        } else {
            (nodes - 1) / self.mode.nodes_per_segment()
        }
    }

    /// Rebuild the arc-length table and refresh topology warnings.
    ///
    /// Called by every mutating setter; callers that mutate the point set
    /// through [`ControlPointSet`] directly must call this themselves before
    /// evaluating again.
    pub fn rebuild(&mut self) -> &[TopologyWarning] {
        self.warnings.clear();
        if self.points.closed() && self.mode == InterpolationMode::Bezier {
            self.warnings.push(TopologyWarning::ClosedBezier);
        }
        self.window.set(None);

        let nps = self.mode.nodes_per_segment();
        let relevant = self.relevant_len();
        let closed = self.is_closed();
        let segment_count = self.segment_count();

        let points = &self.points;
        let basis = &self.basis;
        let mode = self.mode;
        let tension = self.tension;
        let per_node = self.per_node_tension;

        self.table = ArcLengthTable::build(
            segment_count,
            points.accuracy(),
            nps,
            relevant,
            closed,
            |first_node, t| {
                let window = position_window(
                    points, basis, mode, closed, relevant, tension, per_node, first_node,
                );
                basis.blend_vector(t, 1, window).length()
            },
        );

        &self.warnings
    }

    pub fn arc_length_table(&self) -> &ArcLengthTable {
        &self.table
    }

    // -----------------------------------------------------------------------
    // Evaluation
    // -----------------------------------------------------------------------

    fn resolve(&self, param: f64) -> Option<SegmentParameter> {
        if self.relevant_len() == 0 {
            return None;
        }
        Some(self.table.locate(param))
    }

    fn window_at(&self, first_node: usize) -> [Vector3; 4] {
        if let Some(cached) = self.window.get() {
            if cached.first_node == first_node {
                return cached.points;
            }
        }

        let window = position_window(
            &self.points,
            &self.basis,
            self.mode,
            self.is_closed(),
            self.relevant_len(),
            self.tension,
            self.per_node_tension,
            first_node,
        );
        self.window.set(Some(CachedWindow {
            first_node,
            points: window,
        }));
        window
    }

    fn vector_at(&self, param: f64, order: usize) -> Vector3 {
        match self.resolve(param) {
            None => Vector3::ZERO,
            Some(sp) => {
                let window = self.window_at(sp.first_node);
                self.basis.blend_vector(sp.local, order, window)
            }
        }
    }

    /// Position at a normalized arc-length parameter; parameters outside
    /// [0, 1] clamp to the curve ends. A curve without enough points
    /// evaluates to the zero vector everywhere.
    pub fn position(&self, param: f64) -> Point3 {
        self.vector_at(param, 0)
    }

    /// First derivative (unnormalized tangent) at a normalized parameter.
    pub fn tangent(&self, param: f64) -> Vector3 {
        self.vector_at(param, 1)
    }

    /// Second derivative at a normalized parameter.
    pub fn curvature(&self, param: f64) -> Vector3 {
        self.vector_at(param, 2)
    }

    /// The curve's up-normal, normalized. Zero stays zero.
    pub fn normal(&self) -> Vector3 {
        self.normal.normalize_or_zero()
    }

    /// Orientation at a normalized parameter, per the rotation mode.
    /// Degenerate cases (no points, zero tangent, zero normal) yield
    /// identity.
    pub fn orientation(&self, param: f64) -> DQuat {
        let Some(sp) = self.resolve(param) else {
            return DQuat::IDENTITY;
        };

        match self.rotation_mode {
            RotationMode::None => DQuat::IDENTITY,
            RotationMode::Tangent => {
                let window = self.window_at(sp.first_node);
                let tangent = self.basis.blend_vector(sp.local, 1, window);
                let normal = self.normal();
                if tangent.length_squared() == 0.0 || normal.length_squared() == 0.0 {
                    return DQuat::IDENTITY;
                }
                quat::look_rotation(tangent, normal)
            }
            RotationMode::Node => {
                let window = rotation_window(
                    &self.points,
                    &self.basis,
                    self.mode,
                    self.is_closed(),
                    self.relevant_len(),
                    sp.first_node,
                );
                self.basis.blend_rotation(sp.local, 0, window)
            }
        }
    }

    /// Interpolated custom scalar channel. Like B-spline positions, the
    /// interpolated values need not pass through the authored node values.
    pub fn custom_value(&self, param: f64) -> f64 {
        match self.resolve(param) {
            None => 0.0,
            Some(sp) => {
                let window = scalar_window(
                    &self.points,
                    &self.basis,
                    self.mode,
                    self.is_closed(),
                    self.relevant_len(),
                    self.tension,
                    self.per_node_tension,
                    sp.first_node,
                );
                self.basis.blend_scalar(sp.local, 0, window)
            }
        }
    }

    /// Total curve length in model units.
    pub fn length(&self) -> f64 {
        self.table.total_length()
    }

    /// Convert a normalized parameter to a distance from the curve start.
    pub fn distance_at_param(&self, param: f64) -> f64 {
        self.length() * param
    }

    /// Convert a distance from the curve start to a normalized parameter.
    /// Zero-length curves map everything to 0.
    pub fn param_at_distance(&self, distance: f64) -> f64 {
        let length = self.length();
        if length <= 0.0 {
            0.0
        } else {
            distance / length
        }
    }

    // -----------------------------------------------------------------------
    // Segments
    // -----------------------------------------------------------------------

    /// Spans of all segments in curve order.
    pub fn segments(&self) -> Vec<SegmentSpan> {
        let nps = self.mode.nodes_per_segment();
        (0..self.segment_count())
            .map(|seg| {
                let first_node = seg * nps;
                SegmentSpan {
                    first_node,
                    start: self.table.node_position(first_node),
                    length: self.table.node_length(first_node),
                }
            })
            .collect()
    }

    /// The segment containing a normalized parameter (clamped to [0, 1]).
    pub fn segment_at(&self, param: f64) -> Option<SegmentSpan> {
        let param = param.clamp(0.0, 1.0);
        self.segments()
            .into_iter()
            .find(|span| span.contains_param(param, self.tolerance))
    }

    // -----------------------------------------------------------------------
    // Closest-point search
    // -----------------------------------------------------------------------

    /// Parameter of the approximately closest curve point to `point`.
    ///
    /// Coarse scan of `[start, end]` at `step`, then up to 5 (clamped)
    /// refinement passes, each searching `±10^-(pass+2)` around the running
    /// best at a tenth of that window. This is a multi-resolution local
    /// search: on curves whose distance function has several local minima it
    /// can settle on a non-global one.
    pub fn closest_param(
        &self,
        point: Point3,
        iterations: usize,
        start: f64,
        end: f64,
        step: f64,
    ) -> f64 {
        self.closest_param_by(
            |curve_pos| (point - curve_pos).length_squared(),
            iterations,
            start,
            end,
            step,
        )
    }

    /// Parameter of the approximately closest curve point to a ray.
    pub fn closest_param_to_ray(
        &self,
        ray: Ray3,
        iterations: usize,
        start: f64,
        end: f64,
        step: f64,
    ) -> f64 {
        self.closest_param_by(
            |curve_pos| ray.cross_distance_sq(curve_pos),
            iterations,
            start,
            end,
            step,
        )
    }

    /// Parameter of the approximately closest curve point to a plane.
    pub fn closest_param_to_plane(
        &self,
        plane: Plane3,
        iterations: usize,
        start: f64,
        end: f64,
        step: f64,
    ) -> f64 {
        self.closest_param_by(
            |curve_pos| plane.distance_to_point(curve_pos),
            iterations,
            start,
            end,
            step,
        )
    }

    /// Minimize an arbitrary distance function over curve positions.
    pub fn closest_param_by<F>(
        &self,
        distance: F,
        iterations: usize,
        start: f64,
        end: f64,
        step: f64,
    ) -> f64
    where
        F: Fn(Point3) -> f64,
    {
        if step <= 0.0 {
            return start;
        }

        let iterations = iterations.min(5);
        let mut best = self.scan_min(&distance, start, end, step);

        for pass in 0..iterations {
            let offset = 10f64.powi(-(pass as i32 + 2));
            let lo = (best - offset).clamp(0.0, 1.0);
            let hi = (best + offset).clamp(0.0, 1.0);
            best = self.scan_min(&distance, lo, hi, offset * 0.1);
        }

        best
    }

    fn scan_min<F>(&self, distance: &F, start: f64, end: f64, step: f64) -> f64
    where
        F: Fn(Point3) -> f64,
    {
        let mut min_distance = f64::INFINITY;
        let mut min_param = start;

        let mut param = start;
        while param <= end {
            let d = distance(self.position(param));
            if d < min_distance {
                min_distance = d;
                min_param = param;
            }
            param += step;
        }

        min_param
    }
}

// ---------------------------------------------------------------------------
// Window construction
// ---------------------------------------------------------------------------

fn window_indices(basis: &Basis, closed: bool, relevant: usize, first_node: usize) -> [usize; 4] {
    [
        ControlPointSet::node_index(first_node, basis.offsets[0], relevant, closed),
        ControlPointSet::node_index(first_node, basis.offsets[1], relevant, closed),
        ControlPointSet::node_index(first_node, basis.offsets[2], relevant, closed),
        ControlPointSet::node_index(first_node, basis.offsets[3], relevant, closed),
    ]
}

fn node_tension(
    points: &ControlPointSet,
    per_node: bool,
    curve_tension: f64,
    node: usize,
) -> f64 {
    if per_node {
        points.points()[node].tension.unwrap_or(curve_tension)
    } else {
        curve_tension
    }
}

/// Fetch the 4 position values for a segment, applying the Hermite tangent
/// substitution: slots 2/3 become scaled tangent vectors instead of raw
/// neighbor positions. The outgoing tangent takes the segment start node's
/// tension, the incoming one the end node's.
#[allow(clippy::too_many_arguments)]
fn position_window(
    points: &ControlPointSet,
    basis: &Basis,
    mode: InterpolationMode,
    closed: bool,
    relevant: usize,
    tension: f64,
    per_node: bool,
    first_node: usize,
) -> [Vector3; 4] {
    let idx = window_indices(basis, closed, relevant, first_node);
    let pts = points.points();
    let mut w = [
        pts[idx[0]].position,
        pts[idx[1]].position,
        pts[idx[2]].position,
        pts[idx[3]].position,
    ];

    if mode == InterpolationMode::Hermite {
        let t0 = node_tension(points, per_node, tension, idx[0]);
        let t1 = node_tension(points, per_node, tension, idx[1]);
        let outgoing = (w[1] - w[2]) * t0;
        let incoming = (w[3] - w[0]) * t1;
        w[2] = outgoing;
        w[3] = incoming;
    }

    w
}

#[allow(clippy::too_many_arguments)]
fn scalar_window(
    points: &ControlPointSet,
    basis: &Basis,
    mode: InterpolationMode,
    closed: bool,
    relevant: usize,
    tension: f64,
    per_node: bool,
    first_node: usize,
) -> [f64; 4] {
    let idx = window_indices(basis, closed, relevant, first_node);
    let pts = points.points();
    let mut w = [
        pts[idx[0]].custom_value,
        pts[idx[1]].custom_value,
        pts[idx[2]].custom_value,
        pts[idx[3]].custom_value,
    ];

    if mode == InterpolationMode::Hermite {
        let t0 = node_tension(points, per_node, tension, idx[0]);
        let t1 = node_tension(points, per_node, tension, idx[1]);
        let outgoing = (w[1] - w[2]) * t0;
        let incoming = (w[3] - w[0]) * t1;
        w[2] = outgoing;
        w[3] = incoming;
    }

    w
}

/// Fetch the 4 rotations for a segment. Hermite replaces slots 2/3 with
/// SQUAD intermediate quaternions; the second intermediate chains off the
/// first.
fn rotation_window(
    points: &ControlPointSet,
    basis: &Basis,
    mode: InterpolationMode,
    closed: bool,
    relevant: usize,
    first_node: usize,
) -> [DQuat; 4] {
    let idx = window_indices(basis, closed, relevant, first_node);
    let pts = points.points();
    let mut w = [
        pts[idx[0]].rotation,
        pts[idx[1]].rotation,
        pts[idx[2]].rotation,
        pts[idx[3]].rotation,
    ];

    if mode == InterpolationMode::Hermite {
        w[2] = quat::squad_intermediate(w[0], w[1], w[2]);
        w[3] = quat::squad_intermediate(w[1], w[2], w[3]);
    }

    w
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::ControlPoint;
    use glam::dvec3;

    fn line_points() -> Vec<Point3> {
        vec![
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(2.0, 0.0, 0.0),
            dvec3(3.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_empty_curve_evaluates_to_neutral_defaults() {
        let evaluator = CurveEvaluator::new(ControlPointSet::empty(), InterpolationMode::Linear);
        assert_eq!(evaluator.position(0.5), Vector3::ZERO);
        assert_eq!(evaluator.tangent(0.5), Vector3::ZERO);
        assert_eq!(evaluator.custom_value(0.5), 0.0);
        assert!(evaluator.orientation(0.5).dot(DQuat::IDENTITY) > 1.0 - 1e-12);
        assert_eq!(evaluator.length(), 0.0);
    }

    #[test]
    fn test_single_point_is_degenerate_not_an_error() {
        let evaluator = CurveEvaluator::from_positions(
            &[dvec3(4.0, 5.0, 6.0)],
            InterpolationMode::Hermite,
            false,
            5,
        );
        assert_eq!(evaluator.position(0.3), Vector3::ZERO);
        assert_eq!(evaluator.segment_count(), 0);
    }

    #[test]
    fn test_linear_collinear_scenario() {
        let evaluator =
            CurveEvaluator::from_positions(&line_points(), InterpolationMode::Linear, false, 5);
        let p = evaluator.position(0.5);
        assert!((p - dvec3(1.5, 0.0, 0.0)).length() < 1e-9);
        assert!((evaluator.length() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_closed_bezier_warns_and_falls_open() {
        let positions: Vec<_> = (0..4).map(|i| dvec3(i as f64, (i % 2) as f64, 0.0)).collect();
        let evaluator =
            CurveEvaluator::from_positions(&positions, InterpolationMode::Bezier, true, 5);
        assert_eq!(evaluator.warnings(), &[TopologyWarning::ClosedBezier]);
        assert!(!evaluator.is_closed());
        assert!((evaluator.position(0.0) - positions[0]).length() < 1e-9);
        assert!((evaluator.position(1.0) - positions[3]).length() < 1e-9);
    }

    #[test]
    fn test_closed_hermite_wraps_to_seam() {
        let positions = vec![
            dvec3(0.0, 0.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(1.0, 1.0, 0.0),
            dvec3(0.0, 1.0, 0.0),
        ];
        let evaluator =
            CurveEvaluator::from_positions(&positions, InterpolationMode::Hermite, true, 8);
        assert!(evaluator.is_closed());
        assert_eq!(evaluator.segment_count(), 4);
        // 1.0 wraps to the seam: same point as 0.0.
        assert!((evaluator.position(1.0) - evaluator.position(0.0)).length() < 1e-9);
    }

    #[test]
    fn test_mutation_forces_rebuild() {
        let mut evaluator =
            CurveEvaluator::from_positions(&line_points(), InterpolationMode::Linear, false, 5);
        let old_length = evaluator.length();
        evaluator.set_positions(&[dvec3(0.0, 0.0, 0.0), dvec3(6.0, 0.0, 0.0)]);
        assert!((evaluator.length() - 6.0).abs() < 1e-9);
        assert!((old_length - 3.0).abs() < 1e-9);
        assert!((evaluator.position(0.5) - dvec3(3.0, 0.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_edit_points_rebuilds() {
        let mut evaluator =
            CurveEvaluator::from_positions(&line_points(), InterpolationMode::Linear, false, 5);
        evaluator.edit_points(|set| {
            let mut pts = set.points().to_vec();
            pts.push(ControlPoint::at(dvec3(4.0, 0.0, 0.0)));
            set.set_points(pts);
        });
        assert!((evaluator.length() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_value_channel_linear() {
        let mut set = ControlPointSet::from_positions(&line_points(), false, 5);
        for (i, p) in set.points_mut().iter_mut().enumerate() {
            p.custom_value = i as f64 * 10.0;
        }
        let evaluator = CurveEvaluator::new(set, InterpolationMode::Linear);
        let v = evaluator.custom_value(0.5);
        assert!((v - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_orientation_tangent_mode_along_x() {
        let evaluator =
            CurveEvaluator::from_positions(&line_points(), InterpolationMode::Linear, false, 5);
        let q = evaluator.orientation(0.5);
        // +Z of the orientation frame points along the tangent (+X).
        let forward = q * dvec3(0.0, 0.0, 1.0);
        assert!((forward - dvec3(1.0, 0.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_orientation_node_mode_interpolates_rotations() {
        let mut set = ControlPointSet::from_positions(&line_points(), false, 5);
        let q_end = DQuat::from_axis_angle(dvec3(0.0, 1.0, 0.0), 1.0);
        for p in set.points_mut().iter_mut() {
            p.rotation = DQuat::IDENTITY;
        }
        set.points_mut()[3].rotation = q_end;
        let mut evaluator = CurveEvaluator::new(set, InterpolationMode::Linear);
        evaluator.set_rotation_mode(RotationMode::Node);

        let q0 = evaluator.orientation(0.0);
        assert!(q0.dot(DQuat::IDENTITY).abs() > 1.0 - 1e-9);
        let q1 = evaluator.orientation(1.0);
        assert!(q1.dot(q_end).abs() > 1.0 - 1e-9);
    }

    #[test]
    fn test_closest_param_straight_segment() {
        let evaluator = CurveEvaluator::from_positions(
            &[dvec3(0.0, 0.0, 0.0), dvec3(10.0, 0.0, 0.0)],
            InterpolationMode::Linear,
            false,
            5,
        );
        let param = evaluator.closest_param(dvec3(5.0, 1.0, 0.0), 5, 0.0, 1.0, 0.01);
        let p = evaluator.position(param);
        assert!((p - dvec3(5.0, 0.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_closest_param_to_ray_and_plane() {
        let evaluator = CurveEvaluator::from_positions(
            &[dvec3(0.0, 0.0, 0.0), dvec3(10.0, 0.0, 0.0)],
            InterpolationMode::Linear,
            false,
            5,
        );

        let ray = Ray3::new(dvec3(4.0, -5.0, 0.0), dvec3(0.0, 1.0, 0.0));
        let param = evaluator.closest_param_to_ray(ray, 5, 0.0, 1.0, 0.01);
        assert!((evaluator.position(param) - dvec3(4.0, 0.0, 0.0)).length() < 1e-3);

        let plane = Plane3::new(dvec3(7.0, 0.0, 0.0), dvec3(1.0, 0.0, 0.0));
        let param = evaluator.closest_param_to_plane(plane, 5, 0.0, 1.0, 0.01);
        assert!((evaluator.position(param) - dvec3(7.0, 0.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_segments_cover_unit_interval() {
        let evaluator =
            CurveEvaluator::from_positions(&line_points(), InterpolationMode::Linear, false, 5);
        let segments = evaluator.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].start, 0.0);
        let end = segments.last().unwrap();
        assert!((end.start + end.length - 1.0).abs() < 1e-9);

        let span = evaluator.segment_at(0.4).unwrap();
        assert_eq!(span.first_node, 1);
    }

    #[test]
    fn test_distance_param_conversions() {
        let evaluator =
            CurveEvaluator::from_positions(&line_points(), InterpolationMode::Linear, false, 5);
        assert!((evaluator.distance_at_param(0.5) - 1.5).abs() < 1e-9);
        assert!((evaluator.param_at_distance(1.5) - 0.5).abs() < 1e-9);

        let degenerate =
            CurveEvaluator::new(ControlPointSet::empty(), InterpolationMode::Linear);
        assert_eq!(degenerate.param_at_distance(3.0), 0.0);
    }

    #[test]
    fn test_per_node_tension_rule() {
        // Outgoing tangent uses the start node's tension; a node without an
        // override falls back to the curve tension.
        let mut set = ControlPointSet::from_positions(
            &[
                dvec3(0.0, 0.0, 0.0),
                dvec3(1.0, 1.0, 0.0),
                dvec3(2.0, 0.0, 0.0),
                dvec3(3.0, 1.0, 0.0),
            ],
            false,
            5,
        );
        set.points_mut()[1].tension = Some(0.0);
        let mut evaluator = CurveEvaluator::new(set, InterpolationMode::Hermite);
        evaluator.set_per_node_tension(true);

        // Segment starting at node 1: zero outgoing tension kills the
        // tangent contribution at its start.
        let start_of_seg1 = evaluator.arc_length_table().node_position(1);
        let t = evaluator.tangent(start_of_seg1 + 1e-9);
        // Hermite derivative at local t=0 equals the outgoing tangent
        // vector, which is scaled by tension 0.
        assert!(t.length() < 1e-3);
    }
}
