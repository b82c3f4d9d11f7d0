//! CurveKit spline evaluation: control point sets, cubic interpolation bases,
//! arc-length reparameterization, and constant-speed curve queries.

pub mod arc_length;
pub mod basis;
pub mod evaluator;
pub mod points;
pub mod segment;

pub use arc_length::{ArcLengthTable, SegmentParameter};
pub use basis::{Basis, InterpolationMode};
pub use evaluator::{CurveEvaluator, RotationMode, TopologyWarning};
pub use points::{ControlPoint, ControlPointSet};
pub use segment::SegmentSpan;
