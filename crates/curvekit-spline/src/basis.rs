//! Cubic interpolation bases.
//!
//! Every basis is a 4×4 coefficient matrix plus a pattern of four relative
//! node indices. For a local parameter `t` the four blending weights are
//! `b_i(t) = m[4i]·t³ + m[4i+1]·t² + m[4i+2]·t + m[4i+3]`, and the curve
//! value is `Σ b_i·p_i` over the four selected control values. Derivatives
//! are taken analytically on the coefficients, never numerically.

use curvekit_math::{DQuat, Vector3};
use serde::{Deserialize, Serialize};

use curvekit_math::quat;

/// The family of blending functions used between control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterpolationMode {
    /// Hermite spline (Catmull-Rom-like, with tension)
    Hermite = 0,
    /// Bézier spline, 4 control points per segment sharing endpoints
    Bezier = 1,
    /// Uniform B-spline; does not pass through its control points
    BSpline = 2,
    /// Straight-line blend between consecutive points
    Linear = 3,
    /// Caller-supplied coefficient matrix
    CustomMatrix = 4,
}

impl InterpolationMode {
    /// Decode a mode tag from the binary path format.
    pub fn from_i16(tag: i16) -> Option<Self> {
        match tag {
            0 => Some(Self::Hermite),
            1 => Some(Self::Bezier),
            2 => Some(Self::BSpline),
            3 => Some(Self::Linear),
            4 => Some(Self::CustomMatrix),
            _ => None,
        }
    }

    pub fn as_i16(self) -> i16 {
        self as i16
    }

    /// Control nodes consumed per segment: Bézier advances three nodes per
    /// segment (shared endpoints), every other basis advances one.
    pub fn nodes_per_segment(self) -> usize {
        match self {
            Self::Bezier => 3,
            _ => 1,
        }
    }

    /// Minimum number of control points for a non-degenerate open curve.
    pub fn min_points(self) -> usize {
        match self {
            Self::Bezier => 4,
            _ => 2,
        }
    }
}

/// A cubic blending basis: coefficient matrix plus relative node indices.
///
/// Row-major: row `i` holds the (t³, t², t, 1) coefficients of the blending
/// polynomial applied to the node at `offsets[i]` relative to the segment's
/// first control point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Basis {
    pub matrix: [f64; 16],
    pub offsets: [i32; 4],
}

impl Basis {
    pub fn hermite() -> Self {
        Self {
            matrix: [
                2.0, -3.0, 0.0, 1.0, //
                -2.0, 3.0, 0.0, 0.0, //
                1.0, -2.0, 1.0, 0.0, //
                1.0, -1.0, 0.0, 0.0,
            ],
            offsets: [0, 1, -1, 2],
        }
    }

    pub fn bezier() -> Self {
        Self {
            matrix: [
                -1.0, 3.0, -3.0, 1.0, //
                3.0, -6.0, 3.0, 0.0, //
                -3.0, 3.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, 0.0,
            ],
            offsets: [0, 1, 2, 3],
        }
    }

    pub fn bspline() -> Self {
        Self {
            matrix: [
                -1.0 / 6.0, 3.0 / 6.0, -3.0 / 6.0, 1.0 / 6.0, //
                3.0 / 6.0, -6.0 / 6.0, 0.0, 4.0 / 6.0, //
                -3.0 / 6.0, 3.0 / 6.0, 3.0 / 6.0, 1.0 / 6.0, //
                1.0 / 6.0, 0.0, 0.0, 0.0,
            ],
            offsets: [-1, 0, 1, 2],
        }
    }

    pub fn linear() -> Self {
        Self {
            matrix: [
                0.0, 0.0, -1.0, 1.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 0.0,
            ],
            offsets: [0, 1, 2, 3],
        }
    }

    /// A caller-defined basis.
    pub fn custom(matrix: [f64; 16], offsets: [i32; 4]) -> Self {
        Self { matrix, offsets }
    }

    /// The default basis for a mode. `CustomMatrix` falls back to the
    /// Hermite coefficients with straight indices until a matrix is
    /// installed.
    pub fn for_mode(mode: InterpolationMode) -> Self {
        match mode {
            InterpolationMode::Hermite => Self::hermite(),
            InterpolationMode::Bezier => Self::bezier(),
            InterpolationMode::BSpline => Self::bspline(),
            InterpolationMode::Linear => Self::linear(),
            InterpolationMode::CustomMatrix => Self {
                matrix: Self::hermite().matrix,
                offsets: [0, 1, 2, 3],
            },
        }
    }

    /// Blending weights at `t` for the given derivative order (0, 1 or 2).
    pub fn coefficients(&self, t: f64, order: usize) -> [f64; 4] {
        let m = &self.matrix;
        let mut b = [0.0; 4];

        match order {
            0 => {
                let t2 = t * t;
                let t3 = t2 * t;
                for i in 0..4 {
                    b[i] = m[4 * i] * t3 + m[4 * i + 1] * t2 + m[4 * i + 2] * t + m[4 * i + 3];
                }
            }
            1 => {
                let t2 = 3.0 * t * t;
                let t1 = 2.0 * t;
                for i in 0..4 {
                    b[i] = m[4 * i] * t2 + m[4 * i + 1] * t1 + m[4 * i + 2];
                }
            }
            2 => {
                let t1 = 6.0 * t;
                for i in 0..4 {
                    b[i] = m[4 * i] * t1 + m[4 * i + 1] * 2.0;
                }
            }
            _ => {}
        }

        b
    }

    /// Blend four vectors.
    pub fn blend_vector(&self, t: f64, order: usize, p: [Vector3; 4]) -> Vector3 {
        let b = self.coefficients(t, order);
        b[0] * p[0] + b[1] * p[1] + b[2] * p[2] + b[3] * p[3]
    }

    /// Blend four scalars.
    pub fn blend_scalar(&self, t: f64, order: usize, v: [f64; 4]) -> f64 {
        let b = self.coefficients(t, order);
        b[0] * v[0] + b[1] * v[1] + b[2] * v[2] + b[3] * v[3]
    }

    /// Blend four rotations componentwise.
    ///
    /// Adjacent quaternions are flipped into the same hemisphere first, so
    /// antipodal pairs never interpolate the long way around. The blend is
    /// renormalized; a blend that collapses to ~zero yields identity.
    pub fn blend_rotation(&self, t: f64, order: usize, q: [DQuat; 4]) -> DQuat {
        let q0 = q[0];
        let q1 = quat::align(q0, q[1]);
        let q2 = quat::align(q1, q[2]);
        let q3 = quat::align(q2, q[3]);

        let b = self.coefficients(t, order);

        let x = b[0] * q0.x + b[1] * q1.x + b[2] * q2.x + b[3] * q3.x;
        let y = b[0] * q0.y + b[1] * q1.y + b[2] * q2.y + b[3] * q3.y;
        let z = b[0] * q0.z + b[1] * q1.z + b[2] * q2.z + b[3] * q3.z;
        let w = b[0] * q0.w + b[1] * q1.w + b[2] * q2.w + b[3] * q3.w;

        let blended = DQuat::from_xyzw(x, y, z, w);
        if blended.length_squared() < 1e-12 {
            DQuat::IDENTITY
        } else {
            blended.normalize()
        }
    }
}
