//! Quaternion utilities for smooth rotation interpolation along curves.
//!
//! Free functions with no attached state. `log`/`exp`/`squad_intermediate`
//! implement the pieces of SQUAD (spherical quadrangle interpolation) needed
//! to blend control-node orientations with the same cubic coefficients that
//! blend positions.

use crate::{DMat3, DQuat, Vector3};

/// Below this sine magnitude the log/exp maps short-circuit to avoid
/// dividing by zero for near-identity rotations.
const SIN_EPSILON: f64 = 1e-4;

/// Quaternion logarithm.
///
/// Maps a unit quaternion to a pure-imaginary quaternion whose vector part
/// encodes axis and half-angle. Near-zero rotations map to the input's
/// vector part unchanged.
pub fn log(q: DQuat) -> DQuat {
    let mut x = q.x;
    let mut y = q.y;
    let mut z = q.z;

    if q.w.abs() < 1.0 {
        let theta = q.w.acos();
        let sin_theta = theta.sin();

        if sin_theta.abs() > SIN_EPSILON {
            let coef = theta / sin_theta;
            x *= coef;
            y *= coef;
            z *= coef;
        }
    }

    DQuat::from_xyzw(x, y, z, 0.0)
}

/// Quaternion exponential, inverse of [`log`].
pub fn exp(q: DQuat) -> DQuat {
    let angle = (q.x * q.x + q.y * q.y + q.z * q.z).sqrt();
    let sin_angle = angle.sin();

    let mut x = q.x;
    let mut y = q.y;
    let mut z = q.z;

    if sin_angle.abs() > SIN_EPSILON {
        let coef = sin_angle / angle;
        x *= coef;
        y *= coef;
        z *= coef;
    }

    DQuat::from_xyzw(x, y, z, angle.cos())
}

/// Intermediate control quaternion for SQUAD blending.
///
/// `q1 · exp(-0.25 · (log(q1⁻¹·q0) + log(q1⁻¹·q2)))`
pub fn squad_intermediate(q0: DQuat, q1: DQuat, q2: DQuat) -> DQuat {
    let q1_inv = q1.conjugate();

    let p0 = log(q1_inv * q0);
    let p2 = log(q1_inv * q2);

    let sum = DQuat::from_xyzw(
        -0.25 * (p0.x + p2.x),
        -0.25 * (p0.y + p2.y),
        -0.25 * (p0.z + p2.z),
        -0.25 * (p0.w + p2.w),
    );

    q1 * exp(sum)
}

/// Flip `q` to the same hemisphere as `reference`.
///
/// Adjacent control rotations must not interpolate "the long way around";
/// negating one of an antipodal pair yields the same rotation on the short
/// arc.
pub fn align(reference: DQuat, q: DQuat) -> DQuat {
    if reference.dot(q) < 0.0 {
        DQuat::from_xyzw(-q.x, -q.y, -q.z, -q.w)
    } else {
        q
    }
}

/// Orientation looking along `forward` with `up` as the up reference
/// (+Z maps to `forward`).
///
/// Returns identity when `forward` is zero or parallel to `up`.
pub fn look_rotation(forward: Vector3, up: Vector3) -> DQuat {
    if forward.length_squared() == 0.0 {
        return DQuat::IDENTITY;
    }

    let f = forward.normalize();
    let r = up.cross(f);
    if r.length_squared() < 1e-12 {
        return DQuat::IDENTITY;
    }
    let r = r.normalize();
    let u = f.cross(r);

    DQuat::from_mat3(&DMat3::from_cols(r, u, f)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::dvec3;
    use std::f64::consts::FRAC_PI_2;

    fn quat_approx_eq(a: DQuat, b: DQuat) -> bool {
        // Equal as rotations: q and -q are the same orientation.
        a.dot(b).abs() > 1.0 - 1e-8
    }

    #[test]
    fn test_log_exp_round_trip() {
        let q = DQuat::from_axis_angle(dvec3(0.0, 1.0, 0.0), 1.3);
        let back = exp(log(q));
        assert!(quat_approx_eq(q, back));
    }

    #[test]
    fn test_log_identity_is_safe() {
        let l = log(DQuat::IDENTITY);
        assert_abs_diff_eq!(l.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(l.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(l.z, 0.0, epsilon = 1e-12);
        assert!(quat_approx_eq(exp(l), DQuat::IDENTITY));
    }

    #[test]
    fn test_squad_intermediate_of_equal_rotations() {
        let q = DQuat::from_axis_angle(dvec3(1.0, 0.0, 0.0), 0.7);
        let s = squad_intermediate(q, q, q);
        assert!(quat_approx_eq(s, q));
    }

    #[test]
    fn test_align_flips_antipodal() {
        let q = DQuat::from_axis_angle(dvec3(0.0, 0.0, 1.0), 0.5);
        let neg = DQuat::from_xyzw(-q.x, -q.y, -q.z, -q.w);
        let aligned = align(q, neg);
        assert!(aligned.dot(q) > 0.0);
        assert!(quat_approx_eq(aligned, q));
    }

    #[test]
    fn test_look_rotation_axes() {
        let q = look_rotation(dvec3(0.0, 0.0, 1.0), dvec3(0.0, 1.0, 0.0));
        assert!(quat_approx_eq(q, DQuat::IDENTITY));

        let q = look_rotation(dvec3(1.0, 0.0, 0.0), dvec3(0.0, 1.0, 0.0));
        let f = q * dvec3(0.0, 0.0, 1.0);
        assert!((f - dvec3(1.0, 0.0, 0.0)).length() < 1e-10);

        let expected = DQuat::from_axis_angle(dvec3(0.0, 1.0, 0.0), FRAC_PI_2);
        assert!(quat_approx_eq(q, expected));
    }

    #[test]
    fn test_look_rotation_degenerate() {
        assert!(quat_approx_eq(
            look_rotation(dvec3(0.0, 0.0, 0.0), dvec3(0.0, 1.0, 0.0)),
            DQuat::IDENTITY
        ));
        assert!(quat_approx_eq(
            look_rotation(dvec3(0.0, 1.0, 0.0), dvec3(0.0, 1.0, 0.0)),
            DQuat::IDENTITY
        ));
    }
}
