/// Tolerances for curve-space comparisons.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Linear tolerance for distance comparisons (in model units)
    pub linear: f64,
    /// Tolerance for normalized curve parameters in [0, 1]
    pub parametric: f64,
    /// Angular tolerance (in radians)
    pub angular: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-7;
    pub const DEFAULT_PARAMETRIC: f64 = 1e-9;
    pub const DEFAULT_ANGULAR: f64 = 1e-10;

    pub fn new(linear: f64, parametric: f64, angular: f64) -> Self {
        Self {
            linear,
            parametric,
            angular,
        }
    }

    /// Check if two lengths are equal within linear tolerance
    pub fn linear_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.linear
    }

    /// Check if a length is zero within linear tolerance
    pub fn is_zero(self, v: f64) -> bool {
        v.abs() < self.linear
    }

    /// Check if two normalized curve parameters are equal within tolerance
    pub fn param_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.parametric
    }

    /// Check if two angles are equal within angular tolerance
    pub fn angular_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.angular
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            linear: Self::DEFAULT_LINEAR,
            parametric: Self::DEFAULT_PARAMETRIC,
            angular: Self::DEFAULT_ANGULAR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_eq() {
        let tol = Tolerance::default();
        assert!(tol.linear_eq(1.0, 1.0 + 1e-9));
        assert!(!tol.linear_eq(1.0, 1.001));
    }

    #[test]
    fn test_param_eq() {
        let tol = Tolerance::default();
        assert!(tol.param_eq(0.5, 0.5 + 1e-12));
        assert!(!tol.param_eq(0.5, 0.5001));
    }
}
