use crate::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A ray in 3D space defined by origin and direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ray3 {
    pub origin: Point3,
    pub direction: Vector3,
}

impl Ray3 {
    pub fn new(origin: Point3, direction: Vector3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at parameter t.
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }

    /// Find the closest point on the ray to a given point.
    pub fn closest_point(&self, point: Point3) -> Point3 {
        let t = (point - self.origin).dot(self.direction).max(0.0);
        self.at(t)
    }

    /// Distance from a point to the ray.
    pub fn distance_to_point(&self, point: Point3) -> f64 {
        (point - self.closest_point(point)).length()
    }

    /// Squared length of `direction × (point − origin)`.
    ///
    /// For a point at distance d from the infinite line carrying the ray this
    /// is d², which makes it a cheap comparison metric for closest-point
    /// searches along curves.
    pub fn cross_distance_sq(&self, point: Point3) -> f64 {
        self.direction.cross(point - self.origin).length_squared()
    }
}
