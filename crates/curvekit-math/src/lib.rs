pub mod plane;
pub mod quat;
pub mod ray;

pub use glam::{DMat3, DQuat, DVec2, DVec3, DVec4};
pub use plane::Plane3;
pub use ray::Ray3;

pub type Point3 = DVec3;
pub type Vector3 = DVec3;
