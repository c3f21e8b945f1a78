//! Spatial primitives and intersection routines
//!
//! Axis-aligned boxes, planes, frustums and rays, plus the intersection
//! tests the visibility and picking passes are built on.

pub mod aabb;
pub mod frustum;
pub mod plane;
pub mod ray;

pub use aabb::Aabb;
pub use frustum::Frustum;
pub use plane::Plane;
pub use ray::Ray;
