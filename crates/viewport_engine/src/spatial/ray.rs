//! Ray type and ray/primitive intersection tests

use crate::foundation::math::{utils, Mat4, Vec3};
use crate::spatial::Plane;

const EPSILON: f32 = 1e-6;

/// Ray with an origin and a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    /// Create a ray from an origin and a direction; the direction is normalized
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray origin
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Normalized ray direction
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Point at parametric distance `t` along the ray
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Transform the ray by a matrix, renormalizing the direction
    ///
    /// Parametric distances along the transformed ray do not correspond to
    /// distances along the source ray under non-uniform scale; callers that
    /// need a world distance should map the hit point back and measure it.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self::new(
            utils::transform_point(matrix, self.origin),
            utils::transform_vector(matrix, self.direction),
        )
    }

    /// Intersect the ray with a plane
    ///
    /// Returns the distance to the hit point, or `None` when the ray is
    /// parallel to the plane or the plane lies behind the origin.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<f32> {
        let denom = plane.normal.dot(&self.direction);
        if denom.abs() < EPSILON {
            return None;
        }
        let t = -plane.distance_to_point(self.origin) / denom;
        (t >= 0.0).then_some(t)
    }

    /// Intersect the ray with a triangle (Moller-Trumbore)
    ///
    /// When `allow_backfaces` is false, triangles wound away from the ray
    /// are rejected. Returns the distance to the hit point.
    pub fn intersect_triangle(
        &self,
        v0: Vec3,
        v1: Vec3,
        v2: Vec3,
        allow_backfaces: bool,
    ) -> Option<f32> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let pvec = self.direction.cross(&edge2);
        let det = edge1.dot(&pvec);

        if !allow_backfaces && det < EPSILON {
            return None;
        }
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let tvec = self.origin - v0;
        let u = tvec.dot(&pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(&edge1);
        let v = self.direction.dot(&qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(&qvec) * inv_det;
        (t >= 0.0).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_at() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0));
        let p = ray.point_at(3.0);
        assert_relative_eq!(p.y, 3.0);
        assert_relative_eq!(p.x, 1.0);
    }

    #[test]
    fn test_triangle_hit_and_distance() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let t = ray
            .intersect_triangle(
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                true,
            )
            .unwrap();
        assert_relative_eq!(t, 5.0);
    }

    #[test]
    fn test_triangle_backface_rejected() {
        // Wound so the normal faces away from the ray
        let ray = Ray::new(Vec3::new(0.25, 0.25, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let front = ray.intersect_triangle(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            false,
        );
        let back = ray.intersect_triangle(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            false,
        );
        assert!(front.is_some() != back.is_some());
        assert!(
            ray.intersect_triangle(
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                true,
            )
            .is_some()
        );
    }

    #[test]
    fn test_triangle_miss() {
        let ray = Ray::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(ray
            .intersect_triangle(
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                true,
            )
            .is_none());
    }

    #[test]
    fn test_plane_intersection() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -1.0));
        let plane = Plane::redefine(Vec3::new(0.0, 0.0, 1.0), Vec3::zeros());
        assert_relative_eq!(ray.intersect_plane(&plane).unwrap(), 3.0);

        let behind = Plane::redefine(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 10.0));
        assert!(ray.intersect_plane(&behind).is_none());
    }

    #[test]
    fn test_transformed_ray() {
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
        let m = Mat4::new_translation(&Vec3::new(2.0, 0.0, 0.0));
        let moved = ray.transformed(&m);
        assert_relative_eq!(moved.origin().x, 2.0);
        assert_relative_eq!(moved.direction().z, -1.0);
    }
}
