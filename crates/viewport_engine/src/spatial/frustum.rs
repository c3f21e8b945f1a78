//! View frustum for visibility culling

use crate::foundation::math::Vec3;
use crate::spatial::{Aabb, Plane};

/// Frustum as six inward-facing planes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Near, far, left, right, top, bottom
    planes: [Plane; 6],
}

impl Frustum {
    /// Build the frustum for a camera position and orientation
    ///
    /// `fov` is the vertical field of view in radians; the world up axis
    /// is +Z. All six planes face inward.
    pub fn from_view(
        position: Vec3,
        direction: Vec3,
        up: Vec3,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut right = direction.cross(&up);
        if right.magnitude_squared() < 1e-12 {
            // Looking straight along the up axis
            right = Vec3::new(0.0, 1.0, 0.0);
        }
        let right = right.normalize();
        let view_up = right.cross(&direction).normalize();

        let near_center = position + direction * near;
        let half_height = (fov * 0.5).tan() * near;
        let half_width = half_height * aspect_ratio;

        let left_edge = (near_center - right * half_width - position).normalize();
        let right_edge = (near_center + right * half_width - position).normalize();
        let top_edge = (near_center + view_up * half_height - position).normalize();
        let bottom_edge = (near_center - view_up * half_height - position).normalize();

        Self {
            planes: [
                Plane::redefine(direction, near_center),
                Plane::redefine(-direction, position + direction * far),
                Plane::redefine(left_edge.cross(&view_up).normalize(), position),
                Plane::redefine(view_up.cross(&right_edge).normalize(), position),
                Plane::redefine(top_edge.cross(&right).normalize(), position),
                Plane::redefine(right.cross(&bottom_edge).normalize(), position),
            ],
        }
    }

    /// A frustum that culls nothing
    pub fn infinite() -> Self {
        Self {
            planes: [Plane::new(Vec3::zeros(), 0.0); 6],
        }
    }

    /// Check if a point is inside the frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Check if an AABB is inside or intersects the frustum
    pub fn contains_box(&self, aabb: &Aabb) -> bool {
        // For each plane, test the corner of the box furthest along the
        // plane normal; if that corner is outside, the whole box is
        for plane in &self.planes {
            let p = aabb.furthest_point_along_vector(plane.normal);
            if plane.distance_to_point(p) < 0.0 {
                return false;
            }
        }
        true
    }
}

impl Default for Frustum {
    fn default() -> Self {
        Self::infinite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;

    fn test_frustum() -> Frustum {
        // Looking down +X, z-up, square aspect, 90 degree fov
        Frustum::from_view(
            Vec3::zeros(),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            HALF_PI,
            1.0,
            0.1,
            100.0,
        )
    }

    #[test]
    fn test_point_classification() {
        let frustum = test_frustum();
        assert!(frustum.contains_point(Vec3::new(10.0, 0.0, 0.0)));
        assert!(!frustum.contains_point(Vec3::new(-10.0, 0.0, 0.0)));
        assert!(!frustum.contains_point(Vec3::new(10.0, 0.0, 50.0)));
        assert!(!frustum.contains_point(Vec3::new(200.0, 0.0, 0.0)));
    }

    #[test]
    fn test_box_in_front_and_behind() {
        let frustum = test_frustum();
        let ahead = Aabb::from_center_extents(Vec3::new(10.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let behind = Aabb::from_center_extents(Vec3::new(-10.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(frustum.contains_box(&ahead));
        assert!(!frustum.contains_box(&behind));
    }

    #[test]
    fn test_box_straddling_plane_counts_as_visible() {
        let frustum = test_frustum();
        // Centered on the left plane boundary but large enough to cross it
        let straddling =
            Aabb::from_center_extents(Vec3::new(10.0, 10.0, 0.0), Vec3::new(5.0, 5.0, 5.0));
        assert!(frustum.contains_box(&straddling));
    }

    #[test]
    fn test_infinite_frustum_culls_nothing() {
        let frustum = Frustum::infinite();
        let far_away =
            Aabb::from_center_extents(Vec3::new(1e6, -1e6, 1e6), Vec3::new(1.0, 1.0, 1.0));
        assert!(frustum.contains_box(&far_away));
    }
}
