//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics and viewport tooling.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::*;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Quaternion from XYZ Euler angles in radians
    pub fn quat_from_euler(euler: Vec3) -> Quat {
        Quat::from_euler_angles(euler.x, euler.y, euler.z)
    }

    /// Transform a point by a homogeneous matrix, applying the perspective divide
    pub fn transform_point(matrix: &Mat4, point: Vec3) -> Vec3 {
        let p = matrix * Vec4::new(point.x, point.y, point.z, 1.0);
        if p.w != 0.0 {
            Vec3::new(p.x / p.w, p.y / p.w, p.z / p.w)
        } else {
            Vec3::new(p.x, p.y, p.z)
        }
    }

    /// Transform a direction by a homogeneous matrix, ignoring translation
    pub fn transform_vector(matrix: &Mat4, vector: Vec3) -> Vec3 {
        let v = matrix * Vec4::new(vector.x, vector.y, vector.z, 0.0);
        Vec3::new(v.x, v.y, v.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_deg_to_rad_round_trip() {
        assert_relative_eq!(utils::deg_to_rad(180.0), constants::PI);
        assert_relative_eq!(utils::rad_to_deg(constants::HALF_PI), 90.0);
    }

    #[test]
    fn test_transform_point_translation() {
        let m = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let p = utils::transform_point(&m, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 2.0);
        assert_relative_eq!(p.y, 2.0);
        assert_relative_eq!(p.z, 3.0);
    }

    #[test]
    fn test_transform_vector_ignores_translation() {
        let m = Mat4::new_translation(&Vec3::new(5.0, 5.0, 5.0));
        let v = utils::transform_vector(&m, Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(v.y, 1.0);
        assert_relative_eq!(v.x, 0.0);
    }
}
