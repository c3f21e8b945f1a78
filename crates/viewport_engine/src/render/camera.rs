//! Viewport camera with free and orbit move modes
//!
//! The camera keeps its basis vectors, view/projection matrices and frustum
//! in lazily recomputed caches. Mutators only flip dirty bits; every getter
//! settles the caches it depends on before returning, so reads are always
//! consistent no matter how mutations and reads interleave.

use std::cell::Cell;

use crate::core::config::CameraConfig;
use crate::foundation::math::{constants::HALF_PI, utils, Mat4, Vec2, Vec3};
use crate::render::input::{KeyInputs, MouseInputs};
use crate::spatial::{Aabb, Frustum, Ray};

const WORLD_UP: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// How camera movement inputs are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMoveMode {
    /// Fly freely; pan and zoom translate the camera
    #[default]
    Free,
    /// Orbit a target point at a fixed distance
    Orbit,
}

/// Perspective viewport camera
#[derive(Debug)]
pub struct Camera {
    mode: CameraMoveMode,
    yaw: f32,
    pitch: f32,
    orbit_target: Vec3,
    move_speed: f32,
    look_speed: f32,
    fov: f32,
    aspect_ratio: f32,
    near_plane: f32,
    far_plane: f32,

    // Lazily recomputed state. Position lives here because orbit mode
    // derives it from the target and distance.
    position: Cell<Vec3>,
    direction: Cell<Vec3>,
    right: Cell<Vec3>,
    up: Cell<Vec3>,
    orbit_distance: Cell<f32>,
    view: Cell<Mat4>,
    projection: Cell<Mat4>,
    frustum: Cell<Frustum>,
    transform_dirty: Cell<bool>,
    view_dirty: Cell<bool>,
    projection_dirty: Cell<bool>,
    frustum_dirty: Cell<bool>,
}

impl Camera {
    /// Create a camera with editor defaults
    pub fn new() -> Self {
        Self {
            mode: CameraMoveMode::Free,
            yaw: -HALF_PI,
            pitch: 0.0,
            orbit_target: Vec3::zeros(),
            move_speed: 1.0,
            look_speed: 1.0,
            fov: utils::deg_to_rad(55.0),
            aspect_ratio: 1.7777,
            near_plane: 0.1,
            far_plane: 4096.0,
            position: Cell::new(Vec3::new(0.0, 3.0, 1.0)),
            direction: Cell::new(Vec3::zeros()),
            right: Cell::new(Vec3::zeros()),
            up: Cell::new(Vec3::zeros()),
            orbit_distance: Cell::new(3.0),
            view: Cell::new(Mat4::identity()),
            projection: Cell::new(Mat4::identity()),
            frustum: Cell::new(Frustum::infinite()),
            transform_dirty: Cell::new(true),
            view_dirty: Cell::new(true),
            projection_dirty: Cell::new(true),
            frustum_dirty: Cell::new(true),
        }
    }

    /// Create a camera from configuration
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new();
        camera.move_speed = config.move_speed;
        camera.look_speed = config.look_speed;
        camera.fov = utils::deg_to_rad(config.fov_degrees);
        camera.near_plane = config.near_plane;
        camera.far_plane = config.far_plane;
        camera
    }

    // ==================== Movement ====================

    /// Translate along the view plane (free) or rotate around the target (orbit)
    pub fn pan(&mut self, x_amount: f32, y_amount: f32) {
        match self.mode {
            CameraMoveMode::Free => {
                self.update_transform();
                let mut position = self.position.get();
                position += self.right.get() * (x_amount * self.move_speed);
                position += self.up.get() * (y_amount * self.move_speed);
                self.position.set(position);
                self.mark_view_changed();
            }
            CameraMoveMode::Orbit => {
                // Damped further on top of rotate's own factor
                self.rotate(-x_amount * 0.3, y_amount * 0.3);
            }
        }
    }

    /// Adjust yaw and pitch; pitch stays clamped to straight up/down
    pub fn rotate(&mut self, x_amount: f32, y_amount: f32) {
        self.yaw -= x_amount * self.look_speed * 0.3;
        self.pitch -= y_amount * self.look_speed * 0.3;
        self.validate_pitch();
        self.mark_transform_changed();
    }

    /// Move along the view direction (free) or change the orbit distance (orbit)
    pub fn zoom(&mut self, amount: f32) {
        match self.mode {
            CameraMoveMode::Free => {
                self.update_transform();
                let position = self.position.get() + self.direction.get() * (amount * self.move_speed);
                self.position.set(position);
                self.mark_view_changed();
            }
            CameraMoveMode::Orbit => {
                // Clamped on the next transform update
                self.orbit_distance
                    .set(self.orbit_distance.get() - amount * self.move_speed);
                self.mark_transform_changed();
            }
        }
    }

    /// Jump to a position looking straight down the default axis
    pub fn snap(&mut self, position: Vec3) {
        self.position.set(position);
        self.yaw = -HALF_PI;
        self.pitch = 0.0;
        self.mark_transform_changed();
    }

    /// Translate WASDQE key state into movement
    pub fn process_key_input(&mut self, keys: KeyInputs) {
        if keys.contains(KeyInputs::W) {
            self.zoom(0.25);
        }
        if keys.contains(KeyInputs::S) {
            self.zoom(-0.25);
        }
        if keys.contains(KeyInputs::Q) {
            self.pan(0.0, -0.25);
        }
        if keys.contains(KeyInputs::E) {
            self.pan(0.0, 0.25);
        }
        if keys.contains(KeyInputs::A) {
            self.pan(-0.25, 0.0);
        }
        if keys.contains(KeyInputs::D) {
            self.pan(0.25, 0.0);
        }
    }

    /// Translate mouse drag state into movement
    pub fn process_mouse_input(
        &mut self,
        keys: KeyInputs,
        buttons: MouseInputs,
        x_movement: f32,
        y_movement: f32,
    ) {
        let panning = buttons.contains(MouseInputs::MIDDLE)
            || (buttons.contains(MouseInputs::RIGHT) && keys.contains(KeyInputs::CTRL));

        match self.mode {
            CameraMoveMode::Free => {
                if panning {
                    self.pan(-x_movement, y_movement);
                } else if buttons.contains(MouseInputs::RIGHT) {
                    self.rotate(x_movement, y_movement);
                }
            }
            CameraMoveMode::Orbit => {
                if panning {
                    self.pan(-x_movement, y_movement);
                } else if buttons.contains(MouseInputs::LEFT) {
                    self.zoom(-y_movement * 0.2);
                }
            }
        }
    }

    // ==================== Orbit setup ====================

    /// Set the orbit target and distance
    pub fn set_orbit(&mut self, target: Vec3, distance: f32) {
        self.orbit_target = target;
        self.orbit_distance.set(distance);
        if self.mode == CameraMoveMode::Orbit {
            self.mark_transform_changed();
        }
    }

    /// Orbit the center of a bounding box at a distance scaled to its size
    pub fn set_orbit_around(&mut self, aabox: &Aabb, dist_scale: f32) {
        let size = (aabox.max - aabox.min).magnitude();
        self.set_orbit(aabox.center(), size * dist_scale);
    }

    /// Set the orbit target, keeping the camera where it is
    pub fn set_orbit_target(&mut self, target: Vec3) {
        self.update_transform();
        self.orbit_target = target;
        self.orbit_distance
            .set((self.position.get() - target).magnitude());
        if self.mode == CameraMoveMode::Orbit {
            self.mark_transform_changed();
        }
    }

    /// Set the orbit distance
    pub fn set_orbit_distance(&mut self, distance: f32) {
        self.orbit_distance.set(distance);
        if self.mode == CameraMoveMode::Orbit {
            self.mark_transform_changed();
        }
    }

    // ==================== Setters ====================

    /// Switch between free and orbit movement
    pub fn set_move_mode(&mut self, mode: CameraMoveMode) {
        self.mode = mode;
        self.mark_transform_changed();
    }

    /// Set the viewport aspect ratio (width / height)
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.mark_projection_changed();
    }

    /// Set the pan/zoom speed factor
    pub fn set_move_speed(&mut self, speed: f32) {
        self.move_speed = speed;
    }

    /// Set the rotation speed factor
    pub fn set_look_speed(&mut self, speed: f32) {
        self.look_speed = speed;
    }

    // ==================== Getters ====================

    /// Camera move mode
    pub fn move_mode(&self) -> CameraMoveMode {
        self.mode
    }

    /// World-space position
    pub fn position(&self) -> Vec3 {
        self.update_transform();
        self.position.get()
    }

    /// Normalized view direction
    pub fn direction(&self) -> Vec3 {
        self.update_transform();
        self.direction.get()
    }

    /// Normalized up vector
    pub fn up(&self) -> Vec3 {
        self.update_transform();
        self.up.get()
    }

    /// Normalized right vector
    pub fn right(&self) -> Vec3 {
        self.update_transform();
        self.right.get()
    }

    /// Yaw angle in radians
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch angle in radians
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Orbit target point
    pub fn orbit_target(&self) -> Vec3 {
        self.orbit_target
    }

    /// Orbit distance after clamping
    pub fn orbit_distance(&self) -> f32 {
        self.update_transform();
        self.orbit_distance.get()
    }

    /// Vertical field of view in radians
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Viewport aspect ratio
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// View matrix
    pub fn view_matrix(&self) -> Mat4 {
        self.update_view();
        self.view.get()
    }

    /// Projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.update_projection();
        self.projection.get()
    }

    /// View frustum
    pub fn frustum(&self) -> Frustum {
        self.update_frustum();
        self.frustum.get()
    }

    /// Cast a ray through normalized device coordinates (-1..1 on both axes)
    pub fn cast_ray(&self, device_coords: Vec2) -> Ray {
        let view_projection = self.projection_matrix() * self.view_matrix();
        let inverse = view_projection
            .try_inverse()
            .unwrap_or_else(Mat4::identity);

        let origin = utils::transform_point(
            &inverse,
            Vec3::new(device_coords.x, device_coords.y, -1.0),
        );
        let target = utils::transform_point(
            &inverse,
            Vec3::new(device_coords.x, device_coords.y, 0.0),
        );
        Ray::new(origin, target - origin)
    }

    // ==================== Cache maintenance ====================

    fn validate_pitch(&mut self) {
        self.pitch = self.pitch.clamp(-HALF_PI, HALF_PI);
    }

    fn mark_transform_changed(&self) {
        self.transform_dirty.set(true);
        self.view_dirty.set(true);
        self.frustum_dirty.set(true);
    }

    fn mark_view_changed(&self) {
        self.view_dirty.set(true);
        self.frustum_dirty.set(true);
    }

    fn mark_projection_changed(&self) {
        self.projection_dirty.set(true);
        self.frustum_dirty.set(true);
    }

    fn update_transform(&self) {
        if !self.transform_dirty.get() {
            return;
        }

        let direction = Vec3::new(
            self.pitch.cos() * self.yaw.cos(),
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
        );
        let right = Vec3::new((self.yaw - HALF_PI).cos(), (self.yaw - HALF_PI).sin(), 0.0);
        let up = right.cross(&direction);

        self.direction.set(direction);
        self.right.set(right);
        self.up.set(up);

        if self.mode == CameraMoveMode::Orbit {
            let distance = self.orbit_distance.get().max(1.0);
            self.orbit_distance.set(distance);
            self.position.set(self.orbit_target - direction * distance);
        }

        self.transform_dirty.set(false);
    }

    fn update_view(&self) {
        self.update_transform();
        if !self.view_dirty.get() {
            return;
        }

        let position = self.position.get();
        let direction = self.direction.get();
        let right = self.right.get();
        let up = self.up.get();

        self.view.set(Mat4::new(
            right.x, right.y, right.z, -right.dot(&position),
            up.x, up.y, up.z, -up.dot(&position),
            -direction.x, -direction.y, -direction.z, direction.dot(&position),
            0.0, 0.0, 0.0, 1.0,
        ));
        self.view_dirty.set(false);
    }

    fn update_projection(&self) {
        if !self.projection_dirty.get() {
            return;
        }
        self.projection.set(
            nalgebra::Perspective3::new(self.aspect_ratio, self.fov, self.near_plane, self.far_plane)
                .to_homogeneous(),
        );
        self.projection_dirty.set(false);
    }

    fn update_frustum(&self) {
        self.update_transform();
        if !self.frustum_dirty.get() {
            return;
        }
        self.frustum.set(Frustum::from_view(
            self.position.get(),
            self.direction.get(),
            WORLD_UP,
            self.fov,
            self.aspect_ratio,
            self.near_plane,
            self.far_plane,
        ));
        self.frustum_dirty.set(false);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
