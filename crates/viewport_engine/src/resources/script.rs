//! Script object instance data

use std::sync::Arc;

use crate::foundation::math::Vec3;
use crate::resources::{CollisionMesh, Model};

/// Placed script object instance
///
/// Carries the transform, optional display model and optional collision
/// extracted from the instance's property data.
#[derive(Debug, Clone)]
pub struct ScriptObject {
    /// Unique instance id within the area
    pub instance_id: u32,
    /// Instance name
    pub name: String,
    /// World-space position
    pub position: Vec3,
    /// XYZ Euler rotation in radians
    pub rotation: Vec3,
    /// Scale factors
    pub scale: Vec3,
    /// Display model, if the object type has one
    pub model: Option<Arc<Model>>,
    /// Collision geometry, if the object carries any
    pub collision: Option<Arc<CollisionMesh>>,
    /// Whether the instance is active in game mode
    pub active: bool,
    /// Light layer the object samples lighting from
    pub light_layer: usize,
}

impl ScriptObject {
    /// Create an instance at the origin with no resources attached
    pub fn new(instance_id: u32, name: impl Into<String>) -> Self {
        Self {
            instance_id,
            name: name.into(),
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            model: None,
            collision: None,
            active: true,
            light_layer: 0,
        }
    }
}
