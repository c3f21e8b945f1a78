//! Collision mesh resource

use crate::spatial::Aabb;

/// Collision geometry: only the bounds matter to the viewport core
#[derive(Debug, Clone)]
pub struct CollisionMesh {
    name: String,
    aabox: Aabb,
}

impl CollisionMesh {
    /// Create a collision mesh with the given local-space bounds
    pub fn new(name: impl Into<String>, aabox: Aabb) -> Self {
        Self {
            name: name.into(),
            aabox,
        }
    }

    /// Mesh name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local-space bounds
    pub fn aabox(&self) -> Aabb {
        self.aabox
    }
}
