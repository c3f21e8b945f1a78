//! Draw call descriptors emitted by the scene pass
//!
//! The viewport core stops here; an external renderer walks the list and
//! issues the actual graphics API work.

use std::sync::Arc;

use crate::foundation::color::Color;
use crate::foundation::math::{Mat4, Vec2, Vec3};
use crate::render::lighting::LightingContext;
use crate::resources::{CollisionMesh, LightType, Model};
use crate::scene::NodeId;
use crate::spatial::Aabb;

/// Which surfaces of a model a draw call covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceSet {
    /// Every surface
    All,
    /// Only surfaces without blending
    OpaqueOnly,
    /// Only surfaces with blending
    BlendedOnly,
    /// One surface by index
    Single(usize),
}

/// One draw descriptor
#[derive(Debug, Clone)]
pub enum DrawCall {
    /// Draw surfaces of a model
    Surfaces {
        /// Node the draw belongs to
        node: NodeId,
        /// Model to draw
        model: Arc<Model>,
        /// World transform
        transform: Mat4,
        /// Surface selection
        set: SurfaceSet,
        /// Lighting inputs
        lighting: LightingContext,
        /// Color modulation
        tint: Color,
    },
    /// Draw a unit cube placeholder for an object without a display model
    PlaceholderCube {
        /// Node the draw belongs to
        node: NodeId,
        /// World transform
        transform: Mat4,
        /// Color modulation
        tint: Color,
    },
    /// Draw collision geometry
    Collision {
        /// Node the draw belongs to
        node: NodeId,
        /// Collision mesh to draw
        mesh: Arc<CollisionMesh>,
        /// World transform
        transform: Mat4,
        /// Color modulation
        tint: Color,
    },
    /// Draw a camera-facing light billboard
    LightBillboard {
        /// Node the draw belongs to
        node: NodeId,
        /// Kind of light, selects the billboard art
        kind: LightType,
        /// Billboard center
        position: Vec3,
        /// Horizontal and vertical billboard extents
        scale: Vec2,
        /// Light color
        color: Color,
    },
    /// Draw a wireframe box, used for selection outlines
    WireBox {
        /// Node the draw belongs to
        node: NodeId,
        /// Box to outline
        aabox: Aabb,
        /// Line color
        color: Color,
    },
    /// Draw a model as wireframe, used for selection outlines
    Wireframe {
        /// Node the draw belongs to
        node: NodeId,
        /// Model to outline
        model: Arc<Model>,
        /// World transform
        transform: Mat4,
        /// Line color
        color: Color,
    },
    /// Draw a wireframe sphere, used for light radius previews
    WireSphere {
        /// Node the draw belongs to
        node: NodeId,
        /// Sphere center
        center: Vec3,
        /// Sphere radius
        radius: f32,
        /// Line color
        color: Color,
    },
}

impl DrawCall {
    /// Node the draw call belongs to
    pub fn node(&self) -> NodeId {
        match self {
            Self::Surfaces { node, .. }
            | Self::PlaceholderCube { node, .. }
            | Self::Collision { node, .. }
            | Self::LightBillboard { node, .. }
            | Self::WireBox { node, .. }
            | Self::Wireframe { node, .. }
            | Self::WireSphere { node, .. } => *node,
        }
    }
}

/// Ordered list of draw calls for one frame
#[derive(Debug, Default)]
pub struct DrawList {
    calls: Vec<DrawCall>,
}

impl DrawList {
    /// Create an empty draw list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a draw call
    pub fn push(&mut self, call: DrawCall) {
        self.calls.push(call);
    }

    /// Draw calls in emission order
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Number of draw calls
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Drop all draw calls, keeping the allocation
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}
