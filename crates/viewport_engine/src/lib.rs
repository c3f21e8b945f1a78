//! # Viewport Engine
//!
//! Scene graph, visibility and ray picking core for a real-time 3D viewport.
//!
//! ## Features
//!
//! - **Scene Graph**: Arena-owned node hierarchy with lazily cached world
//!   transforms and bounds
//! - **Camera**: Free and orbit move modes with lazily cached view state
//! - **Visibility**: Per-category show flags, frustum culling and
//!   depth-sorted opaque/blended render buckets
//! - **Picking**: Two-phase ray casting with broad-phase distance pruning
//! - **Draw Descriptors**: The core emits a [`render::DrawList`]; it never
//!   touches a graphics API
//!
//! ## Quick Start
//!
//! ```rust
//! use viewport_engine::prelude::*;
//! use std::sync::Arc;
//!
//! let mut scene = Scene::new();
//! let model = Arc::new(Model::new("box", Vec::new()));
//! scene.create_static_node("terrain", Some(model));
//!
//! let camera = Camera::new();
//! let view = ViewInfo::new(&camera);
//! let mut queue = RenderQueue::new();
//! scene.add_to_renderer(&mut queue, &view);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;
pub mod foundation;
pub mod render;
pub mod resources;
pub mod scene;
pub mod spatial;

/// Common imports for viewport users
pub mod prelude {
    pub use crate::{
        core::config::{CameraConfig, ConfigError, ShowConfig, ViewportConfig},
        foundation::{
            color::Color,
            math::{Mat4, Quat, Vec2, Vec3},
        },
        render::{
            Camera, CameraMoveMode, DrawCall, DrawList, KeyInputs, LightingMode, MouseInputs,
            RenderCommand, RenderOptions, RenderQueue, SurfaceSet, ViewInfo,
        },
        resources::{CollisionMesh, Light, LightType, Model, ScriptObject, Surface},
        scene::{
            NodeId, NodeType, RayIntersection, Scene, SceneNode, ShowFlags, TransformSpace,
        },
        spatial::{Aabb, Frustum, Plane, Ray},
    };
}
