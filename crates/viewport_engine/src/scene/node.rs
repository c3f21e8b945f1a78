//! Scene node: the arena-allocated building block of the scene graph
//!
//! Nodes own local transform components and a local-space bounding box;
//! the absolute transform and world-space box are memoized behind a dirty
//! flag. Reads go through `&self` with interior-mutability caches, so a
//! shared scene reference is enough for the whole visibility pass.

use std::cell::Cell;
use std::sync::Arc;

use slotmap::new_key_type;

use crate::foundation::math::{Mat4, Quat, Vec3};
use crate::render::lighting::LightingContext;
use crate::resources::{CollisionMesh, Model, ScriptObject};
use crate::scene::graph::Scene;
use crate::scene::show_flags::NodeFlags;
use crate::spatial::Aabb;

new_key_type! {
    /// Stable key of a node in the scene arena
    pub struct NodeId;
}

/// Coordinate space of a relative transform operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSpace {
    /// Relative to the node's own orientation
    Local,
    /// Relative to the world axes
    World,
}

/// The closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Grouping node with no renderable payload
    Root,
    /// Split world geometry
    Model,
    /// Merged world geometry
    Static,
    /// World collision geometry
    Collision,
    /// Placed script object
    Script,
    /// Light billboard
    Light,
}

impl NodeType {
    /// Category flag for scene-level gating; the root has none
    pub fn node_flag(self) -> NodeFlags {
        match self {
            Self::Root => NodeFlags::empty(),
            Self::Model => NodeFlags::MODEL,
            Self::Static => NodeFlags::STATIC,
            Self::Collision => NodeFlags::COLLISION,
            Self::Script => NodeFlags::SCRIPT,
            Self::Light => NodeFlags::LIGHT,
        }
    }
}

/// Payload of a model node
#[derive(Debug, Clone)]
pub struct ModelData {
    /// Model to render
    pub model: Option<Arc<Model>>,
    /// Whether this is world geometry, which splits its blended surfaces
    /// into individually sorted entries
    pub world_model: bool,
}

/// Payload of a static (merged world) node
#[derive(Debug, Clone)]
pub struct StaticData {
    /// Merged geometry to render
    pub model: Option<Arc<Model>>,
}

/// Payload of a collision node
#[derive(Debug, Clone)]
pub struct CollisionData {
    /// Collision geometry to render
    pub mesh: Option<Arc<CollisionMesh>>,
}

/// Payload of a script object node
#[derive(Debug, Clone)]
pub struct ScriptData {
    /// The placed instance
    pub instance: ScriptObject,
    /// Child node previewing the instance's collision, if it has any
    pub collision_node: Option<NodeId>,
}

/// Payload of a light node
#[derive(Debug, Clone, Copy)]
pub struct LightData {
    /// Index into the scene's light table
    pub light_index: u32,
}

/// Kind-specific node payload
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Grouping node
    Root,
    /// Split world geometry
    Model(ModelData),
    /// Merged world geometry
    Static(StaticData),
    /// World collision geometry
    Collision(CollisionData),
    /// Placed script object
    Script(ScriptData),
    /// Light billboard
    Light(LightData),
}

impl NodeData {
    /// Kind of node this payload belongs to
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Root => NodeType::Root,
            Self::Model(_) => NodeType::Model,
            Self::Static(_) => NodeType::Static,
            Self::Collision(_) => NodeType::Collision,
            Self::Script(_) => NodeType::Script,
            Self::Light(_) => NodeType::Light,
        }
    }
}

/// A node in the scene graph
#[derive(Debug)]
pub struct SceneNode {
    id: NodeId,
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,

    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    inherits_position: bool,
    inherits_rotation: bool,
    inherits_scale: bool,

    local_aabox: Aabb,
    visible: bool,
    selected: bool,
    hovered: bool,
    light_layer: usize,
    lighting: LightingContext,

    transform: Cell<Mat4>,
    world_aabox: Cell<Aabb>,
    transform_dirty: Cell<bool>,

    pub(crate) data: NodeData,
}

impl SceneNode {
    pub(crate) fn new(id: NodeId, name: String, parent: Option<NodeId>, data: NodeData) -> Self {
        Self {
            id,
            name,
            parent,
            children: Vec::new(),
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            inherits_position: true,
            inherits_rotation: true,
            inherits_scale: true,
            local_aabox: Aabb::UNIT,
            visible: true,
            selected: false,
            hovered: false,
            light_layer: 0,
            lighting: LightingContext::fullbright(),
            transform: Cell::new(Mat4::identity()),
            world_aabox: Cell::new(Aabb::UNIT),
            transform_dirty: Cell::new(true),
            data,
        }
    }

    // ==================== Identity and hierarchy ====================

    /// Node key
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of node
    pub fn node_type(&self) -> NodeType {
        self.data.node_type()
    }

    /// Parent key, `None` for the scene root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child keys
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    // ==================== Local transform ====================

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Inheritance flags as (position, rotation, scale)
    pub fn inheritance(&self) -> (bool, bool, bool) {
        (
            self.inherits_position,
            self.inherits_rotation,
            self.inherits_scale,
        )
    }

    /// Local-space bounding box
    pub fn local_aabox(&self) -> Aabb {
        self.local_aabox
    }

    // ==================== Flags ====================

    /// User visibility flag
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the node is selected
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether the mouse hovers the node
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Light layer the node samples lighting from
    pub fn light_layer(&self) -> usize {
        self.light_layer
    }

    /// Cached lighting for this node
    pub fn lighting(&self) -> LightingContext {
        self.lighting
    }

    /// Whether the cached transform needs a recompute
    pub fn has_dirty_transform(&self) -> bool {
        self.transform_dirty.get()
    }

    /// The script instance placed at this node, for script nodes
    pub fn instance(&self) -> Option<&crate::resources::ScriptObject> {
        match &self.data {
            NodeData::Script(data) => Some(&data.instance),
            _ => None,
        }
    }

    // ==================== Absolute transform ====================

    /// World-space position, composed with the parent chain along
    /// inherited axes only
    pub fn absolute_position(&self, scene: &Scene) -> Vec3 {
        let mut position = self.position;
        if self.inherits_position {
            if let Some(parent) = self.parent.and_then(|id| scene.node(id)) {
                position += parent.absolute_position(scene);
            }
        }
        position
    }

    /// World-space rotation
    pub fn absolute_rotation(&self, scene: &Scene) -> Quat {
        let mut rotation = self.rotation;
        if self.inherits_rotation {
            if let Some(parent) = self.parent.and_then(|id| scene.node(id)) {
                rotation = parent.absolute_rotation(scene) * rotation;
            }
        }
        rotation
    }

    /// World-space scale
    pub fn absolute_scale(&self, scene: &Scene) -> Vec3 {
        let mut scale = self.scale;
        if self.inherits_scale {
            if let Some(parent) = self.parent.and_then(|id| scene.node(id)) {
                scale = scale.component_mul(&parent.absolute_scale(scene));
            }
        }
        scale
    }

    /// World transform, recomputed if a mutation dirtied it
    pub fn transform(&self, scene: &Scene) -> Mat4 {
        self.update_transform(scene);
        self.transform.get()
    }

    /// World-space bounding box, recomputed if a mutation dirtied it
    pub fn world_aabox(&self, scene: &Scene) -> Aabb {
        self.update_transform(scene);
        self.world_aabox.get()
    }

    /// Center of the world-space bounding box
    pub fn center_point(&self, scene: &Scene) -> Vec3 {
        self.world_aabox(scene).center()
    }

    fn update_transform(&self, scene: &Scene) {
        if !self.transform_dirty.get() {
            return;
        }

        // Settle the ancestor chain first: a clean node must always imply
        // clean ancestors, or marking could stop above a settled descendant
        if let Some(parent) = self.parent.and_then(|id| scene.node(id)) {
            parent.update_transform(scene);
        }

        let transform = match self.data {
            // Billboards ignore rotation and scale
            NodeData::Light(_) => Mat4::new_translation(&self.absolute_position(scene)),
            _ => {
                Mat4::new_translation(&self.absolute_position(scene))
                    * self.absolute_rotation(scene).to_homogeneous()
                    * Mat4::new_nonuniform_scaling(&self.absolute_scale(scene))
            }
        };
        self.transform.set(transform);
        self.world_aabox.set(self.local_aabox.transformed(&transform));

        // Children derive from this transform, so they recompute too
        for &child in &self.children {
            if let Some(child) = scene.node(child) {
                child.mark_transform_changed(scene);
            }
        }
        self.transform_dirty.set(false);
    }

    /// Mark this node and its descendants for transform recompute
    ///
    /// An already dirty node has already marked its subtree, so marking
    /// stops there.
    pub(crate) fn mark_transform_changed(&self, scene: &Scene) {
        if !self.transform_dirty.get() {
            for &child in &self.children {
                if let Some(child) = scene.node(child) {
                    child.mark_transform_changed(scene);
                }
            }
        }
        self.transform_dirty.set(true);
    }

    // ==================== Crate-internal mutation ====================
    // All mutation funnels through the scene so dirty marking is never
    // skipped.

    pub(crate) fn set_local_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub(crate) fn set_local_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    pub(crate) fn set_local_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    pub(crate) fn set_inheritance_flags(&mut self, position: bool, rotation: bool, scale: bool) {
        self.inherits_position = position;
        self.inherits_rotation = rotation;
        self.inherits_scale = scale;
    }

    pub(crate) fn set_local_aabox(&mut self, aabox: Aabb) {
        self.local_aabox = aabox;
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub(crate) fn set_light_layer(&mut self, layer: usize) {
        self.light_layer = layer;
    }

    pub(crate) fn set_lighting(&mut self, lighting: LightingContext) {
        self.lighting = lighting;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn attach_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(crate) fn detach_child(&mut self, child: NodeId) {
        self.children.retain(|&id| id != child);
    }
}
