//! Scene: arena owner of all nodes plus the per-category bookkeeping
//!
//! The scene owns every node in a slotmap arena; hierarchy is expressed
//! through keys, so deleting a subtree can never leave dangling parent
//! pointers. One node list per category drives both the visibility pass
//! and the scene-wide ray cast. All node mutation funnels through scene
//! methods so transform caches are invalidated consistently.

use std::collections::HashMap;
use std::sync::Arc;

use slotmap::SlotMap;

use crate::foundation::color::Color;
use crate::foundation::math::{utils, Quat, Vec3};
use crate::render::bucket::RenderQueue;
use crate::render::lighting::{LightingContext, MAX_NODE_LIGHTS};
use crate::render::view::ViewInfo;
use crate::resources::{CollisionMesh, Light, LightType, Model, ScriptObject};
use crate::scene::node::{
    CollisionData, LightData, ModelData, NodeData, NodeId, NodeType, SceneNode, ScriptData,
    StaticData, TransformSpace,
};
use crate::scene::picking::{RayCollisionTester, RayIntersection};
use crate::scene::show_flags::NodeFlags;
use crate::spatial::{Aabb, Ray};

/// Category iteration order for rendering and picking
const CATEGORIES: [NodeType; 5] = [
    NodeType::Model,
    NodeType::Static,
    NodeType::Collision,
    NodeType::Script,
    NodeType::Light,
];

fn category_index(node_type: NodeType) -> Option<usize> {
    CATEGORIES.iter().position(|&t| t == node_type)
}

/// The scene graph and everything loaded into it
#[derive(Debug)]
pub struct Scene {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
    area_root: Option<NodeId>,
    node_lists: [Vec<NodeId>; CATEGORIES.len()],
    script_map: HashMap<u32, NodeId>,
    light_map: HashMap<u32, NodeId>,
    lights: Vec<Light>,
    skybox: Option<Arc<Model>>,
}

impl Scene {
    /// Create a scene containing only the root node
    pub fn new() -> Self {
        let mut nodes: SlotMap<NodeId, SceneNode> = SlotMap::with_key();
        let root = nodes
            .insert_with_key(|id| SceneNode::new(id, "Scene Root".into(), None, NodeData::Root));
        Self {
            nodes,
            root,
            area_root: None,
            node_lists: std::array::from_fn(|_| Vec::new()),
            script_map: HashMap::new(),
            light_map: HashMap::new(),
            lights: Vec::new(),
            skybox: None,
        }
    }

    // ==================== Lookup ====================

    /// Node by key
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Root node key
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Area root key, present once anything has been loaded
    pub fn area_root(&self) -> Option<NodeId> {
        self.area_root
    }

    /// Total number of nodes, including the roots
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Keys of every node in a category
    pub fn nodes_of_type(&self, node_type: NodeType) -> &[NodeId] {
        category_index(node_type).map_or(&[], |index| self.node_lists[index].as_slice())
    }

    /// Script node for an instance id
    pub fn node_for_instance_id(&self, instance_id: u32) -> Option<NodeId> {
        self.script_map.get(&instance_id).copied()
    }

    /// Light node for a light table index
    pub fn node_for_light(&self, light_index: u32) -> Option<NodeId> {
        self.light_map.get(&light_index).copied()
    }

    /// Light by table index
    pub fn light(&self, index: u32) -> Option<&Light> {
        self.lights.get(index as usize)
    }

    /// Number of lights in the table
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Skybox model if one is set and the view shows it
    pub fn active_skybox(&self, view: &ViewInfo) -> Option<&Arc<Model>> {
        use crate::scene::show_flags::ShowFlags;
        if view.effective_show_flags().contains(ShowFlags::SKY) {
            self.skybox.as_ref()
        } else {
            None
        }
    }

    /// Set the skybox model
    pub fn set_skybox(&mut self, skybox: Option<Arc<Model>>) {
        self.skybox = skybox;
    }

    // ==================== Node factories ====================

    fn ensure_area_root(&mut self) -> NodeId {
        if let Some(area_root) = self.area_root {
            return area_root;
        }
        let area_root = self.insert_node(self.root, "Area Root".into(), NodeData::Root);
        self.area_root = Some(area_root);
        area_root
    }

    fn insert_node(&mut self, parent: NodeId, name: String, data: NodeData) -> NodeId {
        let id = self
            .nodes
            .insert_with_key(|id| SceneNode::new(id, name, Some(parent), data));
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.attach_child(id);
        }
        if let Some(index) = category_index(self.nodes[id].node_type()) {
            self.node_lists[index].push(id);
        }
        id
    }

    /// Create a split world model node; `None` when the model is missing
    pub fn create_model_node(
        &mut self,
        name: impl Into<String>,
        model: Option<Arc<Model>>,
        world_model: bool,
    ) -> Option<NodeId> {
        let Some(model) = model else {
            log::warn!("Skipping model node with no model");
            return None;
        };
        let parent = self.ensure_area_root();
        let aabox = model.aabox();
        let id = self.insert_node(
            parent,
            name.into(),
            NodeData::Model(ModelData {
                model: Some(model),
                world_model,
            }),
        );
        self.nodes[id].set_local_aabox(aabox);
        log::debug!("Created model node {:?}", id);
        Some(id)
    }

    /// Create a merged world geometry node; `None` when the model is missing
    pub fn create_static_node(
        &mut self,
        name: impl Into<String>,
        model: Option<Arc<Model>>,
    ) -> Option<NodeId> {
        let Some(model) = model else {
            log::warn!("Skipping static node with no model");
            return None;
        };
        let parent = self.ensure_area_root();
        let aabox = model.aabox();
        let id = self.insert_node(
            parent,
            name.into(),
            NodeData::Static(StaticData { model: Some(model) }),
        );
        self.nodes[id].set_local_aabox(aabox);
        log::debug!("Created static node {:?}", id);
        Some(id)
    }

    /// Create a world collision node; `None` when the mesh is missing
    pub fn create_collision_node(
        &mut self,
        name: impl Into<String>,
        mesh: Option<Arc<CollisionMesh>>,
    ) -> Option<NodeId> {
        let Some(mesh) = mesh else {
            log::warn!("Skipping collision node with no mesh");
            return None;
        };
        let parent = self.ensure_area_root();
        let aabox = mesh.aabox();
        let id = self.insert_node(
            parent,
            name.into(),
            NodeData::Collision(CollisionData { mesh: Some(mesh) }),
        );
        self.nodes[id].set_local_aabox(aabox);
        log::debug!("Created collision node {:?}", id);
        Some(id)
    }

    /// Create a script object node seeded from its instance
    ///
    /// Returns `None` when the instance id is already placed. The node gets
    /// a child collision node when the instance carries collision, and its
    /// light list is built immediately.
    pub fn create_script_node(&mut self, instance: ScriptObject) -> Option<NodeId> {
        if self.script_map.contains_key(&instance.instance_id) {
            log::warn!(
                "Skipping duplicate script instance {:#x}",
                instance.instance_id
            );
            return None;
        }
        let parent = self.ensure_area_root();
        let instance_id = instance.instance_id;
        let position = instance.position;
        let rotation = utils::quat_from_euler(instance.rotation);
        let scale = instance.scale;
        let light_layer = instance.light_layer;
        let aabox = instance
            .model
            .as_ref()
            .map_or(Aabb::UNIT, |model| model.aabox());
        let collision = instance.collision.clone();
        let name = instance.name.clone();

        let id = self.insert_node(
            parent,
            name,
            NodeData::Script(ScriptData {
                instance,
                collision_node: None,
            }),
        );
        {
            let node = &mut self.nodes[id];
            node.set_local_position(position);
            node.set_local_rotation(rotation);
            node.set_local_scale(scale);
            node.set_local_aabox(aabox);
            node.set_light_layer(light_layer);
        }

        if let Some(mesh) = collision {
            // Collision previews follow the object but ignore its scale
            let collision_aabox = mesh.aabox();
            let child = self.insert_node(
                id,
                "Collision Preview".into(),
                NodeData::Collision(CollisionData { mesh: Some(mesh) }),
            );
            {
                let node = &mut self.nodes[child];
                node.set_inheritance_flags(true, true, false);
                node.set_local_aabox(collision_aabox);
            }
            // Preview nodes render through their script node, not the
            // collision category list
            if let Some(index) = category_index(NodeType::Collision) {
                self.node_lists[index].retain(|&n| n != child);
            }
            if let Some(NodeData::Script(data)) = self.nodes.get_mut(id).map(|n| &mut n.data) {
                data.collision_node = Some(child);
            }
        }

        self.script_map.insert(instance_id, id);
        self.build_light_list(id);
        log::debug!("Created script node {:?} for instance {:#x}", id, instance_id);
        Some(id)
    }

    /// Create a light billboard node for a light table entry
    pub fn create_light_node(&mut self, light_index: u32) -> Option<NodeId> {
        let light = self.lights.get(light_index as usize)?;
        let position = light.position;
        let parent = self.ensure_area_root();
        let id = self.insert_node(
            parent,
            format!("Light {light_index}"),
            NodeData::Light(LightData { light_index }),
        );
        {
            let node = &mut self.nodes[id];
            node.set_local_position(position);
            node.set_local_aabox(Aabb::UNIT);
        }
        self.light_map.insert(light_index, id);
        log::debug!("Created light node {:?}", id);
        Some(id)
    }

    /// Add a light to the table, returning its index
    pub fn add_light(&mut self, light: Light) -> u32 {
        self.lights.push(light);
        (self.lights.len() - 1) as u32
    }

    /// Move a node under a new parent, keeping its local transform
    pub fn reparent_node(&mut self, id: NodeId, new_parent: NodeId) {
        if id == self.root || id == new_parent || !self.nodes.contains_key(new_parent) {
            return;
        }
        let Some(old_parent) = self.nodes.get(id).and_then(SceneNode::parent) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(old_parent) {
            parent.detach_child(id);
        }
        if let Some(parent) = self.nodes.get_mut(new_parent) {
            parent.attach_child(id);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_parent(Some(new_parent));
        }
        self.on_transformed(id);
    }

    // ==================== Deletion ====================

    /// Delete a node and its whole subtree
    pub fn delete_node(&mut self, id: NodeId) {
        if id == self.root || !self.nodes.contains_key(id) {
            return;
        }

        // Unhook from the parent first, then take the subtree down
        if let Some(parent) = self.nodes[id].parent() {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.detach_child(id);
            }
        }

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.get(current) {
                pending.extend_from_slice(node.children());
            }
            self.unregister_node(current);
            self.nodes.remove(current);
        }
        if self.area_root == Some(id) {
            self.area_root = None;
        }
        log::debug!("Deleted node {:?}", id);
    }

    fn unregister_node(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id) else { return };
        if let Some(index) = category_index(node.node_type()) {
            self.node_lists[index].retain(|&n| n != id);
        }
        match &node.data {
            NodeData::Script(data) => {
                let instance_id = data.instance.instance_id;
                self.script_map.remove(&instance_id);
            }
            NodeData::Light(data) => {
                let light_index = data.light_index;
                self.light_map.remove(&light_index);
            }
            _ => {}
        }
    }

    /// Drop everything loaded into the scene, keeping the root
    pub fn clear_scene(&mut self) {
        if let Some(area_root) = self.area_root {
            self.delete_node(area_root);
        }
        self.area_root = None;
        self.lights.clear();
        self.script_map.clear();
        self.light_map.clear();
        self.skybox = None;
        log::info!("Cleared scene");
    }

    // ==================== Transform mutation ====================

    /// Set a node's local position
    pub fn set_node_position(&mut self, id: NodeId, position: Vec3) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_local_position(position);
            self.on_transformed(id);
        }
    }

    /// Set a node's local rotation
    pub fn set_node_rotation(&mut self, id: NodeId, rotation: Quat) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_local_rotation(rotation);
            self.on_transformed(id);
        }
    }

    /// Set a node's local rotation from XYZ Euler angles in radians
    pub fn set_node_rotation_euler(&mut self, id: NodeId, euler: Vec3) {
        self.set_node_rotation(id, utils::quat_from_euler(euler));
    }

    /// Set a node's local scale
    pub fn set_node_scale(&mut self, id: NodeId, scale: Vec3) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_local_scale(scale);
            self.on_transformed(id);
        }
    }

    /// Translate a node in world or local space
    pub fn translate_node(&mut self, id: NodeId, delta: Vec3, space: TransformSpace) {
        if let Some(node) = self.nodes.get_mut(id) {
            let delta = match space {
                TransformSpace::World => delta,
                TransformSpace::Local => node.rotation() * delta,
            };
            node.set_local_position(node.position() + delta);
            self.on_transformed(id);
        }
    }

    /// Rotate a node in world or local space
    pub fn rotate_node(&mut self, id: NodeId, rotation: Quat, space: TransformSpace) {
        if let Some(node) = self.nodes.get_mut(id) {
            let combined = match space {
                TransformSpace::World => rotation * node.rotation(),
                TransformSpace::Local => node.rotation() * rotation,
            };
            node.set_local_rotation(combined);
            self.on_transformed(id);
        }
    }

    /// Scale a node by per-axis factors
    pub fn scale_node(&mut self, id: NodeId, factors: Vec3) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_local_scale(node.scale().component_mul(&factors));
            self.on_transformed(id);
        }
    }

    /// Set which transform components a node inherits from its parent
    pub fn set_node_inheritance(
        &mut self,
        id: NodeId,
        position: bool,
        rotation: bool,
        scale: bool,
    ) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_inheritance_flags(position, rotation, scale);
            self.on_transformed(id);
        }
    }

    fn on_transformed(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get(id) {
            node.mark_transform_changed(self);
        }
        // Keep script instances in sync with their node
        let Some(node) = self.nodes.get(id) else { return };
        let (position, rotation, scale) = (node.position(), node.rotation(), node.scale());
        if let Some(NodeData::Script(data)) = self.nodes.get_mut(id).map(|n| &mut n.data) {
            data.instance.position = position;
            let (roll, pitch, yaw) = rotation.euler_angles();
            data.instance.rotation = Vec3::new(roll, pitch, yaw);
            data.instance.scale = scale;
        }
    }

    // ==================== Node flag mutation ====================

    /// Set a node's user visibility flag
    pub fn set_node_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_visible(visible);
        }
    }

    /// Select or deselect a node
    pub fn set_node_selected(&mut self, id: NodeId, selected: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_selected(selected);
        }
    }

    /// Set a node's hover highlight
    pub fn set_node_hovered(&mut self, id: NodeId, hovered: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_hovered(hovered);
        }
    }

    /// Rename a node
    pub fn set_node_name(&mut self, id: NodeId, name: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_name(name.into());
        }
    }

    // ==================== Lighting ====================

    /// Rebuild one node's cached light list
    ///
    /// Ambient comes from the node's light layer; the closest
    /// [`MAX_NODE_LIGHTS`] in-radius lights are kept, ranked by distance to
    /// the node's bounds center. A node on an empty layer falls back to
    /// layer 0 with a white ambient.
    pub fn build_light_list(&mut self, id: NodeId) {
        let Some((center, node_layer)) = ({
            let this = &*self;
            this.nodes
                .get(id)
                .map(|node| (node.world_aabox(this).center(), node.light_layer()))
        }) else {
            return;
        };

        let layer_populated = self.lights.iter().any(|light| light.layer == node_layer);
        let (layer, mut ambient) = if layer_populated {
            (node_layer, Color::BLACK)
        } else {
            (0, Color::WHITE)
        };

        let mut ranked: Vec<(f32, u32)> = Vec::new();
        for (index, light) in self.lights.iter().enumerate() {
            if light.layer != layer {
                continue;
            }
            match light.kind {
                LightType::LocalAmbient => ambient = light.color,
                LightType::Directional => ranked.push((0.0, index as u32)),
                LightType::Spot | LightType::Custom => {
                    let distance = (light.position - center).magnitude();
                    if distance <= light.radius {
                        ranked.push((distance, index as u32));
                    }
                }
            }
        }
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        ranked.truncate(MAX_NODE_LIGHTS);
        let indices: Vec<u32> = ranked.into_iter().map(|(_, index)| index).collect();

        if let Some(node) = self.nodes.get_mut(id) {
            node.set_lighting(LightingContext::new(ambient, &indices));
        }
    }

    /// Rebuild the light list of every script node
    pub fn build_light_lists(&mut self) {
        let ids: Vec<NodeId> = self.nodes_of_type(NodeType::Script).to_vec();
        for id in ids {
            self.build_light_list(id);
        }
    }

    // ==================== Visibility and picking ====================

    /// Queue every visible node for rendering
    ///
    /// Game mode replaces the user's show flags with the game-mode mask;
    /// the per-node visibility flag applies in both modes.
    pub fn add_to_renderer(&self, queue: &mut RenderQueue, view: &ViewInfo) {
        let node_flags = NodeFlags::for_show_flags(view.effective_show_flags());
        log::trace!("Scene pass with node flags {:?}", node_flags);

        for (index, node_type) in CATEGORIES.iter().enumerate() {
            if !node_flags.contains(node_type.node_flag()) {
                continue;
            }
            for &id in &self.node_lists[index] {
                let Some(node) = self.nodes.get(id) else { continue };
                if node.is_visible() {
                    node.contribute_to_renderer(self, view, queue);
                }
            }
        }
    }

    /// Cast a ray against everything pickable in the view
    pub fn scene_ray_cast(&self, ray: Ray, view: &ViewInfo) -> Option<RayIntersection> {
        let mut tester = RayCollisionTester::new(ray);
        let node_flags = NodeFlags::for_show_flags(view.effective_show_flags());

        for (index, node_type) in CATEGORIES.iter().enumerate() {
            if !node_flags.contains(node_type.node_flag()) {
                continue;
            }
            for &id in &self.node_lists[index] {
                let Some(node) = self.nodes.get(id) else { continue };
                if node.is_visible() {
                    node.ray_box_test(self, view, &mut tester);
                }
            }
        }
        tester.resolve(self, view)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use crate::render::bucket::RenderCommand;
    use crate::render::camera::Camera;
    use crate::render::draw_list::{DrawCall, DrawList};
    use crate::render::options::RenderOptions;
    use crate::resources::Surface;
    use crate::scene::show_flags::ShowFlags;
    use approx::assert_relative_eq;

    // A quad in the local XZ plane at y = 0, wound to face +Y
    fn quad_triangles() -> Vec<[Vec3; 3]> {
        vec![
            [
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, -1.0),
            ],
            [
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(-1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0),
            ],
        ]
    }

    fn quad_model(name: &str, blended: bool) -> Arc<Model> {
        Arc::new(Model::new(
            name,
            vec![Surface::from_triangles(quad_triangles(), blended)],
        ))
    }

    fn two_surface_model(name: &str) -> Arc<Model> {
        Arc::new(Model::new(
            name,
            vec![
                Surface::from_triangles(quad_triangles(), false),
                Surface::from_triangles(quad_triangles(), true),
            ],
        ))
    }

    fn script_at(scene: &mut Scene, id: u32, position: Vec3, model: Option<Arc<Model>>) -> NodeId {
        let mut instance = ScriptObject::new(id, format!("object {id}"));
        instance.position = position;
        instance.model = model;
        scene.create_script_node(instance).unwrap()
    }

    // Camera at the origin looking down -Y
    fn test_camera() -> Camera {
        let mut camera = Camera::new();
        camera.snap(Vec3::zeros());
        camera
    }

    fn queued_nodes(queue: &RenderQueue) -> Vec<NodeId> {
        queue
            .opaque()
            .entries()
            .iter()
            .chain(queue.blended().entries())
            .map(|entry| entry.node)
            .collect()
    }

    #[test]
    fn test_child_inherits_position_only() {
        let mut scene = Scene::new();
        let parent = script_at(&mut scene, 1, Vec3::new(1.0, 0.0, 0.0), None);
        let child = script_at(&mut scene, 2, Vec3::new(0.0, 5.0, 0.0), None);
        scene.reparent_node(child, parent);
        scene.set_node_rotation_euler(parent, Vec3::new(0.0, 0.0, HALF_PI));
        scene.set_node_inheritance(child, true, false, false);

        let node = scene.node(child).unwrap();
        let position = node.absolute_position(&scene);
        assert_relative_eq!(position.x, 1.0);
        assert_relative_eq!(position.y, 5.0);
        assert_relative_eq!(position.z, 0.0);

        // The parent's rotation must not leak into the child
        let rotation = node.absolute_rotation(&scene);
        assert_relative_eq!(rotation.angle(), 0.0, epsilon = 1e-6);

        let world_box = node.world_aabox(&scene);
        assert_relative_eq!((world_box.center() - position).magnitude(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_transform_cache_idempotent_until_mutation() {
        let mut scene = Scene::new();
        let id = script_at(&mut scene, 1, Vec3::new(2.0, 3.0, 4.0), None);

        let node = scene.node(id).unwrap();
        let first = node.transform(&scene);
        assert!(!node.has_dirty_transform());
        let second = node.transform(&scene);
        assert_eq!(first, second);

        scene.set_node_position(id, Vec3::new(9.0, 0.0, 0.0));
        let node = scene.node(id).unwrap();
        assert!(node.has_dirty_transform());
        let moved = node.world_aabox(&scene);
        assert_relative_eq!(moved.center().x, 9.0);
        assert!(!node.has_dirty_transform());
    }

    #[test]
    fn test_dirty_propagation_reaches_descendants() {
        let mut scene = Scene::new();
        let parent = script_at(&mut scene, 1, Vec3::zeros(), None);
        let child = script_at(&mut scene, 2, Vec3::new(0.0, 1.0, 0.0), None);
        let grandchild = script_at(&mut scene, 3, Vec3::new(0.0, 0.0, 1.0), None);
        scene.reparent_node(child, parent);
        scene.reparent_node(grandchild, child);

        // Reading the grandchild settles its whole ancestor chain, so a
        // clean node always has clean ancestors
        let _ = scene.node(grandchild).unwrap().world_aabox(&scene);
        assert!(!scene.node(grandchild).unwrap().has_dirty_transform());
        assert!(!scene.node(child).unwrap().has_dirty_transform());
        assert!(!scene.node(parent).unwrap().has_dirty_transform());

        scene.set_node_position(parent, Vec3::new(10.0, 0.0, 0.0));
        assert!(scene.node(child).unwrap().has_dirty_transform());
        assert!(scene.node(grandchild).unwrap().has_dirty_transform());

        let world_box = scene.node(grandchild).unwrap().world_aabox(&scene);
        assert_relative_eq!(world_box.center().x, 10.0);
        assert_relative_eq!(world_box.center().y, 1.0);
        assert_relative_eq!(world_box.center().z, 1.0);
    }

    #[test]
    fn test_repeated_parent_moves_keep_descendants_current() {
        let mut scene = Scene::new();
        let parent = script_at(&mut scene, 1, Vec3::zeros(), None);
        let child = script_at(&mut scene, 2, Vec3::new(0.0, 1.0, 0.0), None);
        scene.reparent_node(child, parent);

        scene.set_node_position(parent, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(scene.node(child).unwrap().center_point(&scene).x, 1.0);

        // A second move after everything settled must propagate again
        scene.set_node_position(parent, Vec3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(scene.node(child).unwrap().center_point(&scene).x, 2.0);
    }

    #[test]
    fn test_category_gating_and_visibility_flag() {
        let mut scene = Scene::new();
        let static_id = scene
            .create_static_node("terrain", Some(quad_model("terrain", false)))
            .unwrap();
        scene.set_node_position(static_id, Vec3::new(0.0, -10.0, 0.0));
        let collision_id = scene
            .create_collision_node(
                "collision",
                Some(Arc::new(CollisionMesh::new(
                    "collision",
                    Aabb::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)),
                ))),
            )
            .unwrap();
        scene.set_node_position(collision_id, Vec3::new(0.0, -10.0, 0.0));

        let camera = test_camera();
        let view = ViewInfo::new(&camera);
        let mut queue = RenderQueue::new();
        scene.add_to_renderer(&mut queue, &view);

        // Collision is hidden by default
        let nodes = queued_nodes(&queue);
        assert!(nodes.contains(&static_id));
        assert!(!nodes.contains(&collision_id));

        let mut view = ViewInfo::new(&camera);
        view.show_flags = ShowFlags::DEFAULT | ShowFlags::WORLD_COLLISION;
        queue.clear();
        scene.add_to_renderer(&mut queue, &view);
        assert!(queued_nodes(&queue).contains(&collision_id));

        // A hidden node never contributes in editor mode
        scene.set_node_visible(static_id, false);
        queue.clear();
        scene.add_to_renderer(&mut queue, &ViewInfo::new(&camera));
        assert!(!queued_nodes(&queue).contains(&static_id));
    }

    #[test]
    fn test_game_mode_gating_and_visibility() {
        let mut scene = Scene::new();
        let light_index = scene.add_light(Light::custom(
            Vec3::new(0.0, -5.0, 0.0),
            Color::RED,
            10.0,
            0,
        ));
        let light_id = scene.create_light_node(light_index).unwrap();
        let active = script_at(
            &mut scene,
            1,
            Vec3::new(0.0, -8.0, 0.0),
            Some(quad_model("active", false)),
        );
        let inactive = script_at(
            &mut scene,
            2,
            Vec3::new(0.0, -12.0, 0.0),
            Some(quad_model("inactive", false)),
        );
        if let Some(node) = scene.nodes.get_mut(inactive) {
            if let NodeData::Script(data) = &mut node.data {
                data.instance.active = false;
            }
        }
        let hidden = script_at(
            &mut scene,
            3,
            Vec3::new(3.0, -8.0, 0.0),
            Some(quad_model("hidden", false)),
        );
        // The user visibility flag applies in game mode too
        scene.set_node_visible(hidden, false);

        let camera = test_camera();
        let mut view = ViewInfo::new(&camera);
        view.game_mode = true;
        let mut queue = RenderQueue::new();
        scene.add_to_renderer(&mut queue, &view);

        let nodes = queued_nodes(&queue);
        assert!(nodes.contains(&active));
        assert!(!nodes.contains(&inactive));
        assert!(!nodes.contains(&light_id));
        assert!(!nodes.contains(&hidden));
    }

    #[test]
    fn test_occluder_static_skipped_without_option() {
        let mut scene = Scene::new();
        let occluder = Arc::new(
            Model::new("occluder", vec![Surface::from_triangles(quad_triangles(), false)])
                .with_occluder(true),
        );
        let id = scene.create_static_node("occluder", Some(occluder)).unwrap();
        scene.set_node_position(id, Vec3::new(0.0, -10.0, 0.0));

        let camera = test_camera();
        let view = ViewInfo::new(&camera);
        let mut queue = RenderQueue::new();
        scene.add_to_renderer(&mut queue, &view);
        assert!(queue.opaque().is_empty());

        let mut view = ViewInfo::new(&camera);
        view.options |= RenderOptions::ENABLE_OCCLUDERS;
        scene.add_to_renderer(&mut queue, &view);
        assert!(!queue.opaque().is_empty());
    }

    #[test]
    fn test_blended_surfaces_route_to_blended_bucket() {
        let mut scene = Scene::new();
        let id = script_at(
            &mut scene,
            1,
            Vec3::new(0.0, -10.0, 0.0),
            Some(two_surface_model("mixed")),
        );

        let camera = test_camera();
        let view = ViewInfo::new(&camera);
        let mut queue = RenderQueue::new();
        scene.add_to_renderer(&mut queue, &view);

        assert_eq!(queue.opaque().len(), 1);
        assert_eq!(queue.blended().len(), 1);
        assert_eq!(queue.opaque().entries()[0].command, RenderCommand::DrawOpaqueParts);
        assert_eq!(queue.blended().entries()[0].command, RenderCommand::DrawBlendedParts);
        assert_eq!(queue.blended().entries()[0].node, id);
    }

    #[test]
    fn test_world_model_splits_blended_surfaces() {
        let mut scene = Scene::new();
        let id = scene
            .create_model_node("room", Some(two_surface_model("room")), true)
            .unwrap();
        scene.set_node_position(id, Vec3::new(0.0, -10.0, 0.0));

        let camera = test_camera();
        let mut view = ViewInfo::new(&camera);
        view.show_flags = ShowFlags::SPLIT_WORLD;
        let mut queue = RenderQueue::new();
        scene.add_to_renderer(&mut queue, &view);

        assert_eq!(queue.opaque().len(), 1);
        assert_eq!(queue.blended().len(), 1);
        // The blended entry targets the one blended surface
        assert_eq!(queue.blended().entries()[0].component, Some(1));
    }

    #[test]
    fn test_scene_ray_cast_returns_nearest() {
        let mut scene = Scene::new();
        let near = script_at(
            &mut scene,
            1,
            Vec3::new(0.0, -5.0, 0.0),
            Some(quad_model("near", false)),
        );
        let far = script_at(
            &mut scene,
            2,
            Vec3::new(0.0, -12.0, 0.0),
            Some(quad_model("far", false)),
        );

        let camera = test_camera();
        let view = ViewInfo::new(&camera);
        let ray = Ray::new(Vec3::new(0.1, 0.0, 0.2), Vec3::new(0.0, -1.0, 0.0));

        let hit = scene.scene_ray_cast(ray, &view).unwrap();
        assert_eq!(hit.node, near);
        assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-4);
        assert_relative_eq!(hit.hit_point.y, -5.0, epsilon = 1e-4);

        // Hiding the near object exposes the far one
        scene.set_node_visible(near, false);
        let hit = scene.scene_ray_cast(ray, &view).unwrap();
        assert_eq!(hit.node, far);
    }

    #[test]
    fn test_scene_ray_cast_respects_show_flags() {
        let mut scene = Scene::new();
        script_at(
            &mut scene,
            1,
            Vec3::new(0.0, -5.0, 0.0),
            Some(quad_model("target", false)),
        );

        let camera = test_camera();
        let mut view = ViewInfo::new(&camera);
        view.show_flags = ShowFlags::MERGED_WORLD | ShowFlags::LIGHTS;
        let ray = Ray::new(Vec3::new(0.1, 0.0, 0.2), Vec3::new(0.0, -1.0, 0.0));
        assert!(scene.scene_ray_cast(ray, &view).is_none());
    }

    #[test]
    fn test_light_billboard_picking() {
        let mut scene = Scene::new();
        let light_index =
            scene.add_light(Light::custom(Vec3::new(0.0, -5.0, 0.0), Color::RED, 10.0, 0));
        let light_id = scene.create_light_node(light_index).unwrap();
        script_at(
            &mut scene,
            1,
            Vec3::new(0.0, -12.0, 0.0),
            Some(quad_model("behind", false)),
        );

        let camera = test_camera();
        let view = ViewInfo::new(&camera);
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, -1.0, 0.0));

        let hit = scene.scene_ray_cast(ray, &view).unwrap();
        assert_eq!(hit.node, light_id);
        assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-4);

        // A ray outside the billboard extents passes through to the quad
        let offset_ray = Ray::new(Vec3::new(0.9, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let hit = scene.scene_ray_cast(offset_ray, &view).unwrap();
        assert_ne!(hit.node, light_id);
    }

    #[test]
    fn test_script_instance_sync_on_transform() {
        let mut scene = Scene::new();
        let id = script_at(&mut scene, 7, Vec3::zeros(), None);
        scene.set_node_position(id, Vec3::new(4.0, 5.0, 6.0));
        scene.set_node_scale(id, Vec3::new(2.0, 2.0, 2.0));

        let instance = scene.node(id).unwrap().instance().unwrap();
        assert_relative_eq!(instance.position.x, 4.0);
        assert_relative_eq!(instance.scale.y, 2.0);
    }

    #[test]
    fn test_delete_node_removes_subtree_and_maps() {
        let mut scene = Scene::new();
        let mut instance = ScriptObject::new(42, "with collision");
        instance.collision = Some(Arc::new(CollisionMesh::new(
            "collision",
            Aabb::UNIT,
        )));
        let id = scene.create_script_node(instance).unwrap();
        let child = scene.node(id).unwrap().children()[0];
        let count_before = scene.node_count();

        scene.delete_node(id);
        assert!(scene.node(id).is_none());
        assert!(scene.node(child).is_none());
        assert!(scene.node_for_instance_id(42).is_none());
        assert_eq!(scene.node_count(), count_before - 2);
        assert!(scene.nodes_of_type(NodeType::Script).is_empty());
    }

    #[test]
    fn test_duplicate_instance_id_rejected() {
        let mut scene = Scene::new();
        assert!(script_at(&mut scene, 9, Vec3::zeros(), None) != NodeId::default());
        assert!(scene.create_script_node(ScriptObject::new(9, "dup")).is_none());
    }

    #[test]
    fn test_clear_scene_resets_everything() {
        let mut scene = Scene::new();
        scene.add_light(Light::ambient(Color::WHITE, 0));
        script_at(&mut scene, 1, Vec3::zeros(), None);
        scene
            .create_static_node("terrain", Some(quad_model("terrain", false)))
            .unwrap();

        scene.clear_scene();
        assert_eq!(scene.node_count(), 1);
        assert!(scene.area_root().is_none());
        assert_eq!(scene.light_count(), 0);
        for node_type in CATEGORIES {
            assert!(scene.nodes_of_type(node_type).is_empty());
        }
    }

    #[test]
    fn test_light_list_layer_and_radius() {
        let mut scene = Scene::new();
        scene.add_light(Light::custom(Vec3::zeros(), Color::GREEN, 10.0, 0));
        scene.add_light(Light::ambient(Color::RED, 1));
        let directional = scene.add_light(Light::directional(
            Vec3::new(0.0, 0.0, -1.0),
            Color::WHITE,
            1,
        ));
        let spot = scene.add_light(Light::spot(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, 0.0, -1.0),
            Color::WHITE,
            10.0,
            1,
        ));
        let near = scene.add_light(Light::custom(
            Vec3::new(3.0, 0.0, 0.0),
            Color::WHITE,
            10.0,
            1,
        ));
        scene.add_light(Light::custom(Vec3::new(100.0, 0.0, 0.0), Color::WHITE, 10.0, 1));

        let mut instance = ScriptObject::new(1, "lit");
        instance.light_layer = 1;
        let id = scene.create_script_node(instance).unwrap();

        let lighting = scene.node(id).unwrap().lighting();
        assert_eq!(lighting.ambient, Color::RED);
        // Ranked by distance; the out-of-radius light is dropped
        assert_eq!(lighting.lights(), &[directional, spot, near]);
    }

    #[test]
    fn test_light_list_empty_layer_falls_back() {
        let mut scene = Scene::new();
        let layer0 = scene.add_light(Light::custom(Vec3::zeros(), Color::GREEN, 10.0, 0));

        let mut instance = ScriptObject::new(1, "unlit layer");
        instance.light_layer = 7;
        let id = scene.create_script_node(instance).unwrap();

        let lighting = scene.node(id).unwrap().lighting();
        assert_eq!(lighting.ambient, Color::WHITE);
        assert_eq!(lighting.lights(), &[layer0]);
    }

    #[test]
    fn test_skybox_follows_sky_flag() {
        let mut scene = Scene::new();
        scene.set_skybox(Some(quad_model("sky", false)));

        let camera = test_camera();
        assert!(scene.active_skybox(&ViewInfo::new(&camera)).is_some());

        let mut view = ViewInfo::new(&camera);
        view.show_flags = ShowFlags::DEFAULT.difference(ShowFlags::SKY);
        assert!(scene.active_skybox(&view).is_none());

        // The game-mode mask shows the sky regardless of the editor flags
        view.game_mode = true;
        assert!(scene.active_skybox(&view).is_some());

        scene.clear_scene();
        assert!(scene.active_skybox(&ViewInfo::new(&camera)).is_none());
    }

    #[test]
    fn test_full_pass_emits_draw_calls() {
        let mut scene = Scene::new();
        let static_id = scene
            .create_static_node("terrain", Some(quad_model("terrain", false)))
            .unwrap();
        scene.set_node_position(static_id, Vec3::new(0.0, -10.0, 0.0));
        let placeholder = script_at(&mut scene, 1, Vec3::new(0.0, -6.0, 0.0), None);
        scene.set_node_selected(placeholder, true);

        let camera = test_camera();
        let view = ViewInfo::new(&camera);
        let mut queue = RenderQueue::new();
        scene.add_to_renderer(&mut queue, &view);
        queue.sort(&camera);

        let mut list = DrawList::new();
        queue.draw(&scene, &view, &mut list);

        let mut saw_surfaces = false;
        let mut saw_placeholder = false;
        let mut saw_selection = false;
        for call in list.calls() {
            match call {
                DrawCall::Surfaces { .. } => saw_surfaces |= call.node() == static_id,
                DrawCall::PlaceholderCube { .. } => saw_placeholder |= call.node() == placeholder,
                DrawCall::WireBox { .. } => saw_selection |= call.node() == placeholder,
                _ => {}
            }
        }
        assert!(saw_surfaces);
        assert!(saw_placeholder);
        assert!(saw_selection);
    }
}
