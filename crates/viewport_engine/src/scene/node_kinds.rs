//! Per-kind node behavior: visibility contribution, draw emission and
//! the two ray phases
//!
//! Dispatch is a match over the closed [`NodeData`](super::node::NodeData)
//! set; every kind decides for itself what it queues, what it draws and
//! how it answers ray tests.

use std::sync::Arc;

use crate::foundation::color::Color;
use crate::foundation::math::{utils, Vec2, Vec3};
use crate::render::bucket::{RenderCommand, RenderQueue};
use crate::render::draw_list::{DrawCall, DrawList, SurfaceSet};
use crate::render::lighting::{LightingContext, LightingMode};
use crate::render::options::RenderOptions;
use crate::render::view::ViewInfo;
use crate::resources::{LightType, Model};
use crate::scene::graph::Scene;
use crate::scene::node::{ModelData, NodeData, SceneNode, StaticData};
use crate::scene::picking::RayCollisionTester;
use crate::scene::show_flags::ShowFlags;
use crate::spatial::{Aabb, Plane, Ray};

const HOVER_COLOR: Color = Color::new(0.3, 0.7, 1.0, 1.0);
const BASIC_AMBIENT: Color = Color::new(0.5, 0.5, 0.5, 1.0);
const BILLBOARD_SCALE: f32 = 0.75;

impl SceneNode {
    // ==================== Visibility pass ====================

    /// Queue this node's renderable pieces for the frame
    pub fn contribute_to_renderer(&self, scene: &Scene, view: &ViewInfo, queue: &mut RenderQueue) {
        let frustum = view.camera.frustum();

        match &self.data {
            NodeData::Root => {}

            NodeData::Model(data) => {
                // Split world geometry is an editor-only preview
                if view.game_mode {
                    return;
                }
                let Some(model) = &data.model else { return };
                let world_box = self.world_aabox(scene);
                if !frustum.contains_box(&world_box) {
                    return;
                }

                if data.world_model && model.has_blending() {
                    // World models sort each blended surface on its own
                    // transformed bounds instead of the whole model box
                    queue.add_mesh(self.id(), None, world_box, false, RenderCommand::DrawOpaqueParts);
                    let transform = self.transform(scene);
                    for index in 0..model.surface_count() {
                        if model.is_surface_blended(index) {
                            let surface_box = model.surface_aabox(index).transformed(&transform);
                            queue.add_mesh(
                                self.id(),
                                Some(index),
                                surface_box,
                                true,
                                RenderCommand::DrawBlendedParts,
                            );
                        }
                    }
                } else {
                    self.queue_model(model, world_box, queue);
                }

                if self.is_selected() {
                    queue.add_mesh(self.id(), None, world_box, false, RenderCommand::DrawSelection);
                }
            }

            NodeData::Static(data) => {
                let Some(model) = &data.model else { return };
                if model.is_occluder() && !view.options.contains(RenderOptions::ENABLE_OCCLUDERS) {
                    return;
                }
                let world_box = self.world_aabox(scene);
                if !frustum.contains_box(&world_box) {
                    return;
                }

                if model.has_blending() {
                    // Merged geometry queues per surface so each blended
                    // piece depth-sorts independently
                    let transform = self.transform(scene);
                    for index in 0..model.surface_count() {
                        let surface_box = model.surface_aabox(index).transformed(&transform);
                        if frustum.contains_box(&surface_box) {
                            queue.add_mesh(
                                self.id(),
                                Some(index),
                                surface_box,
                                model.is_surface_blended(index),
                                RenderCommand::DrawMesh,
                            );
                        }
                    }
                } else {
                    queue.add_mesh(self.id(), None, world_box, false, RenderCommand::DrawMesh);
                }

                if self.is_selected() && !view.game_mode {
                    queue.add_mesh(self.id(), None, world_box, false, RenderCommand::DrawSelection);
                }
            }

            NodeData::Collision(data) => {
                if view.game_mode || data.mesh.is_none() {
                    return;
                }
                let world_box = self.world_aabox(scene);
                if !frustum.contains_box(&world_box) {
                    return;
                }
                queue.add_mesh(self.id(), None, world_box, false, RenderCommand::DrawMesh);
                if self.is_selected() {
                    queue.add_mesh(self.id(), None, world_box, false, RenderCommand::DrawSelection);
                }
            }

            NodeData::Script(data) => {
                if view.game_mode && !data.instance.active {
                    return;
                }
                let show = view.effective_show_flags();
                let world_box = self.world_aabox(scene);

                if show.contains(ShowFlags::OBJECT_COLLISION) && !view.game_mode {
                    if let Some(collision) = data.collision_node.and_then(|id| scene.node(id)) {
                        collision.contribute_to_renderer(scene, view, queue);
                    }
                }

                if (show.contains(ShowFlags::OBJECT_GEOMETRY) || view.game_mode)
                    && frustum.contains_box(&world_box)
                {
                    match &data.instance.model {
                        Some(model) => self.queue_model(model, world_box, queue),
                        // No display model: purple placeholder cube
                        None => queue.add_mesh(self.id(), None, world_box, false, RenderCommand::DrawMesh),
                    }
                }

                // Selection draws even when the model is out of view
                if self.is_selected() && !view.game_mode {
                    queue.add_mesh(self.id(), None, world_box, false, RenderCommand::DrawSelection);
                }
            }

            NodeData::Light(data) => {
                if view.game_mode {
                    return;
                }
                let world_box = self.world_aabox(scene);
                if frustum.contains_box(&world_box) {
                    queue.add_mesh(self.id(), None, world_box, false, RenderCommand::DrawMesh);
                }

                if self.is_selected() {
                    let mut selection_box = world_box;
                    if let Some(light) = scene.light(data.light_index) {
                        if light.kind == LightType::Custom {
                            selection_box = Aabb::from_center_extents(
                                self.absolute_position(scene),
                                Vec3::new(light.radius, light.radius, light.radius),
                            );
                        }
                    }
                    if frustum.contains_box(&selection_box) {
                        queue.add_mesh(self.id(), None, selection_box, false, RenderCommand::DrawSelection);
                    }
                }
            }
        }
    }

    fn queue_model(&self, model: &Arc<Model>, world_box: Aabb, queue: &mut RenderQueue) {
        if model.has_blending() {
            queue.add_mesh(self.id(), None, world_box, false, RenderCommand::DrawOpaqueParts);
            queue.add_mesh(self.id(), None, world_box, true, RenderCommand::DrawBlendedParts);
        } else {
            queue.add_mesh(self.id(), None, world_box, false, RenderCommand::DrawMesh);
        }
    }

    // ==================== Draw emission ====================

    /// Emit draw calls for a queued entry
    pub fn draw(
        &self,
        scene: &Scene,
        view: &ViewInfo,
        component: Option<usize>,
        command: RenderCommand,
        out: &mut DrawList,
    ) {
        match &self.data {
            NodeData::Root => {}

            NodeData::Model(data) => {
                if let Some(model) = &data.model {
                    self.emit_surfaces(model, scene, view, component, command, out);
                }
            }

            NodeData::Static(data) => {
                if let Some(model) = &data.model {
                    self.emit_surfaces(model, scene, view, component, command, out);
                }
            }

            NodeData::Collision(data) => {
                if let Some(mesh) = &data.mesh {
                    out.push(DrawCall::Collision {
                        node: self.id(),
                        mesh: Arc::clone(mesh),
                        transform: self.transform(scene),
                        tint: Color::WHITE,
                    });
                }
            }

            NodeData::Script(data) => match &data.instance.model {
                Some(model) => self.emit_surfaces(model, scene, view, component, command, out),
                None => out.push(DrawCall::PlaceholderCube {
                    node: self.id(),
                    transform: self.transform(scene),
                    tint: Color::TRANSPARENT_PURPLE,
                }),
            },

            NodeData::Light(data) => {
                if let Some(light) = scene.light(data.light_index) {
                    out.push(DrawCall::LightBillboard {
                        node: self.id(),
                        kind: light.kind,
                        position: self.absolute_position(scene),
                        scale: self.billboard_scale(scene),
                        color: light.color,
                    });
                }
            }
        }
    }

    /// Emit the selection outline for this node
    pub fn draw_selection(&self, scene: &Scene, _view: &ViewInfo, out: &mut DrawList) {
        let color = self.wireframe_color();
        match &self.data {
            NodeData::Model(ModelData { model: Some(model), .. })
            | NodeData::Static(StaticData { model: Some(model) }) => {
                out.push(DrawCall::Wireframe {
                    node: self.id(),
                    model: Arc::clone(model),
                    transform: self.transform(scene),
                    color,
                });
            }

            NodeData::Script(data) => match &data.instance.model {
                Some(model) => out.push(DrawCall::Wireframe {
                    node: self.id(),
                    model: Arc::clone(model),
                    transform: self.transform(scene),
                    color,
                }),
                None => out.push(DrawCall::WireBox {
                    node: self.id(),
                    aabox: self.world_aabox(scene),
                    color,
                }),
            },

            NodeData::Light(data) => {
                out.push(DrawCall::WireBox {
                    node: self.id(),
                    aabox: self.world_aabox(scene),
                    color,
                });
                if let Some(light) = scene.light(data.light_index) {
                    if light.kind == LightType::Custom {
                        out.push(DrawCall::WireSphere {
                            node: self.id(),
                            center: self.absolute_position(scene),
                            radius: light.radius,
                            color: light.color,
                        });
                    }
                }
            }

            _ => out.push(DrawCall::WireBox {
                node: self.id(),
                aabox: self.world_aabox(scene),
                color,
            }),
        }
    }

    fn emit_surfaces(
        &self,
        model: &Arc<Model>,
        scene: &Scene,
        view: &ViewInfo,
        component: Option<usize>,
        command: RenderCommand,
        out: &mut DrawList,
    ) {
        let set = match component {
            Some(index) => {
                debug_assert!(index < model.surface_count());
                SurfaceSet::Single(index)
            }
            None => match command {
                RenderCommand::DrawOpaqueParts => SurfaceSet::OpaqueOnly,
                RenderCommand::DrawBlendedParts => SurfaceSet::BlendedOnly,
                _ => SurfaceSet::All,
            },
        };
        out.push(DrawCall::Surfaces {
            node: self.id(),
            model: Arc::clone(model),
            transform: self.transform(scene),
            set,
            lighting: self.lighting_context(view),
            tint: if self.is_hovered() { HOVER_COLOR } else { Color::WHITE },
        });
    }

    /// Lighting inputs for this node under the frame's lighting mode
    pub fn lighting_context(&self, view: &ViewInfo) -> LightingContext {
        match view.lighting {
            LightingMode::None => LightingContext::fullbright(),
            LightingMode::Basic => LightingContext::new(BASIC_AMBIENT, &[]),
            LightingMode::World => self.lighting(),
        }
    }

    fn wireframe_color(&self) -> Color {
        if self.is_hovered() {
            HOVER_COLOR
        } else {
            Color::WHITE
        }
    }

    // ==================== Ray picking ====================

    /// Broad phase: queue candidates whose boxes the ray passes through
    pub fn ray_box_test(&self, scene: &Scene, view: &ViewInfo, tester: &mut RayCollisionTester) {
        match &self.data {
            // Collision nodes are not pickable
            NodeData::Root | NodeData::Collision(_) => {}

            NodeData::Model(data) => {
                if view.game_mode {
                    return;
                }
                if let Some(model) = &data.model {
                    self.queue_surface_candidates(model, scene, tester);
                }
            }

            NodeData::Static(data) => {
                let Some(model) = &data.model else { return };
                if model.is_occluder() && !view.options.contains(RenderOptions::ENABLE_OCCLUDERS) {
                    return;
                }
                self.queue_surface_candidates(model, scene, tester);
            }

            NodeData::Script(data) => {
                if view.game_mode && !data.instance.active {
                    return;
                }
                let show = view.effective_show_flags();
                if !show.contains(ShowFlags::OBJECT_GEOMETRY) && !view.game_mode {
                    return;
                }
                match &data.instance.model {
                    Some(model) => self.queue_surface_candidates(model, scene, tester),
                    None => {
                        if let Some(distance) = self.world_aabox(scene).intersect_ray(tester.ray()) {
                            tester.add_node(self.id(), None, distance);
                        }
                    }
                }
            }

            NodeData::Light(_) => {
                if view.game_mode {
                    return;
                }
                // Orientation-independent billboard bounds: expanded in the
                // horizontal plane so the test covers any camera angle
                let scale = self.billboard_scale(scene);
                let horizontal = scale.x.max(scale.y);
                let billboard_box = Aabb::from_center_extents(
                    self.absolute_position(scene),
                    Vec3::new(horizontal, horizontal, scale.y),
                );
                if let Some(distance) = billboard_box.intersect_ray(tester.ray()) {
                    tester.add_node(self.id(), None, distance);
                }
            }
        }
    }

    fn queue_surface_candidates(
        &self,
        model: &Arc<Model>,
        scene: &Scene,
        tester: &mut RayCollisionTester,
    ) {
        if self.world_aabox(scene).intersect_ray(tester.ray()).is_some() {
            tester.add_node_surfaces(self.id(), model, &self.transform(scene));
        }
    }

    /// Precise phase: exact intersection for one queued candidate
    ///
    /// Returns the world-space distance from the ray origin to the hit.
    pub fn ray_node_intersect(
        &self,
        scene: &Scene,
        ray: &Ray,
        component: Option<usize>,
        view: &ViewInfo,
    ) -> Option<f32> {
        match &self.data {
            NodeData::Root | NodeData::Collision(_) => None,

            NodeData::Model(ModelData { model: Some(model), .. })
            | NodeData::Static(StaticData { model: Some(model) }) => {
                self.surface_intersect(model, scene, ray, component?, view)
            }
            NodeData::Model(_) | NodeData::Static(_) => None,

            NodeData::Script(data) => match &data.instance.model {
                Some(model) => self.surface_intersect(model, scene, ray, component?, view),
                // Placeholder cube: the box entry point is the exact hit
                None => self.world_aabox(scene).intersect_ray(ray),
            },

            NodeData::Light(_) => {
                // Intersect the camera-facing billboard plane, then check
                // the hit against the billboard extents
                let position = self.absolute_position(scene);
                let plane = Plane::redefine(-view.camera.direction(), position);
                let distance = ray.intersect_plane(&plane)?;
                let offset = ray.point_at(distance) - position;
                let scale = self.billboard_scale(scene);
                let x = offset.dot(&view.camera.right()).abs();
                let y = offset.dot(&view.camera.up()).abs();
                (x <= scale.x && y <= scale.y).then_some(distance)
            }
        }
    }

    fn surface_intersect(
        &self,
        model: &Arc<Model>,
        scene: &Scene,
        ray: &Ray,
        index: usize,
        view: &ViewInfo,
    ) -> Option<f32> {
        debug_assert!(index < model.surface_count());
        let transform = self.transform(scene);
        let inverse = transform.try_inverse()?;
        let local_ray = ray.transformed(&inverse);
        let allow_backfaces = !view.options.contains(RenderOptions::ENABLE_BACKFACE_CULL);

        let local_t = model.intersect_surface_ray(index, &local_ray, allow_backfaces)?;
        // Distances measured in world space so candidates from differently
        // scaled nodes compare correctly
        let world_point = utils::transform_point(&transform, local_ray.point_at(local_t));
        Some((world_point - ray.origin()).magnitude())
    }

    /// Horizontal and vertical extents of the light billboard
    fn billboard_scale(&self, scene: &Scene) -> Vec2 {
        let scale = self.absolute_scale(scene);
        Vec2::new(scale.x, scale.z) * BILLBOARD_SCALE
    }
}
