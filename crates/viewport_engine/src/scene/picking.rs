//! Two-phase ray picking
//!
//! The broad phase collects `(node, component, box distance)` candidates
//! from ray/AABB hits. Resolution sorts candidates by box distance and runs
//! the expensive precise tests in that order; because a box distance is a
//! lower bound on any hit inside the box, testing stops as soon as the best
//! confirmed hit is strictly closer than the next candidate's box.

use crate::foundation::math::{Mat4, Vec3};
use crate::render::view::ViewInfo;
use crate::resources::Model;
use crate::scene::{NodeId, Scene};
use crate::spatial::Ray;

/// Result of a resolved ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayIntersection {
    /// Node that was hit
    pub node: NodeId,
    /// Component (surface) of the node that was hit, if any
    pub component: Option<usize>,
    /// World-space distance from the ray origin to the hit
    pub distance: f32,
    /// World-space hit point
    pub hit_point: Vec3,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    node: NodeId,
    component: Option<usize>,
    box_distance: f32,
}

/// Collects broad-phase candidates for one ray and resolves the closest hit
#[derive(Debug)]
pub struct RayCollisionTester {
    ray: Ray,
    candidates: Vec<Candidate>,
}

impl RayCollisionTester {
    /// Create a tester for a ray
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            candidates: Vec::new(),
        }
    }

    /// The ray being cast
    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    /// Number of collected candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether no candidate was collected
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Add a broad-phase candidate
    pub fn add_node(&mut self, node: NodeId, component: Option<usize>, box_distance: f32) {
        self.candidates.push(Candidate {
            node,
            component,
            box_distance,
        });
    }

    /// Add one candidate per surface of a model whose transformed surface
    /// bounds the ray passes through
    pub fn add_node_surfaces(&mut self, node: NodeId, model: &Model, transform: &Mat4) {
        for index in 0..model.surface_count() {
            let world_box = model.surface_aabox(index).transformed(transform);
            if let Some(distance) = world_box.intersect_ray(&self.ray) {
                self.add_node(node, Some(index), distance);
            }
        }
    }

    /// Resolve the closest hit by dispatching precise tests to the scene
    pub fn resolve(self, scene: &Scene, view: &ViewInfo) -> Option<RayIntersection> {
        let ray = self.ray;
        self.resolve_with(|node, component| {
            scene
                .node(node)
                .and_then(|n| n.ray_node_intersect(scene, &ray, component, view))
        })
    }

    /// Resolve the closest hit with a caller-supplied precise test
    ///
    /// The test returns the world-space hit distance, or `None` for a miss.
    /// Later candidates at exactly the best distance replace the current
    /// best, matching the order precise tests run in.
    pub fn resolve_with<F>(mut self, mut precise: F) -> Option<RayIntersection>
    where
        F: FnMut(NodeId, Option<usize>) -> Option<f32>,
    {
        self.candidates
            .sort_by(|a, b| a.box_distance.total_cmp(&b.box_distance));

        let mut best: Option<RayIntersection> = None;
        for candidate in &self.candidates {
            if let Some(hit) = &best {
                // Confirmed hit strictly closer than any hit this box can
                // contain; everything after is at least as far
                if hit.distance < candidate.box_distance {
                    break;
                }
            }

            if let Some(distance) = precise(candidate.node, candidate.component) {
                if best.map_or(true, |hit| distance <= hit.distance) {
                    best = Some(RayIntersection {
                        node: candidate.node,
                        component: candidate.component,
                        distance,
                        hit_point: self.ray.point_at(distance),
                    });
                }
            }
        }
        best
    }
}
