//! Depth-sorted render buckets
//!
//! The scene pass fills buckets with lightweight entries; the buckets sort
//! them relative to the camera and ask each node to emit its draw calls.
//! Entry storage is reused across frames: clearing resets the logical size
//! without releasing capacity, and adding overwrites stale slots first.

use crate::render::camera::Camera;
use crate::render::draw_list::DrawList;
use crate::render::view::ViewInfo;
use crate::scene::{NodeId, Scene};
use crate::spatial::Aabb;

/// What a bucket entry asks the node to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCommand {
    /// Draw the whole mesh (or the selected component)
    DrawMesh,
    /// Draw only surfaces without blending
    DrawOpaqueParts,
    /// Draw only surfaces with blending
    DrawBlendedParts,
    /// Draw the selection outline
    DrawSelection,
}

/// One queued draw
#[derive(Debug, Clone, Copy)]
pub struct RenderEntry {
    /// Node to draw
    pub node: NodeId,
    /// Component (surface) of the node, if the entry covers only one
    pub component: Option<usize>,
    /// World-space bounds used for depth sorting
    pub aabox: Aabb,
    /// What to draw
    pub command: RenderCommand,
}

/// Sort direction of a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortPolicy {
    /// Near entries first; used for opaque geometry
    FrontToBack,
    /// Far entries first; used for blended geometry
    BackToFront,
}

/// A depth-sorted list of render entries
#[derive(Debug)]
pub struct RenderBucket {
    policy: SortPolicy,
    entries: Vec<RenderEntry>,
    size: usize,
}

impl RenderBucket {
    /// Create an empty bucket with a sort policy
    pub fn new(policy: SortPolicy) -> Self {
        Self {
            policy,
            entries: Vec::new(),
            size: 0,
        }
    }

    /// Sort policy
    pub fn policy(&self) -> SortPolicy {
        self.policy
    }

    /// Number of entries queued this frame
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether no entry is queued this frame
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Entries queued this frame, in current order
    pub fn entries(&self) -> &[RenderEntry] {
        &self.entries[..self.size]
    }

    /// Queue an entry, reusing a stale slot when one is available
    pub fn add(&mut self, entry: RenderEntry) {
        if self.size < self.entries.len() {
            self.entries[self.size] = entry;
        } else {
            self.entries.push(entry);
        }
        self.size += 1;
    }

    /// Sort entries by camera depth; ties keep insertion order
    pub fn sort(&mut self, camera: &Camera) {
        let position = camera.position();
        let direction = camera.direction();
        let depth = |entry: &RenderEntry| {
            (entry.aabox.closest_point_along_vector(direction) - position).dot(&direction)
        };

        let policy = self.policy;
        self.entries[..self.size].sort_by(|a, b| match policy {
            SortPolicy::FrontToBack => depth(a).total_cmp(&depth(b)),
            SortPolicy::BackToFront => depth(b).total_cmp(&depth(a)),
        });
    }

    /// Reset for the next frame, keeping the backing storage
    pub fn clear(&mut self) {
        self.entries.truncate(self.size);
        self.size = 0;
    }

    /// Emit draw calls for every entry in current order
    pub fn draw(&self, scene: &Scene, view: &ViewInfo, out: &mut DrawList) {
        for entry in self.entries() {
            let Some(node) = scene.node(entry.node) else {
                continue;
            };
            match entry.command {
                RenderCommand::DrawSelection => node.draw_selection(scene, view, out),
                command => node.draw(scene, view, entry.component, command, out),
            }
        }
    }
}

/// The opaque and blended buckets for one frame
#[derive(Debug)]
pub struct RenderQueue {
    opaque: RenderBucket,
    blended: RenderBucket,
}

impl RenderQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            opaque: RenderBucket::new(SortPolicy::FrontToBack),
            blended: RenderBucket::new(SortPolicy::BackToFront),
        }
    }

    /// Queue a mesh into the opaque or blended bucket
    pub fn add_mesh(
        &mut self,
        node: NodeId,
        component: Option<usize>,
        aabox: Aabb,
        blended: bool,
        command: RenderCommand,
    ) {
        let entry = RenderEntry {
            node,
            component,
            aabox,
            command,
        };
        if blended {
            self.blended.add(entry);
        } else {
            self.opaque.add(entry);
        }
    }

    /// Opaque bucket
    pub fn opaque(&self) -> &RenderBucket {
        &self.opaque
    }

    /// Blended bucket
    pub fn blended(&self) -> &RenderBucket {
        &self.blended
    }

    /// Sort both buckets for a camera
    pub fn sort(&mut self, camera: &Camera) {
        self.opaque.sort(camera);
        self.blended.sort(camera);
    }

    /// Reset both buckets, keeping their storage
    pub fn clear(&mut self) {
        self.opaque.clear();
        self.blended.clear();
    }

    /// Emit draw calls: opaque front to back, then blended back to front
    pub fn draw(&self, scene: &Scene, view: &ViewInfo, out: &mut DrawList) {
        self.opaque.draw(scene, view, out);
        self.blended.draw(scene, view, out);
    }
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use slotmap::SlotMap;

    fn make_nodes(count: usize) -> Vec<NodeId> {
        let mut map: SlotMap<NodeId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    // The default camera looks down -Y, so `depth` is distance along -Y
    fn entry_at(node: NodeId, depth: f32) -> RenderEntry {
        RenderEntry {
            node,
            component: None,
            aabox: Aabb::from_center_extents(Vec3::new(0.0, -depth, 0.0), Vec3::new(0.5, 0.5, 0.5)),
            command: RenderCommand::DrawMesh,
        }
    }

    fn camera_at_origin() -> Camera {
        let mut camera = Camera::new();
        camera.snap(Vec3::zeros());
        camera
    }

    #[test]
    fn test_front_to_back_sorting() {
        let nodes = make_nodes(3);
        let camera = camera_at_origin();
        let mut bucket = RenderBucket::new(SortPolicy::FrontToBack);
        bucket.add(entry_at(nodes[0], 30.0));
        bucket.add(entry_at(nodes[1], 10.0));
        bucket.add(entry_at(nodes[2], 20.0));
        bucket.sort(&camera);

        let order: Vec<NodeId> = bucket.entries().iter().map(|e| e.node).collect();
        assert_eq!(order, vec![nodes[1], nodes[2], nodes[0]]);
    }

    #[test]
    fn test_back_to_front_sorting() {
        let nodes = make_nodes(3);
        let camera = camera_at_origin();
        let mut bucket = RenderBucket::new(SortPolicy::BackToFront);
        bucket.add(entry_at(nodes[0], 10.0));
        bucket.add(entry_at(nodes[1], 30.0));
        bucket.add(entry_at(nodes[2], 20.0));
        bucket.sort(&camera);

        let order: Vec<NodeId> = bucket.entries().iter().map(|e| e.node).collect();
        assert_eq!(order, vec![nodes[1], nodes[2], nodes[0]]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let nodes = make_nodes(3);
        let camera = camera_at_origin();
        let mut bucket = RenderBucket::new(SortPolicy::BackToFront);
        for node in &nodes {
            bucket.add(entry_at(*node, 15.0));
        }
        bucket.sort(&camera);

        let order: Vec<NodeId> = bucket.entries().iter().map(|e| e.node).collect();
        assert_eq!(order, nodes);
    }

    #[test]
    fn test_clear_resets_size_and_reuses_slots() {
        let nodes = make_nodes(3);
        let mut bucket = RenderBucket::new(SortPolicy::FrontToBack);
        for node in &nodes {
            bucket.add(entry_at(*node, 1.0));
        }
        assert_eq!(bucket.len(), 3);

        bucket.clear();
        assert!(bucket.is_empty());

        // Two adds after a clear of three: both land in reused slots
        bucket.add(entry_at(nodes[1], 2.0));
        bucket.add(entry_at(nodes[2], 3.0));
        assert_eq!(bucket.len(), 2);

        let order: Vec<NodeId> = bucket.entries().iter().map(|e| e.node).collect();
        assert_eq!(order, vec![nodes[1], nodes[2]]);
    }

    #[test]
    fn test_queue_routes_blended_entries() {
        let nodes = make_nodes(2);
        let mut queue = RenderQueue::new();
        queue.add_mesh(nodes[0], None, Aabb::UNIT, false, RenderCommand::DrawMesh);
        queue.add_mesh(nodes[1], Some(1), Aabb::UNIT, true, RenderCommand::DrawMesh);

        assert_eq!(queue.opaque().len(), 1);
        assert_eq!(queue.blended().len(), 1);
        assert_eq!(queue.blended().entries()[0].component, Some(1));
    }
}
