//! Scene graph, visibility pass and ray picking

pub mod graph;
pub mod node;
pub mod node_kinds;
pub mod picking;
pub mod show_flags;

pub use graph::Scene;
pub use node::{
    CollisionData, LightData, ModelData, NodeData, NodeId, NodeType, SceneNode, ScriptData,
    StaticData, TransformSpace,
};
pub use picking::{RayCollisionTester, RayIntersection};
pub use show_flags::{NodeFlags, ShowFlags};
