//! Resource contracts consumed by the scene
//!
//! The scene core never decodes assets; these types carry the already
//! extracted geometry and light data the visibility and picking passes need.

pub mod collision;
pub mod light;
pub mod model;
pub mod script;

pub use collision::CollisionMesh;
pub use light::{Light, LightType};
pub use model::{Model, Surface};
pub use script::ScriptObject;
