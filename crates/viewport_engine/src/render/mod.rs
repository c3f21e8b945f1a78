//! Rendering front end: camera, buckets and draw descriptors
//!
//! Nothing in here talks to a graphics API. The scene pass fills render
//! buckets, the buckets sort and emit [`DrawCall`](draw_list::DrawCall)
//! descriptors, and an external renderer consumes the resulting
//! [`DrawList`](draw_list::DrawList).

pub mod bucket;
pub mod camera;
pub mod draw_list;
pub mod input;
pub mod lighting;
pub mod options;
pub mod view;

pub use bucket::{RenderBucket, RenderCommand, RenderEntry, RenderQueue, SortPolicy};
pub use camera::{Camera, CameraMoveMode};
pub use draw_list::{DrawCall, DrawList, SurfaceSet};
pub use input::{KeyInputs, MouseInputs};
pub use lighting::{LightingContext, LightingMode, MAX_NODE_LIGHTS};
pub use options::RenderOptions;
pub use view::ViewInfo;
