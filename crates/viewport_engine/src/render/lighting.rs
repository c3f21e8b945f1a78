//! Per-draw lighting state

use crate::foundation::color::Color;

/// Maximum number of lights a node samples from its light layer
pub const MAX_NODE_LIGHTS: usize = 8;

/// How draw calls should be lit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightingMode {
    /// Fullbright
    None,
    /// Renderer default lighting, ignoring area lights
    Basic,
    /// Area lights sampled per node
    #[default]
    World,
}

/// Resolved lighting inputs for one draw call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingContext {
    /// Ambient term
    pub ambient: Color,
    /// Indices into the area light table
    lights: [u32; MAX_NODE_LIGHTS],
    light_count: usize,
}

impl LightingContext {
    /// Fullbright context with no lights
    pub fn fullbright() -> Self {
        Self {
            ambient: Color::WHITE,
            lights: [0; MAX_NODE_LIGHTS],
            light_count: 0,
        }
    }

    /// Context with an ambient term and a set of area light indices
    ///
    /// Lights beyond [`MAX_NODE_LIGHTS`] are ignored.
    pub fn new(ambient: Color, light_indices: &[u32]) -> Self {
        let mut lights = [0; MAX_NODE_LIGHTS];
        let light_count = light_indices.len().min(MAX_NODE_LIGHTS);
        lights[..light_count].copy_from_slice(&light_indices[..light_count]);
        Self {
            ambient,
            lights,
            light_count,
        }
    }

    /// Indices into the area light table
    pub fn lights(&self) -> &[u32] {
        &self.lights[..self.light_count]
    }
}

impl Default for LightingContext {
    fn default() -> Self {
        Self::fullbright()
    }
}
