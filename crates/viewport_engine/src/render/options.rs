//! Global render option flags

use bitflags::bitflags;

bitflags! {
    /// Options toggled per view rather than per node
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RenderOptions: u32 {
        /// Animate UV coordinates on materials that request it
        const ENABLE_UV_ANIMATION = 0x01;
        /// Cull triangles wound away from the camera
        const ENABLE_BACKFACE_CULL = 0x02;
        /// Draw occluder geometry
        const ENABLE_OCCLUDERS = 0x04;
        /// Force-disable alpha on all materials
        const NO_ALPHA = 0x08;
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::ENABLE_UV_ANIMATION | Self::ENABLE_BACKFACE_CULL
    }
}
