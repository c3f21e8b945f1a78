//! Per-frame view state handed to the scene pass

use crate::render::camera::Camera;
use crate::render::lighting::LightingMode;
use crate::render::options::RenderOptions;
use crate::scene::ShowFlags;

/// Everything a node needs to know about the view being rendered
#[derive(Debug, Clone, Copy)]
pub struct ViewInfo<'a> {
    /// Camera the frame is rendered from
    pub camera: &'a Camera,
    /// User-selected category visibility
    pub show_flags: ShowFlags,
    /// Whether the viewport is previewing in game mode
    pub game_mode: bool,
    /// Global render options
    pub options: RenderOptions,
    /// Lighting mode for this frame
    pub lighting: LightingMode,
}

impl<'a> ViewInfo<'a> {
    /// Create view state with editor defaults
    pub fn new(camera: &'a Camera) -> Self {
        Self {
            camera,
            show_flags: ShowFlags::DEFAULT,
            game_mode: false,
            options: RenderOptions::default(),
            lighting: LightingMode::default(),
        }
    }

    /// Show flags after the game-mode override
    pub fn effective_show_flags(&self) -> ShowFlags {
        if self.game_mode {
            ShowFlags::GAME_MODE
        } else {
            self.show_flags
        }
    }
}
