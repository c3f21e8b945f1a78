//! Show flag and node flag masks
//!
//! Show flags are the user-facing view toggles; node flags gate whole
//! scene categories. The translation between the two decides which node
//! lists the visibility and picking passes walk at all.

use bitflags::bitflags;

bitflags! {
    /// User-facing category visibility toggles
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShowFlags: u32 {
        /// Unmerged (per-object) world geometry
        const SPLIT_WORLD = 0x01;
        /// Merged world geometry
        const MERGED_WORLD = 0x02;
        /// Script object display models
        const OBJECT_GEOMETRY = 0x04;
        /// Script object collision
        const OBJECT_COLLISION = 0x08;
        /// World collision geometry
        const WORLD_COLLISION = 0x10;
        /// Light billboards
        const LIGHTS = 0x20;
        /// Skybox
        const SKY = 0x40;
    }
}

impl ShowFlags {
    /// Default editor view
    pub const DEFAULT: Self = Self::MERGED_WORLD
        .union(Self::OBJECT_GEOMETRY)
        .union(Self::LIGHTS)
        .union(Self::SKY);

    /// Mask forced while previewing in game mode
    pub const GAME_MODE: Self = Self::MERGED_WORLD
        .union(Self::OBJECT_GEOMETRY)
        .union(Self::SKY);
}

impl Default for ShowFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

bitflags! {
    /// Scene node category mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeFlags: u32 {
        /// Split world model nodes
        const MODEL = 0x01;
        /// Merged world static nodes
        const STATIC = 0x02;
        /// World collision nodes
        const COLLISION = 0x04;
        /// Script object nodes
        const SCRIPT = 0x08;
        /// Light nodes
        const LIGHT = 0x10;
    }
}

impl NodeFlags {
    /// Every category
    pub const ALL: Self = Self::all();

    /// Categories enabled by a set of show flags
    ///
    /// Script nodes stay enabled when either object geometry or object
    /// collision shows; the node decides per draw which of the two it emits.
    pub fn for_show_flags(show: ShowFlags) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::MODEL, show.contains(ShowFlags::SPLIT_WORLD));
        flags.set(Self::STATIC, show.contains(ShowFlags::MERGED_WORLD));
        flags.set(Self::COLLISION, show.contains(ShowFlags::WORLD_COLLISION));
        flags.set(
            Self::SCRIPT,
            show.intersects(ShowFlags::OBJECT_GEOMETRY | ShowFlags::OBJECT_COLLISION),
        );
        flags.set(Self::LIGHT, show.contains(ShowFlags::LIGHTS));
        flags
    }
}
