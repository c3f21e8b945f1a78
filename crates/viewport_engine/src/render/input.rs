//! Keyboard and mouse state flags consumed by the camera

use bitflags::bitflags;

bitflags! {
    /// Keys relevant to camera movement
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct KeyInputs: u32 {
        /// Ctrl modifier
        const CTRL = 0x01;
        /// Alt modifier
        const ALT = 0x02;
        /// Q key
        const Q = 0x04;
        /// W key
        const W = 0x08;
        /// E key
        const E = 0x10;
        /// A key
        const A = 0x20;
        /// S key
        const S = 0x40;
        /// D key
        const D = 0x80;
    }
}

bitflags! {
    /// Held mouse buttons
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MouseInputs: u32 {
        /// Left mouse button
        const LEFT = 0x01;
        /// Middle mouse button
        const MIDDLE = 0x02;
        /// Right mouse button
        const RIGHT = 0x04;
    }
}
