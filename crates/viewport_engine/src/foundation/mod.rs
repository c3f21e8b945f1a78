//! Foundation utilities: math types, colors, logging

pub mod color;
pub mod logging;
pub mod math;
