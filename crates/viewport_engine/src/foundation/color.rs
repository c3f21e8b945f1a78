//! RGBA color type used for lights, tints and debug draws

use std::ops::{Add, Mul};

/// Linear RGBA color with f32 components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
    /// Alpha component
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque red
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    /// Opaque green
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);
    /// Half-transparent purple, used for placeholder geometry
    pub const TRANSPARENT_PURPLE: Self = Self::new(1.0, 0.0, 1.0, 0.5);

    /// Create a color from components
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from RGB components
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a + rhs.a)
    }
}

impl Mul for Color {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b, self.a * rhs.a)
    }
}

impl Mul<f32> for Color {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.r * rhs, self.g * rhs, self.b * rhs, self.a * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_modulate() {
        let tinted = Color::WHITE * Color::new(0.5, 0.25, 1.0, 1.0);
        assert_eq!(tinted, Color::new(0.5, 0.25, 1.0, 1.0));
    }

    #[test]
    fn test_color_accumulate() {
        let sum = Color::new(0.25, 0.0, 0.0, 0.0) + Color::new(0.25, 0.5, 0.0, 1.0);
        assert_eq!(sum, Color::new(0.5, 0.5, 0.0, 1.0));
    }

    #[test]
    fn test_rgb_is_opaque() {
        assert_eq!(Color::rgb(1.0, 0.0, 0.0), Color::RED);
        assert_eq!(Color::rgb(0.2, 0.4, 0.6).a, 1.0);
    }
}
