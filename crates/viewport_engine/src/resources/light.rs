//! Light data shared between the area tables and light nodes

use crate::foundation::color::Color;
use crate::foundation::math::Vec3;

/// Kind of light source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    /// Flat ambient term for a light layer
    LocalAmbient,
    /// Infinitely distant light with a direction only
    Directional,
    /// Cone light with position and direction
    Spot,
    /// Point-style light with a falloff radius
    Custom,
}

/// A single light in the area light table
#[derive(Debug, Clone)]
pub struct Light {
    /// Kind of light
    pub kind: LightType,
    /// World-space position (unused for directional lights)
    pub position: Vec3,
    /// Direction (unused for ambient and custom lights)
    pub direction: Vec3,
    /// Light color
    pub color: Color,
    /// Influence radius (unused for ambient and directional lights)
    pub radius: f32,
    /// Light layer the light belongs to
    pub layer: usize,
}

impl Light {
    /// Create an ambient light for a layer
    pub fn ambient(color: Color, layer: usize) -> Self {
        Self {
            kind: LightType::LocalAmbient,
            position: Vec3::zeros(),
            direction: Vec3::new(0.0, 0.0, -1.0),
            color,
            radius: 0.0,
            layer,
        }
    }

    /// Create a directional light
    pub fn directional(direction: Vec3, color: Color, layer: usize) -> Self {
        Self {
            kind: LightType::Directional,
            position: Vec3::zeros(),
            direction: direction.normalize(),
            color,
            radius: 0.0,
            layer,
        }
    }

    /// Create a spot light
    pub fn spot(position: Vec3, direction: Vec3, color: Color, radius: f32, layer: usize) -> Self {
        Self {
            kind: LightType::Spot,
            position,
            direction: direction.normalize(),
            color,
            radius,
            layer,
        }
    }

    /// Create a custom (point) light
    pub fn custom(position: Vec3, color: Color, radius: f32, layer: usize) -> Self {
        Self {
            kind: LightType::Custom,
            position,
            direction: Vec3::new(0.0, 0.0, -1.0),
            color,
            radius,
            layer,
        }
    }
}
