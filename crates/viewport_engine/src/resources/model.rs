//! Renderable model made of surfaces

use crate::foundation::math::Vec3;
use crate::spatial::{Aabb, Ray};

/// One surface of a model: a triangle list with its own local-space bounds
#[derive(Debug, Clone)]
pub struct Surface {
    /// Local-space bounds of the surface
    pub aabox: Aabb,
    /// Triangle list in local space
    pub triangles: Vec<[Vec3; 3]>,
    /// Whether the surface's material uses alpha blending
    pub blended: bool,
}

impl Surface {
    /// Create a surface from a triangle list, fitting the bounds around it
    pub fn from_triangles(triangles: Vec<[Vec3; 3]>, blended: bool) -> Self {
        let mut aabox = Aabb::EMPTY;
        for tri in &triangles {
            for vertex in tri {
                aabox.expand_point(*vertex);
            }
        }
        Self { aabox, triangles, blended }
    }
}

/// Model resource: a named set of surfaces with combined local bounds
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    surfaces: Vec<Surface>,
    aabox: Aabb,
    occluder: bool,
}

impl Model {
    /// Create a model from surfaces
    pub fn new(name: impl Into<String>, surfaces: Vec<Surface>) -> Self {
        let mut aabox = Aabb::EMPTY;
        for surface in &surfaces {
            aabox.expand_box(&surface.aabox);
        }
        Self {
            name: name.into(),
            surfaces,
            aabox,
            occluder: false,
        }
    }

    /// Mark the model as occluder geometry
    pub fn with_occluder(mut self, occluder: bool) -> Self {
        self.occluder = occluder;
        self
    }

    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Combined local-space bounds
    pub fn aabox(&self) -> Aabb {
        self.aabox
    }

    /// Whether the model is occluder geometry
    pub fn is_occluder(&self) -> bool {
        self.occluder
    }

    /// Number of surfaces
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Surface by index
    pub fn surface(&self, index: usize) -> Option<&Surface> {
        self.surfaces.get(index)
    }

    /// Local-space bounds of one surface
    pub fn surface_aabox(&self, index: usize) -> Aabb {
        self.surfaces.get(index).map_or(Aabb::EMPTY, |s| s.aabox)
    }

    /// Whether a surface's material uses alpha blending
    pub fn is_surface_blended(&self, index: usize) -> bool {
        self.surfaces.get(index).is_some_and(|s| s.blended)
    }

    /// Whether any surface uses alpha blending
    pub fn has_blending(&self) -> bool {
        self.surfaces.iter().any(|s| s.blended)
    }

    /// Closest local-space hit of a ray against one surface's triangles
    pub fn intersect_surface_ray(
        &self,
        index: usize,
        ray: &Ray,
        allow_backfaces: bool,
    ) -> Option<f32> {
        let surface = self.surfaces.get(index)?;
        let mut best: Option<f32> = None;
        for [v0, v1, v2] in &surface.triangles {
            if let Some(t) = ray.intersect_triangle(*v0, *v1, *v2, allow_backfaces) {
                if best.map_or(true, |b| t < b) {
                    best = Some(t);
                }
            }
        }
        best
    }
}
