//! Area-weighted sampling of emissive triangles.

use rand::RngCore;
use rtv_core::{Color, Triangle};
use rtv_math::Vec3;

use crate::brdf::gen_f32;

/// A point on an emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    pub position: Vec3,
    pub normal: Vec3,
    pub emission: Color,
}

/// All emissive triangles of a scene with a cumulative area table.
#[derive(Debug, Clone, Default)]
pub struct Lights {
    emitters: Vec<Triangle>,
    cumulative_area: Vec<f32>,
    total_area: f32,
}

impl Lights {
    /// Collect the emitters from a triangle list. Zero-area emitters are
    /// skipped.
    pub fn new(triangles: &[Triangle]) -> Self {
        let mut lights = Self::default();
        for tri in triangles.iter().filter(|t| t.material.is_emitter()) {
            let area = tri.area();
            if !(area > 0.0) {
                log::warn!("skipping degenerate emitter at {:?}", tri.centroid());
                continue;
            }
            lights.total_area += area;
            lights.cumulative_area.push(lights.total_area);
            lights.emitters.push(tri.clone());
        }
        log::debug!("{} emitters, total area {}", lights.emitters.len(), lights.total_area);
        lights
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn total_area(&self) -> f32 {
        self.total_area
    }

    /// Area density of [`Lights::sample`]: `1 / total_area`.
    pub fn area_pdf(&self) -> f32 {
        if self.total_area > 0.0 {
            1.0 / self.total_area
        } else {
            0.0
        }
    }

    /// Pick a point uniformly by area over all emitters.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Option<LightSample> {
        if self.is_empty() {
            return None;
        }

        let target = gen_f32(rng) * self.total_area;
        let index = self
            .cumulative_area
            .partition_point(|&a| a <= target)
            .min(self.emitters.len() - 1);
        let tri = &self.emitters[index];

        Some(LightSample {
            position: tri.point_at(gen_f32(rng), gen_f32(rng)),
            normal: tri.normal,
            emission: tri.color,
        })
    }
}
