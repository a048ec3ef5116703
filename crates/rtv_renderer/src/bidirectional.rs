//! Bidirectional path tracing with multiple importance sampling.
//!
//! A full path `x_0 .. x_{n-1}` runs from a light (`x_0`) to the camera
//! (`x_{n-1}`). Strategy `(s, t)` builds it from the first `s` light-subpath
//! vertices and the first `t` camera-subpath vertices. Supported strategies:
//!
//! - `s >= 1, t >= 2`: explicit connection between `light[s-1]` and
//!   `camera[t-1]`;
//! - `s = 0, t >= 2`: the camera subpath itself lands on an emitter
//!   (optional, see [`BidirectionalConfig::emission_strategy`]).
//!
//! Strategies with `t < 2` (tracing light into the lens) are not generated
//! and take no part in the weights.

use rand::RngCore;
use rtv_core::{Color, Material};
use rtv_math::{Ray, Vec3};

use crate::brdf::{self, geometry_term};
use crate::bvh::Bvh;
use crate::config::BidirectionalConfig;
use crate::frame::strategy_slot;
use crate::integrator::{clamp_contribution, Integrator};
use crate::path::{extend_path, Path, PathVertex};
use crate::scene::Scene;

/// Unweighted estimate of one strategy: path contribution `f` and the area
/// density `p` of sampling it that way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub f: Color,
    pub p: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Bidirectional {
    pub max_bounces: u32,
    pub emission_strategy: bool,
}

impl Bidirectional {
    pub fn new(max_bounces: u32, config: &BidirectionalConfig) -> Self {
        Self {
            max_bounces,
            emission_strategy: config.emission_strategy,
        }
    }

    /// Weighted, clamped value of one strategy.
    fn weigh(
        &self,
        contribution: Contribution,
        light: &[PathVertex],
        camera: &[PathVertex],
        light_area_pdf: f32,
    ) -> Color {
        if !(contribution.p > 0.0) {
            return Color::ZERO;
        }
        let w = mis_weight(light, camera, light_area_pdf, self.emission_strategy);
        clamp_contribution(contribution.f / contribution.p * w)
    }
}

impl Integrator for Bidirectional {
    fn name(&self) -> &'static str {
        "bidirectional"
    }

    fn strategy_side(&self) -> usize {
        self.max_bounces as usize + 2
    }

    fn sample(
        &self,
        scene: &Scene,
        ray: Ray,
        rng: &mut dyn RngCore,
        mut strategies: Option<&mut [Color]>,
    ) -> Color {
        let Some(light_sample) = scene.lights.sample(rng) else {
            return Color::ZERO;
        };
        let light_area_pdf = scene.lights.area_pdf();

        let mut camera = Path::from_camera(ray);
        extend_path(&mut camera, &scene.bvh, self.max_bounces, rng);
        let mut light = Path::from_light(&light_sample, light_area_pdf, rng);
        extend_path(&mut light, &scene.bvh, self.max_bounces, rng);

        let camera = camera.vertices();
        let light = light.vertices();
        let side = self.strategy_side();
        let mut total = Color::ZERO;

        let mut record = |s: usize, t: usize, value: Color| {
            total += value;
            let slot = strategy_slot(s, t, side);
            if let Some(cell) = strategies.as_deref_mut().and_then(|grid| grid.get_mut(slot)) {
                *cell += value;
            }
        };

        for t in 2..=camera.len() {
            if self.emission_strategy {
                if let Some(c) = emitted(camera, t) {
                    record(0, t, self.weigh(c, &[], &camera[..t], light_area_pdf));
                }
            }
            for s in 1..=light.len() {
                if let Some(c) = connect(&scene.bvh, light, camera, s, t) {
                    record(s, t, self.weigh(c, &light[..s], &camera[..t], light_area_pdf));
                }
            }
        }

        total
    }
}

/// Strategy `(0, t)`: the camera subpath prefix ends on an emitter.
pub fn emitted(camera: &[PathVertex], t: usize) -> Option<Contribution> {
    if t < 2 {
        return None;
    }
    let z = &camera[t - 1];
    if !z.is_emitter() {
        return None;
    }
    Some(Contribution {
        f: z.color * z.local_color,
        p: z.p,
    })
}

/// Strategy `(s, t)` with `s >= 1`: join `light[s-1]` to `camera[t-1]`.
pub fn connect(
    bvh: &Bvh,
    light: &[PathVertex],
    camera: &[PathVertex],
    s: usize,
    t: usize,
) -> Option<Contribution> {
    if s == 0 || t < 2 {
        return None;
    }
    let y = &light[s - 1];
    let z = &camera[t - 1];
    if y.is_specular() || z.is_specular() {
        return None;
    }

    let to_z = (z.position() - y.position()).normalize_or_zero();
    let f_y = scatter_toward(light, s - 1, to_z);
    let f_z = scatter_toward(camera, t - 1, -to_z);
    if !(f_y > 0.0 && f_z > 0.0) {
        return None;
    }
    if !bvh.visibility_test(y, z) {
        return None;
    }

    let g = geometry_term(y.position(), y.normal, z.position(), z.normal);
    Some(Contribution {
        f: z.color * z.local_color * f_z * g * f_y * y.local_color * y.color,
        p: z.p * y.p,
    })
}

/// BRDF at `path[index]` for light leaving toward `wo`, given the subpath
/// arrived from `path[index - 1]`. A light seed radiates uniformly.
fn scatter_toward(path: &[PathVertex], index: usize, wo: Vec3) -> f32 {
    let v = &path[index];
    match v.material {
        Some(Material::Emitter) if index == 0 => {
            if wo.dot(v.normal) > 0.0 {
                1.0
            } else {
                0.0
            }
        }
        Some(material) if index > 0 => {
            let wi = (path[index - 1].position() - v.position()).normalize_or_zero();
            brdf::eval(material, wi, v.normal, wo)
        }
        _ => 0.0,
    }
}

/// Balance-heuristic weight of the strategy that joins the light prefix
/// `light` to the camera prefix `camera`.
///
/// With `p_i` the density of building the same full path from `i` light
/// vertices, `p_{i+1} / p_i = P_L(x_i) / P_E(x_i)`, where `P_L` and `P_E` are
/// the area densities of generating `x_i` from the light side and from the
/// camera side. The weight is `p_s / sum(p_i)` over every strategy `i` the
/// integrator actually evaluates.
pub fn mis_weight(
    light: &[PathVertex],
    camera: &[PathVertex],
    light_area_pdf: f32,
    emission_strategy: bool,
) -> f32 {
    let s = light.len();
    let full: Vec<&PathVertex> = light.iter().chain(camera.iter().rev()).collect();
    let n = full.len();
    if n < 2 {
        return 0.0;
    }

    let first = if emission_strategy { 0 } else { 1 };
    let last = n - 2;
    let joinable = |i: usize| {
        i >= first && i <= last && !full[i].is_specular() && (i == 0 || !full[i - 1].is_specular())
    };
    let ratio = |j: usize| light_density(&full, j, light_area_pdf) / camera_density(&full, j);

    let mut sum = 1.0f32;

    let mut relative = 1.0f32;
    for i in s + 1..=last {
        relative *= ratio(i - 1);
        if joinable(i) {
            sum += relative;
        }
    }

    relative = 1.0;
    for i in (first..s).rev() {
        relative /= ratio(i);
        if joinable(i) {
            sum += relative;
        }
    }

    if sum.is_finite() && sum > 0.0 {
        1.0 / sum
    } else {
        0.0
    }
}

/// Area density of sampling `full[j]` from `full[j - 1]` (light side).
fn light_density(full: &[&PathVertex], j: usize, light_area_pdf: f32) -> f32 {
    if j == 0 {
        return light_area_pdf;
    }
    let from = j.checked_sub(2).map(|k| full[k]);
    let v = full[j - 1];
    let to = full[j];
    directional_pdf(v, from, to) * geometry_term(v.position(), v.normal, to.position(), to.normal)
}

/// Area density of sampling `full[j]` from `full[j + 1]` (camera side).
fn camera_density(full: &[&PathVertex], j: usize) -> f32 {
    let from = full.get(j + 2).copied();
    let v = full[j + 1];
    let to = full[j];
    directional_pdf(v, from, to) * geometry_term(v.position(), v.normal, to.position(), to.normal)
}

/// Projected-solid-angle density of scattering at `v` toward `to`, having
/// arrived from `from`.
fn directional_pdf(v: &PathVertex, from: Option<&PathVertex>, to: &PathVertex) -> f32 {
    let wo = (to.position() - v.position()).normalize_or_zero();
    match (v.material, from) {
        // The pinhole's own density is shared by every strategy
        (None, _) => 1.0,
        (Some(Material::Emitter), None) => brdf::emission_pdf(v.normal, wo),
        (Some(material), Some(from)) => {
            let wi = (from.position() - v.position()).normalize_or_zero();
            brdf::pdf(material, wi, v.normal, wo)
        }
        (Some(_), None) => 0.0,
    }
}
