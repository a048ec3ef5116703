//! Subpaths grown from the camera or from a light.
//!
//! Every vertex stores the throughput and the area-measure density of the
//! subpath up to (but not including) its own scattering event, so any prefix
//! of a subpath can be joined to any prefix of another.

use rand::RngCore;
use rtv_core::{Color, Material, Triangle};
use rtv_math::{Ray, Vec3};

use crate::brdf::{self, geometry_term};
use crate::bvh::Bvh;
use crate::lights::LightSample;

/// One scattering event on a subpath.
#[derive(Debug, Clone, PartialEq)]
pub struct PathVertex {
    /// Origin is the vertex position, direction the sampled outgoing direction
    pub ray: Ray,
    /// Throughput of the subpath before this vertex scatters
    pub color: Color,
    /// Area density of generating the subpath up to this vertex
    pub p: f32,
    /// Geometry term of the edge arriving at this vertex
    pub g: f32,
    pub bounces: u32,
    pub normal: Vec3,
    /// `None` for the camera vertex
    pub material: Option<Material>,
    /// Albedo, or emitted radiance on emitters
    pub local_color: Color,
    /// BRDF value and density of the sampled outgoing direction
    pub f_out: f32,
    pub pdf_out: f32,
}

impl PathVertex {
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.ray.origin
    }

    pub fn is_specular(&self) -> bool {
        self.material.is_some_and(Material::is_specular)
    }

    pub fn is_emitter(&self) -> bool {
        self.material.is_some_and(Material::is_emitter)
    }
}

/// A camera or light subpath. Never empty: it always holds its seed vertex.
///
/// The seed fixes which end the subpath starts from; the scattering
/// functions are symmetric, so extension treats both ends alike.
#[derive(Debug, Clone)]
pub struct Path {
    vertices: Vec<PathVertex>,
    hit_emitter: bool,
}

impl Path {
    /// Seed a subpath at the camera.
    pub fn from_camera(ray: Ray) -> Self {
        let seed = PathVertex {
            ray,
            color: Color::ONE,
            p: 1.0,
            g: 1.0,
            bounces: 0,
            normal: ray.direction,
            material: None,
            local_color: Color::ONE,
            f_out: 1.0,
            pdf_out: 1.0,
        };
        Self {
            vertices: vec![seed],
            hit_emitter: false,
        }
    }

    /// Seed a subpath at a point on an emitter, leaving in a cosine-weighted
    /// direction. `area_pdf` is the density of having picked `light`.
    pub fn from_light(light: &LightSample, area_pdf: f32, rng: &mut dyn RngCore) -> Self {
        let direction = brdf::cosine_hemisphere(light.normal, rng);
        let seed = PathVertex {
            ray: Ray::new(light.position, direction),
            color: Color::ONE,
            p: area_pdf,
            g: 1.0,
            bounces: 0,
            normal: light.normal,
            material: Some(Material::Emitter),
            local_color: light.emission,
            f_out: 1.0,
            pdf_out: brdf::emission_pdf(light.normal, direction),
        };
        Self {
            vertices: vec![seed],
            hit_emitter: false,
        }
    }

    pub fn vertices(&self) -> &[PathVertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn last(&self) -> &PathVertex {
        &self.vertices[self.vertices.len() - 1]
    }

    /// True once the subpath has landed on an emitter.
    pub fn hit_emitter(&self) -> bool {
        self.hit_emitter
    }

    /// No further vertex can be appended.
    pub fn is_terminated(&self) -> bool {
        self.hit_emitter || !(self.last().pdf_out > 0.0)
    }

    /// Append the surface point `position` on `triangle`. Its outgoing
    /// direction is left unset (absorbing) until sampled. Landing on an
    /// emitter terminates the subpath.
    pub(crate) fn push_surface(&mut self, position: Vec3, triangle: &Triangle) {
        let prev = self.last();
        let g = geometry_term(prev.position(), prev.normal, position, triangle.normal);

        let vertex = PathVertex {
            ray: Ray::new(position, triangle.normal),
            color: prev.color * prev.local_color * prev.f_out * g,
            p: prev.p * prev.pdf_out * g,
            g,
            bounces: prev.bounces + 1,
            normal: triangle.normal,
            material: Some(triangle.material),
            local_color: triangle.color,
            f_out: 0.0,
            pdf_out: 0.0,
        };
        self.vertices.push(vertex);
        self.hit_emitter = triangle.material.is_emitter();
    }

    /// Set the scattering direction of the last vertex.
    pub(crate) fn set_outgoing(&mut self, direction: Vec3, f: f32, pdf: f32) {
        let last = self.vertices.len() - 1;
        let vertex = &mut self.vertices[last];
        vertex.ray = Ray::new(vertex.position(), direction);
        vertex.f_out = f;
        vertex.pdf_out = pdf;
    }
}

/// Grow `path` by up to `max_bounces` vertices.
///
/// Stops early when a ray leaves the scene, when a surface absorbs, or when
/// an emitter is reached (the emitter vertex is kept).
pub fn extend_path(path: &mut Path, bvh: &Bvh, max_bounces: u32, rng: &mut dyn RngCore) {
    for _ in 0..max_bounces {
        if path.is_terminated() {
            break;
        }

        let ray = path.last().ray;
        let Some(hit) = bvh.nearest_hit(&ray) else {
            break;
        };
        let triangle = hit.triangle;
        path.push_surface(hit.point(&ray), triangle);
        if path.hit_emitter() {
            break;
        }

        match brdf::sample(triangle.material, -ray.direction, triangle.normal, rng) {
            Some(sample) => path.set_outgoing(sample.direction, sample.f, sample.pdf),
            None => break,
        }
    }
}
