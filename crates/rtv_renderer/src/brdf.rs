//! Scattering functions for the three surface kinds.
//!
//! Densities are measured with respect to projected solid angle, so a
//! cosine-weighted diffuse sample has `pdf = 1/pi` and the geometry term
//! carries both cosines when converting to area measure.

use std::f32::consts::{FRAC_1_PI, TAU};

use rand::RngCore;
use rtv_core::Material;
use rtv_math::Vec3;

/// Uniform `f32` in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

/// Orthonormal basis with `w` along a surface normal.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Frame {
    pub fn from_normal(normal: Vec3) -> Self {
        let w = normal.normalize_or_zero();
        let (u, v) = w.any_orthonormal_pair();
        Self { u, v, w }
    }

    /// Map local coordinates to world space.
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.u * local.x + self.v * local.y + self.w * local.z
    }
}

/// Cosine-weighted direction on the hemisphere around `normal`.
pub fn cosine_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);
    let phi = TAU * r1;
    let r = r2.sqrt();
    let local = Vec3::new(r * phi.cos(), r * phi.sin(), (1.0 - r2).max(0.0).sqrt());
    Frame::from_normal(normal).to_world(local).normalize_or_zero()
}

/// Mirror `wi` (pointing away from the surface) about `normal`.
#[inline]
pub fn reflect(wi: Vec3, normal: Vec3) -> Vec3 {
    2.0 * wi.dot(normal) * normal - wi
}

/// An outgoing direction with its BRDF value and sampling density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrdfSample {
    pub direction: Vec3,
    pub f: f32,
    pub pdf: f32,
}

/// Sample an outgoing direction. `wi` points from the surface back along the
/// arriving path. Emitters absorb and return `None`.
pub fn sample(
    material: Material,
    wi: Vec3,
    normal: Vec3,
    rng: &mut dyn RngCore,
) -> Option<BrdfSample> {
    match material {
        Material::Diffuse => Some(BrdfSample {
            direction: cosine_hemisphere(normal, rng),
            f: FRAC_1_PI,
            pdf: FRAC_1_PI,
        }),
        // Delta lobe: placeholder values that cancel in f / pdf
        Material::Specular => Some(BrdfSample {
            direction: reflect(wi, normal),
            f: 1.0,
            pdf: 1.0,
        }),
        Material::Emitter => None,
    }
}

/// BRDF value for an explicit pair of directions.
pub fn eval(material: Material, wi: Vec3, normal: Vec3, wo: Vec3) -> f32 {
    match material {
        Material::Diffuse if wi.dot(normal) > 0.0 && wo.dot(normal) > 0.0 => FRAC_1_PI,
        _ => 0.0,
    }
}

/// Density of sampling `wo` given `wi`, in projected solid angle.
///
/// Specular surfaces report the same placeholder as [`sample`]; strategies
/// that would join at a specular vertex are never weighted.
pub fn pdf(material: Material, wi: Vec3, normal: Vec3, wo: Vec3) -> f32 {
    match material {
        Material::Diffuse if wi.dot(normal) > 0.0 && wo.dot(normal) > 0.0 => FRAC_1_PI,
        Material::Diffuse => 0.0,
        Material::Specular => 1.0,
        Material::Emitter => 0.0,
    }
}

/// Density of a uniform (Lambertian) emitter leaving along `wo`.
pub fn emission_pdf(normal: Vec3, wo: Vec3) -> f32 {
    if wo.dot(normal) > 0.0 {
        FRAC_1_PI
    } else {
        0.0
    }
}

/// `cos_a * cos_b / d^2` between two surface points, zero when either side
/// faces away.
pub fn geometry_term(a: Vec3, a_normal: Vec3, b: Vec3, b_normal: Vec3) -> f32 {
    let offset = b - a;
    let distance_squared = offset.length_squared();
    if !(distance_squared > 0.0) {
        return 0.0;
    }

    let direction = offset / distance_squared.sqrt();
    let cos_a = a_normal.dot(direction).max(0.0);
    let cos_b = b_normal.dot(-direction).max(0.0);
    cos_a * cos_b / distance_squared
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gen_f32_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10_000 {
            let x = gen_f32(&mut rng);
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_frame_orthonormal() {
        for n in [Vec3::X, -Vec3::Y, Vec3::new(1.0, 2.0, -3.0).normalize()] {
            let frame = Frame::from_normal(n);
            assert!((frame.w - n).length() < 1e-6);
            assert!(frame.u.dot(frame.v).abs() < 1e-6);
            assert!(frame.u.dot(frame.w).abs() < 1e-6);
            assert!((frame.u.length() - 1.0).abs() < 1e-5);
            assert!((frame.to_world(Vec3::Z) - n).length() < 1e-6);
        }
    }

    #[test]
    fn test_cosine_hemisphere_distribution() {
        let mut rng = StdRng::seed_from_u64(42);
        let normal = Vec3::new(0.0, 1.0, 1.0).normalize();
        let n = 20_000;

        let mut mean_cos = 0.0;
        for _ in 0..n {
            let d = cosine_hemisphere(normal, &mut rng);
            assert!((d.length() - 1.0).abs() < 1e-4);
            assert!(d.dot(normal) >= -1e-6);
            mean_cos += d.dot(normal);
        }
        mean_cos /= n as f32;

        // E[cos] = 2/3 for a cosine-weighted hemisphere
        assert!((mean_cos - 2.0 / 3.0).abs() < 0.01, "mean cos {}", mean_cos);
    }

    #[test]
    fn test_reflect() {
        let wi = Vec3::new(1.0, 1.0, 0.0).normalize();
        let r = reflect(wi, Vec3::Y);
        assert!((r - Vec3::new(-1.0, 1.0, 0.0).normalize()).length() < 1e-6);
    }

    #[test]
    fn test_diffuse_values() {
        let n = Vec3::Y;
        let up = Vec3::new(0.3, 1.0, 0.0).normalize();
        let down = -up;

        assert_eq!(eval(Material::Diffuse, up, n, up), FRAC_1_PI);
        assert_eq!(pdf(Material::Diffuse, up, n, up), FRAC_1_PI);
        assert_eq!(eval(Material::Diffuse, up, n, down), 0.0);
        assert_eq!(pdf(Material::Diffuse, up, n, down), 0.0);
    }

    #[test]
    fn test_specular_and_emitter() {
        let mut rng = StdRng::seed_from_u64(1);
        let wi = Vec3::new(1.0, 1.0, 0.0).normalize();

        let s = sample(Material::Specular, wi, Vec3::Y, &mut rng).expect("mirror scatters");
        assert_eq!((s.f, s.pdf), (1.0, 1.0));
        assert!((s.direction - reflect(wi, Vec3::Y)).length() < 1e-6);
        assert_eq!(eval(Material::Specular, wi, Vec3::Y, s.direction), 0.0);

        assert!(sample(Material::Emitter, wi, Vec3::Y, &mut rng).is_none());
        assert_eq!(eval(Material::Emitter, wi, Vec3::Y, wi), 0.0);
        assert_eq!(pdf(Material::Emitter, wi, Vec3::Y, wi), 0.0);
    }

    #[test]
    fn test_geometry_term() {
        let g = geometry_term(Vec3::ZERO, Vec3::Y, Vec3::new(0.0, 2.0, 0.0), -Vec3::Y);
        assert!((g - 0.25).abs() < 1e-6);

        assert_eq!(geometry_term(Vec3::ZERO, -Vec3::Y, Vec3::new(0.0, 2.0, 0.0), -Vec3::Y), 0.0);
        assert_eq!(geometry_term(Vec3::ONE, Vec3::Y, Vec3::ONE, -Vec3::Y), 0.0);
        assert_eq!(
            geometry_term(Vec3::ZERO, Vec3::Y, Vec3::X, Vec3::Y),
            geometry_term(Vec3::X, Vec3::Y, Vec3::ZERO, Vec3::Y)
        );
    }
}
