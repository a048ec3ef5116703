//! Camera-only path tracing.

use rand::RngCore;
use rtv_core::Color;
use rtv_math::Ray;

use crate::integrator::{clamp_contribution, Integrator};
use crate::path::{extend_path, Path};
use crate::scene::Scene;

/// Follows one camera subpath and counts light only when it lands on an
/// emitter.
#[derive(Debug, Clone, Copy)]
pub struct Unidirectional {
    pub max_bounces: u32,
}

impl Unidirectional {
    pub fn new(max_bounces: u32) -> Self {
        Self { max_bounces }
    }
}

impl Integrator for Unidirectional {
    fn name(&self) -> &'static str {
        "unidirectional"
    }

    fn sample(
        &self,
        scene: &Scene,
        ray: Ray,
        rng: &mut dyn RngCore,
        _strategies: Option<&mut [Color]>,
    ) -> Color {
        let mut path = Path::from_camera(ray);
        extend_path(&mut path, &scene.bvh, self.max_bounces, rng);

        if !path.hit_emitter() {
            return Color::ZERO;
        }
        let emitter = path.last();
        if !(emitter.p > 0.0) {
            return Color::ZERO;
        }
        clamp_contribution(emitter.color * emitter.local_color / emitter.p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::BvhConfig;
    use crate::integrator::tests::{centered_form_factor, floor_under_light, overhead_camera};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rtv_math::Vec3;

    #[test]
    fn test_unidirectional_matches_form_factor() {
        let albedo = 0.5;
        let radiance = 2.0;
        let scene = floor_under_light(albedo, radiance);
        let camera = overhead_camera();
        let integrator = Unidirectional::new(5);
        let mut rng = StdRng::seed_from_u64(42);

        let n = 4000;
        let mut sum = Color::ZERO;
        for _ in 0..n {
            let ray = camera.make_ray(0, 0, &mut rng);
            sum += integrator.sample(&scene, ray, &mut rng, None);
        }
        let estimate = sum.x / n as f32;
        let expected = albedo * radiance * centered_form_factor(2.0, 2.0, 1.0);

        assert!(
            (estimate - expected).abs() < 0.05 * expected,
            "estimate {} expected {}",
            estimate,
            expected
        );
    }

    #[test]
    fn test_unidirectional_sees_emitter_directly() {
        let scene = floor_under_light(0.5, 3.0);
        let integrator = Unidirectional::new(5);
        let mut rng = StdRng::seed_from_u64(1);

        // From below the light, looking up at its face
        let ray = Ray::new(Vec3::new(0.3, 0.5, -0.2), Vec3::Y);
        let c = integrator.sample(&scene, ray, &mut rng, None);
        assert!((c - Color::splat(3.0)).length() < 1e-4, "got {:?}", c);
    }

    #[test]
    fn test_unidirectional_empty_scene() {
        let scene = Scene::new(vec![], &BvhConfig::default());
        let integrator = Unidirectional::new(5);
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::X);
        assert_eq!(integrator.sample(&scene, ray, &mut rng, None), Color::ZERO);
    }

    #[test]
    fn test_unidirectional_zero_bounces() {
        let scene = floor_under_light(0.5, 3.0);
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::new(0.0, 0.5, 0.0), Vec3::Y);
        assert_eq!(Unidirectional::new(0).sample(&scene, ray, &mut rng, None), Color::ZERO);
    }
}
