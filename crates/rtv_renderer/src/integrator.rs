//! Light transport estimators.

use rand::RngCore;
use rtv_core::Color;
use rtv_math::{Ray, Vec3};

use crate::bidirectional::Bidirectional;
use crate::config::{IntegratorKind, RenderConfig};
use crate::scene::Scene;
use crate::unidirectional::Unidirectional;

/// Estimates the radiance arriving along a camera ray.
pub trait Integrator: Send + Sync {
    fn name(&self) -> &'static str;

    /// One radiance sample. When `strategies` is given, the weighted
    /// contribution of every `(s, t)` strategy is also added to it; the block
    /// must hold `strategy_side()^2` cells laid out by `strategy_slot`.
    fn sample(
        &self,
        scene: &Scene,
        ray: Ray,
        rng: &mut dyn RngCore,
        strategies: Option<&mut [Color]>,
    ) -> Color;

    /// Side of the `(s, t)` grid written by [`Integrator::sample`]; 0 if the
    /// integrator has no strategies.
    fn strategy_side(&self) -> usize {
        0
    }
}

/// Build the integrator selected by `config`.
pub fn from_config(config: &RenderConfig) -> Box<dyn Integrator> {
    match config.integrator {
        IntegratorKind::Unidirectional => Box::new(Unidirectional::new(config.max_bounces)),
        IntegratorKind::Bidirectional => {
            Box::new(Bidirectional::new(config.max_bounces, &config.bidirectional))
        }
    }
}

/// Zero out NaN, infinite and negative estimates.
#[inline]
pub fn clamp_contribution(value: Color) -> Color {
    if value.is_finite() {
        value.max(Vec3::ZERO)
    } else {
        Color::ZERO
    }
}
