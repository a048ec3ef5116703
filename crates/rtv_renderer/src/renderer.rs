//! Progressive parallel rendering.
//!
//! Each pass adds one sample to every pixel. Rows are distributed across the
//! rayon pool; each pixel sample draws from its own generator seeded by
//! `(seed, pass, pixel)`, so results do not depend on scheduling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use rtv_core::Color;

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::frame::FrameBuffer;
use crate::integrator::{self, Integrator};
use crate::scene::Scene;

/// Shared flag that stops a render between rows.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Summary of a call to [`render`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    pub passes: u32,
    pub cancelled: bool,
    pub elapsed: Duration,
}

/// Frame buffer sized for `config`, with strategy images when requested.
pub fn frame_for(config: &RenderConfig, integrator: &dyn Integrator) -> FrameBuffer {
    let side = if config.record_strategies {
        integrator.strategy_side()
    } else {
        0
    };
    FrameBuffer::with_strategies(config.width, config.height, side)
}

/// Seed for one pixel sample (splitmix64 over the three inputs).
pub fn pixel_seed(seed: u64, pass: u32, pixel: u64) -> u64 {
    splitmix64(seed ^ splitmix64(((pass as u64) << 32) ^ pixel))
}

#[inline]
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// One radiance sample for pixel `(x, y)`.
pub fn render_pixel(
    scene: &Scene,
    camera: &Camera,
    integrator: &dyn Integrator,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
    strategies: Option<&mut [Color]>,
) -> Color {
    let ray = camera.make_ray(y, x, rng);
    integrator.sample(scene, ray, rng, strategies)
}

/// Side of the strategy grid `frame` can take from `integrator`, or 0 when
/// the frame records no strategies or was sized for a different grid.
fn recorded_side(frame: &FrameBuffer, integrator: &dyn Integrator) -> usize {
    let side = frame.strategy_side();
    if side == integrator.strategy_side() {
        side
    } else {
        0
    }
}

/// Add one sample to every pixel. Returns false if cancelled before every
/// row was rendered.
///
/// Strategy images are only written when the frame's grid matches
/// [`Integrator::strategy_side`]; see [`frame_for`].
pub fn render_pass(
    scene: &Scene,
    camera: &Camera,
    integrator: &dyn Integrator,
    config: &RenderConfig,
    frame: &mut FrameBuffer,
    pass: u32,
    cancel: &CancelToken,
) -> bool {
    let width = frame.width as usize;
    let side = recorded_side(frame, integrator);
    let block = side * side;

    frame.rows_mut().for_each(|row| {
        if cancel.is_cancelled() {
            return;
        }
        for x in 0..width {
            let pixel = row.y as u64 * width as u64 + x as u64;
            let mut rng = StdRng::seed_from_u64(pixel_seed(config.seed, pass, pixel));
            let strategies = if block > 0 {
                Some(&mut row.strategies[x * block..(x + 1) * block])
            } else {
                None
            };

            let color =
                render_pixel(scene, camera, integrator, x as u32, row.y, &mut rng, strategies);
            row.sums[x] += color;
            row.counts[x] += 1;
        }
    });

    !cancel.is_cancelled()
}

/// Render `config.samples_per_pixel` passes into `frame`, stopping early on
/// cancellation. The frame stays resolvable either way.
pub fn render(
    scene: &Scene,
    config: &RenderConfig,
    frame: &mut FrameBuffer,
    cancel: &CancelToken,
) -> RenderStats {
    let start = Instant::now();
    let camera = Camera::from_config(&config.camera, config.width, config.height);
    let integrator = integrator::from_config(config);

    log::info!(
        "Rendering {}x{} with {} integrator, {} passes, {} bounces",
        config.width,
        config.height,
        integrator.name(),
        config.samples_per_pixel,
        config.max_bounces
    );

    if frame.strategy_side() > 0 && recorded_side(frame, integrator.as_ref()) == 0 {
        log::warn!(
            "frame has a {0}x{0} strategy grid but the {1} integrator needs {2}x{2}; \
             not recording strategies",
            frame.strategy_side(),
            integrator.name(),
            integrator.strategy_side()
        );
    }

    let mut passes = 0;
    for pass in 0..config.samples_per_pixel {
        if cancel.is_cancelled() {
            break;
        }
        if !render_pass(scene, &camera, integrator.as_ref(), config, frame, pass, cancel) {
            break;
        }
        passes += 1;
        log::info!("pass {}/{} done ({:.1?})", passes, config.samples_per_pixel, start.elapsed());
    }

    let cancelled = cancel.is_cancelled();
    if cancelled {
        log::warn!("render cancelled after {} complete passes", passes);
    }

    RenderStats {
        passes,
        cancelled,
        elapsed: start.elapsed(),
    }
}
