//! RTV Renderer - CPU bidirectional path tracing
//!
//! A Monte Carlo renderer for triangle scenes:
//!
//! - **Acceleration**: [`Bvh`] built by grid-searched volume-minimising
//!   splits, with nearest-hit and visibility queries
//! - **Transport**: camera and light subpaths ([`path`]) combined by the
//!   [`Bidirectional`] integrator with balance-heuristic MIS, or traced
//!   camera-only by [`Unidirectional`]
//! - **Output**: a progressive [`FrameBuffer`] filled in parallel by
//!   [`render`], and log-average tone mapping in [`tonemap`]

mod bidirectional;
pub mod brdf;
mod bvh;
mod camera;
mod config;
mod frame;
mod integrator;
mod lights;
pub mod path;
mod renderer;
mod scene;
pub mod tonemap;
mod traversal;
mod unidirectional;

pub use bidirectional::{connect, emitted, mis_weight, Bidirectional, Contribution};
pub use brdf::{gen_f32, geometry_term, BrdfSample};
pub use bvh::{
    Bvh, BvhConfig, BvhNode, BvhStats, DEFAULT_MAX_DEPTH, DEFAULT_MAX_MEMBERS,
    DEFAULT_SPLITS_PER_AXIS,
};
pub use camera::Camera;
pub use config::{BidirectionalConfig, CameraConfig, ConfigError, IntegratorKind, RenderConfig};
pub use frame::{strategy_slot, FrameBuffer, RowMut};
pub use integrator::{clamp_contribution, from_config as integrator_from_config, Integrator};
pub use lights::{LightSample, Lights};
pub use path::{extend_path, Path, PathVertex};
pub use renderer::{
    frame_for, pixel_seed, render, render_pass, render_pixel, CancelToken, RenderStats,
};
pub use scene::Scene;
pub use traversal::{nearest_hit_brute_force, Hit};
pub use unidirectional::Unidirectional;

/// Re-export common types
pub use rtv_core::{Color, Material, Triangle};
pub use rtv_math::{Aabb, Interval, Ray, Vec3};
