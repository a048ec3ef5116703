use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use rtv_core::{load_obj, shapes, Color, Material};
use rtv_math::Vec3;
use rtv_renderer::tonemap::{tone_map, DEFAULT_KEY};
use rtv_renderer::{
    frame_for, integrator_from_config, render, CancelToken, IntegratorKind, RenderConfig,
    RenderStats, Scene,
};

/// Render the lit room (plus an optional mesh) with a bidirectional or
/// unidirectional path tracer.
#[derive(Parser, Debug)]
#[command(name = "rtv", author, version, about, long_about = None)]
struct Args {
    /// JSON render settings; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wavefront OBJ mesh to place in the room
    #[arg(long)]
    obj: Option<PathBuf>,

    /// Surface type for the OBJ mesh
    #[arg(long, value_enum, default_value_t = Surface::Diffuse)]
    material: Surface,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Samples per pixel
    #[arg(short, long)]
    samples: Option<u32>,

    /// Maximum bounces per subpath
    #[arg(short, long)]
    bounces: Option<u32>,

    #[arg(short, long, value_enum)]
    integrator: Option<Integrator>,

    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many seconds and save what has been rendered
    #[arg(short, long)]
    time_limit: Option<f64>,

    /// Also save one image per (s, t) strategy
    #[arg(long, default_value_t = false)]
    record_strategies: bool,

    #[arg(short, long, default_value = "out.png")]
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Surface {
    Diffuse,
    Specular,
}

impl From<Surface> for Material {
    fn from(surface: Surface) -> Self {
        match surface {
            Surface::Diffuse => Material::Diffuse,
            Surface::Specular => Material::Specular,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Integrator {
    Unidirectional,
    Bidirectional,
}

impl From<Integrator> for IntegratorKind {
    fn from(integrator: Integrator) -> Self {
        match integrator {
            Integrator::Unidirectional => IntegratorKind::Unidirectional,
            Integrator::Bidirectional => IntegratorKind::Bidirectional,
        }
    }
}

/// Merge the config file (or defaults) with command line overrides.
fn build_config(args: &Args) -> Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::from_path(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => RenderConfig::default(),
    };

    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(samples) = args.samples {
        config.samples_per_pixel = samples;
    }
    if let Some(bounces) = args.bounces {
        config.max_bounces = bounces;
    }
    if let Some(integrator) = args.integrator {
        config.integrator = integrator.into();
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.record_strategies |= args.record_strategies;

    config.validate().context("invalid render settings")?;
    Ok(config)
}

fn build_scene(args: &Args, config: &RenderConfig) -> Result<Scene> {
    let mut triangles = shapes::lit_room();
    if let Some(path) = &args.obj {
        let mesh = load_obj(path, args.material.into(), Vec3::splat(0.75))
            .with_context(|| format!("loading {}", path.display()))?;
        triangles.extend(mesh);
    }
    Ok(Scene::new(triangles, &config.bvh))
}

/// Cancel `token` once `seconds` have passed.
fn spawn_time_limit(seconds: f64, token: CancelToken) -> Result<()> {
    if !(seconds.is_finite() && seconds > 0.0) {
        bail!("time limit must be a positive number of seconds, got {}", seconds);
    }
    let limit = Duration::from_secs_f64(seconds);
    thread::spawn(move || {
        thread::sleep(limit);
        log::warn!("Time limit of {:?} reached, stopping render", limit);
        token.cancel();
    });
    Ok(())
}

/// Ctrl-C stops the render between rows; what was rendered is still saved.
fn interrupt_handler(token: CancelToken) -> impl FnMut() + Send + 'static {
    move || {
        if !token.is_cancelled() {
            log::warn!("Interrupted, saving the partial render");
        }
        token.cancel();
    }
}

fn save_png(path: &Path, width: u32, height: u32, pixels: &[Color]) -> Result<()> {
    let bytes = tone_map(pixels, DEFAULT_KEY);
    let image = image::RgbImage::from_raw(width, height, bytes)
        .context("image buffer has the wrong size")?;
    image.save(path).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved {}", path.display());
    Ok(())
}

/// `out.png` -> `out_s1_t2.png`
fn strategy_path(output: &Path, s: usize, t: usize) -> PathBuf {
    let stem = output.file_stem().and_then(|name| name.to_str()).unwrap_or("out");
    output.with_file_name(format!("{}_s{}_t{}.png", stem, s, t))
}

/// Render `scene` and save the image, plus one image per recorded strategy.
/// A cancelled render is saved as far as it got.
fn render_to_files(
    scene: &Scene,
    config: &RenderConfig,
    output: &Path,
    cancel: &CancelToken,
) -> Result<RenderStats> {
    let integrator = integrator_from_config(config);
    let mut frame = frame_for(config, integrator.as_ref());
    let stats = render(scene, config, &mut frame, cancel);
    log::info!(
        "Rendered {} of {} passes ({} samples) in {:.2?}",
        stats.passes,
        config.samples_per_pixel,
        frame.total_samples(),
        stats.elapsed
    );

    save_png(output, config.width, config.height, &frame.resolve())?;

    let side = frame.strategy_side();
    for s in 0..side {
        for t in 0..side {
            let Some(image) = frame.resolve_strategy(s, t) else {
                continue;
            };
            if image.iter().any(|c| c.max_element() > 0.0) {
                save_png(&strategy_path(output, s, t), config.width, config.height, &image)?;
            }
        }
    }

    Ok(stats)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let scene = build_scene(&args, &config)?;

    let cancel = CancelToken::new();
    ctrlc::set_handler(interrupt_handler(cancel.clone())).context("installing the Ctrl-C handler")?;
    if let Some(seconds) = args.time_limit {
        spawn_time_limit(seconds, cancel.clone())?;
    }

    render_to_files(&scene, &config, &args.output, &cancel)?;
    Ok(())
}
