//! Simple bidirectional render example.
//!
//! Renders the lit room at low resolution and saves it in PPM format.

use rtv_core::shapes::lit_room;
use rtv_renderer::tonemap::{tone_map, DEFAULT_KEY};
use rtv_renderer::{render, CancelToken, FrameBuffer, RenderConfig, Scene};
use std::fs::File;
use std::io::{BufWriter, Write};

fn main() {
    println!("RTV Path Tracer - Simple Example");
    println!("================================");

    // Build the scene
    let start = std::time::Instant::now();
    let config = RenderConfig {
        width: 160,
        height: 90,
        samples_per_pixel: 16,
        ..RenderConfig::default()
    };
    let scene = Scene::new(lit_room(), &config.bvh);
    println!("Scene built in {:?} ({:?})", start.elapsed(), scene.bvh.stats());

    println!(
        "Rendering {}x{} @ {} spp...",
        config.width, config.height, config.samples_per_pixel
    );

    // Render
    let mut frame = FrameBuffer::new(config.width, config.height);
    let stats = render(&scene, &config, &mut frame, &CancelToken::new());
    println!("Rendered {} passes in {:?}", stats.passes, stats.elapsed);

    // Save as PPM
    let filename = "output.ppm";
    save_ppm(&frame, filename).expect("Failed to save image");
    println!("Saved to {}", filename);
}

fn save_ppm(frame: &FrameBuffer, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", frame.width, frame.height)?;
    writeln!(writer, "255")?;

    for rgb in tone_map(&frame.resolve(), DEFAULT_KEY).chunks_exact(3) {
        writeln!(writer, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
    }

    Ok(())
}
