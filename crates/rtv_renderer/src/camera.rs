//! Pinhole camera for ray generation.

use rand::RngCore;
use rtv_math::{Ray, Vec3};

use crate::brdf::gen_f32;
use crate::config::CameraConfig;

/// Camera for generating rays into the scene.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Vertical field of view in degrees
    vfov: f32,

    // Cached computed values (set by initialize())
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 320,
            image_height: 180,
            look_from: Vec3::new(0.0, 2.0, 5.0),
            look_at: Vec3::new(0.0, 2.0, 4.0),
            vup: Vec3::Y,
            vfov: 70.0,
            center: Vec3::ZERO,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
        }
    }

    /// Build and initialize a camera from configuration.
    pub fn from_config(config: &CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self::new()
            .with_resolution(width, height)
            .with_position(config.position, config.look_at, config.up)
            .with_lens(config.vfov);
        camera.initialize();
        camera
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set the vertical field of view in degrees.
    pub fn with_lens(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self
    }

    /// Initialize the camera (must be called before generating rays).
    pub fn initialize(&mut self) {
        self.center = self.look_from;

        // Viewport on the plane one unit in front of the camera
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let aspect = self.image_width as f32 / self.image_height.max(1) as f32;
        let viewport_width = viewport_height * aspect;

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize_or_zero();
        self.u = self.vup.cross(self.w).normalize_or_zero();
        self.v = self.w.cross(self.u);

        // Calculate viewport vectors
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        // Calculate pixel delta vectors
        self.pixel_delta_u = viewport_u / self.image_width.max(1) as f32;
        self.pixel_delta_v = viewport_v / self.image_height.max(1) as f32;

        // Calculate upper left pixel location
        let viewport_upper_left = self.center - self.w - viewport_u / 2.0 - viewport_v / 2.0;

        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);
    }

    /// Generate a ray for pixel (i, j) with a random sub-pixel offset.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;

        Ray::new(self.center, pixel_sample - self.center)
    }

    /// Jittered ray through the pixel at `row`, `col` (row 0 is the top).
    pub fn make_ray(&self, row: u32, col: u32, rng: &mut dyn RngCore) -> Ray {
        self.get_ray(col, row, rng)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample a random point in the unit square [-0.5, 0.5] x [-0.5, 0.5].
fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(gen_f32(rng) - 0.5, gen_f32(rng) - 0.5, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_camera_initialize() {
        let mut camera = Camera::new()
            .with_resolution(800, 600)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0);

        camera.initialize();

        assert_eq!(camera.center, Vec3::ZERO);
        assert!((camera.w - Vec3::Z).length() < 0.001);
    }

    #[test]
    fn test_camera_ray_direction() {
        let mut camera = Camera::new()
            .with_resolution(100, 100)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0);

        camera.initialize();

        let mut rng = StdRng::seed_from_u64(42);

        // Center ray should point roughly towards -Z
        let ray = camera.make_ray(50, 50, &mut rng);
        assert!(ray.direction().z < 0.0);
        assert!(ray.direction().x.abs() < 0.05);
        assert!((ray.direction().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_camera_row_is_vertical() {
        let mut camera = Camera::new()
            .with_resolution(100, 50)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(60.0);
        camera.initialize();
        let mut rng = StdRng::seed_from_u64(42);

        // Row 0 is the top of the image, col 0 the left edge
        let top_left = camera.make_ray(0, 0, &mut rng);
        let bottom_right = camera.make_ray(49, 99, &mut rng);
        assert!(top_left.direction().y > 0.0 && top_left.direction().x < 0.0);
        assert!(bottom_right.direction().y < 0.0 && bottom_right.direction().x > 0.0);
    }

    #[test]
    fn test_camera_jitter_stays_in_pixel() {
        let camera = Camera::from_config(
            &CameraConfig {
                position: Vec3::new(0.0, 3.0, 0.0),
                look_at: Vec3::ZERO,
                up: Vec3::Z,
                vfov: 10.0,
            },
            1,
            1,
        );
        let mut rng = StdRng::seed_from_u64(42);
        let half_angle = 5.0f32.to_radians();

        for _ in 0..100 {
            let ray = camera.make_ray(0, 0, &mut rng);
            assert!(ray.direction().y < 0.0);
            let angle = ray.direction().dot(-Vec3::Y).acos();
            // Square pixel: corners reach sqrt(2) times the half angle
            assert!(angle <= half_angle * 1.5);
        }
    }
}
