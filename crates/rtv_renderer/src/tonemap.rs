//! Global tone mapping from linear radiance to 8-bit RGB.

use rtv_core::Color;
use rtv_math::Vec3;

/// Middle-grey target for the log-average luminance.
pub const DEFAULT_KEY: f32 = 0.64;

/// Offset that keeps `ln` finite on black pixels.
const DELTA: f32 = 0.1;

const LUMINANCE: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);

#[inline]
pub fn luminance(color: Color) -> f32 {
    color.dot(LUMINANCE)
}

/// `exp(mean(ln(DELTA + L)))` over all pixels.
pub fn log_average_luminance(pixels: &[Color]) -> f32 {
    if pixels.is_empty() {
        return 1.0;
    }
    let sum: f64 = pixels
        .iter()
        .map(|&c| (DELTA + luminance(c).max(0.0)) as f64)
        .map(f64::ln)
        .sum();
    (sum / pixels.len() as f64).exp() as f32
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a display-referred color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let channel = |c: f32| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8;
    [channel(color.x), channel(color.y), channel(color.z)]
}

/// Scale the image so its log-average luminance maps to `key`, then
/// gamma-encode to packed RGB8.
pub fn tone_map(pixels: &[Color], key: f32) -> Vec<u8> {
    let scale = key / log_average_luminance(pixels);
    log::debug!("tone map scale {}", scale);

    let mut bytes = Vec::with_capacity(pixels.len() * 3);
    for &color in pixels {
        bytes.extend_from_slice(&color_to_rgb(color * scale));
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_log_average_black_image() {
        let lw = log_average_luminance(&[Color::ZERO; 16]);
        assert!((lw - DELTA).abs() < 1e-6);
    }

    #[test]
    fn test_log_average_is_geometric_mean() {
        // Luminances 0.9 and 3.9 -> (1.0 * 4.0)^(1/2)
        let pixels = [Color::splat(0.9), Color::splat(3.9)];
        assert!((log_average_luminance(&pixels) - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_tone_map_uniform_image() {
        // L = 0.9 -> Lw = 1.0, scaled to the key
        let bytes = tone_map(&[Color::splat(0.9); 4], DEFAULT_KEY);
        assert_eq!(bytes.len(), 12);

        let expected = (255.0 * (0.9f32 * DEFAULT_KEY).sqrt()) as u8;
        assert!(bytes.iter().all(|&b| b == expected));
    }

    #[test]
    fn test_tone_map_clamps_and_handles_nan() {
        let bytes = tone_map(&[Color::splat(1000.0), Color::new(f32::NAN, 0.0, -1.0)], DEFAULT_KEY);
        assert_eq!(&bytes[0..3], &[255, 255, 255]);
        assert_eq!(&bytes[3..6], &[0, 0, 0]);
    }
}
