//! Render settings, loadable from JSON.

use std::path::Path;

use rtv_math::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bvh::BvhConfig;

/// Errors that can occur while loading or validating render settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid render config: {0}")]
    Invalid(String),
}

/// Light transport algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegratorKind {
    /// Camera paths only; light is found by hitting an emitter.
    Unidirectional,
    /// Camera and light subpaths joined with multiple importance sampling.
    #[default]
    Bidirectional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BidirectionalConfig {
    /// Count camera subpaths that land on an emitter (`s = 0`).
    pub emission_strategy: bool,
}

impl Default for BidirectionalConfig {
    fn default() -> Self {
        Self {
            emission_strategy: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 5.0),
            look_at: Vec3::new(0.0, 2.0, 4.0),
            up: Vec3::Y,
            vfov: 70.0,
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Passes over the image; one sample per pixel each
    pub samples_per_pixel: u32,
    /// Maximum vertices appended to each subpath
    pub max_bounces: u32,
    pub integrator: IntegratorKind,
    pub seed: u64,
    /// Keep a per-(s, t) image for every bidirectional strategy
    pub record_strategies: bool,
    pub bvh: BvhConfig,
    pub bidirectional: BidirectionalConfig,
    pub camera: CameraConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 180,
            samples_per_pixel: 100,
            max_bounces: 5,
            integrator: IntegratorKind::default(),
            seed: 0,
            record_strategies: false,
            bvh: BvhConfig::default(),
            bidirectional: BidirectionalConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::info!("Loading render config: {:?}", path);
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "image size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::Invalid("samples_per_pixel must be at least 1".into()));
        }
        if self.bvh.max_members == 0 {
            return Err(ConfigError::Invalid("bvh.max_members must be at least 1".into()));
        }
        if self.bvh.splits_per_axis < 2 {
            return Err(ConfigError::Invalid("bvh.splits_per_axis must be at least 2".into()));
        }
        if !(self.camera.vfov > 0.0 && self.camera.vfov < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.vfov must be in (0, 180), got {}",
                self.camera.vfov
            )));
        }
        let view = self.camera.look_at - self.camera.position;
        if view.length_squared() == 0.0 {
            return Err(ConfigError::Invalid("camera.look_at equals camera.position".into()));
        }
        if view.normalize().cross(self.camera.up.normalize_or_zero()).length_squared() < 1e-12 {
            return Err(ConfigError::Invalid(format!(
                "camera.up {:?} is zero or parallel to the view direction",
                self.camera.up
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_bounces, 5);
        assert_eq!(config.bvh.max_members, 16);
        assert_eq!(config.bvh.max_depth, 10);
        assert_eq!(config.integrator, IntegratorKind::Bidirectional);
        assert!(config.bidirectional.emission_strategy);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RenderConfig::from_json_str(
            r#"{
                "width": 64,
                "integrator": "unidirectional",
                "bvh": { "max_members": 4 },
                "camera": { "position": [1.0, 2.0, 3.0] }
            }"#,
        )
        .expect("valid config");

        assert_eq!(config.width, 64);
        assert_eq!(config.height, 180);
        assert_eq!(config.integrator, IntegratorKind::Unidirectional);
        assert_eq!(config.bvh.max_members, 4);
        assert_eq!(config.bvh.max_depth, 10);
        assert_eq!(config.camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.camera.vfov, 70.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            r#"{ "width": 0 }"#,
            r#"{ "samples_per_pixel": 0 }"#,
            r#"{ "bvh": { "max_members": 0 } }"#,
            r#"{ "bvh": { "splits_per_axis": 1 } }"#,
            r#"{ "camera": { "vfov": 180.0 } }"#,
        ];
        for json in cases {
            let err = RenderConfig::from_json_str(json).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{} gave {:?}", json, err);
        }
    }

    #[test]
    fn test_view_along_up_rejected() {
        let looking_down = r#"{
            "camera": { "position": [0.0, 5.0, 0.0], "look_at": [0.0, 0.0, 0.0] }
        }"#;
        let err = RenderConfig::from_json_str(looking_down).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{:?}", err);

        let zero_up = r#"{ "camera": { "up": [0.0, 0.0, 0.0] } }"#;
        assert!(matches!(RenderConfig::from_json_str(zero_up), Err(ConfigError::Invalid(_))));

        // The same view is fine once `up` is not parallel to it
        let tilted_up = r#"{
            "camera": {
                "position": [0.0, 5.0, 0.0],
                "look_at": [0.0, 0.0, 0.0],
                "up": [0.0, 0.0, -1.0]
            }
        }"#;
        assert!(RenderConfig::from_json_str(tilted_up).is_ok());
    }

    #[test]
    fn test_malformed_json() {
        let err = RenderConfig::from_json_str("{ width: 1 ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));

        let err = RenderConfig::from_json_str(r#"{ "integrator": "photon" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = RenderConfig::from_path("/nonexistent/rtv/render.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut config = RenderConfig::default();
        config.seed = 99;
        config.record_strategies = true;
        let json = serde_json::to_string(&config).expect("serialize");
        assert_eq!(RenderConfig::from_json_str(&json).expect("parse"), config);
    }
}
