//! Surface material tags.

use rtv_math::Vec3;
use serde::{Deserialize, Serialize};

/// Color type alias (linear RGB)
pub type Color = Vec3;

/// How a surface interacts with light.
///
/// The triangle's color is the albedo for `Diffuse` and `Specular` surfaces
/// and the emitted radiance for `Emitter` surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    /// Lambertian reflector.
    #[default]
    Diffuse,
    /// Perfect mirror.
    Specular,
    /// Lambertian emitter; absorbs everything that reaches it.
    Emitter,
}

impl Material {
    /// True for light sources.
    pub fn is_emitter(self) -> bool {
        matches!(self, Material::Emitter)
    }

    /// True for delta (mirror) reflection, which cannot be joined by an
    /// explicit connection.
    pub fn is_specular(self) -> bool {
        matches!(self, Material::Specular)
    }
}
