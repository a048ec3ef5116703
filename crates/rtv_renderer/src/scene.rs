//! Immutable render scene: the BVH plus its emitter table.

use rtv_core::Triangle;

use crate::bvh::{Bvh, BvhConfig};
use crate::lights::Lights;

#[derive(Debug, Clone)]
pub struct Scene {
    pub bvh: Bvh,
    pub lights: Lights,
}

impl Scene {
    pub fn new(triangles: Vec<Triangle>, config: &BvhConfig) -> Self {
        let lights = Lights::new(&triangles);
        if lights.is_empty() {
            log::warn!("scene has no emitters; the image will be black");
        }
        let bvh = Bvh::build_with(triangles, config);
        Self { bvh, lights }
    }
}
