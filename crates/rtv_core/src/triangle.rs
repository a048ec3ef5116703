//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.
//! Surfaces are one-sided: rays arriving from behind the face normal pass
//! straight through.

use crate::{Color, Material};
use rtv_math::{Aabb, Ray, Vec3};

/// Minimum hit distance. Keeps a ray leaving a surface from re-hitting the
/// surface it started on.
pub const COLLISION_SHIFT: f32 = 1e-4;

/// A triangle primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    /// Vertices
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    /// Edges `v1 - v0` and `v2 - v0`
    pub e1: Vec3,
    pub e2: Vec3,
    /// Face normal `normalize(e1 x e2)`
    pub normal: Vec3,
    pub material: Material,
    /// Albedo, or emitted radiance for emitters
    pub color: Color,
}

impl Triangle {
    /// Create a new triangle from three vertices. The normal follows the
    /// counter-clockwise winding `v0 -> v1 -> v2`.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Material, color: Color) -> Self {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let normal = e1.cross(e2).normalize_or_zero();

        Self {
            v0,
            v1,
            v2,
            e1,
            e2,
            normal,
            material,
            color,
        }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::enclosing(self.vertices())
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    pub fn area(&self) -> f32 {
        0.5 * self.e1.cross(self.e2).length()
    }

    /// True if at least one vertex lies inside the box.
    pub fn touches(&self, bbox: &Aabb) -> bool {
        self.vertices().iter().any(|&v| bbox.contains(v))
    }

    /// Map two uniform numbers in `[0, 1)` to a point uniformly distributed
    /// over the triangle's area.
    pub fn point_at(&self, u1: f32, u2: f32) -> Vec3 {
        let su = u1.sqrt();
        let b0 = 1.0 - su;
        let b1 = u2 * su;
        self.v0 + self.e1 * b1 + self.e2 * (1.0 - b0 - b1)
    }

    /// Möller-Trumbore ray-triangle intersection.
    ///
    /// Returns the hit distance if the ray strikes the front face beyond
    /// [`COLLISION_SHIFT`].
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        // Back faces and parallel rays
        if ray.direction.dot(self.normal) >= 0.0 {
            return None;
        }

        let h = ray.direction.cross(self.e2);
        let a = h.dot(self.e1);
        if a <= 0.0 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(self.e1);
        let v = f * ray.direction.dot(q);
        if !(0.0..=1.0).contains(&v) {
            return None;
        }

        let w = 1.0 - u - v;
        if !(0.0..=1.0).contains(&w) {
            return None;
        }

        let t = f * self.e2.dot(q);
        if t > COLLISION_SHIFT {
            Some(t)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Triangle in the XY plane at z = -1, facing +Z (toward the origin).
    fn facing_origin() -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            Material::Diffuse,
            Vec3::splat(0.5),
        )
    }

    #[test]
    fn test_triangle_derived_fields() {
        let tri = facing_origin();
        assert_eq!(tri.e1, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(tri.e2, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(tri.normal, Vec3::Z);
        assert_eq!(tri.area(), 2.0);
        assert_eq!(tri.bounds().min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(tri.bounds().max, Vec3::new(1.0, 1.0, -1.0));
    }

    #[test]
    fn test_triangle_hit() {
        let tri = facing_origin();
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        let t = tri.intersect(&ray).expect("ray aimed at the face");
        assert!((t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_miss_pointing_away() {
        let tri = facing_origin();
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_back_face_culled() {
        let tri = facing_origin();
        // Behind the triangle, looking toward it
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_miss_outside_edges() {
        let tri = facing_origin();
        let ray = Ray::new(Vec3::new(2.0, 0.0, 0.0), -Vec3::Z);
        assert!(tri.intersect(&ray).is_none());

        let ray = Ray::new(Vec3::new(0.0, -1.5, 0.0), -Vec3::Z);
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_parallel_ray() {
        let tri = facing_origin();
        let ray = Ray::new(Vec3::new(-5.0, 0.0, -1.0), Vec3::X);
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_collision_shift() {
        let tri = facing_origin();
        // Origin sits on the surface: t == 0 is rejected
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), -Vec3::Z);
        assert!(tri.intersect(&ray).is_none());

        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0 + COLLISION_SHIFT * 0.5), -Vec3::Z);
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_point_at_stays_inside() {
        let tri = facing_origin();
        for i in 0..10 {
            for j in 0..10 {
                let p = tri.point_at((i as f32 + 0.5) / 10.0, (j as f32 + 0.5) / 10.0);
                assert!(tri.bounds().contains(p));

                // Shooting back at the sampled point must hit the triangle
                let origin = p + tri.normal;
                let t = tri.intersect(&Ray::new(origin, -tri.normal));
                assert!(t.is_some(), "point {:?} not on triangle", p);
            }
        }
    }

    #[test]
    fn test_triangle_touches() {
        let tri = facing_origin();
        let left = Aabb::new(Vec3::new(-2.0, -2.0, -2.0), Vec3::new(-0.5, 2.0, 0.0));
        let away = Aabb::new(Vec3::splat(5.0), Vec3::splat(6.0));
        assert!(tri.touches(&left));
        assert!(!tri.touches(&away));
    }
}
