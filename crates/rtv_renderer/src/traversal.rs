//! Ray queries against a built [`Bvh`].

use rtv_core::{Triangle, COLLISION_SHIFT};
use rtv_math::{Ray, Vec3};

use crate::bvh::Bvh;
use crate::path::PathVertex;

/// Closest intersection along a ray.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub triangle: &'a Triangle,
    /// Index of the triangle in [`Bvh::triangles`]
    pub index: usize,
    pub t: f32,
}

impl Hit<'_> {
    pub fn point(&self, ray: &Ray) -> Vec3 {
        ray.at(self.t)
    }
}

impl Bvh {
    /// Find the nearest front-facing triangle hit by `ray`.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<Hit<'_>> {
        let mut least_t = f32::INFINITY;
        let mut best = None;
        let mut stack = Vec::with_capacity(64);
        stack.push(0);

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            let Some(range) = node.bbox.hit(ray) else {
                continue;
            };
            if range.min > least_t {
                continue;
            }

            match node.children() {
                Some([left, right]) => {
                    stack.push(left);
                    stack.push(right);
                }
                None => {
                    for &member in node.members() {
                        let triangle = &self.triangles[member];
                        if let Some(t) = triangle.intersect(ray) {
                            if t < least_t {
                                least_t = t;
                                best = Some(Hit {
                                    triangle,
                                    index: member,
                                    t,
                                });
                            }
                        }
                    }
                }
            }
        }

        best
    }

    /// True if any triangle is hit closer than `max_t`.
    fn occluded(&self, ray: &Ray, max_t: f32) -> bool {
        let mut stack = Vec::with_capacity(64);
        stack.push(0);

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            let Some(range) = node.bbox.hit(ray) else {
                continue;
            };
            if range.min > max_t {
                continue;
            }

            match node.children() {
                Some([left, right]) => {
                    stack.push(left);
                    stack.push(right);
                }
                None => {
                    let blocked = node
                        .members()
                        .iter()
                        .any(|&m| self.triangles[m].intersect(ray).is_some_and(|t| t < max_t));
                    if blocked {
                        return true;
                    }
                }
            }
        }

        false
    }

    /// Unobstructed line of sight between two surface points whose normals
    /// face each other.
    pub fn visible(&self, a: Vec3, a_normal: Vec3, b: Vec3, b_normal: Vec3) -> bool {
        let offset = b - a;
        let distance = offset.length();
        if !(distance > COLLISION_SHIFT) {
            return false;
        }

        let direction = offset / distance;
        if a_normal.dot(direction) <= 0.0 || b_normal.dot(-direction) <= 0.0 {
            return false;
        }

        !self.occluded(&Ray::new(a, direction), distance - COLLISION_SHIFT)
    }

    /// Mutual visibility of two path vertices.
    pub fn visibility_test(&self, a: &PathVertex, b: &PathVertex) -> bool {
        self.visible(a.position(), a.normal, b.position(), b.normal)
    }
}

/// Linear scan over every triangle. Reference for [`Bvh::nearest_hit`].
pub fn nearest_hit_brute_force<'a>(triangles: &'a [Triangle], ray: &Ray) -> Option<Hit<'a>> {
    triangles
        .iter()
        .enumerate()
        .filter_map(|(index, triangle)| triangle.intersect(ray).map(|t| Hit { triangle, index, t }))
        .min_by(|a, b| a.t.total_cmp(&b.t))
}
