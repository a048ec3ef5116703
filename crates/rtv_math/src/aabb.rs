use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Stored as a min corner and a max corner. A box starts out [`Aabb::EMPTY`]
/// (min = +inf, max = -inf) and grows through [`Aabb::extend`]; once it holds
/// at least one point, `min[k] <= max[k]` on every axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from its corners. The caller guarantees `min <= max`.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point of the iterator.
    pub fn enclosing<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        points.into_iter().fold(Aabb::EMPTY, |acc, p| acc.extend(p))
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Grow the box to contain a point.
    #[must_use]
    pub fn extend(&self, point: Vec3) -> Aabb {
        Aabb {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// True while no point has been added.
    pub fn is_empty(&self) -> bool {
        !(self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z)
    }

    /// Extent along each axis.
    pub fn span(&self) -> Vec3 {
        self.max - self.min
    }

    /// `span.x * span.y * span.z`; zero for flat or empty boxes.
    pub fn volume(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        self.span().element_product()
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        Interval::new(self.min[n], self.max[n])
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive point containment on every face.
    pub fn contains(&self, point: Vec3) -> bool {
        (0..3).all(|axis| self.axis_interval(axis).contains(point[axis]))
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Aabb) -> bool {
        other.is_empty() || (self.contains(other.min) && self.contains(other.max))
    }

    /// Cut the box on `axis` into a left part `[min, max - span * fraction]`
    /// and a right part `[min + span * (1 - fraction), max]`.
    ///
    /// Both parts share one cut coordinate, so they abut exactly and every
    /// point of this box lies in at least one of them.
    pub fn divide(&self, axis: usize, fraction: f32) -> (Aabb, Aabb) {
        let cut = self.min[axis] + self.span()[axis] * (1.0 - fraction);

        let mut left_max = self.max;
        left_max[axis] = cut;
        let mut right_min = self.min;
        right_min[axis] = cut;

        (Aabb::new(self.min, left_max), Aabb::new(right_min, self.max))
    }

    /// Slab test against a ray using its precomputed inverse direction.
    ///
    /// Returns the parametric interval `[t_near, t_far]` where the ray is
    /// inside the box, or `None` when it misses, when the box lies entirely
    /// behind the origin (`t_far <= 0`), or when an axis produces NaN (ray
    /// running exactly in a face plane).
    pub fn hit(&self, ray: &Ray) -> Option<Interval> {
        if self.is_empty() {
            return None;
        }

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            let t0 = (self.min[axis] - ray.origin[axis]) * ray.inv_direction[axis];
            let t1 = (self.max[axis] - ray.origin[axis]) * ray.inv_direction[axis];
            if t0.is_nan() || t1.is_nan() {
                return None;
            }

            t_near = t_near.max(t0.min(t1));
            t_far = t_far.min(t0.max(t1));
            if t_near > t_far {
                return None;
            }
        }

        if t_far > 0.0 {
            Some(Interval::new(t_near, t_far))
        } else {
            None
        }
    }

    /// Static constants
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::EMPTY
    }
}
