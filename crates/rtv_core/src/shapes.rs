//! Procedural scene geometry.
//!
//! Every builder takes an explicit facing direction so winding mistakes
//! cannot silently turn a surface inside out.

use crate::{Color, Material, Triangle};
use rtv_math::{Aabb, Vec3};

/// Two triangles covering the planar quad `p0 p1 p2 p3` (corners in cyclic
/// order), wound so their normals point along `facing`.
pub fn quad(corners: [Vec3; 4], facing: Vec3, material: Material, color: Color) -> [Triangle; 2] {
    let [p0, p1, p2, p3] = corners;
    let winding = (p1 - p0).cross(p2 - p0);
    let [p0, p1, p2, p3] = if winding.dot(facing) < 0.0 {
        [p0, p3, p2, p1]
    } else {
        [p0, p1, p2, p3]
    };

    [
        Triangle::new(p0, p1, p2, material, color),
        Triangle::new(p0, p2, p3, material, color),
    ]
}

/// Axis-aligned rectangle on the plane `axis = offset`, spanning
/// `[lo, hi]` on the two remaining axes and facing along `facing`.
pub fn axis_rect(
    axis: usize,
    offset: f32,
    lo: [f32; 2],
    hi: [f32; 2],
    facing: Vec3,
    material: Material,
    color: Color,
) -> [Triangle; 2] {
    let (a, b) = match axis {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    };
    let corner = |u: f32, v: f32| {
        let mut p = Vec3::ZERO;
        p[axis] = offset;
        p[a] = u;
        p[b] = v;
        p
    };
    quad(
        [
            corner(lo[0], lo[1]),
            corner(hi[0], lo[1]),
            corner(hi[0], hi[1]),
            corner(lo[0], hi[1]),
        ],
        facing,
        material,
        color,
    )
}

/// The six faces of a box with normals pointing `inward` or outward.
fn box_faces(bounds: &Aabb, inward: bool, colors: [Color; 6], material: Material) -> Vec<Triangle> {
    let sign = if inward { 1.0 } else { -1.0 };
    let mut triangles = Vec::with_capacity(12);

    // Faces ordered -X, +X, -Y, +Y, -Z, +Z
    for axis in 0..3 {
        let (a, b) = match axis {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        let lo = [bounds.min[a], bounds.min[b]];
        let hi = [bounds.max[a], bounds.max[b]];

        let mut facing = Vec3::ZERO;
        facing[axis] = sign;
        let (near, far) = (colors[axis * 2], colors[axis * 2 + 1]);
        triangles.extend(axis_rect(axis, bounds.min[axis], lo, hi, facing, material, near));
        triangles.extend(axis_rect(axis, bounds.max[axis], lo, hi, -facing, material, far));
    }

    triangles
}

/// Walls, floor and ceiling of a room, all facing into the box.
pub fn box_interior(bounds: &Aabb, material: Material, color: Color) -> Vec<Triangle> {
    box_faces(bounds, true, [color; 6], material)
}

/// A solid block facing outward.
pub fn box_exterior(bounds: &Aabb, material: Material, color: Color) -> Vec<Triangle> {
    box_faces(bounds, false, [color; 6], material)
}

/// Default scene: a room from `(-10, -3, -10)` to `(10, 17, 10)` with red and
/// green side walls, an emissive panel under the ceiling, one diffuse block
/// and one mirror block.
pub fn lit_room() -> Vec<Triangle> {
    let room = Aabb::new(Vec3::new(-10.0, -3.0, -10.0), Vec3::new(10.0, 17.0, 10.0));
    let white = Vec3::splat(0.75);
    let red = Vec3::new(0.75, 0.25, 0.25);
    let green = Vec3::new(0.25, 0.75, 0.25);

    let walls = [red, green, white, white, white, white];
    let mut triangles = box_faces(&room, true, walls, Material::Diffuse);

    triangles.extend(axis_rect(
        1,
        room.max.y - 0.01,
        [-3.0, -3.0],
        [3.0, 3.0],
        -Vec3::Y,
        Material::Emitter,
        Vec3::splat(8.0),
    ));

    let block = Aabb::new(Vec3::new(-6.0, -3.0, -6.0), Vec3::new(-1.0, 4.0, -1.0));
    triangles.extend(box_exterior(&block, Material::Diffuse, white));

    let mirror = Aabb::new(Vec3::new(2.0, -3.0, -4.0), Vec3::new(6.0, 1.0, 0.0));
    triangles.extend(box_exterior(&mirror, Material::Specular, Vec3::splat(0.9)));

    log::debug!("lit room: {} triangles", triangles.len());
    triangles
}
