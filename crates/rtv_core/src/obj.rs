//! Wavefront OBJ loading.
//!
//! Every face of every model becomes a [`Triangle`] with a single material
//! tag and color. Coordinates are validated here so that NaN or infinite
//! input never reaches the BVH builder.

use std::path::Path;

use rtv_math::Vec3;
use thiserror::Error;

use crate::{Color, Material, Triangle};

/// Errors that can occur while loading scene geometry.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("OBJ error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("Invalid vertex {index} in model '{model}': {position:?}")]
    InvalidVertex {
        model: String,
        index: usize,
        position: [f32; 3],
    },

    #[error("No geometry found in OBJ file")]
    NoGeometry,
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load an OBJ file and return its faces as triangles.
///
/// # Example
///
/// ```ignore
/// use rtv_core::{load_obj, Material};
/// use rtv_math::Vec3;
///
/// let teapot = load_obj("resources/teapot.obj", Material::Specular, Vec3::splat(0.9))?;
/// ```
pub fn load_obj<P: AsRef<Path>>(
    path: P,
    material: Material,
    color: Color,
) -> LoadResult<Vec<Triangle>> {
    let path = path.as_ref();
    log::info!("Loading OBJ: {:?}", path);

    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )?;

    let meshes = models.iter().map(|model| {
        let mesh = &model.mesh;
        (model.name.as_str(), mesh.positions.as_slice(), mesh.indices.as_slice())
    });
    let triangles = triangles_from_meshes(meshes, material, color)?;

    log::info!("Loaded {} triangles from {} models", triangles.len(), models.len());
    Ok(triangles)
}

/// Build triangles from flat position buffers and index lists.
fn triangles_from_meshes<'a, I>(
    meshes: I,
    material: Material,
    color: Color,
) -> LoadResult<Vec<Triangle>>
where
    I: IntoIterator<Item = (&'a str, &'a [f32], &'a [u32])>,
{
    let mut triangles = Vec::new();

    for (name, positions, indices) in meshes {
        let vertices = positions
            .chunks_exact(3)
            .enumerate()
            .map(|(index, p)| {
                let v = Vec3::from_slice(p);
                if v.is_finite() {
                    Ok(v)
                } else {
                    Err(LoadError::InvalidVertex {
                        model: name.to_string(),
                        index,
                        position: [p[0], p[1], p[2]],
                    })
                }
            })
            .collect::<LoadResult<Vec<Vec3>>>()?;

        for face in indices.chunks_exact(3) {
            let corner = |i: u32| vertices.get(i as usize).copied();
            match (corner(face[0]), corner(face[1]), corner(face[2])) {
                (Some(v0), Some(v1), Some(v2)) => {
                    triangles.push(Triangle::new(v0, v1, v2, material, color));
                }
                _ => log::warn!("Skipping face {:?} in '{}': index out of range", face, name),
            }
        }
    }

    if triangles.is_empty() {
        return Err(LoadError::NoGeometry);
    }
    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: [f32; 12] = [
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        1.0, 1.0, 0.0, //
        0.0, 1.0, 0.0,
    ];

    fn diffuse_mesh(name: &str, positions: &[f32], indices: &[u32]) -> LoadResult<Vec<Triangle>> {
        triangles_from_meshes([(name, positions, indices)], Material::Diffuse, Vec3::ONE)
    }

    #[test]
    fn test_triangles_from_meshes() {
        let indices = [0, 1, 2, 0, 2, 3];
        let tris = diffuse_mesh("square", &SQUARE, &indices).expect("valid mesh");

        assert_eq!(tris.len(), 2);
        assert_eq!(tris[0].normal, Vec3::Z);
        assert_eq!(tris[1].v2, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_nan_vertex_fails_fast() {
        let mut positions = SQUARE;
        positions[4] = f32::NAN;
        let indices = [0, 1, 2];

        let err = diffuse_mesh("broken", &positions, &indices).unwrap_err();
        assert!(matches!(err, LoadError::InvalidVertex { index: 1, .. }));
    }

    #[test]
    fn test_out_of_range_face_skipped() {
        let indices = [0, 1, 2, 0, 2, 9];
        let tris = diffuse_mesh("square", &SQUARE, &indices).expect("one valid face remains");
        assert_eq!(tris.len(), 1);
    }

    #[test]
    fn test_empty_mesh_is_error() {
        let err = diffuse_mesh("empty", &[], &[]).unwrap_err();
        assert!(matches!(err, LoadError::NoGeometry));
    }

    #[test]
    fn test_load_obj_from_disk() {
        let path = std::env::temp_dir().join(format!("rtv_core_test_{}.obj", std::process::id()));
        std::fs::write(
            &path,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n",
        )
        .expect("write temp obj");

        let tris = load_obj(&path, Material::Emitter, Vec3::splat(4.0)).expect("load quad");
        std::fs::remove_file(&path).ok();

        assert_eq!(tris.len(), 2);
        assert!(tris.iter().all(|t| t.material == Material::Emitter));
        let area: f32 = tris.iter().map(Triangle::area).sum();
        assert!((area - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_obj_missing_file() {
        let err = load_obj("/nonexistent/rtv/scene.obj", Material::Diffuse, Vec3::ONE).unwrap_err();
        assert!(matches!(err, LoadError::Obj(_)));
    }
}
