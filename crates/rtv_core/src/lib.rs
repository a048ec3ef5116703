//! RTV Core - Scene geometry for the RTV path tracer.
//!
//! This crate provides:
//!
//! - **Primitives**: `Triangle` with its one-sided ray intersection test and
//!   the `Material` tag it carries
//! - **Scene construction**: procedural quads and rooms in [`shapes`], and a
//!   Wavefront OBJ loader in [`obj`]
//!
//! # Example
//!
//! ```ignore
//! use rtv_core::{load_obj, Material};
//! use rtv_math::Vec3;
//!
//! let triangles = load_obj("teapot.obj", Material::Diffuse, Vec3::splat(0.8))?;
//! println!("Loaded {} triangles", triangles.len());
//! ```

pub mod material;
pub mod obj;
pub mod shapes;
pub mod triangle;

// Re-export commonly used types
pub use material::{Color, Material};
pub use obj::{load_obj, LoadError, LoadResult};
pub use triangle::{Triangle, COLLISION_SHIFT};
