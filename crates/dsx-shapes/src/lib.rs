//! Primitive leaf shapes for DSX scenes.
//!
//! This crate provides:
//! - The parametric [`Shape`] built from a `<primitive>` element
//! - Shape validation
//! - Tessellation to triangle meshes, honouring texture tiling where the
//!   shape defines it (rectangles and triangles)

mod geometry;
mod tessellation;

pub use geometry::{BoundingBox, Mesh, Shape, Tiling};
pub use tessellation::tessellate;
