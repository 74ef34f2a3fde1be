//! Component graph for DSX scenes.
//!
//! Builds the node arena from a parsed document, walks it with material,
//! texture and transform inheritance, and exposes the top-level `load`
//! entry points.
//!
//! ```no_run
//! use dsx_core::LoadOptions;
//! use dsx_graph::{load_file, DrawCall};
//!
//! let scene = load_file("scene.dsx", &LoadOptions::default())?;
//! scene.graph.traverse(&mut |call: &DrawCall<'_>| {
//!     println!("{} -> {:?}", call.node, call.material_id);
//! });
//! # Ok::<(), dsx_core::LoadError>(())
//! ```

pub mod builder;
pub mod graph;
pub mod loader;
pub mod traverse;

pub use builder::build_graph;
pub use graph::{MaterialKey, Node, NodeKey, SceneGraph, TextureKey, TextureSpec};
pub use loader::{load, load_file, load_in_background, load_with, LoadEvent, Scene};
pub use traverse::{DrawCall, DrawRecord, DrawSink, TextureBinding, TraversalStats};
