//! Core types, diagnostics, and symbol tables for the DSX scene loader.
//!
//! This crate provides the foundational types used across all other dsx crates:
//! - Value types for the scene vocabulary (colors, views, lights, materials, ...)
//! - Transformations and animations
//! - Symbol tables with duplicate-id policies
//! - The diagnostics collector and error types
//! - Load options

pub mod animation;
pub mod diagnostics;
pub mod errors;
pub mod options;
pub mod symbols;
pub mod types;

pub use animation::*;
pub use diagnostics::*;
pub use errors::*;
pub use options::*;
pub use symbols::*;
pub use types::*;
