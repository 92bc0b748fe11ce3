//! Shared types for the sheath mesh tooling.
//!
//! - [`mesh_format`] - file format constants (extensions, magic bytes, versions)
//! - [`math`] - POD transform types with `glam` conversions
//! - [`fs`] - size-capped file reading

pub mod fs;
pub mod math;
pub mod mesh_format;

pub use math::{Matrix3, Transform};
pub use mesh_format::{ARCHIVE_FORMAT, MeshFormat, SCENE_FORMAT};
