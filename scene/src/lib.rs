//! Sheath scene graph
//!
//! Block-based mesh scene representation shared by the sheath tools:
//! - [`SceneGraph`] arena with typed block access and a string table
//! - geometry maintenance (bounds, tangent space)
//! - `.sgf` scene file and `.sga` archive codecs

pub mod block;
pub mod error;
pub mod formats;
pub mod geometry;
pub mod graph;

pub use block::{
    AvObject, Block, BlockId, Bounds, Geometry, MeshData, Node, Partition, ShaderProperty, Shape,
    SkinBone, SkinData, SkinInstance, SkinPartition, StringExtraData, StringRef, StripData,
    TextureSet, av_flags, shader_flags,
};
pub use error::{FormatError, GraphError, TangentError};
pub use formats::{Archive, ArchiveBuilder, ArchiveIndexEntry};
pub use graph::SceneGraph;
