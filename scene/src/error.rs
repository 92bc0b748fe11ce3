//! Error types for graph access and container decoding.

use crate::block::BlockId;

/// Failed lookup of a block reference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Reference points past the end of the block arena
    #[error("expected {expected} at block {id} not found")]
    Missing { id: BlockId, expected: &'static str },

    /// Reference points at a block of another kind
    #[error("expected {expected} at block {id}, found {found}")]
    WrongKind {
        id: BlockId,
        expected: &'static str,
        found: &'static str,
    },

    /// Graph has no root node
    #[error("scene graph has no root node")]
    NoRoot,
}

/// Failed decoding of a scene file or archive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("invalid {format} magic bytes (expected {expected:?})")]
    BadMagic {
        format: &'static str,
        expected: &'static [u8; 4],
    },

    #[error("unsupported {format} version {found} (max supported: {supported})")]
    UnsupportedVersion {
        format: &'static str,
        found: u32,
        supported: u32,
    },

    #[error("failed to decode {format}: {reason}")]
    Decode { format: &'static str, reason: String },

    #[error("root reference {0} is outside the block table")]
    RootOutOfRange(BlockId),
}

/// Non-fatal fault while recomputing tangent space.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TangentError {
    #[error("{uvs} uvs for {vertices} vertices")]
    UvCount { uvs: usize, vertices: usize },

    #[error("{normals} normals for {vertices} vertices")]
    NormalCount { normals: usize, vertices: usize },

    #[error("triangle {triangle} references vertex {index} of {vertices}")]
    IndexOutOfRange {
        triangle: usize,
        index: u16,
        vertices: usize,
    },
}
