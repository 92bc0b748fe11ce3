//! File format specifications for scene files and archive containers.
//!
//! `MeshFormat` is the single source of truth for the on-disk constants
//! (magic bytes, version) of each container the tools read and write.
//!
//! # Example
//!
//! ```
//! use sheath_shared::SCENE_FORMAT;
//!
//! assert_eq!(SCENE_FORMAT.magic, b"SGRF");
//! ```

/// Format specification for a binary container.
#[derive(Debug, Clone, Copy)]
pub struct MeshFormat {
    /// Magic bytes at start of file (4 bytes)
    pub magic: &'static [u8; 4],

    /// Format version for backward compatibility
    pub version: u32,
}

impl MeshFormat {
    pub const fn new(magic: &'static [u8; 4], version: u32) -> Self {
        Self { magic, version }
    }

    /// Check whether `bytes` start with this format's magic.
    pub fn has_magic(&self, bytes: &[u8]) -> bool {
        bytes.len() >= self.magic.len() && &bytes[..self.magic.len()] == self.magic
    }
}

/// Scene graph file (`.sgf`): one mesh asset.
pub const SCENE_FORMAT: MeshFormat = MeshFormat::new(b"SGRF", 1);

/// Archive container (`.sga`): many scene files addressed by path.
pub const ARCHIVE_FORMAT: MeshFormat = MeshFormat::new(b"SGAR", 1);
