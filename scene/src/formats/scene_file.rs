//! Scene file format (`.sgf`)
//!
//! ```text
//! 0x00: magic "SGRF"
//! 0x04: version u32 (little endian)
//! 0x08: SceneGraph (bitcode serialized)
//!       ├── strings: Vec<String>
//!       ├── blocks: Vec<Block>
//!       └── root: Option<BlockId>
//! ```

use sheath_shared::SCENE_FORMAT;

use crate::error::FormatError;
use crate::graph::SceneGraph;

const FORMAT_NAME: &str = "scene file";
const HEADER_SIZE: usize = 8;

impl SceneGraph {
    /// Serialize the full graph with magic header.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = SCENE_FORMAT.magic.to_vec();
        bytes.extend_from_slice(&SCENE_FORMAT.version.to_le_bytes());
        bytes.extend(bitcode::encode(self));
        bytes
    }

    /// Deserialize and validate a graph.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        if !SCENE_FORMAT.has_magic(bytes) || bytes.len() < HEADER_SIZE {
            return Err(FormatError::BadMagic {
                format: FORMAT_NAME,
                expected: SCENE_FORMAT.magic,
            });
        }

        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version > SCENE_FORMAT.version {
            return Err(FormatError::UnsupportedVersion {
                format: FORMAT_NAME,
                found: version,
                supported: SCENE_FORMAT.version,
            });
        }

        let graph: SceneGraph =
            bitcode::decode(&bytes[HEADER_SIZE..]).map_err(|e| FormatError::Decode {
                format: FORMAT_NAME,
                reason: e.to_string(),
            })?;

        match graph.root {
            Some(root) if root.index() >= graph.blocks.len() => {
                Err(FormatError::RootOutOfRange(root))
            }
            _ => Ok(graph),
        }
    }
}
