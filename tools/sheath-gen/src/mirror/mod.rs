//! Scabbard mirror engine
//!
//! Finds the `Scb` attachment node under the scene root and adds a hidden,
//! mirrored, unskinned copy of it named `ScbLeft`. The mutated graph is only
//! meaningful when [`mirror_scabbard`] succeeds; on error the caller discards
//! it.

mod shape;
mod subtree;

use sheath_scene::{BlockId, GraphError, SceneGraph};
use tracing::debug;

pub use shape::{MIRROR_AXIS, bake_transform, flip_mesh, is_blood_decoration};
pub use subtree::SubtreeMirror;

/// Name of the attachment subtree to mirror.
pub const SCABBARD_NAME: &str = "Scb";
/// Suffix appended to every mirrored block name.
pub const LEFT_SUFFIX: &str = "Left";

/// Why a mesh could not be mirrored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MirrorError {
    #[error("scene graph has no root node")]
    NoRoot,

    #[error("no Scb node under the root")]
    NoScabbard,

    #[error("ScbLeft node already present")]
    AlreadyMirrored,

    #[error("Scb node is hidden")]
    ScabbardHidden,

    #[error("mirrored Scb kept no children")]
    EmptySubtree,

    #[error("shape {0} is blood decoration")]
    BloodDecoration(BlockId),

    #[error("shape {id} has {kind} geometry, which cannot be cloned")]
    UnsupportedGeometry { id: BlockId, kind: &'static str },

    #[error("block {id} is a {kind}, not a node or shape")]
    UnsupportedBlock { id: BlockId, kind: &'static str },

    #[error("shape {id} has {normals} normals for {vertices} vertices")]
    NormalCount {
        id: BlockId,
        normals: usize,
        vertices: usize,
    },

    #[error("skin partition of shape {id}: {reason}")]
    BadSkinPartition { id: BlockId, reason: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Add the mirrored `ScbLeft` subtree to the root of `graph`.
///
/// Returns the id of the new subtree root.
pub fn mirror_scabbard(graph: &mut SceneGraph, mesh_path: &str) -> Result<BlockId, MirrorError> {
    let (root_id, root) = graph.root_node().map_err(|_| MirrorError::NoRoot)?;

    let mirrored_name = format!("{SCABBARD_NAME}{LEFT_SUFFIX}");
    let mut scabbard = None;
    let mut already_mirrored = false;
    for &child in &root.children {
        let Ok(node) = graph.node(child) else {
            continue;
        };
        let Some(name) = graph.name_of(&node.av) else {
            continue;
        };
        if scabbard.is_none() && name.eq_ignore_ascii_case(SCABBARD_NAME) {
            scabbard = Some((child, node.av.is_hidden()));
        } else if name.eq_ignore_ascii_case(&mirrored_name) {
            already_mirrored = true;
        }
    }

    let (scabbard_id, hidden) = scabbard.ok_or(MirrorError::NoScabbard)?;
    if already_mirrored {
        return Err(MirrorError::AlreadyMirrored);
    }
    if hidden {
        return Err(MirrorError::ScabbardHidden);
    }

    debug!("{}: mirroring {} at block {}", mesh_path, SCABBARD_NAME, scabbard_id);
    let mirrored = SubtreeMirror::new(graph, mesh_path).mirror(scabbard_id)?;
    graph.attach_child(root_id, mirrored)?;
    Ok(mirrored)
}
