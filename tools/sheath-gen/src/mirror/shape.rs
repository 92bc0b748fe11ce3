//! Per-shape operations: blood detection, skin removal, bake and flip.

use sheath_scene::{Block, BlockId, MeshData, SceneGraph, Shape, shader_flags};
use sheath_shared::Transform;
use sheath_shared::fs::normalize_asset_path;
use tracing::warn;

use super::MirrorError;

/// Coordinate negated by the mirror (Z, the vertical axis of the assets).
pub const MIRROR_AXIS: usize = 2;

const BLOOD_TEXTURES: [&str; 2] = ["blood/bloodedge", "blood/bloodhit"];
const KEEP_KEY: &str = "Keep";
const HIDE_VALUE: &str = "NiHide";

/// Whether a shape is blood decoration that must not be mirrored.
///
/// Dangling shader or texture references are logged and treated as absent.
pub fn is_blood_decoration(graph: &SceneGraph, shape: &Shape) -> bool {
    if let Some(shader_id) = shape.shader_property {
        match graph.shader_property(shader_id) {
            Ok(shader) => {
                if shader.has_weapon_blood() {
                    return true;
                }
                if let Some(set_id) = shader.texture_set {
                    match graph.texture_set(set_id) {
                        Ok(set) => {
                            let blood_texture = set.textures.first().is_some_and(|t| {
                                let t = normalize_asset_path(t);
                                BLOOD_TEXTURES.iter().any(|b| t.contains(b))
                            });
                            if blood_texture {
                                return true;
                            }
                        }
                        Err(e) => warn!("{}", e),
                    }
                }
            }
            Err(e) => warn!("{}", e),
        }
    }

    graph
        .extra_data_pairs(&shape.av)
        .iter()
        .any(|&(key, value)| key == KEEP_KEY && value == HIDE_VALUE)
}

/// Fold `transform` into the vertices and normals of `mesh`.
pub fn bake_transform(mesh: &mut MeshData, transform: &Transform) {
    if transform.is_identity() {
        return;
    }
    for p in &mut mesh.positions {
        *p = transform.apply_point(*p);
    }
    for n in &mut mesh.normals {
        *n = transform.apply_normal(*n);
    }
}

/// Negate the mirror axis and reverse triangle winding to keep facing.
pub fn flip_mesh(mesh: &mut MeshData) {
    for p in &mut mesh.positions {
        p[MIRROR_AXIS] = -p[MIRROR_AXIS];
    }
    for n in &mut mesh.normals {
        n[MIRROR_AXIS] = -n[MIRROR_AXIS];
    }
    for tri in &mut mesh.triangles {
        tri.reverse();
    }
}

/// Replace skinning on a cloned shape with static geometry.
///
/// Bone rest scales are folded into the shape's own scale, the first skin
/// partition becomes the shape's vertex data, and the skinned flag is cleared
/// on a private copy of the shader.
pub(super) fn remove_skin(
    graph: &mut SceneGraph,
    id: BlockId,
    shape: &mut Shape,
    mesh: &mut MeshData,
) -> Result<(), MirrorError> {
    let Some(skin_id) = shape.skin_instance else {
        return Ok(());
    };
    let skin = graph.skin_instance(skin_id)?.clone();

    let mut scale = shape.av.transform.scale;
    if let Some(&bone) = skin.bones.first() {
        match graph.node(bone) {
            Ok(node) => scale *= node.av.transform.scale,
            Err(e) => warn!("{}", e),
        }
    }
    if let Some(data_id) = skin.data {
        let data = graph.skin_data(data_id)?;
        scale *= data.skin_transform.scale;
        if let Some(bone) = data.bones.first() {
            scale *= bone.transform.scale;
        }
    }
    shape.av.transform.scale = scale;

    if let Some(partition_id) = skin.partition {
        let partition = graph.skin_partition(partition_id)?;
        // Multiple partitions are treated as one
        let first = partition
            .partitions
            .first()
            .ok_or_else(|| MirrorError::BadSkinPartition {
                id,
                reason: "no partitions".into(),
            })?;
        let vertices = partition.positions.len();
        if let Some(tri) = first
            .triangles
            .iter()
            .find(|tri| tri.iter().any(|&i| usize::from(i) >= vertices))
        {
            return Err(MirrorError::BadSkinPartition {
                id,
                reason: format!("triangle {:?} outside {} vertices", tri, vertices),
            });
        }

        mesh.positions = partition.positions.clone();
        mesh.triangles = first.triangles.clone();
        if !partition.normals.is_empty() {
            mesh.normals = partition.normals.clone();
        }
        if !partition.uvs.is_empty() {
            mesh.uvs = partition.uvs.clone();
        }
        mesh.update_bounds();
    }
    shape.skin_instance = None;

    if let Some(shader_id) = shape.shader_property {
        match graph.shader_property(shader_id) {
            Ok(shader) => {
                let mut unskinned = shader.clone();
                unskinned.flags &= !shader_flags::SKINNED;
                shape.shader_property = Some(graph.add_block(Block::ShaderProperty(unskinned)));
            }
            Err(e) => warn!("{}", e),
        }
    }
    Ok(())
}
