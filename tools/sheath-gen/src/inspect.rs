//! Human-readable dump of a scene graph's node tree.

use std::fmt::Write;

use hashbrown::HashSet;
use sheath_scene::{Block, BlockId, Geometry, SceneGraph};

/// Render the tree below the root, one block per line.
///
/// Shared children are printed in full once and referenced afterwards.
pub fn describe(graph: &SceneGraph) -> String {
    let mut out = String::new();
    match graph.root() {
        Some(root) => {
            let mut seen = HashSet::new();
            describe_block(graph, root, 0, &mut seen, &mut out);
        }
        None => out.push_str("(no root)\n"),
    }
    out
}

fn describe_block(
    graph: &SceneGraph,
    id: BlockId,
    depth: usize,
    seen: &mut HashSet<BlockId>,
    out: &mut String,
) {
    let indent = "  ".repeat(depth);
    let Some(block) = graph.block(id) else {
        let _ = writeln!(out, "{indent}[{id}] <missing>");
        return;
    };
    let name = graph.block_name(id).unwrap_or("");
    if !seen.insert(id) {
        let _ = writeln!(out, "{indent}[{id}] {} \"{name}\" (see above)", block.kind_name());
        return;
    }

    let hidden = match block.av() {
        Some(av) if av.is_hidden() => " hidden",
        _ => "",
    };
    let _ = match block {
        Block::Shape(shape) => {
            let triangles = match &shape.geometry {
                Geometry::TriShape(mesh) => mesh.triangles.len(),
                Geometry::TriStrips(strips) => strips.strips.len(),
            };
            let skinned = if shape.skin_instance.is_some() {
                " skinned"
            } else {
                ""
            };
            writeln!(
                out,
                "{indent}[{id}] Shape \"{name}\"{hidden} {} {} vertices {} primitives{skinned}",
                shape.geometry.kind_name(),
                shape.geometry.vertex_count(),
                triangles
            )
        }
        _ => writeln!(out, "{indent}[{id}] {} \"{name}\"{hidden}", block.kind_name()),
    };

    for &child in block.children() {
        describe_block(graph, child, depth + 1, seen, out);
    }
}
