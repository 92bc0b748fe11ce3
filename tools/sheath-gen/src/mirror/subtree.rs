//! Recursive clone of the scabbard subtree.

use hashbrown::HashSet;
use sheath_scene::{AvObject, Block, BlockId, Geometry, Node, SceneGraph, Shape, av_flags};
use sheath_shared::Transform;
use tracing::{debug, warn};

use super::shape::{bake_transform, flip_mesh, is_blood_decoration, remove_skin};
use super::{LEFT_SUFFIX, MirrorError};

/// One mirror traversal over a graph.
///
/// Each source block is visited at most once, so children shared between
/// parents are cloned for the first parent that reaches them.
pub struct SubtreeMirror<'a> {
    graph: &'a mut SceneGraph,
    mesh_path: &'a str,
    visited: HashSet<BlockId>,
}

impl<'a> SubtreeMirror<'a> {
    pub fn new(graph: &'a mut SceneGraph, mesh_path: &'a str) -> Self {
        Self {
            graph,
            mesh_path,
            visited: HashSet::new(),
        }
    }

    /// Clone the subtree rooted at `source` into a hidden mirrored copy.
    ///
    /// The returned block is registered but not attached to any parent.
    pub fn mirror(&mut self, source: BlockId) -> Result<BlockId, MirrorError> {
        self.visited.insert(source);
        self.mirror_block(source, true)
    }

    fn mirror_block(&mut self, source: BlockId, subtree_root: bool) -> Result<BlockId, MirrorError> {
        let block = self
            .graph
            .block(source)
            .cloned()
            .ok_or(sheath_scene::GraphError::Missing {
                id: source,
                expected: "Node or Shape",
            })?;

        match block {
            Block::Node(node) => self.mirror_node(source, node, subtree_root),
            Block::Shape(shape) => self.mirror_shape(source, shape, subtree_root),
            other => Err(MirrorError::UnsupportedBlock {
                id: source,
                kind: other.kind_name(),
            }),
        }
    }

    fn mirror_av(&mut self, av: &mut AvObject, subtree_root: bool) {
        let name = format!("{}{}", self.graph.name_of(av).unwrap_or_default(), LEFT_SUFFIX);
        av.name = Some(self.graph.add_or_find_string(&name));
        if subtree_root {
            av.flags |= av_flags::HIDDEN;
        }
    }

    fn mirror_node(
        &mut self,
        source: BlockId,
        mut node: Node,
        subtree_root: bool,
    ) -> Result<BlockId, MirrorError> {
        self.mirror_av(&mut node.av, subtree_root);

        let mut children = Vec::with_capacity(node.children.len());
        for child in std::mem::take(&mut node.children) {
            if !self.visited.insert(child) {
                continue;
            }
            match self.mirror_block(child, false) {
                Ok(cloned) => children.push(cloned),
                Err(e) => debug!(
                    "{}: omitting block {} under {}: {}",
                    self.mesh_path, child, source, e
                ),
            }
        }
        // A mirrored attachment point must keep something to attach
        if subtree_root && children.is_empty() {
            return Err(MirrorError::EmptySubtree);
        }

        node.children = children;
        Ok(self.graph.add_block(Block::Node(node)))
    }

    fn mirror_shape(
        &mut self,
        source: BlockId,
        mut shape: Shape,
        subtree_root: bool,
    ) -> Result<BlockId, MirrorError> {
        if is_blood_decoration(self.graph, &shape) {
            return Err(MirrorError::BloodDecoration(source));
        }

        let mut mesh = match std::mem::replace(
            &mut shape.geometry,
            Geometry::TriShape(Default::default()),
        ) {
            Geometry::TriShape(mesh) => mesh,
            other => {
                return Err(MirrorError::UnsupportedGeometry {
                    id: source,
                    kind: other.kind_name(),
                });
            }
        };
        self.mirror_av(&mut shape.av, subtree_root);

        remove_skin(self.graph, source, &mut shape, &mut mesh)?;

        if !mesh.normals.is_empty() && mesh.normals.len() != mesh.positions.len() {
            return Err(MirrorError::NormalCount {
                id: source,
                normals: mesh.normals.len(),
                vertices: mesh.positions.len(),
            });
        }

        bake_transform(&mut mesh, &shape.av.transform);
        shape.av.transform = Transform::IDENTITY;

        flip_mesh(&mut mesh);
        mesh.update_bounds();
        if let Err(e) = mesh.calc_tangent_space() {
            warn!(
                "{}: tangent space of shape {} not updated: {}",
                self.mesh_path, source, e
            );
        }

        shape.geometry = Geometry::TriShape(mesh);
        Ok(self.graph.add_block(Block::Shape(shape)))
    }
}
