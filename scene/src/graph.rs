//! In-memory scene graph
//!
//! The graph exclusively owns every block in a flat arena indexed by
//! [`BlockId`], plus a string table that object names and extra data refer
//! to. Blocks are only ever appended, so ids stay stable for the lifetime of
//! the graph.

use bitcode::{Decode, Encode};
use tracing::warn;

use crate::block::{
    AvObject, Block, BlockId, Node, ShaderProperty, Shape, SkinData, SkinInstance, SkinPartition,
    StringExtraData, StringRef, TextureSet,
};
use crate::error::GraphError;

/// Mutable block collection loaded from one mesh asset.
#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct SceneGraph {
    pub(crate) strings: Vec<String>,
    pub(crate) blocks: Vec<Block>,
    pub(crate) root: Option<BlockId>,
}

macro_rules! typed_accessors {
    ($($get:ident => $variant:ident($ty:ty);)*) => {
        $(
            pub fn $get(&self, id: BlockId) -> Result<&$ty, GraphError> {
                match self.blocks.get(id.index()) {
                    Some(Block::$variant(inner)) => Ok(inner),
                    Some(other) => Err(GraphError::WrongKind {
                        id,
                        expected: stringify!($variant),
                        found: other.kind_name(),
                    }),
                    None => Err(GraphError::Missing {
                        id,
                        expected: stringify!($variant),
                    }),
                }
            }
        )*
    };
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    typed_accessors! {
        node => Node(Node);
        shape => Shape(Shape);
        skin_instance => SkinInstance(SkinInstance);
        skin_data => SkinData(SkinData);
        skin_partition => SkinPartition(SkinPartition);
        shader_property => ShaderProperty(ShaderProperty);
        texture_set => TextureSet(TextureSet);
        string_extra_data => StringExtraData(StringExtraData);
    }

    pub fn node_mut(&mut self, id: BlockId) -> Result<&mut Node, GraphError> {
        match self.blocks.get_mut(id.index()) {
            Some(Block::Node(node)) => Ok(node),
            Some(other) => Err(GraphError::WrongKind {
                id,
                expected: "Node",
                found: other.kind_name(),
            }),
            None => Err(GraphError::Missing {
                id,
                expected: "Node",
            }),
        }
    }

    pub fn root(&self) -> Option<BlockId> {
        self.root
    }

    pub fn set_root(&mut self, id: BlockId) {
        self.root = Some(id);
    }

    /// The root block, which must be a `Node`.
    pub fn root_node(&self) -> Result<(BlockId, &Node), GraphError> {
        let id = self.root.ok_or(GraphError::NoRoot)?;
        Ok((id, self.node(id)?))
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    /// Register a new block and return its id.
    pub fn add_block(&mut self, block: Block) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(block);
        id
    }

    /// Append `child` to the children of the `Node` at `parent`.
    pub fn attach_child(&mut self, parent: BlockId, child: BlockId) -> Result<(), GraphError> {
        if self.block(child).is_none() {
            return Err(GraphError::Missing {
                id: child,
                expected: "child block",
            });
        }
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Return the index of `value` in the string table, adding it if absent.
    pub fn add_or_find_string(&mut self, value: &str) -> StringRef {
        if let Some(pos) = self.strings.iter().position(|s| s == value) {
            return StringRef(pos as u32);
        }
        self.strings.push(value.to_string());
        StringRef(self.strings.len() as u32 - 1)
    }

    pub fn string(&self, r: StringRef) -> Option<&str> {
        self.strings.get(r.0 as usize).map(String::as_str)
    }

    pub fn name_of(&self, av: &AvObject) -> Option<&str> {
        av.name.and_then(|r| self.string(r))
    }

    /// Name of a node or shape block.
    pub fn block_name(&self, id: BlockId) -> Option<&str> {
        self.block(id)
            .and_then(Block::av)
            .and_then(|av| self.name_of(av))
    }

    /// Key/value pairs of the `StringExtraData` blocks attached to `av`.
    ///
    /// Dangling or mistyped references are logged and skipped, as are entries
    /// with an unset key or value.
    pub fn extra_data_pairs(&self, av: &AvObject) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        for &id in &av.extra_data {
            match self.string_extra_data(id) {
                Ok(extra) => {
                    let key = extra.name.and_then(|r| self.string(r));
                    let value = extra.value.and_then(|r| self.string(r));
                    if let (Some(key), Some(value)) = (key, value) {
                        pairs.push((key, value));
                    }
                }
                Err(e) => warn!("{}", e),
            }
        }
        pairs
    }
}
