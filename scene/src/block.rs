//! Scene block kinds
//!
//! A scene graph is a flat arena of [`Block`]s. Blocks never embed each other;
//! they reference other blocks by [`BlockId`], so a child may be shared by
//! several parents. No block stores a parent reference.

use bitcode::{Decode, Encode};
use sheath_shared::Transform;

/// Stable index of a block within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct BlockId(pub u32);

impl BlockId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into the graph's string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub struct StringRef(pub u32);

/// Scene object flag bits.
pub mod av_flags {
    /// Object is not rendered.
    pub const HIDDEN: u32 = 0x1;
}

/// Shader property flag bits.
pub mod shader_flags {
    /// Vertices are deformed by a skin instance.
    pub const SKINNED: u32 = 0x2;
    /// Shader renders the weapon blood decal.
    pub const WEAPON_BLOOD: u32 = 0x20000;
}

/// Fields shared by every placeable object (nodes and shapes).
#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct AvObject {
    pub name: Option<StringRef>,
    pub flags: u32,
    pub transform: Transform,
    /// `StringExtraData` blocks attached to this object
    pub extra_data: Vec<BlockId>,
}

impl AvObject {
    pub fn named(name: StringRef) -> Self {
        Self {
            name: Some(name),
            ..Default::default()
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.flags & av_flags::HIDDEN != 0
    }
}

/// Grouping node with ordered children.
#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct Node {
    pub av: AvObject,
    pub children: Vec<BlockId>,
}

/// Bounding sphere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Encode, Decode)]
pub struct Bounds {
    pub center: [f32; 3],
    pub radius: f32,
}

/// Triangle geometry stored inline on the shape.
#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub tangents: Vec<[f32; 3]>,
    pub bitangents: Vec<[f32; 3]>,
    pub triangles: Vec<[u16; 3]>,
    pub bounds: Bounds,
}

/// Legacy triangle-strip geometry. Read and written, never cloned.
#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct StripData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub strips: Vec<Vec<u16>>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum Geometry {
    TriShape(MeshData),
    TriStrips(StripData),
}

impl Geometry {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Geometry::TriShape(_) => "TriShape",
            Geometry::TriStrips(_) => "TriStrips",
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::TriShape(mesh) => mesh.positions.len(),
            Geometry::TriStrips(strips) => strips.positions.len(),
        }
    }
}

/// Renderable geometry leaf.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct Shape {
    pub av: AvObject,
    pub geometry: Geometry,
    pub skin_instance: Option<BlockId>,
    pub shader_property: Option<BlockId>,
}

/// Binds a shape to bone nodes.
#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct SkinInstance {
    pub bones: Vec<BlockId>,
    pub data: Option<BlockId>,
    pub partition: Option<BlockId>,
}

#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct SkinBone {
    pub transform: Transform,
}

/// Rest transforms of a skin.
#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct SkinData {
    pub skin_transform: Transform,
    pub bones: Vec<SkinBone>,
}

#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct Partition {
    pub triangles: Vec<[u16; 3]>,
}

/// Resolved per-vertex data of a skinned shape.
#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct SkinPartition {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub partitions: Vec<Partition>,
}

#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct ShaderProperty {
    pub flags: u32,
    pub texture_set: Option<BlockId>,
}

impl ShaderProperty {
    pub fn is_skinned(&self) -> bool {
        self.flags & shader_flags::SKINNED != 0
    }

    pub fn has_weapon_blood(&self) -> bool {
        self.flags & shader_flags::WEAPON_BLOOD != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct TextureSet {
    pub textures: Vec<String>,
}

/// Key/value string pair attached to an object.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct StringExtraData {
    pub name: Option<StringRef>,
    pub value: Option<StringRef>,
}

/// Every block kind a scene graph can hold.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum Block {
    Node(Node),
    Shape(Shape),
    SkinInstance(SkinInstance),
    SkinData(SkinData),
    SkinPartition(SkinPartition),
    ShaderProperty(ShaderProperty),
    TextureSet(TextureSet),
    StringExtraData(StringExtraData),
}

impl Block {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Node(_) => "Node",
            Block::Shape(_) => "Shape",
            Block::SkinInstance(_) => "SkinInstance",
            Block::SkinData(_) => "SkinData",
            Block::SkinPartition(_) => "SkinPartition",
            Block::ShaderProperty(_) => "ShaderProperty",
            Block::TextureSet(_) => "TextureSet",
            Block::StringExtraData(_) => "StringExtraData",
        }
    }

    /// Object fields, for nodes and shapes.
    pub fn av(&self) -> Option<&AvObject> {
        match self {
            Block::Node(node) => Some(&node.av),
            Block::Shape(shape) => Some(&shape.av),
            _ => None,
        }
    }

    pub fn av_mut(&mut self) -> Option<&mut AvObject> {
        match self {
            Block::Node(node) => Some(&mut node.av),
            Block::Shape(shape) => Some(&mut shape.av),
            _ => None,
        }
    }

    /// Child references; empty for every kind but `Node`.
    pub fn children(&self) -> &[BlockId] {
        match self {
            Block::Node(node) => &node.children,
            _ => &[],
        }
    }
}
