//! In-memory scene produced by an importer. The animation core only reads
//! from these types and never changes them after loading.
use crate::animation::Animation;
use nalgebra_glm as glm;

/// Read-only access to a node in a hierarchy. Traversal code is generic over
/// this so that other importers can hand over their own node types.
pub trait SceneNode: Sized {
    fn name(&self) -> &str;
    /// Node space to parent space
    fn transform(&self) -> glm::Mat4;
    /// Children in stored order
    fn children(&self) -> &[Self];
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub transform: glm::Mat4,
    pub children: Vec<Node>,
}

impl Node {
    #[must_use]
    pub fn new(name: &str, transform: glm::Mat4) -> Self {
        Self {
            name: name.to_string(),
            transform,
            children: Vec::new(),
        }
    }

    /// Builder style helper for assembling trees by hand
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree including this one
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

impl SceneNode for Node {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self) -> glm::Mat4 {
        self.transform
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

/// One vertex influenced by a bone
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexWeight {
    pub vertex: u32,
    pub weight: f32,
}

/// A bone as seen by one mesh. Several meshes may refer to the same bone
/// name, in which case they should all carry the same offset.
#[derive(Clone, Debug)]
pub struct MeshBone {
    pub name: String,
    /// Mesh space to bone space in the bind pose
    pub offset: glm::Mat4,
    pub weights: Vec<VertexWeight>,
}

/// Raw mesh data as read from the file. Normals and texture coordinates may
/// be empty if the file did not provide them.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<glm::Vec3>,
    pub normals: Vec<glm::Vec3>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub bones: Vec<MeshBone>,
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub root: Node,
    pub meshes: Vec<MeshData>,
    pub animations: Vec<Animation>,
}
