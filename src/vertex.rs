// Skinned vertices are uploaded as a single interleaved stream
use crate::{bones::VertexBoneData, types::BONES_PER_VERTEX};
use bytemuck::{Pod, Zeroable};
use nalgebra_glm as glm;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Zeroable, Pod)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
    pub bone_ids: [u32; BONES_PER_VERTEX],
    pub bone_weights: [f32; BONES_PER_VERTEX],
}

impl SkinnedVertex {
    #[must_use]
    pub fn new(
        position: &glm::Vec3,
        normal: &glm::Vec3,
        tex_coord: [f32; 2],
        bones: &VertexBoneData,
    ) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            normal: [normal.x, normal.y, normal.z],
            tex_coord,
            bone_ids: bones.ids,
            bone_weights: bones.weights,
        }
    }
}

/// Raw bytes of a vertex slice for copying into a GPU buffer
#[must_use]
pub fn as_bytes(vertices: &[SkinnedVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}
