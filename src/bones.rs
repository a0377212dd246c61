pub mod registry;
pub mod weights;

// Re-exports
pub use {
    registry::{BoneInfo, BoneRegistry, BoneTransforms},
    weights::VertexBoneData,
};
