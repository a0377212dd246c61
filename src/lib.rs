//! Skeletal animation for GPU skinning.
//!
//! A model is imported from glTF into a plain scene description, its meshes
//! are converted to skinned vertices, and each frame the skeleton is posed
//! from the current animation clip. The resulting bone matrices are laid out
//! for a single uniform upload.
pub mod animation;
pub mod bones;
pub mod mesh_import;
pub mod model;
pub mod mr_error;
pub mod quat;
pub mod scene;
pub mod types;
pub mod vertex;
