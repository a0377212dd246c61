/// Maximum bones for a skinned model. This must match the size of the
/// `bones` uniform array in the skinning shader.
pub const MAX_BONES: usize = 100;

/// Number of bone index / weight pairs stored with each vertex
pub const BONES_PER_VERTEX: usize = 4;

/// Bone weights at or below this value are discarded when building vertex
/// bone data
pub const WEIGHT_THRESHOLD: f32 = 0.1;

/// Tick rate used when an animation clip reports zero ticks per second
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// Name of the shader uniform that receives the flattened bone matrices
pub const BONES_UNIFORM: &str = "bones";
