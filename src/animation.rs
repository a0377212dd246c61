pub mod clock;
pub mod interpolate;
mod types;
mod util;

// Re-exports
pub use {
    clock::{animation_time, AnimationClock},
    types::{Animation, AnimationChannel, Key, QuatKey, VectorKey},
    util::{animate, static_pose},
};
