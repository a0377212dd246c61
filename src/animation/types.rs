use ahash::HashMap;
use nalgebra_glm as glm;

/// A sample of some value at a time in ticks
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Key<T> {
    pub time: f32,
    pub value: T,
}

impl<T> Key<T> {
    pub const fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

pub type VectorKey = Key<glm::Vec3>;
pub type QuatKey = Key<glm::Quat>;

/// Keyframes for one node. The three sequences are timed independently and
/// may have different lengths. Each is expected to be sorted by time.
#[derive(Clone, Debug)]
pub struct AnimationChannel {
    pub node_name: String,
    pub positions: Vec<VectorKey>,
    pub rotations: Vec<QuatKey>,
    pub scales: Vec<VectorKey>,
}

impl AnimationChannel {
    #[must_use]
    pub fn new(node_name: &str) -> Self {
        Self {
            node_name: node_name.to_string(),
            positions: Vec::new(),
            rotations: Vec::new(),
            scales: Vec::new(),
        }
    }

    /// Largest timestamp in any of the sequences
    #[must_use]
    pub fn max_time(&self) -> f32 {
        self.positions
            .iter()
            .map(|k| k.time)
            .chain(self.rotations.iter().map(|k| k.time))
            .chain(self.scales.iter().map(|k| k.time))
            .fold(0.0_f32, f32::max)
    }
}

/// An animation clip. Channels are keyed by node name.
#[derive(Clone, Debug)]
pub struct Animation {
    pub name: String,
    /// Length of the clip in ticks
    pub duration: f32,
    /// May be zero in malformed files, see `ticks_per_second`
    pub ticks_per_second: f32,
    pub channels: HashMap<String, AnimationChannel>,
}

impl Animation {
    /// Tick rate with the fallback for clips that do not report one
    #[must_use]
    pub fn ticks_per_second(&self) -> f32 {
        if self.ticks_per_second > 0.0 {
            self.ticks_per_second
        } else {
            crate::types::DEFAULT_TICKS_PER_SECOND
        }
    }

    #[must_use]
    pub fn channel(&self, node_name: &str) -> Option<&AnimationChannel> {
        self.channels.get(node_name)
    }
}
