use crate::types::BONES_PER_VERTEX;
use log::trace;

/// Bone influences for one vertex. Unused slots are index 0 with weight 0.
/// Weights are stored as given and do not necessarily add up to 1.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VertexBoneData {
    pub ids: [u32; BONES_PER_VERTEX],
    pub weights: [f32; BONES_PER_VERTEX],
}

impl VertexBoneData {
    /// Adds an influence. Weights at or below `threshold` are dropped. When
    /// every slot is in use the smallest stored weight is replaced, but only
    /// by a larger one. Returns whether the influence was stored.
    pub fn add(&mut self, bone: u32, weight: f32, threshold: f32) -> bool {
        if weight <= threshold {
            return false;
        }
        if let Some(slot) = self.weights.iter().position(|w| *w <= 0.0) {
            self.ids[slot] = bone;
            self.weights[slot] = weight;
            return true;
        }

        // All slots in use
        let (slot, smallest) = self
            .weights
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::MAX), |acc, (i, w)| {
                if w < acc.1 {
                    (i, w)
                } else {
                    acc
                }
            });
        if weight > smallest {
            trace!(
                "bone {} weight {} replaces bone {} weight {}",
                bone,
                weight,
                self.ids[slot],
                smallest
            );
            self.ids[slot] = bone;
            self.weights[slot] = weight;
            true
        } else {
            false
        }
    }

    /// Number of slots holding an influence
    #[must_use]
    pub fn count(&self) -> usize {
        self.weights.iter().filter(|w| **w > 0.0).count()
    }

    /// Sum of the stored weights
    #[must_use]
    pub fn total(&self) -> f32 {
        self.weights.iter().sum()
    }
}
