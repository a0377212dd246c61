use nalgebra_glm as glm;

/// Translation components smaller than this are snapped to zero
const SNAP_EPSILON: f32 = 0.00001;

/// Axis aligned box around every vertex position of a model
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: glm::Vec3,
    pub max: glm::Vec3,
}

impl Default for Bounds {
    /// Empty bounds, `min` above `max` until something is included
    fn default() -> Self {
        Self {
            min: glm::vec3(f32::MAX, f32::MAX, f32::MAX),
            max: glm::vec3(f32::MIN, f32::MIN, f32::MIN),
        }
    }
}

impl Bounds {
    pub fn include(&mut self, p: &glm::Vec3) {
        self.min = glm::min2(&self.min, p);
        self.max = glm::max2(&self.max, p);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
            || self.min.y > self.max.y
            || self.min.z > self.max.z
    }

    #[must_use]
    pub fn center(&self) -> glm::Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Size along the longest axis
    #[must_use]
    pub fn extent(&self) -> f32 {
        let size = self.max - self.min;
        size.x.max(size.y).max(size.z)
    }

    /// Matrix that moves the center to the origin and scales the longest axis
    /// to 2 units, so the model fits in -1..1. Identity for empty or flat
    /// bounds.
    #[must_use]
    pub fn fit_matrix(&self) -> glm::Mat4 {
        if self.is_empty() || self.extent() <= f32::EPSILON {
            return glm::Mat4::identity();
        }
        let scale = 1.0 / (self.extent() * 0.5);
        let t = (-self.center() * scale)
            .map(|c| if c.abs() < SNAP_EPSILON { 0.0 } else { c });
        glm::translation(&t) * glm::scaling(&glm::vec3(scale, scale, scale))
    }
}
