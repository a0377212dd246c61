use crate::mr_error::MrError;
use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};

/// Final transform of one bone
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct BonePose {
    pub index: usize,
    pub name: String,
    pub transform: glm::Mat4,
}

/// Every bone's final transform at one point in time, in registry order.
/// Useful for inspecting a pose or comparing poses in tests.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
pub struct PoseSnapshot {
    /// Name of the clip that produced the pose, `None` for the static pose
    pub animation: Option<String>,
    /// Time in ticks
    pub time: f32,
    pub bones: Vec<BonePose>,
}

impl PoseSnapshot {
    #[must_use]
    pub fn bone(&self, name: &str) -> Option<&BonePose> {
        self.bones.iter().find(|b| b.name == name)
    }

    /// # Errors
    /// May return `MrError::SerdeYamlError`
    pub fn to_yaml(&self) -> Result<String, MrError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// # Errors
    /// May return `MrError::SerdeYamlError`
    pub fn from_yaml_str(s: &str) -> Result<Self, MrError> {
        Ok(serde_yaml::from_str(s)?)
    }
}
