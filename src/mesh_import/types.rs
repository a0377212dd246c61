use crate::{mr_error::MrError, types::WEIGHT_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Options for turning an imported scene into a `Model`. Every field has a
/// default so a YAML file only needs to list what it changes.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(default)]
pub struct ImportOptions {
    /// Bone weights at or below this are not stored in vertices
    pub weight_threshold: f32,
    /// Build a model matrix that centers the model and scales it to fit
    /// in a 2 unit cube
    pub normalize: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            weight_threshold: WEIGHT_THRESHOLD,
            normalize: true,
        }
    }
}

impl ImportOptions {
    /// # Errors
    /// May return `MrError::SerdeYamlError`
    pub fn from_yaml_str(s: &str) -> Result<Self, MrError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// # Errors
    /// May return `MrError`
    pub fn from_yaml_file(path: &Path) -> Result<Self, MrError> {
        let s = fs::read_to_string(path)?;
        Self::from_yaml_str(&s)
    }

    /// # Errors
    /// May return `MrError::SerdeYamlError`
    pub fn to_yaml(&self) -> Result<String, MrError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::ImportOptions;
    use crate::mr_error::MrError;

    #[test]
    fn partial_yaml_uses_defaults() {
        let options =
            ImportOptions::from_yaml_str("normalize: false\n").unwrap();
        assert!(!options.normalize);
        assert!((options.weight_threshold - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn yaml_both_ways() {
        let options = ImportOptions {
            weight_threshold: 0.25,
            normalize: false,
        };
        let s = options.to_yaml().unwrap();
        assert_eq!(ImportOptions::from_yaml_str(&s).unwrap(), options);
    }

    #[test]
    fn bad_yaml() {
        let res = ImportOptions::from_yaml_str("normalize: [1, 2");
        assert!(matches!(res, Err(MrError::SerdeYamlError(_))));
    }

    #[test]
    fn missing_file() {
        let res = ImportOptions::from_yaml_file(std::path::Path::new(
            "./this/file/does/not/exist.yaml",
        ));
        assert!(matches!(res, Err(MrError::StdIoError(_))));
    }
}
