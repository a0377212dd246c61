use std::{error, fmt};

/// Unified error type
///
/// Only structural problems are reported here. Missing animation data,
/// unanimated nodes and malformed tick rates are recovered locally with
/// defaults and never become errors.
#[derive(Debug)]
pub enum MrError {
    /// More distinct bones than `MAX_BONES` were found in one model
    CapacityExceeded { name: String },
    InvalidBoneIndex(usize),
    /// The scene could not be read. Carries the importer's diagnostic.
    ImportFailure(String),
    StdIoError(std::io::Error),
    SerdeYamlError(Box<serde_yaml::Error>),
}

impl error::Error for MrError {}

impl fmt::Display for MrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::CapacityExceeded { name } => {
                write!(
                    f,
                    "bone \"{name}\" exceeds the capacity of {} bones",
                    crate::types::MAX_BONES
                )
            }
            Self::InvalidBoneIndex(i) => {
                write!(f, "bone index {i} is not registered")
            }
            Self::ImportFailure(s) => write!(f, "import failure: {s}"),
            Self::StdIoError(e) => write!(f, "std::io::Error: {}", e.kind()),
            Self::SerdeYamlError(e) => {
                write!(f, "serde_yaml::Error: {e}")
            }
        }
    }
}

impl From<serde_yaml::Error> for MrError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::SerdeYamlError(Box::new(e))
    }
}

impl From<std::io::Error> for MrError {
    fn from(e: std::io::Error) -> Self {
        Self::StdIoError(e)
    }
}

/// Everything the `gltf` crate reports is an importer failure as far as the
/// caller is concerned
impl From<gltf::Error> for MrError {
    fn from(e: gltf::Error) -> Self {
        Self::ImportFailure(format!("gltf: {e}"))
    }
}
