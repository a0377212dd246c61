use crate::{mr_error::MrError, types::MAX_BONES};
use ahash::{HashMap, HashMapExt};
use itertools::Itertools;
use log::{debug, error, trace};
use nalgebra_glm as glm;

/// Per bone matrices
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneInfo {
    /// Mesh space to bone space in the bind pose. Set while loading.
    pub offset: glm::Mat4,
    /// Matrix used by the skinning shader. Updated every frame.
    pub final_transform: glm::Mat4,
}

impl Default for BoneInfo {
    fn default() -> Self {
        Self {
            offset: glm::Mat4::identity(),
            final_transform: glm::Mat4::identity(),
        }
    }
}

/// Maps bone names to stable indices and stores the matrices for each bone.
///
/// Indices are handed out in order of first registration starting at 0 and
/// are never reused. The index is what vertices store to refer to a bone, so
/// the registry only ever grows and refuses to grow past `MAX_BONES`.
#[derive(Clone, Debug, Default)]
pub struct BoneRegistry {
    names: HashMap<String, usize>,
    bones: Vec<BoneInfo>,
}

impl BoneRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
            bones: Vec::new(),
        }
    }

    /// Returns the index for `name`, registering it with default matrices if
    /// it has not been seen before.
    ///
    /// # Errors
    /// Returns `MrError::CapacityExceeded` if a new bone would need an index
    /// of `MAX_BONES` or more
    pub fn register_bone(&mut self, name: &str) -> Result<usize, MrError> {
        if let Some(index) = self.names.get(name) {
            return Ok(*index);
        }
        let index = self.bones.len();
        if index >= MAX_BONES {
            error!("bone {} would exceed {} bones", name, MAX_BONES);
            return Err(MrError::CapacityExceeded {
                name: name.to_string(),
            });
        }
        self.names.insert(name.to_string(), index);
        self.bones.push(BoneInfo::default());
        debug!("registered bone {} as index {}", name, index);
        Ok(index)
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    #[must_use]
    pub fn bone(&self, index: usize) -> Option<&BoneInfo> {
        self.bones.get(index)
    }

    /// Sets the bind pose offset. Meshes that share a bone each set it, so
    /// the last write wins.
    ///
    /// # Errors
    /// Returns `MrError::InvalidBoneIndex` if `index` was never registered
    pub fn set_offset(
        &mut self,
        index: usize,
        offset: &glm::Mat4,
    ) -> Result<(), MrError> {
        let bone = self
            .bones
            .get_mut(index)
            .ok_or(MrError::InvalidBoneIndex(index))?;
        bone.offset = *offset;
        Ok(())
    }

    /// Sets the matrix that will be sent to the shader
    ///
    /// # Errors
    /// Returns `MrError::InvalidBoneIndex` if `index` was never registered
    pub fn update_final(
        &mut self,
        index: usize,
        transform: &glm::Mat4,
    ) -> Result<(), MrError> {
        let bone = self
            .bones
            .get_mut(index)
            .ok_or(MrError::InvalidBoneIndex(index))?;
        bone.final_transform = *transform;
        Ok(())
    }

    /// Used by the traversal. If `name` is a bone, its final transform becomes
    /// `prefix * global * offset`. Returns whether a bone was updated.
    pub(crate) fn apply_global(
        &mut self,
        name: &str,
        prefix: &glm::Mat4,
        global: &glm::Mat4,
    ) -> bool {
        let Some(index) = self.index_of(name) else {
            return false;
        };
        // Indices in `names` always have an entry in `bones`
        if let Some(bone) = self.bones.get_mut(index) {
            bone.final_transform = prefix * global * bone.offset;
            trace!("bone {} index {} updated", name, index);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Bone names in index order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.names
            .iter()
            .sorted_by_key(|(_, index)| **index)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Produces the shader ready buffer. Slots without a bone hold identity.
    #[must_use]
    pub fn flatten(&self) -> BoneTransforms {
        let mut out = BoneTransforms::default();
        for (slot, bone) in out.0.iter_mut().zip(&self.bones) {
            *slot = row_major(&bone.final_transform);
        }
        out
    }
}

/// Flattens a matrix row by row
fn row_major(m: &glm::Mat4) -> [f32; 16] {
    let mut out = [0.0_f32; 16];
    for row in 0..4 {
        for col in 0..4 {
            out[row * 4 + col] = m[(row, col)];
        }
    }
    out
}

/// Bone matrices laid out for a uniform upload: `MAX_BONES` matrices of 16
/// floats each, row-major, so the shader side must upload with transpose.
#[derive(Clone, Copy, Debug)]
pub struct BoneTransforms(pub [[f32; 16]; MAX_BONES]);

impl Default for BoneTransforms {
    fn default() -> Self {
        Self([row_major(&glm::Mat4::identity()); MAX_BONES])
    }
}

impl BoneTransforms {
    /// Raw bytes for copying into a GPU buffer
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.0.as_slice())
    }

    /// Matrix in slot `index` converted back to `glm::Mat4`
    #[must_use]
    pub fn matrix(&self, index: usize) -> Option<glm::Mat4> {
        self.0.get(index).map(|m| glm::Mat4::from_row_slice(m))
    }
}
