use super::bounds::Bounds;
use crate::{
    bones::{BoneRegistry, VertexBoneData},
    mr_error::MrError,
    scene::MeshData,
    types::BONES_PER_VERTEX,
    vertex::SkinnedVertex,
};
use log::{debug, warn};
use nalgebra_glm as glm;

/// Mesh with bone indices resolved against the model's registry, ready to be
/// uploaded
#[derive(Clone, Debug, Default)]
pub struct SkinnedMesh {
    pub name: String,
    pub vertices: Vec<SkinnedVertex>,
    pub indices: Vec<u32>,
}

impl SkinnedMesh {
    /// Converts imported mesh data. Every bone the mesh refers to is
    /// registered and its offset stored, and each vertex keeps the influences
    /// that are above `threshold`. Positions are added to `bounds`.
    ///
    /// # Errors
    /// Returns `MrError::CapacityExceeded` if the model has too many bones
    pub fn process(
        mesh: &MeshData,
        registry: &mut BoneRegistry,
        threshold: f32,
        bounds: &mut Bounds,
    ) -> Result<Self, MrError> {
        let mut bone_data =
            vec![VertexBoneData::default(); mesh.positions.len()];
        let mut discarded = 0_usize;
        let mut overflowed = 0_usize;

        for bone in &mesh.bones {
            let index = registry.register_bone(&bone.name)?;
            registry.set_offset(index, &bone.offset)?;
            let id = u32::try_from(index)
                .map_err(|_| MrError::InvalidBoneIndex(index))?;

            for w in &bone.weights {
                let Some(data) = bone_data.get_mut(w.vertex as usize) else {
                    warn!(
                        "{} bone {} refers to missing vertex {}",
                        mesh.name, bone.name, w.vertex
                    );
                    continue;
                };
                if data.count() == BONES_PER_VERTEX && w.weight > threshold {
                    overflowed += 1;
                }
                if !data.add(id, w.weight, threshold) {
                    discarded += 1;
                }
            }
        }

        let zero = glm::Vec3::zeros();
        let vertices = mesh
            .positions
            .iter()
            .zip(&bone_data)
            .enumerate()
            .map(|(i, (position, bones))| {
                bounds.include(position);
                SkinnedVertex::new(
                    position,
                    mesh.normals.get(i).unwrap_or(&zero),
                    mesh.tex_coords.get(i).copied().unwrap_or_default(),
                    bones,
                )
            })
            .collect();

        if overflowed > 0 {
            warn!(
                "{}: {} influences did not fit in {} slots",
                mesh.name, overflowed, BONES_PER_VERTEX
            );
        }
        debug!(
            "{}: bones={}, influences discarded={}",
            mesh.name,
            mesh.bones.len(),
            discarded
        );
        Ok(Self {
            name: mesh.name.clone(),
            vertices,
            indices: mesh.indices.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Bounds, SkinnedMesh};
    use crate::{
        bones::BoneRegistry,
        scene::{MeshBone, MeshData, VertexWeight},
        types::WEIGHT_THRESHOLD,
    };
    use nalgebra_glm as glm;

    fn bone(name: &str, weights: &[(u32, f32)]) -> MeshBone {
        MeshBone {
            name: name.to_string(),
            offset: glm::translation(&glm::vec3(0.0, -1.0, 0.0)),
            weights: weights
                .iter()
                .map(|(vertex, weight)| VertexWeight {
                    vertex: *vertex,
                    weight: *weight,
                })
                .collect(),
        }
    }

    fn quad(bones: Vec<MeshBone>) -> MeshData {
        MeshData {
            name: "quad".to_string(),
            positions: vec![
                glm::vec3(0.0, 0.0, 0.0),
                glm::vec3(1.0, 0.0, 0.0),
                glm::vec3(1.0, 1.0, 0.0),
                glm::vec3(0.0, 1.0, 0.0),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
            bones,
            ..Default::default()
        }
    }

    #[test]
    fn registers_and_discards() {
        let mesh = quad(vec![
            bone("a", &[(0, 1.0), (1, 0.6), (2, 0.05)]),
            bone("b", &[(1, 0.4), (2, 0.1), (3, 1.0)]),
        ]);
        let mut registry = BoneRegistry::new();
        let mut bounds = Bounds::default();
        let out = SkinnedMesh::process(
            &mesh,
            &mut registry,
            WEIGHT_THRESHOLD,
            &mut bounds,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(out.vertices.len(), 4);
        assert_eq!(out.indices.len(), 6);
        assert_eq!(out.vertices[1].bone_ids, [0, 1, 0, 0]);
        assert_eq!(out.vertices[1].bone_weights, [0.6, 0.4, 0.0, 0.0]);
        // 0.05 and 0.1 are both dropped
        assert_eq!(out.vertices[2].bone_weights, [0.0; 4]);
        assert_eq!(out.vertices[3].bone_ids, [1, 0, 0, 0]);
        assert_eq!(
            registry.bone(1).unwrap().offset,
            glm::translation(&glm::vec3(0.0, -1.0, 0.0))
        );
        assert!((bounds.extent() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn shared_bone_names_share_index() {
        let mut registry = BoneRegistry::new();
        let mut bounds = Bounds::default();
        let first = quad(vec![bone("spine", &[(0, 1.0)])]);
        let second = quad(vec![
            bone("neck", &[(0, 1.0)]),
            bone("spine", &[(1, 1.0)]),
        ]);
        SkinnedMesh::process(&first, &mut registry, 0.1, &mut bounds).unwrap();
        let out = SkinnedMesh::process(&second, &mut registry, 0.1, &mut bounds)
            .unwrap();
        assert_eq!(registry.names(), vec!["spine", "neck"]);
        assert_eq!(out.vertices[0].bone_ids[0], 1);
        assert_eq!(out.vertices[1].bone_ids[0], 0);
    }

    #[test]
    fn bad_vertex_index_skipped() {
        let mesh = quad(vec![bone("a", &[(17, 1.0)])]);
        let mut registry = BoneRegistry::new();
        let mut bounds = Bounds::default();
        let out = SkinnedMesh::process(&mesh, &mut registry, 0.1, &mut bounds)
            .unwrap();
        assert!(out.vertices.iter().all(|v| v.bone_weights == [0.0; 4]));
    }
}
