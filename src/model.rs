//! A loaded, skinned model with its skeleton and the clip it plays.
//!
//! Loading registers every bone referenced by the meshes, stores their
//! offsets and gives every bone a resting transform from the stored node
//! transforms. After that, `update` is called once per frame and the result
//! of `bone_transforms` is uploaded.
use crate::{
    animation::{self, Animation, AnimationClock},
    bones::{BoneRegistry, BoneTransforms},
    mesh_import::{gltf_file, ImportOptions},
    mr_error::MrError,
    scene::{Node, Scene},
};
use log::{info, warn};
use nalgebra_glm as glm;
use std::{path::Path, time::Instant};

mod bounds;
mod mesh;
mod snapshot;

// Re-exports
pub use bounds::Bounds;
pub use mesh::SkinnedMesh;
pub use snapshot::{BonePose, PoseSnapshot};

pub struct Model {
    root: Node,
    meshes: Vec<SkinnedMesh>,
    registry: BoneRegistry,
    global_transform: glm::Mat4,
    global_inverse: glm::Mat4,
    animation: Option<Animation>,
    clock: Option<AnimationClock>,
    animation_time: f32,
    bounds: Bounds,
    matrix: glm::Mat4,
}

impl Model {
    /// Loads a glTF file
    ///
    /// # Errors
    /// May return `MrError`
    pub fn load(path: &Path, options: &ImportOptions) -> Result<Self, MrError> {
        info!("Loading model {:?}", path);
        let scene = gltf_file::load(path)?;
        Self::from_scene(scene, options)
    }

    /// Builds a model from an imported scene. Only the first animation of the
    /// scene is kept.
    ///
    /// # Errors
    /// Returns `MrError::CapacityExceeded` if the meshes refer to too many
    /// distinct bones
    pub fn from_scene(
        scene: Scene,
        options: &ImportOptions,
    ) -> Result<Self, MrError> {
        let Scene {
            root,
            meshes,
            animations,
        } = scene;

        let global_transform = root.transform;
        let global_inverse = global_transform.try_inverse().unwrap_or_else(|| {
            warn!("Root transform of {} is not invertible", root.name);
            glm::Mat4::identity()
        });

        let mut registry = BoneRegistry::new();
        let mut bounds = Bounds::default();
        let meshes = meshes
            .iter()
            .map(|m| {
                SkinnedMesh::process(
                    m,
                    &mut registry,
                    options.weight_threshold,
                    &mut bounds,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        animation::static_pose(&root, &glm::Mat4::identity(), &mut registry);

        let matrix = if options.normalize {
            bounds.fit_matrix()
        } else {
            glm::Mat4::identity()
        };

        if animations.len() > 1 {
            info!(
                "{} animations found, only {} is used",
                animations.len(),
                animations[0].name
            );
        }
        let animation = animations.into_iter().next();
        let no_rate = |a: &&Animation| a.ticks_per_second <= 0.0;
        if let Some(a) = animation.as_ref().filter(no_rate) {
            warn!(
                "{} has no tick rate, using {}",
                a.name,
                a.ticks_per_second()
            );
        }

        info!(
            "Model ready: nodes={}, meshes={}, bones={}, animation={:?}",
            root.count(),
            meshes.len(),
            registry.len(),
            animation.as_ref().map(|a| a.name.as_str())
        );

        Ok(Self {
            root,
            meshes,
            registry,
            global_transform,
            global_inverse,
            animation,
            clock: None,
            animation_time: 0.0,
            bounds,
            matrix,
        })
    }

    /// Starts (or restarts) the clip at `now`
    pub fn start(&mut self, now: Instant) {
        self.clock = Some(AnimationClock::new(now));
    }

    /// Poses the skeleton for the wall clock time `now`. The clock starts on
    /// the first call if `start` was not called. Returns the animation time
    /// in ticks, or `None` if the model has no animation.
    pub fn update(&mut self, now: Instant) -> Option<f32> {
        let clip = self.animation.as_ref()?;
        let clock = *self.clock.get_or_insert_with(|| AnimationClock::new(now));
        let time = clock.animation_time(now, clip);
        animation::animate(
            &self.root,
            clip,
            time,
            &self.global_inverse,
            &mut self.registry,
        );
        self.animation_time = time;
        Some(time)
    }

    /// Poses the skeleton at an explicit time in ticks. Returns false if the
    /// model has no animation.
    pub fn pose_at(&mut self, time: f32) -> bool {
        let Some(clip) = self.animation.as_ref() else {
            return false;
        };
        animation::animate(
            &self.root,
            clip,
            time,
            &self.global_inverse,
            &mut self.registry,
        );
        self.animation_time = time;
        true
    }

    /// Returns every bone to the pose given by the stored node transforms
    pub fn rest_pose(&mut self) {
        animation::static_pose(
            &self.root,
            &glm::Mat4::identity(),
            &mut self.registry,
        );
        self.animation_time = 0.0;
    }

    /// Final transforms of every bone, ready for upload
    #[must_use]
    pub fn bone_transforms(&self) -> BoneTransforms {
        self.registry.flatten()
    }

    #[must_use]
    pub fn snapshot(&self) -> PoseSnapshot {
        let bones = self
            .registry
            .names()
            .into_iter()
            .enumerate()
            .filter_map(|(index, name)| {
                self.registry.bone(index).map(|b| BonePose {
                    index,
                    name: name.to_string(),
                    transform: b.final_transform,
                })
            })
            .collect();
        PoseSnapshot {
            animation: self.animation.as_ref().map(|a| a.name.clone()),
            time: self.animation_time,
            bones,
        }
    }

    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    #[must_use]
    pub fn meshes(&self) -> &[SkinnedMesh] {
        &self.meshes
    }

    #[must_use]
    pub const fn registry(&self) -> &BoneRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn animation(&self) -> Option<&Animation> {
        self.animation.as_ref()
    }

    #[must_use]
    pub const fn is_animated(&self) -> bool {
        self.animation.is_some()
    }

    /// Time in ticks of the last pose
    #[must_use]
    pub const fn animation_time(&self) -> f32 {
        self.animation_time
    }

    #[must_use]
    pub const fn global_transform(&self) -> &glm::Mat4 {
        &self.global_transform
    }

    #[must_use]
    pub const fn global_inverse(&self) -> &glm::Mat4 {
        &self.global_inverse
    }

    #[must_use]
    pub const fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Model matrix. Fits the model in a 2 unit cube around the origin if
    /// `ImportOptions::normalize` was set, identity otherwise.
    #[must_use]
    pub const fn matrix(&self) -> &glm::Mat4 {
        &self.matrix
    }
}
