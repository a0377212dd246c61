// Reads a glTF file into a `Scene`. Only what the animation pipeline needs is
// read: the node tree, skinned triangle meshes and TRS animation channels.
// Images are never loaded.

use crate::{
    animation::{Animation, AnimationChannel, Key},
    mr_error::MrError,
    scene::{MeshBone, MeshData, Node, Scene, VertexWeight},
};
use ahash::{HashMap, HashMapExt};
use gltf::{
    animation::{util::ReadOutputs, Interpolation},
    buffer::Data,
    mesh::Mode,
    Document, Gltf,
};
use log::{debug, error, info, trace, warn};
use nalgebra_glm as glm;
use std::{fs, io, path::Path};

/// Name of the node inserted above the scene's nodes when there is more than
/// one of them
pub const SYNTHETIC_ROOT: &str = "scene.root";

/// glTF keyframe times are in seconds
const GLTF_TICKS_PER_SECOND: f32 = 1.0;

/// Static TRS of a node used to fill in channel components that are not
/// animated
type Decomposed = ([f32; 3], [f32; 4], [f32; 3]);

fn load_impl<P>(path: P) -> Result<(Document, Vec<Data>), MrError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let base = path.parent().unwrap_or_else(|| Path::new("./"));
    let file = fs::File::open(path).map_err(|e| {
        MrError::ImportFailure(format!("{}: {e}", path.display()))
    })?;
    let reader = io::BufReader::new(file);
    let gltf = Gltf::from_reader(reader)?;
    let buffers = gltf::import_buffers(&gltf.document, Some(base), gltf.blob)?;

    // Some info
    info!(
        "{:?}, base path={:?}, buffer count={}",
        path,
        base,
        buffers.len(),
    );

    Ok((gltf.document, buffers))
}

/// Loads a glTF file
///
/// # Errors
/// Returns `MrError::ImportFailure` if the file can't be read, is not valid
/// glTF, or has nothing to use as a root node
pub fn load(path: &Path) -> Result<Scene, MrError> {
    let (document, buffers) = load_impl(path)?;
    build_scene(&document, &buffers)
}

/// Loads glTF from memory. External buffers are resolved relative to `base`.
///
/// # Errors
/// Returns `MrError::ImportFailure` if the data is not valid glTF or has
/// nothing to use as a root node
pub fn from_slice(bytes: &[u8], base: Option<&Path>) -> Result<Scene, MrError> {
    let gltf = Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&gltf.document, base, gltf.blob)?;
    build_scene(&gltf.document, &buffers)
}

fn build_scene(
    document: &Document,
    buffers: &[Data],
) -> Result<Scene, MrError> {
    let scene = selected_scene(document)?;
    let root = load_root(&scene)?;
    let meshes = load_meshes(&scene, buffers)?;
    let animations = load_animations(document, buffers)?;
    info!(
        "root={}, nodes={}, meshes={}, animations={}",
        root.name,
        root.count(),
        meshes.len(),
        animations.len()
    );
    Ok(Scene {
        root,
        meshes,
        animations,
    })
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("node.{}", node.index()), ToString::to_string)
}

/// Reader callback shared by meshes, skins and animations
fn buffer_data<'a>(
    buffers: &'a [Data],
    buffer: &gltf::Buffer,
) -> Option<&'a [u8]> {
    buffers.get(buffer.index()).map(|data| data.0.as_slice())
}

/// Recursive node tree conversion
fn build_node(node: &gltf::Node) -> Node {
    Node {
        name: node_name(node),
        transform: node.transform().matrix().into(),
        children: node.children().map(|child| build_node(&child)).collect(),
    }
}

/// The scene the model is built from, the default one or else the first
fn selected_scene(document: &Document) -> Result<gltf::Scene, MrError> {
    document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| {
            error!("No scene found");
            MrError::ImportFailure("no scene".to_string())
        })
}

/// Every node reachable from the scene, depth first
fn scene_nodes<'a>(scene: &gltf::Scene<'a>) -> Vec<gltf::Node<'a>> {
    let mut ret = Vec::new();
    let mut stack: Vec<gltf::Node> = scene.nodes().collect();
    stack.reverse();
    while let Some(node) = stack.pop() {
        let first_child = stack.len();
        stack.extend(node.children());
        stack[first_child..].reverse();
        ret.push(node);
    }
    ret
}

fn load_root(scene: &gltf::Scene) -> Result<Node, MrError> {
    let mut roots: Vec<Node> =
        scene.nodes().map(|node| build_node(&node)).collect();
    match roots.len() {
        0 => {
            error!("scene {} has no nodes", scene.index());
            Err(MrError::ImportFailure("scene has no root node".to_string()))
        }
        1 => Ok(roots.remove(0)),
        n => {
            debug!("{} scene nodes, adding {}", n, SYNTHETIC_ROOT);
            Ok(Node {
                name: SYNTHETIC_ROOT.to_string(),
                transform: glm::Mat4::identity(),
                children: roots,
            })
        }
    }
}

/// Reads the bones of a skin with no vertex weights yet
fn load_skin(
    skin: &gltf::Skin,
    buffers: &[Data],
) -> Result<Vec<MeshBone>, MrError> {
    let reader = skin.reader(|x| buffer_data(buffers, &x));
    let Some(iter) = reader.read_inverse_bind_matrices() else {
        error!("skin {} is missing inverse bind matrices", skin.index());
        return Err(MrError::ImportFailure(format!(
            "skin {} has no inverse bind matrices",
            skin.index()
        )));
    };
    Ok(iter
        .zip(skin.joints())
        .map(|(ibm, joint)| MeshBone {
            name: node_name(&joint),
            offset: ibm.into(),
            weights: Vec::new(),
        })
        .collect())
}

/// Meshes of the nodes in `scene`. Meshes only used by other scenes are
/// left out since their bones would never be posed.
fn load_meshes(
    scene: &gltf::Scene,
    buffers: &[Data],
) -> Result<Vec<MeshData>, MrError> {
    let mut ret = Vec::new();
    for node in scene_nodes(scene) {
        let Some(mesh) = node.mesh() else {
            continue;
        };
        let skin_bones = match node.skin() {
            Some(skin) => load_skin(&skin, buffers)?,
            None => Vec::new(),
        };
        let mesh_name = mesh.name().map_or_else(
            || format!("mesh.{}", mesh.index()),
            ToString::to_string,
        );

        for p in mesh.primitives() {
            if p.mode() != Mode::Triangles {
                warn!("{} primitive {} is not triangles", mesh_name, p.index());
                continue;
            }
            let reader = p.reader(|x| buffer_data(buffers, &x));
            let Some(positions) = reader.read_positions() else {
                warn!("{} primitive {} has no positions", mesh_name, p.index());
                continue;
            };
            let positions: Vec<glm::Vec3> = positions.map(Into::into).collect();
            let normals: Vec<glm::Vec3> = reader
                .read_normals()
                .map_or_else(Vec::new, |it| it.map(Into::into).collect());
            let tex_coords: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map_or_else(Vec::new, |it| it.into_f32().collect());
            let indices: Vec<u32> = match reader.read_indices() {
                Some(it) => it.into_u32().collect(),
                None => {
                    let count = u32::try_from(positions.len()).map_err(|_| {
                        MrError::ImportFailure(
                            "vertex count does not fit in 32 bits".to_string(),
                        )
                    })?;
                    (0..count).collect()
                }
            };

            // Sort the per vertex joints and weights into per bone lists
            let mut bones = skin_bones.clone();
            if let (Some(joints), Some(weights)) =
                (reader.read_joints(0), reader.read_weights(0))
            {
                for (vertex, (ids, ws)) in
                    joints.into_u16().zip(weights.into_f32()).enumerate()
                {
                    trace!("vertex {} ids={:?} weights={:?}", vertex, ids, ws);
                    let vertex = u32::try_from(vertex).map_err(|_| {
                        MrError::ImportFailure(
                            "vertex index does not fit in 32 bits".to_string(),
                        )
                    })?;
                    for (id, weight) in ids.iter().zip(ws) {
                        if weight <= 0.0 {
                            continue;
                        }
                        if let Some(bone) = bones.get_mut(usize::from(*id)) {
                            bone.weights.push(VertexWeight { vertex, weight });
                        } else {
                            warn!(
                                "{} vertex {} refers to missing joint {}",
                                mesh_name, vertex, id
                            );
                        }
                    }
                }
            }

            info!(
                "{} primitive {}: vertices={}, indices={}, bones={}",
                mesh_name,
                p.index(),
                positions.len(),
                indices.len(),
                bones.len()
            );
            ret.push(MeshData {
                name: format!("{mesh_name}.{}", p.index()),
                positions,
                normals,
                tex_coords,
                indices,
                bones,
            });
        }
    }
    Ok(ret)
}

/// Pairs times with values. Cubic spline samplers store an in-tangent, value
/// and out-tangent for every key and only the value is kept.
fn keys<T>(
    times: &[f32],
    values: impl Iterator<Item = T>,
    cubic: bool,
) -> Vec<Key<T>> {
    let values: Vec<T> = if cubic {
        values.skip(1).step_by(3).collect()
    } else {
        values.collect()
    };
    times
        .iter()
        .zip(values)
        .map(|(time, value)| Key::new(*time, value))
        .collect()
}

/// Gives every empty component of a channel a single key holding the node's
/// static value
fn fill_missing(channel: &mut AnimationChannel, defaults: Option<&Decomposed>) {
    let (t, r, s) = defaults.copied().unwrap_or((
        [0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
    ));
    if channel.positions.is_empty() {
        channel.positions.push(Key::new(0.0, t.into()));
    }
    if channel.rotations.is_empty() {
        channel
            .rotations
            .push(Key::new(0.0, glm::quat(r[0], r[1], r[2], r[3])));
    }
    if channel.scales.is_empty() {
        channel.scales.push(Key::new(0.0, s.into()));
    }
}

fn load_animations(
    document: &Document,
    buffers: &[Data],
) -> Result<Vec<Animation>, MrError> {
    let defaults: HashMap<String, Decomposed> = document
        .nodes()
        .map(|node| (node_name(&node), node.transform().decomposed()))
        .collect();

    let mut ret = Vec::new();
    for animation in document.animations() {
        let name = animation.name().map_or_else(
            || format!("animation.{}", animation.index()),
            ToString::to_string,
        );
        let mut channels = HashMap::<String, AnimationChannel>::new();

        for channel in animation.channels() {
            let node_name = node_name(&channel.target().node());
            let interpolation = channel.sampler().interpolation();
            if matches!(interpolation, Interpolation::Step) {
                warn!("{} {} step treated as linear", name, node_name);
            }
            let cubic = matches!(interpolation, Interpolation::CubicSpline);

            let reader = channel.reader(|x| buffer_data(buffers, &x));
            let Some(inputs) = reader.read_inputs() else {
                error!("{} {} has no sampler input", name, node_name);
                return Err(MrError::ImportFailure(format!(
                    "animation {name} channel for {node_name} has no input"
                )));
            };
            let times: Vec<f32> = inputs.collect();
            let Some(outputs) = reader.read_outputs() else {
                error!("{} {} has no sampler output", name, node_name);
                return Err(MrError::ImportFailure(format!(
                    "animation {name} channel for {node_name} has no output"
                )));
            };

            if let ReadOutputs::MorphTargetWeights(_) = outputs {
                warn!("{} {} morph targets ignored", name, node_name);
                continue;
            }
            let entry = channels
                .entry(node_name.clone())
                .or_insert_with(|| AnimationChannel::new(&node_name));
            match outputs {
                ReadOutputs::Translations(it) => {
                    entry.positions = keys(&times, it.map(Into::into), cubic);
                }
                ReadOutputs::Rotations(it) => {
                    entry.rotations = keys(
                        &times,
                        it.into_f32()
                            .map(|q| glm::quat(q[0], q[1], q[2], q[3])),
                        cubic,
                    );
                }
                ReadOutputs::Scales(it) => {
                    entry.scales = keys(&times, it.map(Into::into), cubic);
                }
                ReadOutputs::MorphTargetWeights(_) => {}
            }
        }

        let mut duration = 0.0_f32;
        for (node_name, channel) in &mut channels {
            fill_missing(channel, defaults.get(node_name));
            duration = duration.max(channel.max_time());
            debug!(
                "{} {} keys: positions={} rotations={} scales={}",
                name,
                node_name,
                channel.positions.len(),
                channel.rotations.len(),
                channel.scales.len()
            );
        }

        info!(
            "animation {} channels={} duration={}",
            name,
            channels.len(),
            duration
        );
        ret.push(Animation {
            name,
            duration,
            ticks_per_second: GLTF_TICKS_PER_SECOND,
            channels,
        });
    }
    Ok(ret)
}
