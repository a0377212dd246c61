//! Recommend using with
//! `RUSTFLAGS="-C target-cpu=x86-86-v2" cargo bench`
//!
//! These cover the per frame work: sampling channels and walking the tree to
//! produce bone matrices.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marrow::{
    animation::{
        self, interpolate, Animation, AnimationChannel, QuatKey, VectorKey,
    },
    bones::BoneRegistry,
    quat,
    scene::Node,
    types::MAX_BONES,
};
use nalgebra_glm as glm;

const COUNT: usize = 100;
const MUL: f32 = 1.0_f32 / (COUNT as f32);
const KEYS: usize = 30;

fn use_these_quats() -> (glm::Quat, glm::Quat) {
    let q1 = quat::from_axis_angle(
        0.376_f32, //
        &glm::vec3(0.0_f32, 0.0_f32, 1.0_f32),
    );
    let q2 = quat::from_axis_angle(
        2.512_f32, //
        &glm::vec3(0.0_f32, 1.0_f32, 0.0_f32),
    );
    (q1, q2)
}

fn slerp(c: &mut Criterion) {
    let (q1, q2) = use_these_quats();
    let q1 = black_box(q1);
    let q2 = black_box(q2);
    c.bench_function(
        "slerp", //
        |b| {
            b.iter(|| {
                for i in 0..=COUNT {
                    let _ = quat::slerp(&q1, &q2, (i as f32) * MUL);
                }
            })
        },
    );
}

fn glm_slerp(c: &mut Criterion) {
    let (q1, q2) = use_these_quats();
    let q1 = black_box(q1);
    let q2 = black_box(q2);
    c.bench_function(
        "glm slerp", //
        |b| {
            b.iter(|| {
                for i in 0..=COUNT {
                    let _ = glm::quat_slerp(&q1, &q2, (i as f32) * MUL);
                }
            })
        },
    );
}

fn channel(name: &str) -> AnimationChannel {
    let mut channel = AnimationChannel::new(name);
    for i in 0..KEYS {
        let t = i as f32;
        channel
            .positions
            .push(VectorKey::new(t, glm::vec3(t, 0.5 * t, 0.0)));
        channel.rotations.push(QuatKey::new(
            t,
            quat::from_axis_angle(0.1 * t, &glm::vec3(0.0, 1.0, 0.0)),
        ));
        channel
            .scales
            .push(VectorKey::new(t, glm::vec3(1.0, 1.0, 1.0)));
    }
    channel
}

fn sample_channel(c: &mut Criterion) {
    let channel = black_box(channel("bone"));
    let last = (KEYS - 1) as f32;
    c.bench_function(
        "sample channel", //
        |b| {
            b.iter(|| {
                for i in 0..=COUNT {
                    let _ = interpolate::local_transform(
                        &channel,
                        (i as f32) * MUL * last,
                    );
                }
            })
        },
    );
}

/// A single chain of bones, each with its own channel
fn use_this_rig(bones: usize) -> (Node, Animation, BoneRegistry) {
    let mut registry = BoneRegistry::new();
    let mut channels = Vec::new();
    let mut node: Option<Node> = None;
    for i in (0..bones).rev() {
        let name = format!("bone.{i}");
        registry.register_bone(&name).unwrap();
        channels.push((name.clone(), channel(&name)));
        let step = glm::translation(&glm::vec3(0.0, 1.0, 0.0));
        let mut n = Node::new(&name, step);
        if let Some(child) = node.take() {
            n = n.with_child(child);
        }
        node = Some(n);
    }
    let animation = Animation {
        name: "bench".to_string(),
        duration: (KEYS - 1) as f32,
        ticks_per_second: 25.0,
        channels: channels.into_iter().collect(),
    };
    (node.unwrap(), animation, registry)
}

fn animate(c: &mut Criterion) {
    let (root, animation, mut registry) = use_this_rig(MAX_BONES);
    let root = black_box(root);
    let inverse = glm::Mat4::identity();
    c.bench_function(
        "animate", //
        |b| {
            b.iter(|| {
                animation::animate(
                    &root,
                    &animation,
                    black_box(12.3),
                    &inverse,
                    &mut registry,
                )
            })
        },
    );
}

fn flatten(c: &mut Criterion) {
    let (_, _, registry) = use_this_rig(MAX_BONES);
    let registry = black_box(registry);
    c.bench_function(
        "flatten", //
        |b| b.iter(|| registry.flatten()),
    );
}

criterion_group!(benches, slerp, glm_slerp, sample_channel, animate, flatten);
criterion_main!(benches);
