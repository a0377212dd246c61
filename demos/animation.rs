//! Headless demo of animation using marrow
//!
//! Loads a skinned glTF model, plays its first animation on a simulated clock
//! and logs the pose. Usage:
//!
//! `RUST_LOG=info cargo run --example animation -- [model.gltf] [options.yaml]`
use log::info;
use marrow::{mesh_import::ImportOptions, model::Model, types::BONES_UNIFORM};
use std::{
    path::Path,
    time::{Duration, Instant},
};

const FILENAME: &str = "./tests/data/rig.gltf";
const FRAME_DURATION: Duration = Duration::from_micros(33_333);
const FRAMES: u32 = 45;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let file_path = if args.len() < 2 {
        FILENAME.to_string()
    } else {
        args[1].clone()
    };
    let options = if args.len() < 3 {
        ImportOptions::default()
    } else {
        ImportOptions::from_yaml_file(Path::new(&args[2])).unwrap()
    };

    let mut model = Model::load(Path::new(&file_path), &options).unwrap();
    info!(
        "bones={:?}, matrix={:?}",
        model.registry().names(),
        model.matrix()
    );

    if !model.is_animated() {
        info!("No animation, resting pose only");
        println!("{}", model.snapshot().to_yaml().unwrap());
        return;
    }

    // Simulated frames so output doesn't depend on how fast this runs
    let start = Instant::now();
    model.start(start);
    let mut now = start;
    for frame in 0..FRAMES {
        let time = model.update(now).unwrap_or_default();
        let transforms = model.bone_transforms();
        info!(
            "frame {} time={:.3} {}: {} bytes, first bone={:?}",
            frame,
            time,
            BONES_UNIFORM,
            transforms.as_bytes().len(),
            transforms.matrix(0)
        );
        now += FRAME_DURATION;
    }

    println!("{}", model.snapshot().to_yaml().unwrap());
}
