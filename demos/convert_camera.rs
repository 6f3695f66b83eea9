//! Scene Object Camera Converter
//!
//! Loads a scene-object record from YAML, builds the engine camera for it and prints
//! the payload that would be handed to the engine binding.
//!
//! Usage:
//! ```bash
//! cargo run --example convert_camera -- \
//!   --input-path samples/perspective_camera.yaml \
//!   --width 960 --height 540 --flip-y
//! ```

use clap::Parser;
use log::info;
use nerf_camera_tools::{
    AssemblerRegistry, CameraConverter, CameraSource, EngineCameraPayload, Resolution,
    SceneContext, SceneObject,
};
use std::path::PathBuf;

/// Scene object to engine camera conversion tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the scene object YAML file
    #[arg(short = 'p', long)]
    input_path: PathBuf,

    /// Engine image width in pixels
    #[arg(long, default_value = "1920")]
    width: u32,

    /// Engine image height in pixels
    #[arg(long, default_value = "1080")]
    height: u32,

    /// Render resolution width of the scene (defaults to the image width)
    #[arg(long)]
    render_width: Option<u32>,

    /// Render resolution height of the scene (defaults to the image height)
    #[arg(long)]
    render_height: Option<u32>,

    /// Emit the camera with the vertical axis flipped
    #[arg(long)]
    flip_y: bool,

    /// Also save the engine camera to this YAML file
    #[arg(short = 'o', long)]
    output_path: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let cli = Cli::parse();

    let input_path_str = cli.input_path.to_str().ok_or("Invalid input path string")?;
    let object = SceneObject::load_from_yaml(input_path_str)?;

    let image = Resolution::new(cli.width, cli.height);
    let context = SceneContext {
        render_resolution: Resolution::new(
            cli.render_width.unwrap_or(cli.width),
            cli.render_height.unwrap_or(cli.height),
        ),
        ..SceneContext::default()
    };

    let converter = CameraConverter::new(AssemblerRegistry::with_defaults());
    let mut camera = converter.convert(&context, CameraSource::SceneObject(&object), &image)?;
    if cli.flip_y {
        camera = camera.with_flipped_y();
    }

    info!(
        "Converted '{}' to a {}x{} engine camera",
        object.name, camera.resolution.width, camera.resolution.height
    );

    println!("{}", EngineCameraPayload::from(&camera).to_json()?);

    if let Some(output_path) = cli.output_path {
        let output_path_str = output_path.to_str().ok_or("Invalid output path string")?;
        camera.save_to_yaml(output_path_str)?;
        println!("Saved engine camera to {output_path_str}");
    }

    Ok(())
}
