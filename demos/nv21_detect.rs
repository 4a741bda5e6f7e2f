//! Run the bridge on a raw NV21 frame dumped from a phone camera.
//!
//! ```text
//! nv21_detect --assets ./assets --frame preview.nv21 --width 640 --height 480 --rotation 90
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fdbridge::{
    decode_detections, normalize_frame, BridgeConfig, DirAssetReader, FaceBridge, Rotation,
};
use fdbridge_preprocess::to_rgba_image;
use log::info;

#[derive(Parser)]
struct Args {
    /// Directory the model path is resolved against
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// JSON bridge config; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Raw NV21 frame (width*height*3/2 bytes)
    #[arg(long)]
    frame: PathBuf,

    #[arg(long)]
    width: u32,

    #[arg(long)]
    height: u32,

    /// Clockwise rotation to the user's orientation
    #[arg(long, default_value_t = 0)]
    rotation: i32,

    /// Save the upright frame as PNG
    #[arg(long)]
    dump: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => BridgeConfig::default(),
    };

    let mut bridge = FaceBridge::new(cfg.factory());
    let assets = DirAssetReader::new(&args.assets);
    let handle = bridge
        .load_detector(&assets, &cfg.model_path)
        .with_context(|| format!("loading {} from {}", cfg.model_path, args.assets.display()))?;

    let nv21 = std::fs::read(&args.frame)
        .with_context(|| format!("reading frame {}", args.frame.display()))?;

    if let Some(path) = &args.dump {
        let upright = normalize_frame(&nv21, args.width, args.height, args.rotation)?;
        to_rgba_image(&upright)?
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("upright frame written to {}", path.display());
    }

    let flat = bridge.detect(
        &handle,
        &nv21,
        cfg.heatmap_threshold,
        cfg.nms_threshold,
        args.width,
        args.height,
        args.rotation,
    )?;

    let (w, h) = Rotation::from(args.rotation).oriented_dims(args.width, args.height);
    let faces = decode_detections(&flat);
    println!("{} face(s) in {}x{} upright frame", faces.len(), w, h);
    for (i, f) in faces.iter().enumerate() {
        println!(
            "  #{i}: ({:.1}, {:.1}) - ({:.1}, {:.1})  score {:.3}",
            f.x1, f.y1, f.x2, f.y2, f.score
        );
    }

    bridge.release(handle)?;
    Ok(())
}
