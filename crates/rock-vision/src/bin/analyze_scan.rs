//! CLI tool to run a saved cockpit screenshot through the scan pipeline and
//! dump the intermediate crops.
//! Usage: cargo run -p rock-vision --features cli --bin analyze_scan -- <screenshot.png> [output_dir]

use std::path::PathBuf;

use anyhow::{Context, Result};
use rock_capture::{crop_rect, crop_region, load_screenshot, regions};
use rock_vision::{
    composition_window, detection_window, extract_composition, locate_scan_results, Tesseract,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <screenshot.png> [output_dir]", args[0]);
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let output_dir = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./debug_output"));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let frame = load_screenshot(&input_path)?;
    let (w, h) = frame.dimensions();
    println!("Image size: {}x{}", w, h);

    let engine = Tesseract::default();
    if !engine.is_available() {
        println!("Tesseract not available! Install it and make sure it is on PATH.");
        return Ok(());
    }

    println!("\n=== Anchor ===");
    let window = detection_window(w, h);
    println!(
        "Detection window: x={} y={} w={} h={}",
        window.min_x,
        window.min_y,
        window.width(),
        window.height()
    );
    crop_region(&frame, &regions::scan_results()).save(output_dir.join("anchor_window.png"))?;

    let anchor = match locate_scan_results(&frame, &engine) {
        Ok(anchor) => anchor,
        Err(e) => {
            println!("Anchor: {}", e);
            return Ok(());
        }
    };
    println!(
        "Anchor: x={} y={} w={} h={}",
        anchor.min_x,
        anchor.min_y,
        anchor.width(),
        anchor.height()
    );

    println!("\n=== Composition ===");
    let panel = composition_window(&anchor, w, h);
    println!(
        "Composition window: x={} y={} w={} h={}",
        panel.min_x,
        panel.min_y,
        panel.width(),
        panel.height()
    );
    crop_rect(&frame, &panel).save(output_dir.join("composition_window.png"))?;

    match extract_composition(&frame, &anchor, &engine) {
        Ok(comp) => println!("{}", serde_json::to_string_pretty(&comp)?),
        Err(e) => println!("Composition: {}", e),
    }

    println!("\nDebug images saved to: {}", output_dir.display());
    Ok(())
}
