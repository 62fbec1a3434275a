//! Device listing command

use anyhow::{Context, Result};
use botsim_scene::{SimConfig, Simulation};
use std::path::Path;

pub fn run(scene: &Path, config: &Path, format: &str) -> Result<()> {
    let config =
        SimConfig::load(config).with_context(|| format!("loading config {}", config.display()))?;
    let sim = Simulation::load(scene, &config)
        .with_context(|| format!("loading scene {}", scene.display()))?;

    let objects = sim.device_objects();
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&objects)?);
        return Ok(());
    }

    if objects.is_empty() {
        println!("No devices in {}", sim.name());
        return Ok(());
    }

    println!("Devices in {}:", sim.name());
    for object in &objects {
        println!(
            "  {}[{}] {} {}",
            object["body"].as_str().unwrap_or("?"),
            object["index"],
            object["name"].as_str().unwrap_or("?"),
            object["state"]
        );
    }

    let palette = sim.palette();
    if !palette.is_empty() {
        println!("Palette:");
        for (name, colour) in palette.iter() {
            println!("  {} = {}", name, colour);
        }
    }
    Ok(())
}
