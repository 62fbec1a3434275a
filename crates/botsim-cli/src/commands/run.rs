//! Scene run command

use anyhow::{Context, Result};
use botsim_scene::{SimConfig, Simulation};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

pub struct RunArgs {
    pub scene: PathBuf,
    pub config: PathBuf,
    pub ticks: Option<u64>,
    pub format: String,
}

pub fn run(args: RunArgs) -> Result<()> {
    let mut config = SimConfig::load(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    if let Some(ticks) = args.ticks {
        config.ticks = ticks;
    }

    let mut sim = Simulation::load(&args.scene, &config)
        .with_context(|| format!("loading scene {}", args.scene.display()))?;
    sim.run(config.ticks)?;
    info!(scene = %sim.name(), ticks = sim.tick_count(), "run complete");

    let poses = sim.object_poses();
    if args.format == "json" {
        let output = json!({
            "scene": sim.name(),
            "ticks": sim.tick_count(),
            "objects": poses,
            "devices": sim.device_objects(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Scene: {} ({} ticks)", sim.name(), sim.tick_count());
    for pose in &poses {
        println!(
            "  {:<32} {:<8} ({:>8.3}, {:>8.3}) {:>8.2}°",
            pose.key,
            pose.kind,
            pose.position[0],
            pose.position[1],
            pose.rotation.to_degrees()
        );
    }
    Ok(())
}
