//! Botsim CLI - Command-line interface for the robot simulator

mod commands;
mod logger;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, devices, run};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "botsim")]
#[command(about = "Headless robot simulator with config-driven devices", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a scene, run it and print the final poses
    Run {
        /// Path to scene file
        scene: PathBuf,

        /// Path to config file
        #[arg(short, long, default_value = "botsim.toml")]
        config: PathBuf,

        /// Number of ticks, overriding the config
        #[arg(long)]
        ticks: Option<u64>,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },

    /// List the devices a scene builds
    Devices {
        /// Path to scene file
        scene: PathBuf,

        /// Path to config file
        #[arg(short, long, default_value = "botsim.toml")]
        config: PathBuf,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },

    /// Check that every device type in a registry loads and resolves
    Check {
        /// Path to device type registry
        registry: PathBuf,
    },
}

fn parse_format(s: &str) -> Result<String, String> {
    match s {
        "text" | "json" => Ok(s.to_string()),
        _ => Err(format!("unknown format '{}'; valid values: text, json", s)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(&cli.log_level)?;

    match cli.command {
        Commands::Run {
            scene,
            config,
            ticks,
            format,
        } => run::run(run::RunArgs {
            scene,
            config,
            ticks,
            format,
        }),
        Commands::Devices {
            scene,
            config,
            format,
        } => devices::run(&scene, &config, &format),
        Commands::Check { registry } => check::run(&registry),
    }
}
