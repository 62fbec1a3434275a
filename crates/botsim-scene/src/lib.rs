//! Botsim Scene - TOML scenes and the running simulation
//!
//! This crate loads scene files into a `Simulation`: bodies are spawned,
//! their devices built in file order, generic scripts registered, and the
//! whole thing ticked with a physics step.

mod config;
mod format;
mod scripts;
mod simulation;

pub use config::SimConfig;
pub use format::{BodyDef, SceneFile, SceneMetadata, ScriptDef};
pub use scripts::SpinScript;
pub use simulation::{ObjectPose, Registries, Simulation};
