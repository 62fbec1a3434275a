//! Botsim Core - Foundational types for the device simulator
//!
//! This crate provides the core types that all other botsim crates depend on:
//! - `ObjectId`, `InteractorId` - Stable identifiers
//! - `Vec2`, `Pose` - Planar spatial types and the rotation convention
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{Result, SimError};
pub use id::{BodyId, InteractorId, ObjectId};
pub use types::{local_to_world, rotate, Pose, Vec2};
