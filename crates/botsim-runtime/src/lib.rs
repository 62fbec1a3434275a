//! Botsim Runtime - Tick loop infrastructure
//!
//! Provides the tick loop building blocks:
//! - `Interactor` - trait for controllers driven by the tick loop
//! - `Scheduler` - two-tier execution list (device tier before generic tier)
//! - `PhysicsStep` / `KinematicPhysics` - the physics phase of a tick

mod interactor;
mod physics;
mod scheduler;

pub use interactor::Interactor;
pub use physics::{KinematicPhysics, PhysicsStep};
pub use scheduler::{Scheduler, Tier};
