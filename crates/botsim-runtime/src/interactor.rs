//! Interactor trait

use botsim_core::Result;
use botsim_world::SimWorld;

/// A controller ticked by the scheduler
///
/// The scheduler calls `start_up` exactly once, then for every tick
/// `tick` before physics and `after_physics` once the physics step has
/// moved the bodies.
pub trait Interactor {
    /// Human-readable name for this interactor
    fn name(&self) -> &str;

    /// One-time setup, run before the first tick this interactor sees
    fn start_up(&mut self, world: &mut SimWorld) -> Result<()>;

    /// Called every tick before the physics step
    fn tick(&mut self, _world: &mut SimWorld, _tick: u64) -> Result<()> {
        Ok(())
    }

    /// Called every tick after the physics step
    fn after_physics(&mut self, _world: &mut SimWorld) -> Result<()> {
        Ok(())
    }
}
