//! Built-in generic scripts

use botsim_core::{BodyId, Result, SimError, Vec2};
use botsim_device::InteractorOptions;
use botsim_runtime::Interactor;
use botsim_world::{Motion, SimWorld};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SpinConfig {
    body: String,
    /// Degrees per second
    #[serde(default)]
    angular_velocity: f32,
    #[serde(default)]
    velocity: [f32; 2],
}

/// Drives a body at a constant velocity every tick
#[derive(Debug)]
pub struct SpinScript {
    body_key: String,
    body: Option<BodyId>,
    motion: Motion,
}

impl SpinScript {
    pub fn new(body_key: impl Into<String>, velocity: Vec2, angular_velocity_deg: f32) -> Self {
        Self {
            body_key: body_key.into(),
            body: None,
            motion: Motion {
                velocity,
                angular_velocity: angular_velocity_deg.to_radians(),
            },
        }
    }

    pub fn factory(options: InteractorOptions) -> Result<Box<dyn Interactor>> {
        let config: SpinConfig = options.parse()?;
        Ok(Box::new(Self::new(
            config.body,
            Vec2::from_array(config.velocity),
            config.angular_velocity,
        )))
    }
}

impl Interactor for SpinScript {
    fn name(&self) -> &str {
        "spin"
    }

    fn start_up(&mut self, world: &mut SimWorld) -> Result<()> {
        let id = world
            .get_id(&self.body_key)
            .filter(|id| world.is_body(*id))
            .ok_or_else(|| SimError::BodyNotFound(self.body_key.clone()))?;
        self.body = Some(id);
        Ok(())
    }

    fn tick(&mut self, world: &mut SimWorld, _tick: u64) -> Result<()> {
        // The body may have been removed since setup
        match self.body {
            Some(id) if world.contains(id) => world.set_motion(id, self.motion),
            _ => Ok(()),
        }
    }
}
