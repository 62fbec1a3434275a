//! The assembled simulation: world, scheduler, devices and palette

use crate::config::SimConfig;
use crate::format::SceneFile;
use crate::scripts::SpinScript;
use botsim_core::{Pose, Result, SimError, Vec2};
use botsim_device::{
    DeviceClassRegistry, DeviceInstantiator, DeviceKey, DeviceStore, DeviceTypeRegistry,
    InteractorOptions, InteractorRegistry, Palette,
};
use botsim_runtime::{KinematicPhysics, PhysicsStep, Scheduler, Tier};
use botsim_world::{Motion, SimWorld};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Name lookups used while building a scene
pub struct Registries {
    pub types: DeviceTypeRegistry,
    pub classes: DeviceClassRegistry,
    pub interactors: InteractorRegistry,
}

impl Registries {
    /// Built-in classes and scripts over the given device types
    pub fn with_types(types: DeviceTypeRegistry) -> Self {
        let mut interactors = InteractorRegistry::with_builtins();
        interactors.register("spin", SpinScript::factory);
        Self {
            types,
            classes: DeviceClassRegistry::with_builtins(),
            interactors,
        }
    }
}

/// Pose of one object, for output
#[derive(Debug, Clone, Serialize)]
pub struct ObjectPose {
    pub key: String,
    pub kind: String,
    pub position: [f32; 2],
    /// Radians
    pub rotation: f32,
}

/// A loaded scene ready to tick
pub struct Simulation {
    name: String,
    world: SimWorld,
    scheduler: Scheduler,
    devices: DeviceStore,
    palette: Palette,
    physics: Box<dyn PhysicsStep>,
    dt: f32,
}

impl Simulation {
    /// Load a scene file, reading device types from the configured registry
    pub fn load<P: AsRef<Path>>(path: P, config: &SimConfig) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let types = DeviceTypeRegistry::load(&config.device_registry)?;
        Self::load_str(&content, &Registries::with_types(types), config)
    }

    /// Load a scene from a TOML string
    pub fn load_str(content: &str, registries: &Registries, config: &SimConfig) -> Result<Self> {
        let scene: SceneFile = toml::from_str(content)?;
        Self::build(&scene, registries, config)
    }

    /// Build a simulation from a parsed scene.
    ///
    /// Bodies are spawned first, then devices are built body by body in file
    /// order, so palette overrides always land in the same order. A device
    /// that fails to build is skipped with a warning unless
    /// `strict_devices` is set.
    pub fn build(scene: &SceneFile, registries: &Registries, config: &SimConfig) -> Result<Self> {
        let mut world = SimWorld::new();
        let mut scheduler = Scheduler::new();
        let mut devices = DeviceStore::new();
        let mut palette = Palette::new();

        let mut body_ids = Vec::with_capacity(scene.bodies.len());
        for body in &scene.bodies {
            let pose = Pose::new(Vec2::from_array(body.position), body.rotation.to_radians());
            let id = world.spawn_body(body.key.clone(), pose, body.z_pos)?;
            world.set_motion(
                id,
                Motion {
                    velocity: Vec2::from_array(body.velocity),
                    angular_velocity: body.angular_velocity.to_radians(),
                },
            )?;
            body_ids.push(id);
        }

        let instantiator = DeviceInstantiator::new(
            &registries.types,
            &registries.classes,
            &registries.interactors,
        );
        for (body, id) in scene.bodies.iter().zip(&body_ids) {
            for (device_index, descriptor) in body.devices.iter().enumerate() {
                match instantiator.instantiate(
                    descriptor,
                    *id,
                    device_index,
                    &mut world,
                    &mut scheduler,
                    &mut palette,
                ) {
                    Ok(built) => {
                        devices.insert(built);
                    }
                    Err(e) if !config.strict_devices => {
                        warn!(
                            body = %body.key,
                            device = %descriptor.name,
                            port = %descriptor.port,
                            error = %e,
                            "device skipped"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        for script in &scene.scripts {
            let factory = registries.interactors.get(&script.class)?;
            let interactor = factory(InteractorOptions::from_kwargs(script.kwargs.clone()))?;
            scheduler.register(Tier::Generic, interactor);
        }

        info!(
            scene = %scene.scene.name,
            bodies = body_ids.len(),
            devices = devices.len(),
            interactors = scheduler.len(),
            "scene loaded"
        );

        Ok(Self {
            name: scene.scene.name.clone(),
            world,
            scheduler,
            devices,
            palette,
            physics: Box::new(KinematicPhysics),
            dt: config.dt,
        })
    }

    /// Replace the physics step
    pub fn with_physics(mut self, physics: Box<dyn PhysicsStep>) -> Self {
        self.physics = physics;
        self
    }

    /// Run setup for every interactor not yet set up
    pub fn start(&mut self) -> Result<()> {
        let result = self.scheduler.start_pending(&mut self.world);
        self.drop_failed_devices();
        result
    }

    /// Advance one tick
    pub fn step(&mut self) -> Result<()> {
        let result = self
            .scheduler
            .run_tick(&mut self.world, self.physics.as_mut(), self.dt);
        self.drop_failed_devices();
        result
    }

    /// Drop every device owning an interactor whose setup failed.
    ///
    /// The device leaves the store and all of its interactors are
    /// unregistered and detached from the body, so nothing refers to the
    /// failed id afterwards.
    fn drop_failed_devices(&mut self) {
        for failed in self.scheduler.take_failed() {
            let Some(key) = self.devices.device_of(failed) else {
                continue;
            };
            let Some(entry) = self.devices.remove(key) else {
                continue;
            };
            self.scheduler.remove(&entry.interactors);
            for id in &entry.interactors {
                self.world.detach_device_interactor(key.body, *id);
            }
            warn!(
                body = ?self.world.key(key.body),
                index = key.index,
                port = %entry.port,
                interactor = %failed,
                "device dropped after failed setup"
            );
        }
    }

    /// Feed an input such as a button press to the device at `index` on `body`
    pub fn set_device_input(
        &mut self,
        body: &str,
        index: usize,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        let id = self
            .world
            .get_id(body)
            .filter(|id| self.world.is_body(*id))
            .ok_or_else(|| SimError::BodyNotFound(body.to_string()))?;
        let entry = self
            .devices
            .get_mut(DeviceKey::new(id, index))
            .ok_or_else(|| SimError::ObjectNotFound(format!("{}[{}]", body, index)))?;
        entry.device.set_input(field, value)
    }

    pub fn run(&mut self, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    /// Remove a body with its devices, their interactors and generated objects
    pub fn remove_body(&mut self, key: &str) -> Result<()> {
        let id = self
            .world
            .get_id(key)
            .filter(|id| self.world.is_body(*id))
            .ok_or_else(|| SimError::BodyNotFound(key.to_string()))?;

        let mut interactors = self.devices.remove_body(id);
        if let Some(attached) = self.world.device_interactors(id) {
            interactors.extend_from_slice(attached);
        }
        let unregistered = self.scheduler.remove(&interactors);
        let removed = self.world.despawn_recursive(id)?;

        info!(body = %key, objects = removed.len(), interactors = unregistered, "body removed");
        Ok(())
    }

    /// Device states as exposed to outward-facing protocols
    pub fn device_objects(&self) -> Vec<serde_json::Value> {
        self.devices
            .iter()
            .map(|(key, entry)| {
                json!({
                    "body": self.world.key(key.body),
                    "index": key.index,
                    "name": entry.device.object_name(&entry.port),
                    "state": entry.device.to_object(&entry.port),
                })
            })
            .collect()
    }

    /// Poses of every object, ordered by id
    pub fn object_poses(&self) -> Vec<ObjectPose> {
        self.world
            .objects()
            .into_iter()
            .filter_map(|info| {
                let pose = self.world.pose(info.id)?;
                Some(ObjectPose {
                    key: info.key.clone(),
                    kind: info.kind.clone(),
                    position: pose.position.to_array(),
                    rotation: pose.rotation,
                })
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn devices(&self) -> &DeviceStore {
        &self.devices
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn tick_count(&self) -> u64 {
        self.scheduler.tick_count()
    }
}
