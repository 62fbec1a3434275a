//! Building devices from descriptors

use crate::config::DeviceDescriptor;
use crate::device::{Device, DeviceClass};
use crate::interactor::{DeviceIdentity, InteractorOptions};
use crate::palette::Palette;
use crate::registry::{DeviceClassRegistry, DeviceTypeRegistry, InteractorRegistry};
use crate::store::DeviceKey;
use botsim_core::{BodyId, InteractorId, Result, SimError};
use botsim_runtime::{Interactor, Scheduler, Tier};
use botsim_world::SimWorld;
use tracing::info;

/// A device and the interactors registered for it
pub struct InstantiatedDevice {
    pub key: DeviceKey,
    pub device: Box<dyn DeviceClass>,
    pub port: String,
    /// Interactor ids in config order
    pub interactors: Vec<InteractorId>,
}

/// Resolves a descriptor against the registries and builds its device
pub struct DeviceInstantiator<'a> {
    types: &'a DeviceTypeRegistry,
    classes: &'a DeviceClassRegistry,
    interactors: &'a InteractorRegistry,
}

impl<'a> DeviceInstantiator<'a> {
    pub fn new(
        types: &'a DeviceTypeRegistry,
        classes: &'a DeviceClassRegistry,
        interactors: &'a InteractorRegistry,
    ) -> Self {
        Self {
            types,
            classes,
            interactors,
        }
    }

    /// Build one device on `parent`.
    ///
    /// All-or-nothing: the config is parsed, every class resolved and every
    /// interactor constructed before anything is written. On error the
    /// palette, scheduler and world are exactly as they were.
    ///
    /// Interactors go to the scheduler's device tier, so their hooks run
    /// before every generic script of the same tick. Their setup runs on the
    /// scheduler's next `start_pending`.
    pub fn instantiate(
        &self,
        descriptor: &DeviceDescriptor,
        parent: BodyId,
        device_index: usize,
        world: &mut SimWorld,
        scheduler: &mut Scheduler,
        palette: &mut Palette,
    ) -> Result<InstantiatedDevice> {
        let config = self.types.load_config(&descriptor.name)?;
        let ctor = self.classes.get(&config.class)?;
        if !world.is_body(parent) {
            return Err(SimError::BodyNotFound(parent.to_string()));
        }

        let relative_location = descriptor.relative_location();
        let relative_rotation = descriptor.relative_rotation();
        let device = ctor(Device::new(parent, relative_location, relative_rotation));

        let mut built: Vec<Box<dyn Interactor>> = Vec::with_capacity(config.interactors.len());
        for (single_device_index, spec) in config.interactors.iter().enumerate() {
            let factory = self.interactors.get(&spec.class)?;
            let identity = DeviceIdentity {
                device: device.device_type().to_string(),
                parent,
                relative_location,
                relative_rotation,
                device_index,
                single_device_index,
                port: descriptor.port.clone(),
            };
            built.push(factory(InteractorOptions::merge(spec.kwargs.clone(), identity))?);
        }

        palette.merge(&config.colours);
        let mut ids = Vec::with_capacity(built.len());
        for interactor in built {
            let id = scheduler.register(Tier::Device, interactor);
            world.attach_device_interactor(parent, id)?;
            ids.push(id);
        }

        info!(
            name = %descriptor.name,
            port = %descriptor.port,
            device_index,
            interactors = ids.len(),
            "device instantiated"
        );

        Ok(InstantiatedDevice {
            key: DeviceKey::new(parent, device_index),
            device,
            port: descriptor.port.clone(),
            interactors: ids,
        })
    }
}
