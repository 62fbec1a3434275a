//! Botsim Device - devices attached to physical bodies
//!
//! A device is a fixed frame on a body. Its interactors own the objects
//! that make up the device and keep them placed as the body moves:
//! - `Device` / `DeviceClass` - the frame and its typed behaviour
//! - `DeviceInteractor` - generated elements and their per-tick placement
//! - `DeviceInstantiator` - builds devices from descriptors and type configs
//! - `DeviceStore` - devices by identity, with their ports and interactors

mod config;
mod device;
mod instantiator;
mod interactor;
mod palette;
mod registry;
mod store;

pub use config::{DeviceDescriptor, DeviceTypeConfig, InteractorSpec};
pub use device::{ButtonDevice, Device, DeviceClass, PlainDevice};
pub use instantiator::{DeviceInstantiator, InstantiatedDevice};
pub use interactor::{compose_element_pose, DeviceIdentity, DeviceInteractor, InteractorOptions};
pub use palette::Palette;
pub use registry::{
    DeviceClassRegistry, DeviceCtor, DeviceTypeRegistry, InteractorFactory, InteractorRegistry,
};
pub use store::{DeviceEntry, DeviceKey, DeviceStore};
