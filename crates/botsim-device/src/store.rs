//! Devices by identity

use crate::device::DeviceClass;
use crate::instantiator::InstantiatedDevice;
use botsim_core::{BodyId, InteractorId};
use std::collections::BTreeMap;

/// Identity of a device: its body and its position among the body's devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceKey {
    pub body: BodyId,
    pub index: usize,
}

impl DeviceKey {
    pub fn new(body: BodyId, index: usize) -> Self {
        Self { body, index }
    }
}

pub struct DeviceEntry {
    pub device: Box<dyn DeviceClass>,
    pub port: String,
    /// Interactors built for this device, in config order
    pub interactors: Vec<InteractorId>,
}

/// Owns every built device and maps it to its interactors.
///
/// Devices hold no reference to their interactors; lookups in either
/// direction go through this table.
#[derive(Default)]
pub struct DeviceStore {
    entries: BTreeMap<DeviceKey, DeviceEntry>,
}

impl DeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, built: InstantiatedDevice) -> DeviceKey {
        let key = built.key;
        self.entries.insert(
            key,
            DeviceEntry {
                device: built.device,
                port: built.port,
                interactors: built.interactors,
            },
        );
        key
    }

    pub fn get(&self, key: DeviceKey) -> Option<&DeviceEntry> {
        self.entries.get(&key)
    }

    pub fn get_mut(&mut self, key: DeviceKey) -> Option<&mut DeviceEntry> {
        self.entries.get_mut(&key)
    }

    /// Device owning an interactor
    pub fn device_of(&self, interactor: InteractorId) -> Option<DeviceKey> {
        self.entries
            .iter()
            .find(|(_, e)| e.interactors.contains(&interactor))
            .map(|(k, _)| *k)
    }

    /// Devices of one body, ordered by device index
    pub fn for_body(&self, body: BodyId) -> impl Iterator<Item = (&DeviceKey, &DeviceEntry)> {
        self.entries.iter().filter(move |(k, _)| k.body == body)
    }

    /// Drop a body's devices, returning the interactors they owned
    pub fn remove_body(&mut self, body: BodyId) -> Vec<InteractorId> {
        let keys: Vec<DeviceKey> = self.for_body(body).map(|(k, _)| *k).collect();
        keys.into_iter()
            .filter_map(|k| self.entries.remove(&k))
            .flat_map(|e| e.interactors)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DeviceKey, &DeviceEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop one device, returning its entry
    pub fn remove(&mut self, key: DeviceKey) -> Option<DeviceEntry> {
        self.entries.remove(&key)
    }
}
