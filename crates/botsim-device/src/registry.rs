//! Registries resolving names from configuration to code
//!
//! Device and interactor classes are looked up by id in tables populated at
//! startup. Device type names are looked up in the registry file that maps
//! each type to its config.

use crate::config::DeviceTypeConfig;
use crate::device::{ButtonDevice, Device, DeviceClass, PlainDevice};
use crate::interactor::{DeviceInteractor, InteractorOptions};
use botsim_core::{Result, SimError};
use botsim_runtime::Interactor;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Builds a device class from its frame
pub type DeviceCtor = fn(Device) -> Box<dyn DeviceClass>;

/// Builds an interactor from merged options
pub type InteractorFactory = fn(InteractorOptions) -> Result<Box<dyn Interactor>>;

/// Device class id -> constructor
#[derive(Default)]
pub struct DeviceClassRegistry {
    classes: HashMap<String, DeviceCtor>,
}

impl DeviceClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `device` and `button`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("device", plain_device);
        registry.register("button", button_device);
        registry
    }

    /// Register a class; a later registration under the same id replaces it
    pub fn register(&mut self, id: impl Into<String>, ctor: DeviceCtor) {
        self.classes.insert(id.into(), ctor);
    }

    pub fn get(&self, id: &str) -> Result<DeviceCtor> {
        self.classes
            .get(id)
            .copied()
            .ok_or_else(|| SimError::UnknownDeviceClass(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.classes.contains_key(id)
    }
}

fn plain_device(frame: Device) -> Box<dyn DeviceClass> {
    Box::new(PlainDevice::new(frame))
}

fn button_device(frame: Device) -> Box<dyn DeviceClass> {
    Box::new(ButtonDevice::new(frame))
}

/// Interactor class id -> factory
#[derive(Default)]
pub struct InteractorRegistry {
    factories: HashMap<String, InteractorFactory>,
}

impl InteractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the generic `device` interactor
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("device", DeviceInteractor::factory);
        registry
    }

    pub fn register(&mut self, id: impl Into<String>, factory: InteractorFactory) {
        self.factories.insert(id.into(), factory);
    }

    pub fn get(&self, id: &str) -> Result<InteractorFactory> {
        self.factories
            .get(id)
            .copied()
            .ok_or_else(|| SimError::UnknownInteractorClass(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }
}

#[derive(Debug, Clone)]
enum ConfigSource {
    File(PathBuf),
    Inline(String),
}

/// Device type name -> per-type configuration
///
/// Loaded from a registry file of the form `type_name = "path.toml"`, with
/// paths relative to the registry file. Configs are read and parsed on
/// every lookup.
#[derive(Debug, Clone, Default)]
pub struct DeviceTypeRegistry {
    types: BTreeMap<String, ConfigSource>,
}

impl DeviceTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&content, base, &path.display().to_string())
    }

    /// Parse registry content, resolving relative paths against `base`
    pub fn parse(content: &str, base: &Path, origin: &str) -> Result<Self> {
        let entries: BTreeMap<String, String> =
            toml::from_str(content).map_err(|e| SimError::ConfigParse {
                path: origin.to_string(),
                message: e.to_string(),
            })?;

        let types = entries
            .into_iter()
            .map(|(name, file)| (name, ConfigSource::File(base.join(file))))
            .collect();
        Ok(Self { types })
    }

    /// Register a type backed by a config file
    pub fn insert_file(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.types.insert(name.into(), ConfigSource::File(path.into()));
    }

    /// Register a type backed by in-memory TOML
    pub fn insert_inline(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.types.insert(name.into(), ConfigSource::Inline(content.into()));
    }

    /// Path of the config file for a type, `None` for inline types
    pub fn config_path(&self, name: &str) -> Result<Option<&Path>> {
        match self.source(name)? {
            ConfigSource::File(path) => Ok(Some(path.as_path())),
            ConfigSource::Inline(_) => Ok(None),
        }
    }

    fn source(&self, name: &str) -> Result<&ConfigSource> {
        self.types
            .get(name)
            .ok_or_else(|| SimError::UnknownDeviceType(name.to_string()))
    }

    /// Read and parse the config for a type
    pub fn load_config(&self, name: &str) -> Result<DeviceTypeConfig> {
        match self.source(name)? {
            ConfigSource::File(path) => DeviceTypeConfig::load(path),
            ConfigSource::Inline(content) => {
                DeviceTypeConfig::parse(content, &format!("<inline:{}>", name))
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
