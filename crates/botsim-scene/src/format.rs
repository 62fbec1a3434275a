//! Scene file format definitions

use botsim_device::DeviceDescriptor;
use serde::{Deserialize, Serialize};

/// Root structure of a scene TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub scene: SceneMetadata,
    #[serde(default)]
    pub bodies: Vec<BodyDef>,
    #[serde(default)]
    pub scripts: Vec<ScriptDef>,
}

/// Scene metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneMetadata {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// A physical body and the devices mounted on it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyDef {
    pub key: String,
    #[serde(default)]
    pub position: [f32; 2],
    /// Heading in degrees
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub z_pos: f32,
    /// Velocity in the body's own frame
    #[serde(default)]
    pub velocity: [f32; 2],
    /// Degrees per second
    #[serde(default)]
    pub angular_velocity: f32,
    /// Device descriptors; the position in this list is the device index
    #[serde(default)]
    pub devices: Vec<DeviceDescriptor>,
}

impl BodyDef {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            position: [0.0, 0.0],
            rotation: 0.0,
            z_pos: 0.0,
            velocity: [0.0, 0.0],
            angular_velocity: 0.0,
            devices: Vec::new(),
        }
    }

    pub fn with_device(mut self, device: DeviceDescriptor) -> Self {
        self.devices.push(device);
        self
    }
}

/// A generic script, run after every device interactor in each phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptDef {
    pub class: String,
    #[serde(default)]
    pub kwargs: toml::Table,
}

impl SceneFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scene: SceneMetadata {
                name: name.into(),
                version: default_version(),
                description: None,
            },
            bodies: Vec::new(),
            scripts: Vec::new(),
        }
    }

    pub fn add_body(&mut self, body: BodyDef) {
        self.bodies.push(body);
    }
}
