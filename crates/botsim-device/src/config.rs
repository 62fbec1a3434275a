//! Device descriptors and per-type configuration files

use botsim_core::{Result, SimError, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A device as placed on a body in a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Device type name, must match a registry entry
    pub name: String,
    /// Offset in the parent's local frame
    #[serde(default)]
    pub position: [f32; 2],
    /// Rotation relative to the parent, in degrees
    #[serde(default)]
    pub rotation: f32,
    /// Opaque address forwarded to interactors unchanged
    pub port: String,
}

impl DeviceDescriptor {
    pub fn new(name: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: [0.0, 0.0],
            rotation: 0.0,
            port: port.into(),
        }
    }

    pub fn with_position(mut self, position: [f32; 2]) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn relative_location(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    /// Rotation in radians
    pub fn relative_rotation(&self) -> f32 {
        self.rotation.to_radians()
    }
}

/// One `[[interactors]]` entry of a device type config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractorSpec {
    /// Interactor class id, resolved through the `InteractorRegistry`
    pub class: String,
    #[serde(default)]
    pub kwargs: toml::Table,
}

/// Parsed per-type device configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceTypeConfig {
    /// Device class id, resolved through the `DeviceClassRegistry`
    pub class: String,
    /// Palette overrides merged when a device of this type is built
    #[serde(default)]
    pub colours: BTreeMap<String, String>,
    #[serde(default)]
    pub interactors: Vec<InteractorSpec>,
}

impl DeviceTypeConfig {
    /// Parse a config; `origin` names the source in error messages
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SimError::ConfigParse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::parse(&content, &path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_descriptor_defaults() {
        let desc: DeviceDescriptor = toml::from_str(
            r#"
name = "button"
port = "up"
"#,
        )
        .unwrap();
        assert_eq!(desc.relative_location(), Vec2::ZERO);
        assert_eq!(desc.relative_rotation(), 0.0);
    }

    #[test]
    fn test_descriptor_rotation_is_degrees() {
        let desc = DeviceDescriptor::new("button", "up")
            .with_position([1.0, 0.0])
            .with_rotation(90.0);
        assert!((desc.relative_rotation() - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(desc.relative_location(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_descriptor_requires_port() {
        let result: std::result::Result<DeviceDescriptor, _> = toml::from_str(r#"name = "button""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_type_config() {
        let config = DeviceTypeConfig::parse(
            r##"
class = "button"

[colours]
button_red = "#ff0000"

[[interactors]]
class = "device"

[interactors.kwargs]
name = "button"

[[interactors.kwargs.elements]]
key = "light"
position = [0, 0.5]
"##,
            "button.toml",
        )
        .unwrap();

        assert_eq!(config.class, "button");
        assert_eq!(config.colours.get("button_red").map(String::as_str), Some("#ff0000"));
        assert_eq!(config.interactors.len(), 1);
        assert_eq!(config.interactors[0].class, "device");
        assert!(config.interactors[0].kwargs.contains_key("elements"));
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = DeviceTypeConfig::parse("class = ", "broken.toml").unwrap_err();
        match err {
            SimError::ConfigParse { path, .. } => assert_eq!(path, "broken.toml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.toml");
        fs::write(&path, "class = \"device\"\n").unwrap();

        let config = DeviceTypeConfig::load(&path).unwrap();
        assert_eq!(config.class, "device");
        assert!(config.interactors.is_empty());
        assert!(config.colours.is_empty());
    }
}
