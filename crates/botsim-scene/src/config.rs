//! Layered simulation configuration
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `BOTSIM_TICKS`, `BOTSIM_DT`,
//!    `BOTSIM_STRICT_DEVICES`, `BOTSIM_DEVICE_REGISTRY`
//! 2. The config file (`botsim.toml` by default)
//! 3. Built-in defaults

use botsim_core::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SimulationSection {
    #[serde(default = "default_ticks")]
    ticks: u64,
    /// Seconds per tick
    #[serde(default = "default_dt")]
    dt: f32,
    /// Abort the scene when a device fails to build
    #[serde(default)]
    strict_devices: bool,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            dt: default_dt(),
            strict_devices: false,
        }
    }
}

fn default_ticks() -> u64 {
    60
}

fn default_dt() -> f32 {
    1.0 / 60.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DevicesSection {
    /// Device type registry, relative to the config file
    #[serde(default = "default_registry")]
    registry: PathBuf,
}

impl Default for DevicesSection {
    fn default() -> Self {
        Self {
            registry: default_registry(),
        }
    }
}

fn default_registry() -> PathBuf {
    PathBuf::from("devices/classes.toml")
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SimConfigFile {
    #[serde(default)]
    simulation: SimulationSection,
    #[serde(default)]
    devices: DevicesSection,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub ticks: u64,
    pub dt: f32,
    pub strict_devices: bool,
    pub device_registry: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_file(SimConfigFile::default(), Path::new("."))
    }
}

impl SimConfig {
    /// Load config: defaults < file (if it exists) < environment
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::load_file(path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load a config file without environment overrides
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&content, base).map_err(|e| match e {
            SimError::TomlParseError(message) => SimError::ConfigParse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse config content, resolving relative paths against `base`
    pub fn parse(content: &str, base: &Path) -> Result<Self> {
        let file: SimConfigFile = toml::from_str(content)?;
        Ok(Self::from_file(file, base))
    }

    fn from_file(file: SimConfigFile, base: &Path) -> Self {
        Self {
            ticks: file.simulation.ticks,
            dt: file.simulation.dt,
            strict_devices: file.simulation.strict_devices,
            device_registry: base.join(file.devices.registry),
        }
    }

    /// Apply overrides from a variable lookup such as the process environment
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("BOTSIM_TICKS") {
            self.ticks = parse_var("BOTSIM_TICKS", &value)?;
        }
        if let Some(value) = lookup("BOTSIM_DT") {
            self.dt = parse_var("BOTSIM_DT", &value)?;
        }
        if let Some(value) = lookup("BOTSIM_STRICT_DEVICES") {
            self.strict_devices = parse_var("BOTSIM_STRICT_DEVICES", &value)?;
        }
        if let Some(value) = lookup("BOTSIM_DEVICE_REGISTRY") {
            self.device_registry = PathBuf::from(value);
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| SimError::InvalidField {
        field: name.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.ticks, 60);
        assert!((config.dt - 1.0 / 60.0).abs() < 1e-9);
        assert!(!config.strict_devices);
        assert_eq!(config.device_registry, Path::new("./devices/classes.toml"));
    }

    #[test]
    fn test_parse_partial_file() {
        let config = SimConfig::parse(
            r#"
[simulation]
ticks = 10
strict_devices = true
"#,
            Path::new("/project"),
        )
        .unwrap();
        assert_eq!(config.ticks, 10);
        assert!(config.strict_devices);
        assert_eq!(
            config.device_registry,
            Path::new("/project/devices/classes.toml")
        );
    }

    #[test]
    fn test_overrides_win() {
        let mut config = SimConfig::default();
        let vars: HashMap<&str, &str> = [
            ("BOTSIM_TICKS", "5"),
            ("BOTSIM_STRICT_DEVICES", "true"),
            ("BOTSIM_DEVICE_REGISTRY", "/etc/botsim/classes.toml"),
        ]
        .into_iter()
        .collect();

        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.ticks, 5);
        assert!(config.strict_devices);
        assert_eq!(config.device_registry, Path::new("/etc/botsim/classes.toml"));
    }

    #[test]
    fn test_bad_override() {
        let mut config = SimConfig::default();
        let result = config.apply_overrides(|k| (k == "BOTSIM_TICKS").then(|| "many".to_string()));
        assert!(matches!(result, Err(SimError::InvalidField { field, .. }) if field == "BOTSIM_TICKS"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SimConfig::load_file(&dir.path().join("absent.toml"));
        assert!(config.is_err());

        let config = SimConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.device_registry, Path::new("./devices/classes.toml").to_path_buf());
    }

    #[test]
    fn test_load_file_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("botsim.toml");
        fs::write(&path, "[simulation\n").unwrap();
        assert!(matches!(
            SimConfig::load_file(&path),
            Err(SimError::ConfigParse { .. })
        ));
    }
}
