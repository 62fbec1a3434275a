//! Device registry check command

use anyhow::{bail, Result};
use botsim_device::DeviceTypeRegistry;
use botsim_scene::Registries;
use std::path::Path;

/// Problems found with one device type
#[derive(Debug)]
pub struct TypeReport {
    pub name: String,
    pub problems: Vec<String>,
}

/// Load every type in the registry and resolve its classes
pub fn check_registry(registry: &Path) -> Result<Vec<TypeReport>> {
    let types = DeviceTypeRegistry::load(registry)?;
    let names: Vec<String> = types.names().map(String::from).collect();
    let registries = Registries::with_types(types);

    let reports = names
        .into_iter()
        .map(|name| {
            let mut problems = Vec::new();
            match registries.types.load_config(&name) {
                Ok(config) => {
                    if !registries.classes.contains(&config.class) {
                        problems.push(format!("unknown device class '{}'", config.class));
                    }
                    for spec in &config.interactors {
                        if !registries.interactors.contains(&spec.class) {
                            problems.push(format!("unknown interactor class '{}'", spec.class));
                        }
                    }
                }
                Err(e) => problems.push(e.to_string()),
            }
            TypeReport { name, problems }
        })
        .collect();
    Ok(reports)
}

pub fn run(registry: &Path) -> Result<()> {
    let reports = check_registry(registry)?;
    let failed = reports.iter().filter(|r| !r.problems.is_empty()).count();

    for report in &reports {
        if report.problems.is_empty() {
            println!("  ok    {}", report.name);
        } else {
            for problem in &report.problems {
                println!("  error {}: {}", report.name, problem);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} device type(s) failed", failed, reports.len());
    }
    println!("{} device type(s) ok", reports.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_check_registry() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("classes.toml"),
            "button = \"button.toml\"\nlaser = \"laser.toml\"\nmissing = \"missing.toml\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("button.toml"),
            "class = \"button\"\n[[interactors]]\nclass = \"device\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("laser.toml"),
            "class = \"laser\"\n[[interactors]]\nclass = \"beam\"\n",
        )
        .unwrap();

        let reports = check_registry(&dir.path().join("classes.toml")).unwrap();
        assert_eq!(reports.len(), 3);

        let button = reports.iter().find(|r| r.name == "button").unwrap();
        assert!(button.problems.is_empty());

        let laser = reports.iter().find(|r| r.name == "laser").unwrap();
        assert_eq!(laser.problems.len(), 2);

        let missing = reports.iter().find(|r| r.name == "missing").unwrap();
        assert_eq!(missing.problems.len(), 1);
    }

    #[test]
    fn test_missing_registry() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_registry(&dir.path().join("absent.toml")).is_err());
    }
}
