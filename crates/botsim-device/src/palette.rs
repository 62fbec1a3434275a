//! Colour palette shared by everything built from one scene

use std::collections::BTreeMap;
use tracing::debug;

/// Named colours, threaded through scene construction.
///
/// Merges are last-write-wins, so the final palette depends on the order
/// devices are built in; scene loading keeps that order equal to the
/// descriptor order in the scene file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    colours: BTreeMap<String, String>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, overrides: &BTreeMap<String, String>) {
        for (name, colour) in overrides {
            if let Some(previous) = self.colours.insert(name.clone(), colour.clone()) {
                if previous != *colour {
                    debug!(%name, %previous, %colour, "palette colour overridden");
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.colours.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colours.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.colours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }
}
