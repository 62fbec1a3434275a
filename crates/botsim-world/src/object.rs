//! Object metadata and per-object ECS components

use botsim_core::{ObjectId, Vec2};
use serde::{Deserialize, Serialize};

/// Information about an object for lookups and snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub id: ObjectId,
    /// Unique key across the whole world
    pub key: String,
    pub kind: String,
    pub z_pos: f32,
    /// Remaining descriptor fields
    #[serde(default)]
    pub data: toml::Table,
}

impl ObjectInfo {
    pub fn new(id: ObjectId, key: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
            kind: kind.into(),
            z_pos: 0.0,
            data: toml::Table::new(),
        }
    }

    pub fn with_z_pos(mut self, z_pos: f32) -> Self {
        self.z_pos = z_pos;
        self
    }
}

/// Marker component for physical bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct Body;

/// Velocities consumed by the physics step
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub velocity: Vec2,
    /// Radians per second
    pub angular_velocity: f32,
}
