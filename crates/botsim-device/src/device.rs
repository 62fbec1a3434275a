//! Device frames and device classes

use botsim_core::{BodyId, Result, SimError, Vec2};
use botsim_world::SimWorld;
use serde_json::json;

/// A device's fixed placement on a physical body.
///
/// The device does not own its parent; it only names it. Positions derived
/// from the parent are read from the world on every call and never cached,
/// since the parent moves every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub parent: BodyId,
    /// Offset in the parent's local frame
    pub relative_pos: Vec2,
    /// Rotation relative to the parent's frame, in radians
    pub relative_rot: f32,
}

impl Device {
    pub fn new(parent: BodyId, relative_pos: Vec2, relative_rot: f32) -> Self {
        Self {
            parent,
            relative_pos,
            relative_rot,
        }
    }

    /// `parent.position + R(parent.rotation) · relative_pos`
    pub fn global_position(&self, world: &SimWorld) -> Result<Vec2> {
        let pose = world
            .pose(self.parent)
            .ok_or_else(|| SimError::BodyNotFound(self.parent.to_string()))?;
        Ok(pose.transform_point(self.relative_pos))
    }

    /// World heading of the device in radians
    pub fn global_rotation(&self, world: &SimWorld) -> Result<f32> {
        let pose = world
            .pose(self.parent)
            .ok_or_else(|| SimError::BodyNotFound(self.parent.to_string()))?;
        Ok(pose.rotation + self.relative_rot)
    }
}

/// Typed behaviour of a device, constructed from its type config's `class`
pub trait DeviceClass {
    /// Driver-facing type name
    fn device_type(&self) -> &str;

    fn frame(&self) -> &Device;

    /// Object name the device is exposed under for `port`
    fn object_name(&self, port: &str) -> String {
        format!("{}{}", self.device_type(), port)
    }

    /// Snapshot of the device state as seen by outward-facing protocols
    fn to_object(&self, port: &str) -> serde_json::Value {
        json!({
            "address": port,
            "device_type": self.device_type(),
        })
    }

    /// Apply an input from outside the simulation, such as a key press
    fn set_input(&mut self, field: &str, _value: &serde_json::Value) -> Result<()> {
        Err(SimError::InvalidField {
            field: field.to_string(),
            message: format!("{} devices take no input", self.device_type()),
        })
    }
}

/// A device with no state beyond its frame
#[derive(Debug, Clone)]
pub struct PlainDevice {
    frame: Device,
}

impl PlainDevice {
    pub fn new(frame: Device) -> Self {
        Self { frame }
    }
}

impl DeviceClass for PlainDevice {
    fn device_type(&self) -> &str {
        "device"
    }

    fn frame(&self) -> &Device {
        &self.frame
    }
}

/// A push button on the robot brick
#[derive(Debug, Clone)]
pub struct ButtonDevice {
    frame: Device,
    pressed: bool,
}

impl ButtonDevice {
    pub fn new(frame: Device) -> Self {
        Self {
            frame,
            pressed: false,
        }
    }

    pub fn pressed(&self) -> bool {
        self.pressed
    }
}

impl DeviceClass for ButtonDevice {
    fn device_type(&self) -> &str {
        "brick_button"
    }

    fn frame(&self) -> &Device {
        &self.frame
    }

    fn object_name(&self, port: &str) -> String {
        format!("button{}", port)
    }

    fn to_object(&self, port: &str) -> serde_json::Value {
        json!({
            "address": port,
            "driver_name": "ev3sim-button",
            "pressed": self.pressed,
        })
    }

    fn set_input(&mut self, field: &str, value: &serde_json::Value) -> Result<()> {
        match (field, value.as_bool()) {
            ("pressed", Some(pressed)) => {
                self.pressed = pressed;
                Ok(())
            }
            ("pressed", None) => Err(SimError::InvalidField {
                field: field.to_string(),
                message: format!("expected a boolean, got {}", value),
            }),
            _ => Err(SimError::InvalidField {
                field: field.to_string(),
                message: "buttons only take `pressed`".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botsim_core::{rotate, Pose};
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    const EPS: f32 = 1e-5;

    #[test]
    fn test_global_position_matches_rotation_matrix() {
        let mut world = SimWorld::new();
        let body = world
            .spawn_body("robot", Pose::new(Vec2::new(3.0, -2.0), 0.0), 0.0)
            .unwrap();
        let offsets = [
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 2.5),
            Vec2::new(-1.5, 0.75),
        ];

        for step in 0..12 {
            let theta = step as f32 * TAU / 12.0;
            world
                .set_pose(body, Pose::new(Vec2::new(3.0, -2.0), theta))
                .unwrap();

            for r in offsets {
                let device = Device::new(body, r, 0.0);
                let got = device.global_position(&world).unwrap();
                let (s, c) = theta.sin_cos();
                let expected = Vec2::new(3.0 + c * r.x - s * r.y, -2.0 + s * r.x + c * r.y);
                assert!(got.approx_eq(&expected, EPS), "theta={} got {:?}", theta, got);
                assert!(got.approx_eq(&(Vec2::new(3.0, -2.0) + rotate(r, theta)), EPS));
            }
        }
    }

    #[test]
    fn test_global_position_follows_parent() {
        let mut world = SimWorld::new();
        let body = world.spawn_body("robot", Pose::IDENTITY, 0.0).unwrap();
        let device = Device::new(body, Vec2::new(1.0, 0.0), FRAC_PI_2);

        assert!(device
            .global_position(&world)
            .unwrap()
            .approx_eq(&Vec2::new(1.0, 0.0), EPS));

        world.set_pose(body, Pose::new(Vec2::new(0.0, 1.0), PI)).unwrap();
        assert!(device
            .global_position(&world)
            .unwrap()
            .approx_eq(&Vec2::new(-1.0, 1.0), EPS));
        assert!((device.global_rotation(&world).unwrap() - (PI + FRAC_PI_2)).abs() < EPS);
    }

    #[test]
    fn test_global_position_without_parent() {
        let world = SimWorld::new();
        let device = Device::new(BodyId::from_raw(9999), Vec2::ZERO, 0.0);
        assert!(matches!(
            device.global_position(&world),
            Err(SimError::BodyNotFound(_))
        ));
    }

    #[test]
    fn test_button_to_object() {
        let mut button = ButtonDevice::new(Device::new(BodyId::from_raw(1), Vec2::ZERO, 0.0));
        button.set_input("pressed", &json!(true)).unwrap();
        assert!(button.pressed());

        assert_eq!(button.device_type(), "brick_button");
        assert_eq!(button.object_name("left"), "buttonleft");
        let obj = button.to_object("left");
        assert_eq!(obj["address"], "left");
        assert_eq!(obj["driver_name"], "ev3sim-button");
        assert_eq!(obj["pressed"], true);
    }

    #[test]
    fn test_button_rejects_bad_input() {
        let mut button = ButtonDevice::new(Device::new(BodyId::from_raw(1), Vec2::ZERO, 0.0));
        assert!(matches!(
            button.set_input("pressed", &json!("yes")),
            Err(SimError::InvalidField { .. })
        ));
        assert!(matches!(
            button.set_input("colour", &json!(true)),
            Err(SimError::InvalidField { field, .. }) if field == "colour"
        ));
        assert!(!button.pressed());
    }

    #[test]
    fn test_plain_device_to_object() {
        let device = PlainDevice::new(Device::new(BodyId::from_raw(1), Vec2::ZERO, 0.0));
        let obj = device.to_object("in1");
        assert_eq!(obj["address"], "in1");
        assert_eq!(obj["device_type"], "device");
        assert_eq!(device.object_name("in1"), "devicein1");
    }

    #[test]
    fn test_plain_device_takes_no_input() {
        let mut device = PlainDevice::new(Device::new(BodyId::from_raw(1), Vec2::ZERO, 0.0));
        assert!(device.set_input("pressed", &json!(true)).is_err());
    }
}
