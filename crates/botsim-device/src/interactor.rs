//! Device interactors: generated elements and their placement

use botsim_core::{local_to_world, rotate, BodyId, ObjectId, Pose, Result, SimError, Vec2};
use botsim_runtime::Interactor;
use botsim_world::{ElementDef, ObjectFactory, SimWorld};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

/// Fields every interactor of a device receives from its descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceIdentity {
    /// Device type of the owning device
    pub device: String,
    pub parent: BodyId,
    pub relative_location: Vec2,
    /// Radians
    pub relative_rotation: f32,
    /// Position of the device among its body's devices
    pub device_index: usize,
    /// Position of the interactor in the device's interactor list
    pub single_device_index: usize,
    pub port: String,
}

impl DeviceIdentity {
    fn into_entries(self) -> Vec<(&'static str, toml::Value)> {
        vec![
            ("device", toml::Value::String(self.device)),
            ("parent", toml::Value::Integer(self.parent.raw() as i64)),
            (
                "relative_location",
                toml::Value::Array(vec![
                    toml::Value::Float(self.relative_location.x as f64),
                    toml::Value::Float(self.relative_location.y as f64),
                ]),
            ),
            (
                "relative_rotation",
                toml::Value::Float(self.relative_rotation as f64),
            ),
            ("device_index", toml::Value::Integer(self.device_index as i64)),
            (
                "single_device_index",
                toml::Value::Integer(self.single_device_index as i64),
            ),
            ("port", toml::Value::String(self.port)),
        ]
    }
}

/// Constructor options handed to an interactor factory.
///
/// Built from the config's `kwargs` with the descriptor identity written on
/// top: an identity field always replaces a same-named key from the config
/// file, so a config cannot corrupt indexing or placement.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractorOptions {
    kwargs: toml::Table,
}

impl InteractorOptions {
    pub fn merge(mut kwargs: toml::Table, identity: DeviceIdentity) -> Self {
        for (key, value) in identity.into_entries() {
            if let Some(previous) = kwargs.insert(key.to_string(), value) {
                warn!(key, %previous, "config kwargs entry replaced by device identity");
            }
        }
        Self { kwargs }
    }

    /// Options for an interactor that belongs to no device
    pub fn from_kwargs(kwargs: toml::Table) -> Self {
        Self { kwargs }
    }

    pub fn kwargs(&self) -> &toml::Table {
        &self.kwargs
    }

    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.kwargs.get(key)
    }

    /// Deserialize the options into a typed config
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        toml::Value::Table(self.kwargs.clone())
            .try_into()
            .map_err(|e: toml::de::Error| SimError::InvalidField {
                field: "kwargs".to_string(),
                message: e.to_string(),
            })
    }
}

#[derive(Debug, Deserialize)]
struct DeviceInteractorConfig {
    #[serde(default = "default_name")]
    name: String,
    parent: BodyId,
    relative_location: [f32; 2],
    relative_rotation: f32,
    device_index: usize,
    single_device_index: usize,
    port: String,
    #[serde(default)]
    elements: Vec<ElementDef>,
}

fn default_name() -> String {
    "UNNAMED".to_string()
}

/// Pose of a generated element for the current body pose.
///
/// The element's fixed `local` offset is first rotated into the device's
/// frame and shifted by the device offset, then the combined vector is
/// mapped through the body's rotation and position as one unit.
pub fn compose_element_pose(
    body: Pose,
    relative_location: Vec2,
    relative_rotation: f32,
    local: Vec2,
) -> Pose {
    let in_device_frame = relative_location + rotate(local, relative_rotation);
    Pose {
        position: local_to_world(in_device_frame, body.rotation, body.position),
        rotation: body.rotation + relative_rotation,
    }
}

/// Controller that owns a device's generated elements
#[derive(Debug, Clone)]
pub struct DeviceInteractor {
    name: String,
    physical_object: BodyId,
    relative_location: Vec2,
    relative_rotation: f32,
    /// `"{device_index}-{single_device_index}"`
    index: String,
    items: Vec<ElementDef>,
    generated: Vec<ObjectId>,
    /// Local element positions captured at setup
    relative_positions: Vec<Vec2>,
    port: String,
    started: bool,
}

impl DeviceInteractor {
    pub fn from_options(options: InteractorOptions) -> Result<Self> {
        let config: DeviceInteractorConfig = options.parse()?;
        Ok(Self {
            name: config.name,
            physical_object: config.parent,
            relative_location: Vec2::from_array(config.relative_location),
            relative_rotation: config.relative_rotation,
            index: format!("{}-{}", config.device_index, config.single_device_index),
            items: config.elements,
            generated: Vec::new(),
            relative_positions: Vec::new(),
            port: config.port,
            started: false,
        })
    }

    /// Factory registered as the `device` interactor class
    pub fn factory(options: InteractorOptions) -> Result<Box<dyn Interactor>> {
        Ok(Box::new(Self::from_options(options)?))
    }

    /// `"{body key}-{name}-{index}-"`, prepended to every generated key
    pub fn prefix(&self, world: &SimWorld) -> Result<String> {
        let key = world
            .key(self.physical_object)
            .ok_or_else(|| SimError::BodyNotFound(self.physical_object.to_string()))?;
        Ok(format!("{}-{}-{}-", key, self.name, self.index))
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn physical_object(&self) -> BodyId {
        self.physical_object
    }

    pub fn items(&self) -> &[ElementDef] {
        &self.items
    }

    pub fn generated(&self) -> &[ObjectId] {
        &self.generated
    }

    pub fn relative_positions(&self) -> &[Vec2] {
        &self.relative_positions
    }
}

impl Interactor for DeviceInteractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn start_up(&mut self, world: &mut SimWorld) -> Result<()> {
        if self.started {
            return Err(SimError::RuntimeError(format!(
                "interactor {} already set up",
                self.index
            )));
        }

        let prefix = self.prefix(world)?;
        let layer = world.z_pos(self.physical_object).unwrap_or(0.0);

        let mut items = self.items.clone();
        let mut relative_positions = Vec::with_capacity(items.len());
        for item in &mut items {
            relative_positions.push(Vec2::from_array(item.position));
            item.key = format!("{}{}", prefix, item.key);
            item.kind = "object".to_string();
            if let Some(visual) = item.visual.as_mut() {
                visual.z_pos += layer;
            }
        }

        let generated = world.load_elements(items.clone())?;
        assert_eq!(
            generated.len(),
            items.len(),
            "object factory returned a different number of objects"
        );
        world.add_children(self.physical_object, &generated)?;

        debug!(prefix = %prefix, count = generated.len(), "device elements generated");
        self.items = items;
        self.generated = generated;
        self.relative_positions = relative_positions;
        self.started = true;
        Ok(())
    }

    fn after_physics(&mut self, world: &mut SimWorld) -> Result<()> {
        assert_eq!(
            self.generated.len(),
            self.relative_positions.len(),
            "generated objects out of step with recorded positions"
        );

        let body = world
            .pose(self.physical_object)
            .ok_or_else(|| SimError::BodyNotFound(self.physical_object.to_string()))?;

        for (obj, local) in self.generated.iter().zip(&self.relative_positions) {
            let pose = compose_element_pose(
                body,
                self.relative_location,
                self.relative_rotation,
                *local,
            );
            world.set_pose(*obj, pose)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    const EPS: f32 = 1e-5;

    fn identity(parent: BodyId, device_index: usize, single: usize) -> DeviceIdentity {
        DeviceIdentity {
            device: "device".into(),
            parent,
            relative_location: Vec2::new(1.0, 0.0),
            relative_rotation: 0.0,
            device_index,
            single_device_index: single,
            port: "in1".into(),
        }
    }

    fn kwargs(toml_str: &str) -> toml::Table {
        toml::from_str(toml_str).unwrap()
    }

    fn interactor(ident: DeviceIdentity, extra: &str) -> DeviceInteractor {
        DeviceInteractor::from_options(InteractorOptions::merge(kwargs(extra), ident)).unwrap()
    }

    #[test]
    fn test_identity_overrides_config_keys() {
        let body = BodyId::from_raw(7);
        let options = InteractorOptions::merge(
            kwargs(
                r#"
name = "light"
port = "bogus"
device_index = 99
"#,
            ),
            identity(body, 2, 1),
        );

        assert_eq!(options.get("port").and_then(|v| v.as_str()), Some("in1"));
        assert_eq!(options.get("device_index").and_then(|v| v.as_integer()), Some(2));
        assert_eq!(options.get("name").and_then(|v| v.as_str()), Some("light"));

        let it = DeviceInteractor::from_options(options).unwrap();
        assert_eq!(it.index(), "2-1");
        assert_eq!(it.port(), "in1");
        assert_eq!(it.physical_object(), body);
        assert_eq!(it.name(), "light");
    }

    #[test]
    fn test_default_name() {
        let it = DeviceInteractor::from_options(InteractorOptions::merge(
            toml::Table::new(),
            identity(BodyId::from_raw(1), 0, 0),
        ))
        .unwrap();
        assert_eq!(it.name(), "UNNAMED");
        assert!(it.items().is_empty());
    }

    #[test]
    fn test_prefix() {
        let mut world = SimWorld::new();
        let body = world.spawn_body("bot", Pose::IDENTITY, 0.0).unwrap();
        let it = interactor(identity(body, 3, 0), r#"name = "button""#);
        assert_eq!(it.prefix(&world).unwrap(), "bot-button-3-0-");
    }

    #[test]
    fn test_start_up_rewrites_and_records() {
        let mut world = SimWorld::new();
        let body = world.spawn_body("bot", Pose::IDENTITY, 5.0).unwrap();
        let mut it = interactor(
            identity(body, 0, 0),
            r#"
name = "button"

[[elements]]
key = "light"
type = "circle"
position = [0, 1]

[elements.visual]
zPos = 0.5

[[elements]]
key = "rim"
position = [2, 0]
"#,
        );

        it.start_up(&mut world).unwrap();

        assert_eq!(it.generated().len(), 2);
        assert_eq!(
            it.relative_positions(),
            &[Vec2::new(0.0, 1.0), Vec2::new(2.0, 0.0)]
        );
        assert_eq!(it.items()[0].key, "bot-button-0-0-light");
        assert_eq!(it.items()[0].kind, "object");
        assert_eq!(world.key(it.generated()[1]), Some("bot-button-0-0-rim"));
        // Visual depth is offset by the body's layer, not replaced
        assert_eq!(world.z_pos(it.generated()[0]), Some(5.5));
        assert_eq!(world.children(body), it.generated());
    }

    #[test]
    fn test_start_up_runs_once() {
        let mut world = SimWorld::new();
        let body = world.spawn_body("bot", Pose::IDENTITY, 0.0).unwrap();
        let mut it = interactor(
            identity(body, 0, 0),
            r#"
[[elements]]
key = "e"
"#,
        );
        it.start_up(&mut world).unwrap();
        assert!(it.start_up(&mut world).is_err());
        assert_eq!(world.children(body).len(), 1);
    }

    #[test]
    fn test_start_up_propagates_key_collision() {
        let mut world = SimWorld::new();
        let body = world.spawn_body("bot", Pose::IDENTITY, 0.0).unwrap();
        let elements = r#"
[[elements]]
key = "e"
"#;
        let mut first = interactor(identity(body, 0, 0), elements);
        let mut twin = interactor(identity(body, 0, 0), elements);

        first.start_up(&mut world).unwrap();
        assert!(matches!(
            twin.start_up(&mut world),
            Err(SimError::DuplicateKey(_))
        ));
        assert!(twin.generated().is_empty());
        assert_eq!(world.children(body).len(), 1);
    }

    #[test]
    fn test_distinct_indices_never_collide() {
        let mut world = SimWorld::new();
        let body = world.spawn_body("bot", Pose::IDENTITY, 0.0).unwrap();
        let elements = r#"
[[elements]]
key = "a"

[[elements]]
key = "b"
"#;
        let mut keys = HashSet::new();
        for device_index in 0..3 {
            for single in 0..3 {
                let mut it = interactor(identity(body, device_index, single), elements);
                it.start_up(&mut world).unwrap();
                for id in it.generated() {
                    assert!(keys.insert(world.key(*id).unwrap().to_string()));
                }
            }
        }
        assert_eq!(keys.len(), 18);
    }

    #[test]
    fn test_end_to_end_quarter_turn() {
        let mut world = SimWorld::new();
        let body = world
            .spawn_body("bot", Pose::new(Vec2::ZERO, FRAC_PI_2), 0.0)
            .unwrap();
        let mut it = interactor(
            identity(body, 0, 0),
            r#"
[[elements]]
key = "e"
position = [0, 1]
"#,
        );
        it.start_up(&mut world).unwrap();
        it.after_physics(&mut world).unwrap();

        let pose = world.pose(it.generated()[0]).unwrap();
        assert!(pose.position.approx_eq(&Vec2::new(-1.0, 1.0), EPS), "got {:?}", pose.position);
        assert!((pose.rotation - FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn test_after_physics_is_idempotent() {
        let mut world = SimWorld::new();
        let body = world
            .spawn_body("bot", Pose::new(Vec2::new(2.0, -1.0), 0.7), 0.0)
            .unwrap();
        let mut ident = identity(body, 0, 0);
        ident.relative_rotation = 0.3;
        let mut it = interactor(
            ident,
            r#"
[[elements]]
key = "e"
position = [0.5, 0.25]
"#,
        );
        it.start_up(&mut world).unwrap();

        it.after_physics(&mut world).unwrap();
        let first = world.pose(it.generated()[0]).unwrap();
        it.after_physics(&mut world).unwrap();
        let second = world.pose(it.generated()[0]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_after_physics_tracks_body() {
        let mut world = SimWorld::new();
        let body = world.spawn_body("bot", Pose::IDENTITY, 0.0).unwrap();
        let mut it = interactor(
            identity(body, 0, 0),
            r#"
[[elements]]
key = "e"
"#,
        );
        it.start_up(&mut world).unwrap();
        world.set_pose(body, Pose::new(Vec2::new(0.0, 3.0), PI)).unwrap();
        it.after_physics(&mut world).unwrap();

        let pose = world.pose(it.generated()[0]).unwrap();
        assert!(pose.position.approx_eq(&Vec2::new(-1.0, 3.0), EPS), "got {:?}", pose.position);
    }

    #[test]
    fn test_compose_without_device_rotation_is_translation() {
        let locals = [Vec2::new(0.0, 1.0), Vec2::new(-2.0, 0.5)];
        for step in 0..8 {
            let theta = step as f32 * TAU / 8.0;
            let body = Pose::new(Vec2::new(1.0, 2.0), theta);
            for local in locals {
                let loc = Vec2::new(0.5, -0.5);
                let pose = compose_element_pose(body, loc, 0.0, local);
                let expected = body.position + rotate(loc + local, theta);
                assert!(pose.position.approx_eq(&expected, EPS));
                assert!((pose.rotation - theta).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_compose_without_body_rotation() {
        let locals = [Vec2::new(0.0, 1.0), Vec2::new(-2.0, 0.5)];
        for step in 0..8 {
            let rel = step as f32 * TAU / 8.0;
            let body = Pose::new(Vec2::new(1.0, 2.0), 0.0);
            for local in locals {
                let loc = Vec2::new(0.5, -0.5);
                let pose = compose_element_pose(body, loc, rel, local);
                let expected = body.position + loc + rotate(local, rel);
                assert!(pose.position.approx_eq(&expected, EPS));
                assert!((pose.rotation - rel).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_compose_rotates_device_offset_once() {
        // Device offset is rotated by the body only, element offset by both
        let body = Pose::new(Vec2::ZERO, FRAC_PI_2);
        let pose = compose_element_pose(body, Vec2::new(1.0, 0.0), FRAC_PI_2, Vec2::new(1.0, 0.0));
        // in device frame: (1,0) + (0,1) = (1,1); rotated by 90°: (-1,1)
        assert!(pose.position.approx_eq(&Vec2::new(-1.0, 1.0), EPS), "got {:?}", pose.position);
        assert!((pose.rotation - PI).abs() < EPS);
    }
}
