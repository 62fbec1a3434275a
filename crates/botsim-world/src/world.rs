//! SimWorld - ECS world with stable IDs and keyed objects

use crate::element::ElementDef;
use crate::factory::ObjectFactory;
use crate::object::{Body, Motion, ObjectInfo};
use bimap::BiMap;
use botsim_core::{BodyId, InteractorId, ObjectId, Pose, Result, SimError};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// The object world for the simulator
///
/// Wraps hecs::World with:
/// - Stable ObjectId mapping
/// - Keyed object lookup
/// - Ordered parent/child ownership
/// - Per-body device interactor lists
pub struct SimWorld {
    /// The underlying hecs world (holds `Pose`, `Motion` and `Body`)
    world: hecs::World,
    /// Bidirectional mapping: ObjectId <-> hecs::Entity
    id_map: BiMap<ObjectId, hecs::Entity>,
    /// Object key -> ObjectId mapping
    key_map: HashMap<String, ObjectId>,
    /// Metadata for each object
    objects: HashMap<ObjectId, ObjectInfo>,
    /// Ordered children of each parent
    children: HashMap<ObjectId, Vec<ObjectId>>,
    /// Parent relationships: child -> parent
    parents: HashMap<ObjectId, ObjectId>,
    /// Interactors attached to a body, in attachment order
    device_interactors: HashMap<BodyId, Vec<InteractorId>>,
    /// Bodies in spawn order
    bodies: Vec<BodyId>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
            id_map: BiMap::new(),
            key_map: HashMap::new(),
            objects: HashMap::new(),
            children: HashMap::new(),
            parents: HashMap::new(),
            device_interactors: HashMap::new(),
            bodies: Vec::new(),
        }
    }

    /// Spawn a physical body
    pub fn spawn_body(&mut self, key: impl Into<String>, pose: Pose, z_pos: f32) -> Result<BodyId> {
        let key = key.into();
        if self.key_map.contains_key(&key) {
            return Err(SimError::DuplicateKey(key));
        }

        let id = ObjectId::new();
        let entity = self.world.spawn((pose, Motion::default(), Body));
        self.id_map.insert(id, entity);
        self.key_map.insert(key.clone(), id);
        self.objects
            .insert(id, ObjectInfo::new(id, key, "body").with_z_pos(z_pos));
        self.bodies.push(id);

        Ok(id)
    }

    fn spawn_element(&mut self, def: ElementDef) -> ObjectId {
        let id = ObjectId::new();
        let pose = Pose::from_position(def.position.into());
        let entity = self.world.spawn((pose,));
        self.id_map.insert(id, entity);
        self.key_map.insert(def.key.clone(), id);

        let mut info = ObjectInfo::new(id, def.key, def.kind);
        info.data = def.extra;
        if let Some(visual) = def.visual {
            info.z_pos = visual.z_pos;
            info.data
                .insert("visual".to_string(), toml::Value::Table(visual.extra));
        }
        self.objects.insert(id, info);
        id
    }

    fn entity(&self, id: ObjectId) -> Result<hecs::Entity> {
        self.id_map
            .get_by_left(&id)
            .copied()
            .ok_or_else(|| SimError::ObjectNotFound(id.to_string()))
    }

    /// Get an object's current pose
    pub fn pose(&self, id: ObjectId) -> Option<Pose> {
        let entity = self.id_map.get_by_left(&id)?;
        self.world.get::<&Pose>(*entity).ok().map(|p| *p)
    }

    /// Overwrite an object's pose
    pub fn set_pose(&mut self, id: ObjectId, pose: Pose) -> Result<()> {
        let entity = self.entity(id)?;
        let mut current = self
            .world
            .get::<&mut Pose>(entity)
            .map_err(|_| SimError::ObjectNotFound(id.to_string()))?;
        *current = pose;
        Ok(())
    }

    /// Get a body's velocities
    pub fn motion(&self, id: BodyId) -> Option<Motion> {
        let entity = self.id_map.get_by_left(&id)?;
        self.world.get::<&Motion>(*entity).ok().map(|m| *m)
    }

    /// Set a body's velocities
    pub fn set_motion(&mut self, id: BodyId, motion: Motion) -> Result<()> {
        let entity = self.entity(id)?;
        let mut current = self
            .world
            .get::<&mut Motion>(entity)
            .map_err(|_| SimError::BodyNotFound(id.to_string()))?;
        *current = motion;
        Ok(())
    }

    /// Visit every body's pose together with its velocities
    pub fn for_each_body_mut(&mut self, mut f: impl FnMut(&mut Pose, &Motion)) {
        for (_, (pose, motion, _)) in self.world.query_mut::<(&mut Pose, &Motion, &Body)>() {
            f(pose, motion);
        }
    }

    /// Get object ID by key
    pub fn get_id(&self, key: &str) -> Option<ObjectId> {
        self.key_map.get(key).copied()
    }

    /// Get object key by ID
    pub fn key(&self, id: ObjectId) -> Option<&str> {
        self.objects.get(&id).map(|o| o.key.as_str())
    }

    /// Draw depth of an object
    pub fn z_pos(&self, id: ObjectId) -> Option<f32> {
        self.objects.get(&id).map(|o| o.z_pos)
    }

    pub fn is_body(&self, id: ObjectId) -> bool {
        self.id_map
            .get_by_left(&id)
            .map(|e| self.world.get::<&Body>(*e).is_ok())
            .unwrap_or(false)
    }

    /// Append objects to a parent's children, transferring lifetime ownership
    pub fn add_children(&mut self, parent: ObjectId, children: &[ObjectId]) -> Result<()> {
        if !self.id_map.contains_left(&parent) {
            return Err(SimError::ObjectNotFound(parent.to_string()));
        }
        for child in children {
            if !self.id_map.contains_left(child) {
                return Err(SimError::ObjectNotFound(child.to_string()));
            }
        }

        let list = self.children.entry(parent).or_default();
        for child in children {
            list.push(*child);
            self.parents.insert(*child, parent);
        }
        Ok(())
    }

    /// Ordered children of an object
    pub fn children(&self, parent: ObjectId) -> &[ObjectId] {
        self.children
            .get(&parent)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, child: ObjectId) -> Option<ObjectId> {
        self.parents.get(&child).copied()
    }

    /// Record an interactor on a body, creating the list on first use
    pub fn attach_device_interactor(&mut self, body: BodyId, interactor: InteractorId) -> Result<()> {
        if !self.is_body(body) {
            return Err(SimError::BodyNotFound(body.to_string()));
        }
        self.device_interactors.entry(body).or_default().push(interactor);
        Ok(())
    }

    /// Forget an interactor on a body, returning whether it was attached
    pub fn detach_device_interactor(&mut self, body: BodyId, interactor: InteractorId) -> bool {
        let Some(list) = self.device_interactors.get_mut(&body) else {
            return false;
        };
        let before = list.len();
        list.retain(|i| *i != interactor);
        let detached = list.len() != before;
        if list.is_empty() {
            self.device_interactors.remove(&body);
        }
        detached
    }

    /// Interactors attached to a body, `None` if none are attached
    pub fn device_interactors(&self, body: BodyId) -> Option<&[InteractorId]> {
        self.device_interactors.get(&body).map(|v| v.as_slice())
    }

    /// Despawn an object together with everything it owns.
    ///
    /// Returns the removed ids, children before their parents.
    pub fn despawn_recursive(&mut self, id: ObjectId) -> Result<Vec<ObjectId>> {
        let entity = self.entity(id)?;

        let mut removed = Vec::new();
        let owned = self.children.remove(&id).unwrap_or_default();
        for child in owned {
            // Children may already be gone if they were removed directly
            if self.id_map.contains_left(&child) {
                removed.extend(self.despawn_recursive(child)?);
            }
        }

        self.world
            .despawn(entity)
            .map_err(|_| SimError::ObjectNotFound(id.to_string()))?;
        self.id_map.remove_by_left(&id);
        if let Some(info) = self.objects.remove(&id) {
            self.key_map.remove(&info.key);
        }
        if let Some(parent) = self.parents.remove(&id) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|c| *c != id);
            }
        }
        self.device_interactors.remove(&id);
        self.bodies.retain(|b| *b != id);

        removed.push(id);
        Ok(removed)
    }

    /// Bodies in spawn order
    pub fn bodies(&self) -> &[BodyId] {
        &self.bodies
    }

    /// All objects ordered by id
    pub fn objects(&self) -> Vec<&ObjectInfo> {
        let mut all: Vec<&ObjectInfo> = self.objects.values().collect();
        all.sort_by_key(|o| o.id);
        all
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.id_map.contains_left(&id)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.key_map.contains_key(key)
    }
}

impl ObjectFactory for SimWorld {
    fn load_elements(&mut self, elements: Vec<ElementDef>) -> Result<Vec<ObjectId>> {
        // Validate the whole batch before spawning anything
        let mut seen = HashSet::new();
        for def in &elements {
            if self.key_map.contains_key(&def.key) || !seen.insert(def.key.as_str()) {
                return Err(SimError::DuplicateKey(def.key.clone()));
            }
        }

        let ids: Vec<ObjectId> = elements
            .into_iter()
            .map(|def| self.spawn_element(def))
            .collect();
        debug!(count = ids.len(), "loaded elements");
        Ok(ids)
    }
}
