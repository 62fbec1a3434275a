//! Two-tier interactor scheduler

use crate::interactor::Interactor;
use crate::physics::PhysicsStep;
use botsim_core::{InteractorId, Result};
use botsim_world::SimWorld;
use tracing::{debug, warn};

/// Execution tier of an interactor
///
/// Every device-tier hook of a phase runs before any generic-tier hook of
/// the same phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Device,
    Generic,
}

struct Slot {
    id: InteractorId,
    started: bool,
    interactor: Box<dyn Interactor>,
}

/// Drives interactors through setup and the per-tick phases
///
/// Within the device tier the most recently registered interactor runs
/// first. That order is an artifact of registration and must not be relied
/// upon; only the device-before-generic precedence is a contract.
#[derive(Default)]
pub struct Scheduler {
    device: Vec<Slot>,
    generic: Vec<Slot>,
    /// Interactors unregistered after a failed setup, not yet collected
    failed: Vec<InteractorId>,
    ticks: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interactor; setup runs on the next `start_pending`
    pub fn register(&mut self, tier: Tier, interactor: Box<dyn Interactor>) -> InteractorId {
        let id = InteractorId::new();
        debug!(%id, name = interactor.name(), ?tier, "registered interactor");
        let slot = Slot {
            id,
            started: false,
            interactor,
        };
        match tier {
            Tier::Device => self.device.insert(0, slot),
            Tier::Generic => self.generic.push(slot),
        }
        id
    }

    fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.device.iter().chain(self.generic.iter())
    }

    fn slots_mut(&mut self) -> impl Iterator<Item = &mut Slot> {
        self.device.iter_mut().chain(self.generic.iter_mut())
    }

    /// Interactor ids in the order their hooks run
    pub fn execution_order(&self) -> Vec<InteractorId> {
        self.slots().map(|s| s.id).collect()
    }

    pub fn tier_of(&self, id: InteractorId) -> Option<Tier> {
        if self.device.iter().any(|s| s.id == id) {
            Some(Tier::Device)
        } else if self.generic.iter().any(|s| s.id == id) {
            Some(Tier::Generic)
        } else {
            None
        }
    }

    pub fn get(&self, id: InteractorId) -> Option<&dyn Interactor> {
        self.slots()
            .find(|s| s.id == id)
            .map(|s| s.interactor.as_ref())
    }

    pub fn is_started(&self, id: InteractorId) -> bool {
        self.slots().any(|s| s.id == id && s.started)
    }

    /// Run setup for every interactor that has not been set up yet.
    ///
    /// An interactor whose setup fails is unregistered so it never sees a
    /// tick, and the error is returned. Its id is kept for `take_failed` so
    /// the owner can drop whatever else refers to it. Interactors after it
    /// stay pending.
    pub fn start_pending(&mut self, world: &mut SimWorld) -> Result<()> {
        let mut failed = None;
        for slot in self.slots_mut().filter(|s| !s.started) {
            match slot.interactor.start_up(world) {
                Ok(()) => slot.started = true,
                Err(e) => {
                    warn!(id = %slot.id, name = slot.interactor.name(), error = %e, "interactor setup failed");
                    failed = Some((slot.id, e));
                    break;
                }
            }
        }

        match failed {
            Some((id, e)) => {
                self.remove(&[id]);
                self.failed.push(id);
                Err(e)
            }
            None => Ok(()),
        }
    }

    /// Run one tick: pending setup, pre-tick hooks, physics, after-physics hooks
    pub fn run_tick(
        &mut self,
        world: &mut SimWorld,
        physics: &mut dyn PhysicsStep,
        dt: f32,
    ) -> Result<()> {
        self.start_pending(world)?;

        let tick = self.ticks;
        for slot in self.slots_mut() {
            slot.interactor.tick(world, tick)?;
        }

        physics.step(world, dt);

        for slot in self.slots_mut() {
            slot.interactor.after_physics(world)?;
        }

        self.ticks += 1;
        Ok(())
    }

    /// Unregister interactors, returning how many were removed
    pub fn remove(&mut self, ids: &[InteractorId]) -> usize {
        let before = self.len();
        self.device.retain(|s| !ids.contains(&s.id));
        self.generic.retain(|s| !ids.contains(&s.id));
        before - self.len()
    }

    /// Number of completed ticks
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn len(&self) -> usize {
        self.device.len() + self.generic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the ids of interactors unregistered by a failed setup
    pub fn take_failed(&mut self) -> Vec<InteractorId> {
        std::mem::take(&mut self.failed)
    }
}
