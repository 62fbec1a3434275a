//! Botsim World - object store with stable IDs
//!
//! This crate wraps hecs with stable object identifiers, keyed lookup,
//! parent/child ownership and the batch element construction used by
//! device interactors.

mod element;
mod factory;
mod object;
mod world;

pub use element::{ElementDef, VisualDef};
pub use factory::ObjectFactory;
pub use object::{Body, Motion, ObjectInfo};
pub use world::SimWorld;
