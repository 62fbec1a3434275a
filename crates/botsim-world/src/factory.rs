//! Batch object construction

use crate::element::ElementDef;
use botsim_core::{ObjectId, Result};

/// Materialises element descriptors into live objects.
///
/// Implementations return exactly one id per descriptor, in input order,
/// or fail without constructing anything.
pub trait ObjectFactory {
    fn load_elements(&mut self, elements: Vec<ElementDef>) -> Result<Vec<ObjectId>>;
}
