//! CLI command implementations

pub mod check;
pub mod devices;
pub mod run;
