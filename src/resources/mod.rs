//! Idempotent filesystem primitives (check + apply pattern).
pub mod helpers;
pub mod symlink;

pub use symlink::{LinkState, Occupant, SymlinkResource};
