//! Facade over the Quarry crates. Depend on this crate and pick a dialect
//! crate (`quarry-sqlite`, `quarry-mysql`) for the writers it should drive.

pub use quarry_core::*;
