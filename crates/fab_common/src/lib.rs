//! Shared foundational types for the structured-ASIC placement engine.
//!
//! This crate provides the opaque ID newtypes shared across the fabric,
//! netlist, and placement data structures, plus the closed set of fatal
//! error kinds and the `Result` alias built on top of them.

#![warn(missing_docs)]

pub mod error;
pub mod ids;

pub use error::{FabResult, FatalError};
pub use ids::{InstanceId, NetId, PinId, SlotId};
