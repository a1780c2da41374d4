//! Unts: colonies of ant-like units competing for food and water on a grid
//! shared with predators.
//!
//! The engine lives in `unts_core`; this crate re-exports it under
//! [`model`] for the host binary and the integration tests.

pub mod model;

pub use model::config::AppConfig;
pub use model::simulation::{Simulation, TickReport};
pub use model::{Lifecycle, Perception};
