//! Core data structures for the Unts simulation.

pub mod entity;
pub mod signal;
pub mod terrain;
