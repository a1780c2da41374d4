//! Error types for building a simulation.
//!
//! Only construction can fail. Once a [`Simulation`](crate::simulation::Simulation)
//! exists, blocked moves, failed withdrawals and vanished targets are ordinary
//! outcomes reported through `bool` and `Option`.

use thiserror::Error;
use unts_data::Position;

#[derive(Error, Debug)]
pub enum SimError {
    /// The configuration document failed validation.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A scene entry was placed outside the field.
    #[error("{what} at ({}, {}) lies outside the field", .position.x, .position.y)]
    OutOfBounds { what: &'static str, position: Position },

    #[error("Unknown colony {0}")]
    UnknownColony(u32),

    #[error("Unknown hill {0}")]
    UnknownHill(u32),

    /// A species was requested from the wrong family.
    #[error("Cannot spawn {0} here")]
    InvalidSpecies(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
