//! # Unts Core
//!
//! The simulation engine for Unts, a grid world where ant-like colonies
//! forage, fight and expand while predators roam between them.
//!
//! This crate contains the deterministic simulation logic, including:
//! - The two-phase field (read the last tick, write the next one)
//! - Pheromone deposit, stacking and decay
//! - Threat and colony-unit behaviour as per-species state machines
//! - The colony and hill economy: stockpiles, consumption and reproduction
//! - Metrics collection and structured logging
//!
//! ## Example
//!
//! ```
//! use unts_core::config::{AppConfig, ColonyConfig, HillSeed};
//! use unts_core::simulation::Simulation;
//! use unts_data::Position;
//!
//! let config = AppConfig {
//!     colonies: vec![ColonyConfig {
//!         hills: vec![HillSeed {
//!             position: Position::new(5, 5),
//!             workers: 10,
//!             warriors: 2,
//!             builders: 0,
//!         }],
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! };
//! let mut sim = Simulation::new(config).expect("valid scene");
//! let report = sim.step();
//! assert_eq!(report.tick, 1);
//! ```

/// Threat species and colony castes
pub mod agent;
/// Colony stockpiles and the reproduction cycle
pub mod colony;
/// Configuration management for simulation parameters
pub mod config;
/// Construction errors
pub mod error;
/// Spaces, line of sight and pheromone flow
pub mod field;
/// Grid distances, angles and headings
pub mod geometry;
/// Colony hills and generation planning
pub mod hill;
/// Performance metrics collection and logging
pub mod metrics;
/// Decaying signals left by agents
pub mod pheromone;
/// Arenas for agents, colonies, hills and resources
pub mod registry;
/// Food and water sources
pub mod resource;
/// The tick driver
pub mod simulation;
/// Serialisable views for hosts
pub mod snapshot;

pub use agent::{Agent, Lifecycle, Perception};
pub use error::{Result, SimError};
pub use metrics::{init_logging, Metrics};
pub use simulation::{Simulation, TickReport};
