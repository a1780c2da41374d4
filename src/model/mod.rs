pub use unts_core::{Lifecycle, Perception};
pub mod agent {
    pub use unts_core::agent::*;
}
pub mod colony {
    pub use unts_core::colony::*;
}
pub mod config {
    pub use unts_core::config::*;
}
pub mod error {
    pub use unts_core::error::*;
}
pub mod field {
    pub use unts_core::field::*;
}
pub mod geometry {
    pub use unts_core::geometry::*;
}
pub mod hill {
    pub use unts_core::hill::*;
}
pub mod metrics {
    pub use unts_core::metrics::*;
}
pub mod pheromone {
    pub use unts_core::pheromone::*;
}
pub mod registry {
    pub use unts_core::registry::*;
}
pub mod resource {
    pub use unts_core::resource::*;
}
pub mod simulation {
    pub use unts_core::simulation::*;
}
pub mod snapshot {
    pub use unts_core::snapshot::*;
}

pub mod state {
    pub use unts_data::*;
}
