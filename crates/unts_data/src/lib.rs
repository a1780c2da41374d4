//! Shared vocabulary of the Unts simulation: grid positions, species tags,
//! behavioural states, signal kinds and the handle newtypes that let the
//! engine refer to colonies, hills and resources without owning them.

pub mod data;

pub use data::entity::{Appearance, Boldness, Focus, Species, Status};
pub use data::signal::{PheromoneType, ResourceKind};
pub use data::terrain::{BarrierKind, ColonyId, HillId, Position, ResourceId};
