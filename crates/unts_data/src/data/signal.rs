use serde::{Deserialize, Serialize};

/// Harvestable resource types.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Food,
    Water,
}

/// Pheromone signal types.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PheromoneType {
    /// Trail leading toward food.
    Food,
    /// Trail leading toward water.
    Water,
    /// Danger marker left by fights and violent deaths.
    Threat,
}

impl PheromoneType {
    pub const RESOURCES: [PheromoneType; 2] = [PheromoneType::Food, PheromoneType::Water];
}

impl From<ResourceKind> for PheromoneType {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Food => PheromoneType::Food,
            ResourceKind::Water => PheromoneType::Water,
        }
    }
}
