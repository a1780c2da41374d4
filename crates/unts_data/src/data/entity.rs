use super::signal::{PheromoneType, ResourceKind};
use serde::{Deserialize, Serialize};

/// Concrete species. Only these can be spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Predator,
    Hunter,
    Stalker,
    Architect,
    Builder,
    Warrior,
    Worker,
}

impl Species {
    pub const THREATS: [Species; 3] = [Species::Predator, Species::Hunter, Species::Stalker];

    pub fn is_threat(self) -> bool {
        matches!(self, Species::Predator | Species::Hunter | Species::Stalker)
    }

    pub fn is_unt(self) -> bool {
        !self.is_threat()
    }
}

/// Behavioural state shared by every agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Wandering,
    Following,
    /// Post-attack cooldown; the agent does not move.
    Killing,
    Retreating,
    Backtracking,
    Detouring,
    /// Following a pheromone around an obstruction on the way home.
    Tracing,
}

/// Reaction of a worker to a sighted threat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boldness {
    /// Keeps away from it.
    Passive,
    /// Ignores it.
    #[default]
    Assertive,
    /// Charges it.
    Aggressive,
}

/// Resource a foraging unt is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
    Food,
    Water,
    #[default]
    Any,
}

impl Focus {
    pub fn resources(self) -> &'static [ResourceKind] {
        match self {
            Focus::Food => &[ResourceKind::Food],
            Focus::Water => &[ResourceKind::Water],
            Focus::Any => &[ResourceKind::Food, ResourceKind::Water],
        }
    }

    pub fn pheromones(self) -> &'static [PheromoneType] {
        match self {
            Focus::Food => &[PheromoneType::Food],
            Focus::Water => &[PheromoneType::Water],
            Focus::Any => &PheromoneType::RESOURCES,
        }
    }
}

impl From<ResourceKind> for Focus {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Food => Focus::Food,
            ResourceKind::Water => Focus::Water,
        }
    }
}

/// Rendering hints attached at creation. The engine never reads them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "unit_size")]
    pub size: f32,
}

fn unit_size() -> f32 {
    1.0
}

impl Appearance {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, size: 1.0 }
    }
}

impl Default for Appearance {
    fn default() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_families() {
        for s in Species::THREATS {
            assert!(s.is_threat());
        }
        assert!(Species::Builder.is_unt());
        assert!(!Species::Worker.is_threat());
    }

    #[test]
    fn test_focus_any_covers_both_resources() {
        assert_eq!(Focus::Any.resources().len(), 2);
        assert_eq!(Focus::Water.pheromones(), &[PheromoneType::Water]);
    }
}
