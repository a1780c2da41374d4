//! Serialisable views of a running simulation for hosts and renderers.

use crate::agent::Agent;
use crate::registry::{Census, Registry};
use serde::{Deserialize, Serialize};
use unts_data::{Appearance, ColonyId, HillId, Species, Status};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Stable for the agent's lifetime; never reused while it is alive.
    pub id: u64,
    pub species: Species,
    pub x: i32,
    pub y: i32,
    pub visible: bool,
    pub status: Status,
    pub colony: Option<ColonyId>,
    pub appearance: Appearance,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HillSnapshot {
    pub id: HillId,
    pub colony: ColonyId,
    pub x: i32,
    pub y: i32,
    pub builders: usize,
    pub warriors: usize,
    pub workers: usize,
    pub appearance: Appearance,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ColonySnapshot {
    pub id: ColonyId,
    pub name: String,
    pub food: f64,
    pub water: f64,
    pub units: usize,
    pub hills: usize,
    pub architects: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub width: i32,
    pub height: i32,
    /// Ordered by id.
    pub agents: Vec<AgentSnapshot>,
    pub hills: Vec<HillSnapshot>,
    pub colonies: Vec<ColonySnapshot>,
    pub census: Census,
}

impl AgentSnapshot {
    pub fn new(id: u64, agent: &Agent) -> Self {
        Self {
            id,
            species: agent.species(),
            x: agent.position().x,
            y: agent.position().y,
            visible: agent.is_visible(),
            status: agent.status(),
            colony: agent.colony(),
            appearance: agent.body.appearance,
        }
    }
}

impl WorldSnapshot {
    pub fn capture(tick: u64, width: i32, height: i32, registry: &Registry) -> Self {
        let mut agents: Vec<AgentSnapshot> = registry
            .ecs
            .query::<&Agent>()
            .iter()
            .map(|(entity, agent)| AgentSnapshot::new(entity.to_bits().get(), agent))
            .collect();
        agents.sort_by_key(|a| a.id);

        let hills = registry
            .hills
            .iter()
            .map(|hill| HillSnapshot {
                id: hill.id,
                colony: hill.colony,
                x: hill.position.x,
                y: hill.position.y,
                builders: hill.builders().len(),
                warriors: hill.warriors().len(),
                workers: hill.workers().len(),
                appearance: registry
                    .colony(hill.colony)
                    .map(|c| c.config.hill_appearance)
                    .unwrap_or_default(),
            })
            .collect();

        let colonies = registry
            .colonies
            .iter()
            .map(|colony| ColonySnapshot {
                id: colony.id,
                name: colony.config.name.clone(),
                food: colony.food(),
                water: colony.water(),
                units: colony.unit_count(&registry.hills),
                hills: colony.hills.len(),
                architects: colony.architects().len(),
            })
            .collect();

        Self {
            tick,
            width,
            height,
            agents,
            hills,
            colonies,
            census: registry.census,
        }
    }

    /// Agents a renderer should draw.
    pub fn visible_agents(&self) -> impl Iterator<Item = &AgentSnapshot> + '_ {
        self.agents.iter().filter(|a| a.visible)
    }

    pub fn count(&self, species: Species) -> usize {
        self.agents.iter().filter(|a| a.species == species).count()
    }
}
