//! The tick driver.
//!
//! A [`Simulation`] owns the configuration, the seeded random source, the
//! [`Registry`] of everything alive and the field the previous tick left
//! behind. [`Simulation::step`] assembles the next field from it.

mod init;
mod update;

use crate::agent::Agent;
use crate::colony::Colony;
use crate::config::AppConfig;
use crate::error::{Result, SimError};
use crate::field::Field;
use crate::registry::{Registry, TickContext};
use crate::snapshot::WorldSnapshot;
use hecs::Entity;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use unts_data::{ColonyId, HillId, Position, Species};

/// What one call to [`Simulation::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// The tick just completed, counting from 1.
    pub tick: u64,
    pub pheromones_processed: usize,
    /// Live agents after the tick.
    pub agents: usize,
}

pub struct Simulation {
    config: AppConfig,
    /// The field assembled by the previous tick. Only ever read by agents.
    field: Field,
    registry: Registry,
    rng: ChaCha8Rng,
    tick: u64,
}

impl Simulation {
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn agent_count(&self) -> usize {
        self.registry.ecs.len() as usize
    }

    /// A copy of an agent's current state.
    pub fn agent(&self, entity: Entity) -> Option<Agent> {
        self.registry
            .ecs
            .get::<&Agent>(entity)
            .ok()
            .map(|agent| (*agent).clone())
    }

    pub fn colony_mut(&mut self, id: ColonyId) -> Result<&mut Colony> {
        self.registry
            .colony_mut(id)
            .ok_or(SimError::UnknownColony(id.0))
    }

    /// Adds a threat at `position`. It first acts on the next tick.
    pub fn spawn_threat(&mut self, species: Species, position: Position) -> Result<Entity> {
        if !self.field.contains(position) {
            return Err(SimError::OutOfBounds {
                what: "threat",
                position,
            });
        }
        let config = self
            .config
            .threats
            .for_species(species)
            .ok_or_else(|| SimError::InvalidSpecies(format!("{species:?}")))?;
        self.registry
            .spawn_threat(species, position, config, &mut self.rng)
            .ok_or_else(|| SimError::InvalidSpecies(format!("{species:?}")))
    }

    /// Adds a unit of `species` to `hill`, resting there.
    pub fn spawn_unt(&mut self, hill: HillId, species: Species) -> Result<Entity> {
        if self.registry.hill(hill).is_none() {
            return Err(SimError::UnknownHill(hill.0));
        }
        let interval = self.config.reproduction.interval;
        self.registry
            .spawn_unt(hill, species, interval, &mut self.rng)
            .ok_or_else(|| SimError::InvalidSpecies(format!("{species:?}")))
    }

    /// Runs `f` on an agent outside of a tick, as if it were acting.
    ///
    /// Deposits made by `f` go into a scratch field that is thrown away. An
    /// agent that dies inside `f` is removed. Returns `None` when the agent
    /// does not exist.
    pub fn with_agent<R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut Agent, Entity, &mut TickContext) -> R,
    ) -> Option<R> {
        let mut scratch = Field::new(self.field.width(), self.field.height());
        self.registry.plant_inerts(&mut scratch);
        self.operate(entity, &mut scratch, f)
    }

    /// Takes an agent out of the world, lets `f` act on it, then puts it back
    /// or despawns it when it died.
    fn operate<R>(
        &mut self,
        entity: Entity,
        next: &mut Field,
        f: impl FnOnce(&mut Agent, Entity, &mut TickContext) -> R,
    ) -> Option<R> {
        let mut agent = self.registry.ecs.remove_one::<Agent>(entity).ok()?;
        let mut ctx = TickContext {
            config: &self.config,
            old: &self.field,
            new: next,
            registry: &mut self.registry,
            rng: &mut self.rng,
        };
        let result = f(&mut agent, entity, &mut ctx);

        if agent.body.alive {
            let _ = self.registry.ecs.insert_one(entity, agent);
        } else {
            let _ = self.registry.ecs.despawn(entity);
        }
        Some(result)
    }

    /// Rebuilds the readable field from where everything stands now,
    /// dropping every pheromone.
    #[cfg(test)]
    pub(crate) fn resurvey(&mut self) {
        let (width, height) = (self.field.width(), self.field.height());
        self.field = init::survey(width, height, &self.registry);
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(
            self.tick,
            self.field.width(),
            self.field.height(),
            &self.registry,
        )
    }
}
