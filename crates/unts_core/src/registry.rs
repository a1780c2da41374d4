//! Arenas that own everything living in a simulation, plus the per-tick
//! context agents act through.
//!
//! Agents live as [`Agent`] components in a `hecs::World`; colonies, hills
//! and resources live in index-stable vectors addressed by their id newtypes.
//! Every cross reference is a handle, so a unit that dies mid-tick leaves
//! nothing dangling: its handle simply stops resolving.

use crate::agent::{Agent, Lifecycle, Target};
use crate::colony::Colony;
use crate::config::{AppConfig, ThreatConfig};
use crate::field::{Field, Inert};
use crate::geometry::calc_distance;
use crate::hill::{Brood, Hill};
use crate::pheromone::Pheromone;
use crate::resource::Resource;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use unts_data::{BarrierKind, ColonyId, HillId, Position, Species};

/// Running totals of population changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub born: u64,
    pub died: u64,
    pub killed: u64,
    pub hills_founded: u64,
}

/// Owner of every agent, colony, hill, resource and barrier.
pub struct Registry {
    pub ecs: World,
    pub colonies: Vec<Colony>,
    pub hills: Vec<Hill>,
    pub resources: Vec<Resource>,
    pub barriers: Vec<(Position, BarrierKind)>,
    threats: Vec<Entity>,
    pub census: Census,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            ecs: World::new(),
            colonies: Vec::new(),
            hills: Vec::new(),
            resources: Vec::new(),
            barriers: Vec::new(),
            threats: Vec::new(),
            census: Census::default(),
        }
    }

    pub fn threats(&self) -> &[Entity] {
        &self.threats
    }

    /// Whether `entity` is alive and can currently be perceived.
    pub fn is_present(&self, entity: Entity) -> bool {
        self.ecs
            .get::<&Agent>(entity)
            .is_ok_and(|agent| agent.is_visible())
    }

    pub fn position_of(&self, entity: Entity) -> Option<Position> {
        self.ecs
            .get::<&Agent>(entity)
            .ok()
            .map(|agent| agent.body.position)
    }

    pub fn species_of(&self, entity: Entity) -> Option<Species> {
        self.ecs
            .get::<&Agent>(entity)
            .ok()
            .map(|agent| agent.body.species)
    }

    pub fn colony(&self, id: ColonyId) -> Option<&Colony> {
        self.colonies.get(id.index())
    }

    pub fn colony_mut(&mut self, id: ColonyId) -> Option<&mut Colony> {
        self.colonies.get_mut(id.index())
    }

    pub fn hill(&self, id: HillId) -> Option<&Hill> {
        self.hills.get(id.index())
    }

    pub fn hill_mut(&mut self, id: HillId) -> Option<&mut Hill> {
        self.hills.get_mut(id.index())
    }

    /// Nearest hill of `colony` to `from`. Ties go to the older hill.
    pub fn nearest_hill(&self, colony: ColonyId, from: Position) -> Option<HillId> {
        let colony = self.colony(colony)?;
        colony
            .hills
            .iter()
            .filter_map(|id| self.hill(*id))
            .min_by_key(|hill| (calc_distance(from, hill.position), hill.id))
            .map(|hill| hill.id)
    }

    /// Units of every colony in roster order: architects first, then hill members.
    pub fn units(&self) -> Vec<Entity> {
        let mut units = Vec::new();
        for colony in &self.colonies {
            units.extend_from_slice(colony.architects());
            for id in &colony.hills {
                if let Some(hill) = self.hill(*id) {
                    units.extend(hill.members());
                }
            }
        }
        units
    }

    pub fn spawn_threat(
        &mut self,
        species: Species,
        position: Position,
        config: &ThreatConfig,
        rng: &mut ChaCha8Rng,
    ) -> Option<Entity> {
        let agent = Agent::threat(species, position, config, rng)?;
        let entity = self.ecs.spawn((agent,));
        self.threats.push(entity);
        self.census.born += 1;
        Some(entity)
    }

    /// Creates a unit of `species` resting at `hill` and books it with its
    /// hill and colony. Threat species are refused.
    pub fn spawn_unt(
        &mut self,
        hill: HillId,
        species: Species,
        interval: u32,
        rng: &mut ChaCha8Rng,
    ) -> Option<Entity> {
        let home = self.hills.get(hill.index())?;
        let colony = self.colonies.get(home.colony.index())?;
        let agent = Agent::unt(species, home, colony, interval, rng)?;
        let (food, water) = agent
            .as_unt()
            .map(|unt| (unt.consumption_food, unt.consumption_water))
            .unwrap_or_default();
        let colony_id = home.colony;

        let entity = self.ecs.spawn((agent,));
        if species == Species::Architect {
            if let Some(colony) = self.colony_mut(colony_id) {
                colony.add_architect(entity);
            }
        } else if let Some(home) = self.hill_mut(hill) {
            home.attach(entity, species);
        }
        if let Some(colony) = self.colony_mut(colony_id) {
            colony.add_consumption(food, water);
        }
        self.census.born += 1;
        Some(entity)
    }

    /// Spawns a brood at `hill`. Builders of the previous cohort are retired
    /// first so generations never overlap.
    pub fn generate(&mut self, hill: HillId, brood: Brood, interval: u32, rng: &mut ChaCha8Rng) {
        for _ in 0..brood.workers {
            self.spawn_unt(hill, Species::Worker, interval, rng);
        }
        for _ in 0..brood.warriors {
            self.spawn_unt(hill, Species::Warrior, interval, rng);
        }
        let retired = self
            .hill_mut(hill)
            .map(Hill::take_builders)
            .unwrap_or_default();
        for builder in retired {
            self.retire(builder);
        }
        for _ in 0..brood.builders {
            self.spawn_unt(hill, Species::Builder, interval, rng);
        }
    }

    /// Founds a new hill for `colony` at `position`, plants it in `field` and
    /// staffs it with the builders summoned from `origin`.
    pub fn found_hill(
        &mut self,
        colony: ColonyId,
        origin: HillId,
        position: Position,
        interval: u32,
        field: &mut Field,
        rng: &mut ChaCha8Rng,
    ) -> Option<HillId> {
        self.colony(colony)?;
        let id = HillId(self.hills.len() as u32);
        let hill = Hill::new(id, colony, position);
        hill.plant(field);
        self.hills.push(hill);

        let summoned = self
            .hill_mut(origin)
            .map(Hill::take_builders)
            .unwrap_or_default();
        let available = summoned.len() as u32;
        for builder in summoned {
            self.retire(builder);
        }

        let Some(owner) = self.colonies.get_mut(colony.index()) else {
            return Some(id);
        };
        owner.hills.push(id);
        let workers = (f64::from(available) * owner.worker_ratio(&self.hills)) as u32;
        let brood = Brood {
            workers,
            warriors: available - workers,
            builders: 0,
        };
        self.generate(id, brood, interval, rng);
        if let Some(hill) = self.hill_mut(id) {
            hill.close_generation(brood);
        }
        self.census.hills_founded += 1;
        tracing::info!(
            colony = colony.0,
            hill = id.0,
            x = position.x,
            y = position.y,
            staff = available,
            "Hill founded"
        );
        Some(id)
    }

    /// Unbooks a dead or retired agent from its hill, colony and threat list.
    /// The caller owns the component and despawns the entity.
    pub fn release(&mut self, entity: Entity, agent: &Agent, killed: bool) {
        self.census.died += 1;
        if killed {
            self.census.killed += 1;
        }

        let Some(unt) = agent.as_unt() else {
            self.threats.retain(|e| *e != entity);
            return;
        };
        let species = agent.body.species;
        if species != Species::Architect {
            if let Some(hill) = self.hill_mut(unt.hill) {
                hill.detach(entity, species, killed);
            }
        }
        if let Some(colony) = self.colony_mut(unt.colony) {
            if species == Species::Architect {
                colony.remove_architect(entity);
            }
            colony.remove_consumption(unt.consumption_food, unt.consumption_water);
        }
    }

    /// Removes a unit peacefully, outside of any tick.
    pub fn retire(&mut self, entity: Entity) {
        if let Ok(mut agent) = self.ecs.remove_one::<Agent>(entity) {
            agent.body.alive = false;
            self.release(entity, &agent, false);
        }
        let _ = self.ecs.despawn(entity);
    }

    /// Moves a unit's roster entry between two hills of its colony.
    pub fn transfer(&mut self, entity: Entity, species: Species, from: HillId, to: HillId) {
        if from == to {
            return;
        }
        if let Some(hill) = self.hill_mut(from) {
            hill.detach(entity, species, false);
        }
        if let Some(hill) = self.hill_mut(to) {
            hill.attach(entity, species);
        }
    }

    /// Plants every barrier, resource and hill into a fresh field.
    pub fn plant_inerts(&self, field: &mut Field) {
        for (position, kind) in &self.barriers {
            field.place(*position, Inert::Barrier(*kind));
        }
        for resource in &self.resources {
            resource.plant(field);
        }
        for hill in &self.hills {
            hill.plant(field);
        }
    }
}

/// Everything an acting agent may touch during one tick.
///
/// `old` is the previous tick's field and is only read. `new` is the field
/// being assembled and only receives writes.
pub struct TickContext<'a> {
    pub config: &'a AppConfig,
    pub old: &'a Field,
    pub new: &'a mut Field,
    pub registry: &'a mut Registry,
    pub rng: &'a mut ChaCha8Rng,
}

impl TickContext<'_> {
    /// Rolls the per-tick chance to reconsider the current status.
    pub fn decides(&mut self) -> bool {
        self.rng.gen::<f64>() < self.config.world.decision_frequency
    }

    /// Where a target is right now.
    pub fn position_of(&self, target: Target) -> Option<Position> {
        match target {
            Target::Agent(entity) => self.registry.position_of(entity),
            Target::Hill(id) => self.registry.hill(id).map(|hill| hill.position),
            Target::Resource(id) => self
                .registry
                .resources
                .get(id.index())
                .map(|resource| resource.position),
            Target::Scent(scent) => Some(scent.position),
        }
    }

    /// Whether a target can still be found in the field being read.
    pub fn exists(&self, target: Target) -> bool {
        match target {
            Target::Agent(entity) => {
                self.registry.is_present(entity) && self.old.locate(entity).is_some()
            }
            Target::Hill(id) => self.registry.hill(id).is_some(),
            Target::Resource(id) => self.registry.resources.get(id.index()).is_some(),
            Target::Scent(scent) => self
                .old
                .space(scent.position)
                .is_some_and(|space| space.has_pheromone(scent.kind, scent.colony)),
        }
    }

    /// Queues a pheromone in the field being assembled.
    pub fn deposit(&mut self, pheromone: Pheromone) {
        self.new.deposit(pheromone);
    }

    /// Kills another agent violently.
    pub fn kill(&mut self, victim: Entity) {
        let Ok(mut agent) = self.registry.ecs.remove_one::<Agent>(victim) else {
            return;
        };
        agent.die(victim, self, true);
        let _ = self.registry.ecs.despawn(victim);
    }

    /// Makes a threat absorb a blow. Returns whether it survived.
    pub fn defend(&mut self, victim: Entity) -> bool {
        let Ok(mut agent) = self.registry.ecs.remove_one::<Agent>(victim) else {
            return false;
        };
        let survived = agent.defend(victim, self);
        if agent.body.alive {
            let _ = self.registry.ecs.insert_one(victim, agent);
        } else {
            let _ = self.registry.ecs.despawn(victim);
        }
        survived
    }
}
