//! Agents: the threat species and the colony castes.
//!
//! Every agent is one [`Agent`] component in the registry's `hecs::World`.
//! The component pairs a [`Body`] (what every species shares: position,
//! heading, status, target, lifespan, senses) with a [`Kind`] that carries
//! the per-family state. Behaviour is dispatched on the species tag rather
//! than through a class hierarchy, so there is no way to construct an agent
//! of an abstract family.
//!
//! ## Acting
//!
//! The tick driver takes an agent's component out of the world, hands it a
//! [`TickContext`] and puts it back afterwards. While acting, an agent reads
//! the previous tick's field and writes deposits into the next one; other
//! agents it kills or wounds are reached through the context by handle.

mod architect;
mod movement;
mod perception;
mod threat;
mod unt;
mod warrior;
mod worker;

pub use perception::{ColonyFilter, Perception};
pub use threat::Threat;
pub use unt::{Caste, Unt};
pub use worker::Worker;

use crate::field::Sighting;
use crate::pheromone::Pheromone;
use crate::registry::TickContext;
use hecs::Entity;
use unts_data::{
    Appearance, ColonyId, HillId, PheromoneType, Position, ResourceId, Species, Status,
};

/// A pheromone as remembered by an agent following it.
///
/// Merged signals are recreated every tick, so a follower keeps the identity
/// of the signal (type, owner, cell) rather than the signal itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scent {
    pub kind: PheromoneType,
    pub colony: Option<ColonyId>,
    pub position: Position,
}

impl From<&Pheromone> for Scent {
    fn from(pheromone: &Pheromone) -> Self {
        Self {
            kind: pheromone.kind,
            colony: pheromone.colony,
            position: pheromone.position,
        }
    }
}

/// Anything an agent can follow or avoid. Every variant is a weak reference
/// that is re-resolved on use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Agent(Entity),
    Hill(HillId),
    Resource(ResourceId),
    Scent(Scent),
}

impl From<&Sighting> for Target {
    fn from(sighting: &Sighting) -> Self {
        Target::Agent(sighting.entity)
    }
}

/// State shared by every species.
#[derive(Debug, Clone)]
pub struct Body {
    pub species: Species,
    pub position: Position,
    /// Heading in degrees, 0 = north, clockwise.
    pub orientation: i32,
    pub status: Status,
    pub target: Option<Target>,
    /// Ticks left before a natural death.
    pub life: u32,
    pub sight: i32,
    pub smell: i32,
    pub visible: bool,
    pub alive: bool,
    pub appearance: Appearance,
}

impl Body {
    pub(crate) fn set_orientation(&mut self, angle: i32) {
        self.orientation = angle.rem_euclid(360);
    }
}

#[derive(Debug, Clone)]
pub enum Kind {
    Threat(Threat),
    Unt(Unt),
}

/// The component stored for every agent.
#[derive(Debug, Clone)]
pub struct Agent {
    pub body: Body,
    pub kind: Kind,
}

impl Agent {
    pub fn species(&self) -> Species {
        self.body.species
    }

    pub fn position(&self) -> Position {
        self.body.position
    }

    pub fn status(&self) -> Status {
        self.body.status
    }

    pub fn target(&self) -> Option<Target> {
        self.body.target
    }

    /// Alive and rendered. Resting units and builders are hidden.
    pub fn is_visible(&self) -> bool {
        self.body.alive && self.body.visible
    }

    pub fn colony(&self) -> Option<ColonyId> {
        self.as_unt().map(|unt| unt.colony)
    }

    pub fn as_unt(&self) -> Option<&Unt> {
        match &self.kind {
            Kind::Unt(unt) => Some(unt),
            Kind::Threat(_) => None,
        }
    }

    pub fn as_unt_mut(&mut self) -> Option<&mut Unt> {
        match &mut self.kind {
            Kind::Unt(unt) => Some(unt),
            Kind::Threat(_) => None,
        }
    }

    pub fn as_threat(&self) -> Option<&Threat> {
        match &self.kind {
            Kind::Threat(threat) => Some(threat),
            Kind::Unt(_) => None,
        }
    }

    /// What the field being assembled records about this agent.
    pub fn sighting(&self, entity: Entity) -> Sighting {
        Sighting {
            entity,
            species: self.body.species,
            colony: self.colony(),
            position: self.body.position,
        }
    }

    pub(crate) fn follow(&mut self, target: Target, at: Position) {
        self.body.status = Status::Following;
        self.body.target = Some(target);
        self.body
            .set_orientation(crate::geometry::find_angle(self.body.position, at));
    }
}

/// Operations every species goes through each tick.
pub trait Lifecycle {
    /// Counts down the lifespan. Returns `false` once the agent is gone.
    fn tick(&mut self, me: Entity, ctx: &mut TickContext) -> bool;

    /// Decides and moves.
    fn act(&mut self, me: Entity, ctx: &mut TickContext);

    /// Removes the agent from every registry. `violent` deaths leave a
    /// threat signal behind for the victim's colony.
    fn die(&mut self, me: Entity, ctx: &mut TickContext, violent: bool);
}

impl Lifecycle for Agent {
    fn tick(&mut self, me: Entity, ctx: &mut TickContext) -> bool {
        if !self.body.alive {
            return false;
        }
        self.body.life = self.body.life.saturating_sub(1);
        if self.body.life == 0 {
            if matches!(self.kind, Kind::Threat(_)) {
                self.spawn_offspring(ctx);
            }
            self.die(me, ctx, false);
            return false;
        }
        true
    }

    fn act(&mut self, me: Entity, ctx: &mut TickContext) {
        if !self.body.alive {
            return;
        }
        if matches!(self.kind, Kind::Threat(_)) {
            self.act_threat(me, ctx);
        } else {
            self.act_unt(me, ctx);
        }
    }

    fn die(&mut self, me: Entity, ctx: &mut TickContext, violent: bool) {
        if !self.body.alive {
            return;
        }
        self.body.alive = false;

        if violent {
            if let Some(colony) = self.colony() {
                let intensity = ctx
                    .registry
                    .colony(colony)
                    .map_or(0.0, |c| c.config.pheromones_attack);
                ctx.deposit(Pheromone::new(
                    PheromoneType::Threat,
                    Some(colony),
                    self.body.position,
                    intensity,
                ));
            }
        }

        ctx.registry.release(me, self, violent);
        tracing::trace!(
            species = ?self.body.species,
            x = self.body.position.x,
            y = self.body.position.y,
            violent,
            "Agent died"
        );
    }
}
