//! Warriors guard their colony's foragers.

use super::perception::{ColonyFilter, Perception};
use super::{Agent, Caste, Lifecycle, Target};
use crate::geometry::calc_distance;
use crate::pheromone::Pheromone;
use crate::registry::TickContext;
use hecs::Entity;
use unts_data::{PheromoneType, Species, Status};

/// What a warrior chases first: foreign warriors and every threat species.
const HOSTILE: [Species; 4] = [
    Species::Warrior,
    Species::Predator,
    Species::Hunter,
    Species::Stalker,
];

/// Foreign units a warrior hunts down when nothing hostile is around.
const FORAGERS: [Species; 2] = [Species::Worker, Species::Architect];

impl Agent {
    pub(super) fn act_warrior(&mut self, me: Entity, ctx: &mut TickContext) {
        if ctx.decides() {
            if self.body.status == Status::Following
                && !self.body.target.is_some_and(|t| ctx.exists(t))
            {
                self.body.status = Status::Wandering;
                self.body.target = None;
            }
            let pursuing = self.body.status == Status::Following
                && !matches!(self.body.target, Some(Target::Hill(_)));
            if self.body.status == Status::Wandering || pursuing {
                self.look_for_trouble(me, ctx);
            }
        }

        self.travel(me, ctx);

        if self.body.status != Status::Following {
            return;
        }
        let Some(Target::Agent(foe)) = self.body.target else {
            return;
        };
        let in_reach = ctx
            .registry
            .position_of(foe)
            .is_some_and(|at| calc_distance(self.body.position, at) <= 1);
        if !in_reach || !ctx.registry.is_present(foe) {
            return;
        }

        if self.engage(foe, ctx) {
            if self.head_home(ctx) {
                if let Some(unt) = self.as_unt_mut() {
                    unt.returning = true;
                }
            }
        } else {
            self.die(me, ctx, true);
        }
    }

    /// Picks something to chase, in order of urgency.
    fn look_for_trouble(&mut self, me: Entity, ctx: &mut TickContext) {
        let Some(colony) = self.colony() else {
            return;
        };

        let hostile = self.agents_in_sight(me, ctx, &HOSTILE, ColonyFilter::Except(colony));
        if let Some(foe) = hostile.first() {
            self.aim(ctx, Target::from(foe));
            return;
        }

        let alarm = self
            .pheromones_by_strength(ctx, &[PheromoneType::Threat], None)
            .into_iter()
            .next();
        if let Some(scent) = alarm {
            self.follow(Target::Scent(scent), scent.position);
            return;
        }

        let foreigners = self.agents_in_sight(me, ctx, &FORAGERS, ColonyFilter::Except(colony));
        if let Some(foreigner) = foreigners.first() {
            self.aim(ctx, Target::from(foreigner));
            return;
        }

        let escort = self
            .as_unt()
            .is_some_and(|unt| matches!(unt.caste, Caste::Warrior { escort: true }));
        if escort {
            let trail = self
                .pheromones_by_strength(ctx, &PheromoneType::RESOURCES, None)
                .into_iter()
                .next();
            if let Some(scent) = trail {
                self.follow(Target::Scent(scent), scent.position);
            }
        }
    }

    /// Sounds the alarm and attacks `foe`. Returns whether the warrior lives.
    ///
    /// A threat that survives the blow kills the warrior; a unit is killed
    /// outright, but killing another warrior is fatal for both.
    fn engage(&mut self, foe: Entity, ctx: &mut TickContext) -> bool {
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

        let Some(species) = ctx.registry.species_of(foe) else {
            return true;
        };
        if species.is_threat() {
            return !ctx.defend(foe);
        }
        ctx.kill(foe);
        species != Species::Warrior
    }
}
