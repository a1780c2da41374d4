//! Predators, hunters and stalkers.
//!
//! Threats wander until a lone unit (or a group without warriors) comes into
//! sight, chase it, and kill it once within two cells. A kill pins the threat
//! in place for a cooldown, after which it retreats from warriors while their
//! colony's alarm signals linger. Threats that live out their lifespan leave
//! offspring in proportion to what they ate.

use super::perception::{ColonyFilter, Perception};
use super::{Agent, Body, Kind, Lifecycle, Target};
use crate::config::ThreatConfig;
use crate::geometry::{calc_distance, find_angle};
use crate::pheromone::Pheromone;
use crate::registry::TickContext;
use hecs::Entity;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use unts_data::{PheromoneType, Position, Species, Status};

/// Species a threat will chase.
const PREY: [Species; 3] = [Species::Architect, Species::Warrior, Species::Worker];

/// Reach of a threat's attack.
const STRIKE_RANGE: i32 = 2;

#[derive(Debug, Clone)]
pub struct Threat {
    pub health: u32,
    /// Units eaten plus warrior fights survived.
    pub consumed: u32,
    pub nourishment: u32,
    /// Ticks left pinned after a kill.
    pub cooldown: u32,
}

impl Threat {
    /// Offspring left behind on a natural death.
    pub fn offspring(&self) -> u32 {
        self.consumed / self.nourishment.max(1) + 1
    }
}

impl Agent {
    /// Creates a threat of `species`. Unt species are refused.
    pub fn threat(
        species: Species,
        position: Position,
        config: &ThreatConfig,
        rng: &mut ChaCha8Rng,
    ) -> Option<Agent> {
        if !species.is_threat() {
            return None;
        }
        Some(Agent {
            body: Body {
                species,
                position,
                orientation: rng.gen_range(0..8) * 45,
                status: Status::Wandering,
                target: None,
                life: config.lifespan,
                sight: config.sight.max(1),
                smell: config.smell.max(1),
                visible: true,
                alive: true,
                appearance: config.appearance,
            },
            kind: Kind::Threat(Threat {
                health: config.health_points,
                consumed: 0,
                nourishment: config.nourishment,
                cooldown: 0,
            }),
        })
    }

    fn threat_state(&mut self) -> Option<&mut Threat> {
        match &mut self.kind {
            Kind::Threat(threat) => Some(threat),
            Kind::Unt(_) => None,
        }
    }

    pub(super) fn act_threat(&mut self, me: Entity, ctx: &mut TickContext) {
        if self.body.status == Status::Killing {
            let Some(threat) = self.threat_state() else {
                return;
            };
            threat.cooldown = threat.cooldown.saturating_sub(1);
            if threat.cooldown > 0 {
                return;
            }
            self.body.status = Status::Retreating;
        }

        if ctx.decides() {
            self.reconsider_hunt(me, ctx);
        }

        self.travel(me, ctx);

        match (self.body.status, self.body.target) {
            (Status::Following, Some(Target::Agent(prey))) => {
                let within_reach = ctx
                    .registry
                    .position_of(prey)
                    .is_some_and(|at| calc_distance(self.body.position, at) <= STRIKE_RANGE);
                if within_reach && ctx.registry.is_present(prey) {
                    self.strike(me, prey, ctx);
                }
            }
            (Status::Wandering, _) => self.species_action(ctx),
            _ => {}
        }
    }

    fn give_up(&mut self) {
        self.body.status = Status::Wandering;
        self.body.target = None;
    }

    fn reconsider_hunt(&mut self, me: Entity, ctx: &mut TickContext) {
        match self.body.status {
            Status::Wandering => {
                let prey = self.agents_in_sight(me, ctx, &PREY, ColonyFilter::Any);
                let guarded = prey.iter().any(|s| s.species == Species::Warrior);
                if let Some(first) = prey.first() {
                    if prey.len() == 1 || !guarded {
                        self.aim(ctx, Target::from(first));
                    }
                }
            }
            Status::Following => {
                let Some(target) = self.body.target.filter(|t| ctx.exists(*t)) else {
                    self.give_up();
                    return;
                };
                let health = self.as_threat().map_or(0, |t| t.health);
                let warriors =
                    self.agents_in_sight(me, ctx, &[Species::Warrior], ColonyFilter::Any);
                let chasing_lone_warrior =
                    warriors.len() == 1 && Target::from(&warriors[0]) == target;
                if health == 1
                    || warriors.len() > 1
                    || (warriors.len() == 1 && !chasing_lone_warrior)
                {
                    self.give_up();
                }
            }
            Status::Retreating => {
                if self
                    .pheromones_by_strength(ctx, &[PheromoneType::Threat], None)
                    .is_empty()
                {
                    self.give_up();
                } else if let Some(warrior) = self
                    .agents_in_sight(me, ctx, &[Species::Warrior], ColonyFilter::Any)
                    .first()
                {
                    let away = find_angle(self.body.position, warrior.position) + 180;
                    self.body.set_orientation(away);
                }
            }
            _ => {}
        }
    }

    /// Kills `prey`. Fighting a warrior costs one hit point.
    fn strike(&mut self, me: Entity, prey: Entity, ctx: &mut TickContext) {
        let Some(species) = ctx.registry.species_of(prey) else {
            return;
        };
        let cooldown = ctx.config.threats.kill_time(species);
        if let Some(threat) = self.threat_state() {
            threat.cooldown = cooldown;
            if species != Species::Warrior {
                threat.consumed += 1;
            }
        }
        if species == Species::Warrior {
            self.defend(me, ctx);
        }
        self.body.status = Status::Killing;
        ctx.kill(prey);
    }

    /// Takes a blow. Returns whether the threat is still standing.
    pub fn defend(&mut self, me: Entity, ctx: &mut TickContext) -> bool {
        if !self.body.alive {
            return false;
        }
        let Some(threat) = self.threat_state() else {
            return false;
        };
        threat.health = threat.health.saturating_sub(1);
        if threat.health == 0 {
            self.die(me, ctx, true);
            return false;
        }
        threat.consumed += 1;
        true
    }

    fn species_action(&mut self, ctx: &mut TickContext) {
        match self.body.species {
            Species::Hunter => {
                let kind = PheromoneType::RESOURCES[ctx.rng.gen_range(0..2)];
                let intensity = ctx.config.threats.hunters.pheromones;
                ctx.deposit(Pheromone::new(kind, None, self.body.position, intensity));
            }
            Species::Stalker => {
                let lead = self
                    .pheromones_by_strength(ctx, &PheromoneType::RESOURCES, None)
                    .into_iter()
                    .next();
                if let Some(scent) = lead {
                    self.follow(Target::Scent(scent), scent.position);
                }
            }
            _ => {}
        }
    }

    /// Spawns this threat's offspring at its position.
    pub(super) fn spawn_offspring(&self, ctx: &mut TickContext) {
        let Some(threat) = self.as_threat() else {
            return;
        };
        let config = ctx.config;
        let Some(species_config) = config.threats.for_species(self.body.species) else {
            return;
        };
        for _ in 0..threat.offspring() {
            ctx.registry.spawn_threat(
                self.body.species,
                self.body.position,
                species_config,
                &mut *ctx.rng,
            );
        }
    }
}
