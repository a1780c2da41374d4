//! State and lifecycle shared by every colony unit.
//!
//! Builders stay in their hill as reservists. Architects scout for a site and
//! found a new hill. Warriors and workers are field units: they rest in a
//! hill until dispatched, head out, and come back to the nearest hill of
//! their colony once half their energy is gone (workers also after a harvest).

use super::worker::Worker;
use super::{Agent, Body, Kind, Lifecycle};
use crate::colony::Colony;
use crate::hill::Hill;
use crate::registry::TickContext;
use hecs::Entity;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use unts_data::{Appearance, ColonyId, Focus, HillId, Species, Status};

/// Per-caste state.
#[derive(Debug, Clone)]
pub enum Caste {
    Architect {
        /// Resource the architect wants near its new hill.
        focus: Focus,
    },
    Builder,
    Warrior {
        /// Escorts shadow resource trails when nothing else needs them.
        escort: bool,
    },
    Worker(Worker),
}

#[derive(Debug, Clone)]
pub struct Unt {
    pub colony: ColonyId,
    pub hill: HillId,
    pub energy: i32,
    pub max_energy: i32,
    pub consumption_food: f64,
    pub consumption_water: f64,
    pub returning: bool,
    /// Waiting inside a hill to be dispatched.
    pub resting: bool,
    pub caste: Caste,
}

impl Unt {
    pub fn is_field_unit(&self) -> bool {
        matches!(self.caste, Caste::Warrior { .. } | Caste::Worker(_))
    }
}

/// Creation parameters pulled from a colony's configuration.
struct Profile {
    energy: i32,
    consumption_food: f64,
    consumption_water: f64,
    sight: i32,
    smell: i32,
    appearance: Appearance,
}

/// Which resource an architect looks for: the one the colony is shorter of.
fn architect_focus(colony: &Colony) -> Focus {
    let (food, water) = (colony.risk_food(), colony.risk_water());
    if food > water {
        Focus::Food
    } else if water > food {
        Focus::Water
    } else {
        Focus::Any
    }
}

impl Agent {
    /// Creates a unit of `species` at `hill`. Threat species are refused.
    ///
    /// Units live for one reproduction interval plus the colony lifespan.
    pub fn unt(
        species: Species,
        hill: &Hill,
        colony: &Colony,
        interval: u32,
        rng: &mut ChaCha8Rng,
    ) -> Option<Agent> {
        let config = &colony.config;
        let profile = match species {
            Species::Architect => Profile {
                energy: config.architects.energy,
                consumption_food: 0.0,
                consumption_water: 0.0,
                sight: config.architects.sight,
                smell: 1,
                appearance: config.architects.appearance,
            },
            Species::Builder => Profile {
                energy: config.builders.energy,
                consumption_food: config.builders.consumption_food,
                consumption_water: config.builders.consumption_water,
                sight: 1,
                smell: 1,
                appearance: Appearance::default(),
            },
            Species::Warrior => Profile {
                energy: config.warriors.energy,
                consumption_food: config.warriors.consumption_food,
                consumption_water: config.warriors.consumption_water,
                sight: config.warriors.sight,
                smell: config.warriors.smell,
                appearance: config.warriors.appearance,
            },
            Species::Worker => Profile {
                energy: config.workers.energy,
                consumption_food: config.workers.consumption_food,
                consumption_water: config.workers.consumption_water,
                sight: config.workers.sight,
                smell: config.workers.smell,
                appearance: config.workers.appearance,
            },
            _ => return None,
        };

        let orientation = rng.gen_range(0..8) * 45;
        let caste = match species {
            Species::Architect => Caste::Architect {
                focus: architect_focus(colony),
            },
            Species::Warrior => Caste::Warrior {
                escort: rng.gen::<f64>() < config.warriors.escort,
            },
            Species::Worker => Caste::Worker(Worker::new(&config.workers, rng)),
            _ => Caste::Builder,
        };
        let field_unit = matches!(species, Species::Warrior | Species::Worker);

        Some(Agent {
            body: Body {
                species,
                position: hill.position,
                orientation,
                status: Status::Wandering,
                target: None,
                life: interval + config.lifespan,
                sight: profile.sight.max(1),
                smell: profile.smell.max(1),
                visible: species == Species::Architect,
                alive: true,
                appearance: profile.appearance,
            },
            kind: Kind::Unt(Unt {
                colony: colony.id,
                hill: hill.id,
                energy: profile.energy,
                max_energy: profile.energy,
                consumption_food: profile.consumption_food,
                consumption_water: profile.consumption_water,
                returning: false,
                resting: field_unit,
                caste,
            }),
        })
    }

    pub(super) fn act_unt(&mut self, me: Entity, ctx: &mut TickContext) {
        match self.body.species {
            Species::Builder => {
                if self.exist(me, ctx) && self.as_unt().is_some_and(|u| u.energy <= 0) {
                    self.recover_energy(ctx);
                }
            }
            Species::Architect => {
                if self.exist(me, ctx) {
                    self.act_architect(me, ctx);
                }
            }
            Species::Warrior | Species::Worker => self.act_field_unit(me, ctx),
            _ => {}
        }
    }

    fn act_field_unit(&mut self, me: Entity, ctx: &mut TickContext) {
        let Some(unt) = self.as_unt() else {
            return;
        };
        if unt.resting {
            self.dispatch(ctx);
            return;
        }

        let exhausted =
            f64::from(unt.energy - 1) / f64::from(unt.max_energy.max(1)) <= 0.5;
        if !unt.returning && exhausted && self.head_home(ctx) {
            if let Some(unt) = self.as_unt_mut() {
                unt.returning = true;
            }
        }

        if !self.exist(me, ctx) {
            return;
        }
        if matches!(self.body.species, Species::Warrior) {
            self.act_warrior(me, ctx);
        } else {
            self.act_worker(me, ctx);
        }
    }

    /// Burns one unit of energy, starving once none is left.
    pub fn exist(&mut self, me: Entity, ctx: &mut TickContext) -> bool {
        if !self.body.alive {
            return false;
        }
        let Some(unt) = self.as_unt_mut() else {
            return false;
        };
        if unt.energy <= 0 {
            self.die(me, ctx, false);
            return false;
        }
        unt.energy -= 1;
        true
    }

    /// Eats and drinks from the colony stockpiles in proportion to the
    /// energy missing. Each resource restores half of that gap, and only
    /// when its withdrawal succeeds.
    pub fn recover_energy(&mut self, ctx: &mut TickContext) {
        let Some(unt) = self.as_unt_mut() else {
            return;
        };
        if unt.max_energy <= 0 {
            return;
        }
        let Some(colony) = ctx.registry.colony_mut(unt.colony) else {
            return;
        };

        let factor = 1.0 - f64::from(unt.energy) / f64::from(unt.max_energy);
        let mut halves = 0;
        if colony.remove_food(unt.consumption_food * factor) {
            halves += 1;
        }
        if colony.remove_water(unt.consumption_water * factor) {
            halves += 1;
        }
        let recovered = (factor / 2.0) * f64::from(halves) * f64::from(unt.max_energy);
        unt.energy += recovered.ceil() as i32;
    }

    /// Sends a resting unit out of its hill.
    fn dispatch(&mut self, ctx: &mut TickContext) {
        if matches!(self.body.species, Species::Worker) {
            self.roll_focus(ctx);
        }
        self.body.status = Status::Wandering;
        self.body.target = None;
        self.body.orientation = ctx.rng.gen_range(0..360);
        if let Some(unt) = self.as_unt_mut() {
            unt.resting = false;
        }
        self.recover_energy(ctx);
        self.body.visible = true;
    }

    /// Ends a trip at `hill`: workers unload, the unit joins that hill's
    /// roster and goes back to rest.
    pub(super) fn arrive(&mut self, me: Entity, hill: HillId, ctx: &mut TickContext) {
        let species = self.body.species;
        let Some(unt) = self.as_unt_mut() else {
            return;
        };

        if let Caste::Worker(worker) = &mut unt.caste {
            let payload = worker.payload.take();
            if let Some(home) = ctx.registry.hill_mut(hill) {
                home.record_return(payload);
            }
            if let (Some((kind, quantity)), Some(colony)) =
                (payload, ctx.registry.colony_mut(unt.colony))
            {
                colony.deposit(kind, quantity);
            }
        }

        if unt.hill != hill {
            ctx.registry.transfer(me, species, unt.hill, hill);
            unt.hill = hill;
        }
        unt.resting = true;
        unt.returning = false;
        self.body.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColonyConfig, ReproductionConfig};
    use rand::SeedableRng;
    use unts_data::Position;

    fn fixture() -> (Hill, Colony) {
        let colony = Colony::new(
            ColonyId(0),
            ColonyConfig::default(),
            &ReproductionConfig::default(),
        );
        let hill = Hill::new(HillId(0), ColonyId(0), Position::new(4, 4));
        (hill, colony)
    }

    #[test]
    fn test_field_units_start_resting_and_hidden() {
        let (hill, colony) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let worker = Agent::unt(Species::Worker, &hill, &colony, 500, &mut rng);
        let worker = worker.as_ref().and_then(Agent::as_unt).cloned();
        assert!(worker.is_some_and(|u| u.resting && u.is_field_unit()));

        let builder = Agent::unt(Species::Builder, &hill, &colony, 500, &mut rng);
        assert!(builder.is_some_and(|b| !b.is_visible() && b.body.life == 600));
    }

    #[test]
    fn test_architects_are_visible_and_free() {
        let (hill, colony) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let architect = Agent::unt(Species::Architect, &hill, &colony, 500, &mut rng);
        assert!(architect.as_ref().is_some_and(Agent::is_visible));
        let unt = architect.as_ref().and_then(Agent::as_unt);
        assert_eq!(unt.map(|u| u.consumption_food), Some(0.0));
        assert_eq!(unt.map(|u| u.max_energy), Some(75));
    }

    #[test]
    fn test_threat_species_refused() {
        let (hill, colony) = fixture();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(Agent::unt(Species::Stalker, &hill, &colony, 500, &mut rng).is_none());
    }

    #[test]
    fn test_architect_focus_follows_risk() {
        let (_, mut colony) = fixture();
        assert_eq!(architect_focus(&colony), Focus::Any);
        colony.remove_food(20.0);
        assert_eq!(architect_focus(&colony), Focus::Food);
    }
}
