//! Hills: a colony's immobile anchors.
//!
//! A hill keeps the roster of units attached to it and the statistics of the
//! generation it dispatched. At each reproduction cycle those statistics
//! decide how the hill's share of the brood splits into workers, warriors
//! and builders, and then they are cleared.

use crate::config::ColonyConfig;
use crate::field::{Field, Inert};
use hecs::Entity;
use serde::{Deserialize, Serialize};
use unts_data::{ColonyId, HillId, Position, ResourceKind, Species};

/// Per-generation counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HillStats {
    pub workers_killed: u32,
    pub warriors_killed: u32,
    pub food_gathered: f64,
    pub water_gathered: f64,
    pub workers_returned: u32,
    pub workers_unsuccessful: u32,
}

/// How a hill's allocation splits by caste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Brood {
    pub workers: u32,
    pub warriors: u32,
    pub builders: u32,
}

impl Brood {
    pub fn total(&self) -> u32 {
        self.workers + self.warriors + self.builders
    }
}

#[derive(Debug, Clone)]
pub struct Hill {
    pub id: HillId,
    pub colony: ColonyId,
    pub position: Position,
    builders: Vec<Entity>,
    warriors: Vec<Entity>,
    workers: Vec<Entity>,
    workers_lastgen: u32,
    warriors_lastgen: u32,
    pub stats: HillStats,
}

impl Hill {
    pub fn new(id: HillId, colony: ColonyId, position: Position) -> Self {
        Self {
            id,
            colony,
            position,
            builders: Vec::new(),
            warriors: Vec::new(),
            workers: Vec::new(),
            workers_lastgen: 0,
            warriors_lastgen: 0,
            stats: HillStats::default(),
        }
    }

    pub fn plant(&self, field: &mut Field) {
        field.place(
            self.position,
            Inert::Hill {
                id: self.id,
                colony: self.colony,
            },
        );
    }

    fn roster_mut(&mut self, species: Species) -> Option<&mut Vec<Entity>> {
        match species {
            Species::Builder => Some(&mut self.builders),
            Species::Warrior => Some(&mut self.warriors),
            Species::Worker => Some(&mut self.workers),
            _ => None,
        }
    }

    /// Adds a unit to the roster of its caste. Other species are not rostered.
    pub fn attach(&mut self, entity: Entity, species: Species) {
        if let Some(roster) = self.roster_mut(species) {
            if !roster.contains(&entity) {
                roster.push(entity);
            }
        }
    }

    /// Removes a unit from its roster, counting it as a combat loss when
    /// `killed`. Returns whether it was rostered here.
    pub fn detach(&mut self, entity: Entity, species: Species, killed: bool) -> bool {
        let Some(roster) = self.roster_mut(species) else {
            return false;
        };
        let Some(idx) = roster.iter().position(|e| *e == entity) else {
            return false;
        };
        roster.remove(idx);
        if killed {
            match species {
                Species::Warrior => self.stats.warriors_killed += 1,
                Species::Worker => self.stats.workers_killed += 1,
                _ => {}
            }
        }
        true
    }

    /// Empties the builder roster, handing the builders to the caller.
    pub fn take_builders(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.builders)
    }

    pub fn builders(&self) -> &[Entity] {
        &self.builders
    }

    pub fn warriors(&self) -> &[Entity] {
        &self.warriors
    }

    pub fn workers(&self) -> &[Entity] {
        &self.workers
    }

    /// Every rostered unit: builders, then warriors, then workers.
    pub fn members(&self) -> impl Iterator<Item = Entity> + '_ {
        self.builders
            .iter()
            .chain(&self.warriors)
            .chain(&self.workers)
            .copied()
    }

    pub fn unit_count(&self) -> usize {
        self.builders.len() + self.warriors.len() + self.workers.len()
    }

    /// Books the end of a worker's trip.
    pub fn record_return(&mut self, payload: Option<(ResourceKind, f64)>) {
        self.stats.workers_returned += 1;
        match payload {
            Some((ResourceKind::Food, quantity)) => self.stats.food_gathered += quantity,
            Some((ResourceKind::Water, quantity)) => self.stats.water_gathered += quantity,
            None => self.stats.workers_unsuccessful += 1,
        }
    }

    /// Share of the next brood this hill deserves. Totals of zero must be
    /// passed as one.
    pub fn priority(
        &self,
        food_total: f64,
        water_total: f64,
        population: f64,
        colony: &ColonyConfig,
    ) -> f64 {
        let control = colony.importance_expansion * self.builders.len() as f64;
        let survival = colony.importance_territory
            * f64::from(self.stats.workers_killed + self.stats.warriors_killed);
        let race = colony.importance_resources
            * (self.stats.food_gathered / food_total + self.stats.water_gathered / water_total);
        let size = colony.importance_growth * (self.unit_count() as f64 / population);
        control + survival + race + size
    }

    /// Warrior growth coefficient for the coming generation.
    fn insecurity(&self, killed: u32, colony: &ColonyConfig) -> f64 {
        if killed == 0 {
            let floor = self.unit_count() as f64 * colony.warriors.population_minimum;
            if (self.warriors.len() as f64) < floor {
                1.0
            } else {
                colony.warriors.decay
            }
        } else {
            let exposed = (self.workers.len() + self.warriors.len()) as u32 + killed;
            colony.warriors.growth + f64::from(killed) / f64::from(exposed)
        }
    }

    /// Splits an allocation of `n` units. Losses are replaced first.
    pub fn plan_generation(&self, n: u32, colony: &ColonyConfig) -> Brood {
        let workers_killed = self.stats.workers_killed;
        let warriors_killed = self.stats.warriors_killed;
        let killed = workers_killed + warriors_killed;
        let available = n.saturating_sub(killed);

        if n == 1 {
            return Brood {
                workers: 1,
                ..Brood::default()
            };
        }

        if killed > available {
            let share = |lost: u32| (f64::from(n) * f64::from(lost) / f64::from(killed)) as u32;
            return Brood {
                workers: share(workers_killed),
                warriors: share(warriors_killed),
                builders: 0,
            };
        }

        let returned = self.stats.workers_returned.max(1);
        let success = 1.0 - f64::from(self.stats.workers_unsuccessful) / f64::from(returned);
        let target_workers =
            (success * colony.workers.growth * f64::from(self.workers_lastgen.max(1))) as u32;
        let target_warriors =
            (self.insecurity(killed, colony) * f64::from(self.warriors_lastgen.max(1))) as u32;
        let targets = target_workers + target_warriors;

        if targets <= available {
            Brood {
                workers: workers_killed + target_workers,
                warriors: warriors_killed + target_warriors,
                builders: available - targets,
            }
        } else {
            let scaled = |lost: u32, target: u32| {
                (f64::from(lost) + f64::from(available) * f64::from(target) / f64::from(targets))
                    as u32
            };
            Brood {
                workers: scaled(workers_killed, target_workers),
                warriors: scaled(warriors_killed, target_warriors),
                builders: 0,
            }
        }
    }

    /// Whether the builder reserve has grown large enough to release an architect.
    pub fn is_mature(&self, colony: &ColonyConfig) -> bool {
        self.builders.len() as f64
            > colony.architects.spawning_builder_ratio * self.unit_count() as f64
    }

    /// Remembers the size of the generation just spawned and clears the counters.
    pub fn close_generation(&mut self, brood: Brood) {
        self.workers_lastgen = brood.workers;
        self.warriors_lastgen = brood.warriors;
        self.stats = HillStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: usize) -> (hecs::World, Vec<Entity>) {
        let mut world = hecs::World::new();
        let handles = (0..n).map(|_| world.spawn(())).collect();
        (world, handles)
    }

    fn hill() -> Hill {
        Hill::new(HillId(0), ColonyId(0), Position::new(5, 5))
    }

    #[test]
    fn test_detach_counts_losses() {
        let (_world, e) = entities(3);
        let mut h = hill();
        h.attach(e[0], Species::Worker);
        h.attach(e[1], Species::Warrior);
        h.attach(e[2], Species::Builder);
        assert_eq!(h.unit_count(), 3);

        assert!(h.detach(e[0], Species::Worker, true));
        assert!(h.detach(e[1], Species::Warrior, false));
        assert!(!h.detach(e[1], Species::Warrior, true));
        assert_eq!(h.stats.workers_killed, 1);
        assert_eq!(h.stats.warriors_killed, 0);
        assert_eq!(h.unit_count(), 1);
    }

    #[test]
    fn test_record_return() {
        let mut h = hill();
        h.record_return(Some((ResourceKind::Food, 5.0)));
        h.record_return(None);
        assert_eq!(h.stats.workers_returned, 2);
        assert_eq!(h.stats.workers_unsuccessful, 1);
        assert_eq!(h.stats.food_gathered, 5.0);
    }

    #[test]
    fn test_single_unit_allocation_is_a_worker() {
        let brood = hill().plan_generation(1, &ColonyConfig::default());
        assert_eq!(
            brood,
            Brood {
                workers: 1,
                warriors: 0,
                builders: 0
            }
        );
    }

    #[test]
    fn test_heavy_losses_split_by_loss_share() {
        let mut h = hill();
        h.stats.workers_killed = 6;
        h.stats.warriors_killed = 2;
        let brood = h.plan_generation(10, &ColonyConfig::default());
        assert_eq!(brood.workers, 7);
        assert_eq!(brood.warriors, 2);
        assert_eq!(brood.builders, 0);
    }

    #[test]
    fn test_remainder_becomes_builders() {
        let (_world, e) = entities(10);
        let mut h = hill();
        for entity in &e[..9] {
            h.attach(*entity, Species::Worker);
        }
        h.attach(e[9], Species::Warrior);
        h.close_generation(Brood {
            workers: 4,
            warriors: 2,
            builders: 0,
        });
        // No losses, no trips: workers grow by 1.25, warriors decay by 0.55.
        let brood = h.plan_generation(20, &ColonyConfig::default());
        assert_eq!(brood.workers, 5);
        assert_eq!(brood.warriors, 1);
        assert_eq!(brood.builders, 14);
        assert_eq!(brood.total(), 20);
    }

    #[test]
    fn test_targets_scaled_to_fit() {
        let mut h = hill();
        h.close_generation(Brood {
            workers: 20,
            warriors: 10,
            builders: 0,
        });
        h.stats.workers_killed = 1;
        let brood = h.plan_generation(6, &ColonyConfig::default());
        assert_eq!(brood.builders, 0);
        assert!(brood.workers + brood.warriors <= 6);
        assert!(brood.workers >= 1);
    }

    #[test]
    fn test_maturity_threshold() {
        let (_world, e) = entities(3);
        let mut h = hill();
        h.attach(e[0], Species::Builder);
        h.attach(e[1], Species::Worker);
        h.attach(e[2], Species::Worker);
        assert!(h.is_mature(&ColonyConfig::default()));
        let taken = h.take_builders();
        assert_eq!(taken, vec![e[0]]);
        assert!(!h.is_mature(&ColonyConfig::default()));
    }
}
