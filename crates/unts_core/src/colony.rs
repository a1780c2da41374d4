//! Colonies: stockpiles, consumption and the reproduction cycle.

use crate::config::{ColonyConfig, ReproductionConfig};
use crate::hill::Hill;
use hecs::Entity;
use unts_data::{ColonyId, HillId, ResourceKind};

#[derive(Debug, Clone)]
pub struct Colony {
    pub id: ColonyId,
    pub config: ColonyConfig,
    pub hills: Vec<HillId>,
    architects: Vec<Entity>,
    consumption_food: f64,
    consumption_water: f64,
    food: f64,
    water: f64,
    countdown: u32,
}

impl Colony {
    pub fn new(id: ColonyId, config: ColonyConfig, reproduction: &ReproductionConfig) -> Self {
        Self {
            id,
            food: config.food,
            water: config.water,
            config,
            hills: Vec::new(),
            architects: Vec::new(),
            consumption_food: 0.0,
            consumption_water: 0.0,
            countdown: reproduction.interval,
        }
    }

    pub fn food(&self) -> f64 {
        self.food
    }

    pub fn water(&self) -> f64 {
        self.water
    }

    pub fn consumption_food(&self) -> f64 {
        self.consumption_food
    }

    pub fn consumption_water(&self) -> f64 {
        self.consumption_water
    }

    /// Ticks left before the next reproduction attempt.
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Urgency of food: positive while the stockpile is under twice the
    /// colony's consumption.
    pub fn risk_food(&self) -> f64 {
        -(self.food - 2.0 * self.consumption_food)
    }

    pub fn risk_water(&self) -> f64 {
        -(self.water - 2.0 * self.consumption_water)
    }

    /// Withdraws food if any is left. The stockpile may end up negative.
    pub fn remove_food(&mut self, amount: f64) -> bool {
        if self.food > 0.0 {
            self.food -= amount;
            return true;
        }
        false
    }

    pub fn remove_water(&mut self, amount: f64) -> bool {
        if self.water > 0.0 {
            self.water -= amount;
            return true;
        }
        false
    }

    pub fn deposit(&mut self, kind: ResourceKind, quantity: f64) {
        match kind {
            ResourceKind::Food => self.food += quantity,
            ResourceKind::Water => self.water += quantity,
        }
    }

    /// Adds a unit's appetite to the colony totals.
    pub fn add_consumption(&mut self, food: f64, water: f64) {
        self.consumption_food += food;
        self.consumption_water += water;
    }

    /// Removes a unit's appetite. Totals never drop below zero.
    pub fn remove_consumption(&mut self, food: f64, water: f64) {
        self.consumption_food = (self.consumption_food - food).max(0.0);
        self.consumption_water = (self.consumption_water - water).max(0.0);
    }

    pub fn add_architect(&mut self, entity: Entity) {
        if !self.architects.contains(&entity) {
            self.architects.push(entity);
        }
    }

    pub fn remove_architect(&mut self, entity: Entity) -> bool {
        let before = self.architects.len();
        self.architects.retain(|e| *e != entity);
        self.architects.len() != before
    }

    pub fn architects(&self) -> &[Entity] {
        &self.architects
    }

    fn own_hills<'a>(&'a self, hills: &'a [Hill]) -> impl Iterator<Item = &'a Hill> + 'a {
        self.hills
            .iter()
            .filter_map(move |id| hills.get(id.index()))
    }

    /// Architects plus every unit rostered at one of this colony's hills.
    pub fn unit_count(&self, hills: &[Hill]) -> usize {
        self.architects.len()
            + self
                .own_hills(hills)
                .map(Hill::unit_count)
                .sum::<usize>()
    }

    /// Share of workers among field units; `1.0` when there are none.
    pub fn worker_ratio(&self, hills: &[Hill]) -> f64 {
        let (workers, warriors) = self.own_hills(hills).fold((0, 0), |(w, r), hill| {
            (w + hill.workers().len(), r + hill.warriors().len())
        });
        if workers + warriors == 0 {
            return 1.0;
        }
        workers as f64 / (workers + warriors) as f64
    }

    /// Advances the reproduction countdown. Returns the size of the brood to
    /// allocate when a cycle completes.
    pub fn tick(&mut self, hills: &[Hill], reproduction: &ReproductionConfig) -> Option<f64> {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            return None;
        }

        let surplus_food = (self.food - self.consumption_food) * reproduction.resources_reserve;
        let surplus_water = (self.water - self.consumption_water) * reproduction.resources_reserve;
        let existing = self.unit_count(hills) as f64;
        let mut brood = surplus_food.min(surplus_water) * existing;

        if existing == 0.0 {
            brood = (self.hills.len() as u32 * reproduction.restart_factor) as f64;
            if self.food <= 0.0 {
                self.food = self.config.food;
            }
            if self.water <= 0.0 {
                self.water = self.config.water;
            }
        } else if brood < 0.0 {
            brood = 0.0;
        }

        if existing > 0.0 && brood < reproduction.generation_minimum * existing {
            self.countdown = reproduction.delay;
            return None;
        }

        self.countdown = reproduction.interval;
        Some(brood)
    }

    /// Splits a brood of `n` across this colony's hills by priority, rounding
    /// each share up and giving every hill at least one unit.
    pub fn allocate(&self, hills: &[Hill], n: f64) -> Vec<(HillId, u32)> {
        let own: Vec<&Hill> = self.own_hills(hills).collect();
        let food: f64 = own.iter().map(|h| h.stats.food_gathered).sum();
        let water: f64 = own.iter().map(|h| h.stats.water_gathered).sum();
        let population = own.iter().map(|h| h.unit_count()).sum::<usize>() as f64;

        let or_one = |v: f64| if v == 0.0 { 1.0 } else { v };
        let priorities: Vec<f64> = own
            .iter()
            .map(|h| {
                h.priority(
                    or_one(food),
                    or_one(water),
                    or_one(population),
                    &self.config,
                )
            })
            .collect();
        let sum = or_one(priorities.iter().sum());

        own.iter()
            .zip(priorities)
            .map(|(hill, priority)| {
                let share = (priority / sum * n).ceil().max(0.0) as u32;
                (hill.id, share.max(1))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unts_data::Position;

    fn colony() -> Colony {
        Colony::new(
            ColonyId(0),
            ColonyConfig::default(),
            &ReproductionConfig::default(),
        )
    }

    #[test]
    fn test_withdrawal_only_while_stocked() {
        let mut c = colony();
        assert!(c.remove_food(30.0));
        assert!(c.food() < 0.0);
        assert!(!c.remove_food(1.0));
        assert!(c.remove_water(1.0));
    }

    #[test]
    fn test_risk_sign() {
        let mut c = colony();
        c.add_consumption(20.0, 5.0);
        assert!(c.risk_food() > 0.0);
        assert!(c.risk_water() < 0.0);
        c.remove_consumption(100.0, 100.0);
        assert_eq!(c.consumption_food(), 0.0);
    }

    #[test]
    fn test_empty_colony_restarts() {
        let reproduction = ReproductionConfig {
            interval: 2,
            ..Default::default()
        };
        let mut c = Colony::new(ColonyId(0), ColonyConfig::default(), &reproduction);
        c.hills.push(HillId(0));
        let hills = vec![Hill::new(HillId(0), ColonyId(0), Position::new(1, 1))];
        c.remove_food(100.0);

        assert_eq!(c.tick(&hills, &reproduction), None);
        assert_eq!(c.tick(&hills, &reproduction), Some(5.0));
        assert_eq!(c.food(), c.config.food);
        assert_eq!(c.countdown(), 2);
    }

    #[test]
    fn test_small_brood_deferred() {
        let reproduction = ReproductionConfig {
            interval: 1,
            delay: 7,
            ..Default::default()
        };
        let mut world = hecs::World::new();
        let mut c = Colony::new(ColonyId(0), ColonyConfig::default(), &reproduction);
        c.hills.push(HillId(0));
        c.add_consumption(30.0, 30.0);
        let mut hill = Hill::new(HillId(0), ColonyId(0), Position::new(1, 1));
        hill.attach(world.spawn(()), unts_data::Species::Worker);

        assert_eq!(c.tick(&[hill], &reproduction), None);
        assert_eq!(c.countdown(), 7);
    }

    #[test]
    fn test_allocation_gives_every_hill_one() {
        let mut c = colony();
        c.hills = vec![HillId(0), HillId(1), HillId(2)];
        let hills: Vec<Hill> = (0..3)
            .map(|i| Hill::new(HillId(i), ColonyId(0), Position::new(i as i32, 0)))
            .collect();
        let shares = c.allocate(&hills, 1.0);
        assert_eq!(shares.len(), 3);
        assert!(shares.iter().all(|(_, n)| *n == 1));
    }
}
