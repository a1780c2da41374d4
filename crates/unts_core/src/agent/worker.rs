//! Workers forage for their colony.
//!
//! A worker leaves its hill with a focus rolled from the colony's shortages,
//! follows trails that lead away from home, harvests the first suitable
//! resource it reaches and walks back laying a fading trail of its own.
//! Threats and alarm signals it notices go on an avoid list that makes it
//! scatter until they are out of sensing range.

use super::perception::{ColonyFilter, Perception};
use super::{Agent, Caste, Scent, Target};
use crate::config::WorkerConfig;
use crate::geometry::{calc_distance, find_angle, find_closest};
use crate::pheromone::Pheromone;
use crate::registry::TickContext;
use hecs::Entity;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use unts_data::{Boldness, ColonyId, Focus, PheromoneType, Position, ResourceKind, Species, Status};

/// Agents a worker treats as dangerous when they belong to no colony or to
/// another one.
const HOSTILE: [Species; 4] = [
    Species::Warrior,
    Species::Predator,
    Species::Hunter,
    Species::Stalker,
];

#[derive(Debug, Clone)]
pub struct Worker {
    pub boldness: Boldness,
    pub carrying_capacity: f64,
    /// Stochastic workers ignore resource trails.
    pub stochastic: bool,
    pub focus: Focus,
    pub avoid: Vec<Target>,
    pub payload: Option<(ResourceKind, f64)>,
    /// Fraction of the colony's pheromone strength the next trail deposit gets.
    pub trail: f64,
}

impl Worker {
    pub fn new(config: &WorkerConfig, rng: &mut ChaCha8Rng) -> Self {
        Self {
            boldness: config.boldness,
            carrying_capacity: config.carrying_capacity,
            stochastic: rng.gen::<f64>() < config.stochastic_probability,
            focus: Focus::Any,
            avoid: Vec::new(),
            payload: None,
            trail: 0.0,
        }
    }

    fn shun(&mut self, target: Target) {
        if !self.avoid.contains(&target) {
            self.avoid.push(target);
        }
    }
}

/// Rolls a forager's focus from the colony's food and water risks.
///
/// With nothing at risk the choice is random, biased towards whichever
/// stockpile is smaller. When one or both are at risk the odds follow how
/// severe each risk is.
pub fn roll_focus(
    risk_food: f64,
    risk_water: f64,
    stock: (f64, f64),
    consumption: (f64, f64),
    no_focus: f64,
    rng: &mut ChaCha8Rng,
) -> Focus {
    let (food, water) = stock;
    if risk_food <= 0.0 && risk_water <= 0.0 {
        if rng.gen::<f64>() < no_focus {
            return Focus::Any;
        }
        let scarcer = if food < water {
            Focus::Food
        } else if water < food {
            Focus::Water
        } else {
            Focus::Any
        };
        return [Focus::Food, Focus::Water, scarcer][rng.gen_range(0..3)];
    }

    if risk_food > 0.0 && risk_water > 0.0 {
        return if rng.gen::<f64>() < risk_food / (risk_food + risk_water) {
            Focus::Food
        } else {
            Focus::Water
        };
    }

    // With no consumption to measure against, any risk is total.
    if risk_food > 0.0 {
        if consumption.0 <= 0.0 || rng.gen::<f64>() < risk_food / consumption.0 {
            Focus::Food
        } else {
            [Focus::Water, Focus::Any][rng.gen_range(0..2)]
        }
    } else if consumption.1 <= 0.0 || rng.gen::<f64>() < risk_water / consumption.1 {
        Focus::Water
    } else {
        [Focus::Food, Focus::Any][rng.gen_range(0..2)]
    }
}

impl Agent {
    fn worker(&self) -> Option<&Worker> {
        match &self.as_unt()?.caste {
            Caste::Worker(worker) => Some(worker),
            _ => None,
        }
    }

    fn worker_mut(&mut self) -> Option<&mut Worker> {
        match &mut self.as_unt_mut()?.caste {
            Caste::Worker(worker) => Some(worker),
            _ => None,
        }
    }

    pub(super) fn roll_focus(&mut self, ctx: &mut TickContext) {
        let Some(colony) = self.colony().and_then(|id| ctx.registry.colony(id)) else {
            return;
        };
        let focus = roll_focus(
            colony.risk_food(),
            colony.risk_water(),
            (colony.food(), colony.water()),
            (colony.consumption_food(), colony.consumption_water()),
            colony.config.workers.no_focus,
            &mut *ctx.rng,
        );
        if let Some(worker) = self.worker_mut() {
            worker.focus = focus;
        }
    }

    pub(super) fn act_worker(&mut self, me: Entity, ctx: &mut TickContext) {
        if ctx.decides() {
            self.forget_vanished(ctx);
            if self.body.status == Status::Following
                && !self.body.target.is_some_and(|t| ctx.exists(t))
            {
                self.body.status = Status::Wandering;
                self.body.target = None;
            }
            let on_trail = self.body.status == Status::Following
                && matches!(self.body.target, Some(Target::Scent(_)));
            if self.body.status == Status::Wandering || on_trail {
                self.reconsider_forage(me, ctx);
            }
        }

        let (returning, resting) = self
            .as_unt()
            .map_or((false, true), |unt| (unt.returning, unt.resting));
        let mut harvested = false;
        if returning {
            self.lay_trail(ctx);
        } else if !resting {
            harvested = self.harvest(ctx);
        }

        if !harvested {
            self.scatter_or_travel(me, ctx);
        }
    }

    /// Drops avoided things that can no longer be sensed.
    fn forget_vanished(&mut self, ctx: &TickContext) {
        let avoid = self
            .worker_mut()
            .map(|worker| std::mem::take(&mut worker.avoid))
            .unwrap_or_default();
        let kept: Vec<Target> = avoid
            .into_iter()
            .filter(|target| self.can_sense(ctx, *target))
            .collect();
        if let Some(worker) = self.worker_mut() {
            worker.avoid = kept;
        }
    }

    fn reconsider_forage(&mut self, me: Entity, ctx: &mut TickContext) {
        let Some(colony) = self.colony() else {
            return;
        };
        let Some((boldness, stochastic, focus)) =
            self.worker().map(|w| (w.boldness, w.stochastic, w.focus))
        else {
            return;
        };

        let threats = self.agents_in_sight(me, ctx, &HOSTILE, ColonyFilter::Except(colony));
        if let Some(threat) = threats.first() {
            match boldness {
                Boldness::Aggressive => {
                    self.aim(ctx, Target::from(threat));
                    if let Some(worker) = self.worker_mut() {
                        worker.avoid.clear();
                    }
                    return;
                }
                Boldness::Passive => {
                    if let Some(worker) = self.worker_mut() {
                        worker.shun(Target::from(threat));
                    }
                }
                Boldness::Assertive => {}
            }
        }

        let alarm = self
            .pheromones_by_strength(ctx, &[PheromoneType::Threat], None)
            .into_iter()
            .next();
        if let (Some(alarm), Some(worker)) = (alarm, self.worker_mut()) {
            worker.shun(Target::Scent(alarm));
        }

        if !stochastic {
            if let Some(scent) = self.outbound_signal(ctx, focus.pheromones(), colony) {
                self.follow(Target::Scent(scent), scent.position);
            }
        }
    }

    /// The strongest resource trail whose bearing points away from the
    /// nearest hill.
    fn outbound_signal(
        &self,
        ctx: &TickContext,
        kinds: &[PheromoneType],
        colony: ColonyId,
    ) -> Option<Scent> {
        let here = self.body.position;
        let home = ctx
            .registry
            .nearest_hill(colony, here)
            .and_then(|hill| ctx.registry.hill(hill))
            .map(|hill| hill.position)?;
        let home_bearing = find_angle(here, home);
        self.pheromones_by_strength(ctx, kinds, Some(colony))
            .into_iter()
            .find(|scent| {
                let difference = (home_bearing - find_angle(here, scent.position)).abs();
                difference > 90 && difference < 270
            })
    }

    /// Takes from an adjacent resource, or heads for the nearest one in sight.
    /// Returns whether anything was gathered.
    fn harvest(&mut self, ctx: &mut TickContext) -> bool {
        let Some(focus) = self.worker().map(|w| w.focus) else {
            return false;
        };
        let Some((id, at)) = self
            .objects_in_sight(ctx, focus.resources())
            .into_iter()
            .next()
        else {
            return false;
        };
        let target = Target::Resource(id);

        if calc_distance(self.body.position, at) > 1 {
            if !self.worker().is_some_and(|w| w.avoid.contains(&target)) {
                self.aim(ctx, target);
            }
            return false;
        }

        let capacity = self.worker().map_or(0.0, |w| w.carrying_capacity);
        let Some(resource) = ctx.registry.resources.get_mut(id.index()) else {
            return false;
        };
        let kind = resource.kind;
        let gathered = resource.harvest(capacity);

        if gathered > 0.0 {
            if let Some(worker) = self.worker_mut() {
                worker.payload = Some((kind, gathered));
                worker.trail = 1.0;
                worker.avoid.clear();
            }
            if let Some(unt) = self.as_unt_mut() {
                unt.returning = true;
            }
            self.head_home(ctx);
            return true;
        }

        if let Some(worker) = self.worker_mut() {
            worker.shun(target);
        }
        self.body.status = Status::Wandering;
        self.body.target = None;
        false
    }

    /// Marks the way home with the payload's pheromone, weaker at every step.
    fn lay_trail(&mut self, ctx: &mut TickContext) {
        let Some(colony) = self.colony() else {
            return;
        };
        let Some((pheromones, gradient)) = ctx
            .registry
            .colony(colony)
            .map(|c| (c.config.pheromones, c.config.pheromones_gradient))
        else {
            return;
        };
        let position = self.body.position;
        let Some(worker) = self.worker_mut() else {
            return;
        };
        let Some((kind, _)) = worker.payload else {
            return;
        };

        let intensity = (pheromones * worker.trail).floor();
        if intensity > 0.0 {
            ctx.deposit(Pheromone::new(kind.into(), Some(colony), position, intensity));
            worker.trail *= gradient;
        }
    }

    /// Normal movement, unless something is being avoided: then step to any
    /// neighbour facing away from the nearest avoided thing, or stay put.
    fn scatter_or_travel(&mut self, me: Entity, ctx: &mut TickContext) {
        let returning = self.as_unt().is_some_and(|unt| unt.returning);
        let avoided: Vec<Position> = self
            .worker()
            .map(|w| w.avoid.iter().filter_map(|t| ctx.position_of(*t)).collect())
            .unwrap_or_default();
        let here = self.body.position;
        let nearest = find_closest(here, &avoided, |p| *p).copied();

        let Some(nearest) = nearest.filter(|_| !returning) else {
            self.travel(me, ctx);
            return;
        };

        let danger = find_angle(here, nearest);
        let paths: Vec<Position> = ctx
            .old
            .moore(here)
            .map(|(_, space)| space.position())
            .filter(|p| (find_angle(here, *p) - danger).abs() >= 90)
            .collect();
        if let Some(path) = paths.choose(&mut *ctx.rng) {
            self.orient_to(*path);
            self.advance(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::fixtures::{deploy, resource, scene};
    use crate::field::Field;
    use crate::geometry::angle_offset;
    use crate::simulation::Simulation;
    use rand::SeedableRng;
    use unts_data::{HillId, ResourceId};

    /// A forager at (30, 30) focused on food, with a food source at `food`.
    fn forager(food: (i32, i32)) -> (Simulation, Entity) {
        let mut config = scene(&[(10, 10)]);
        config.scene.food.push(resource(food.0, food.1));
        let mut sim = Simulation::new(config).expect("valid scene");
        let worker = deploy(&mut sim, HillId(0), Species::Worker, Position::new(30, 30));
        sim.with_agent(worker, |agent, _, _| {
            if let Some(worker) = agent.worker_mut() {
                worker.focus = Focus::Food;
            }
        });
        (sim, worker)
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    #[test]
    fn test_both_risks_split_by_severity() {
        let mut rng = rng();
        for _ in 0..50 {
            let focus = roll_focus(5.0, 5.0, (0.0, 0.0), (5.0, 5.0), 0.25, &mut rng);
            assert!(matches!(focus, Focus::Food | Focus::Water));
        }
        for _ in 0..50 {
            let focus = roll_focus(1e9, 1e-9, (0.0, 0.0), (5.0, 5.0), 0.25, &mut rng);
            assert_eq!(focus, Focus::Food);
        }
    }

    #[test]
    fn test_water_risk_beyond_consumption_always_wins() {
        let mut rng = rng();
        for _ in 0..100 {
            let focus = roll_focus(-10.0, 4.0, (30.0, 2.0), (10.0, 3.0), 0.25, &mut rng);
            assert_eq!(focus, Focus::Water);
        }
    }

    #[test]
    fn test_no_risk_always_focused_when_no_focus_is_zero() {
        let mut rng = rng();
        for _ in 0..100 {
            let focus = roll_focus(-1.0, -1.0, (10.0, 20.0), (1.0, 1.0), 0.0, &mut rng);
            assert!(matches!(focus, Focus::Food | Focus::Water));
        }
    }

    #[test]
    fn test_risk_without_consumption_forces_focus() {
        let mut rng = rng();
        for _ in 0..50 {
            let food = roll_focus(5.0, -1.0, (-5.0, 10.0), (0.0, 1.0), 0.25, &mut rng);
            assert_eq!(food, Focus::Food);
            let water = roll_focus(-1.0, 5.0, (10.0, -5.0), (1.0, 0.0), 0.25, &mut rng);
            assert_eq!(water, Focus::Water);
        }
    }

    #[test]
    fn test_harvest_sends_worker_home_laying_fading_trail() {
        let (mut sim, worker) = forager((31, 30));

        let deposits = sim.with_agent(worker, |agent, _, ctx| {
            assert!(agent.harvest(ctx));
            assert_eq!(
                agent.worker().and_then(|w| w.payload),
                Some((ResourceKind::Food, 5.0))
            );
            assert_eq!(agent.target(), Some(Target::Hill(HillId(0))));
            assert!(agent.as_unt().is_some_and(|unt| unt.returning));

            for x in [30, 29, 28] {
                agent.body.position = Position::new(x, 30);
                agent.lay_trail(ctx);
            }
            let mut reader = Field::new(ctx.new.width(), ctx.new.height());
            reader.flow_pheromones(&mut *ctx.new, 1.0, 0.25);
            let mut trail: Vec<(i32, f64)> = ctx
                .new
                .pheromones()
                .iter()
                .filter(|p| p.kind == PheromoneType::Food && p.colony == Some(ColonyId(0)))
                .map(|p| (p.position.x, p.intensity()))
                .collect();
            trail.sort_by_key(|(x, _)| -x);
            trail
        });

        assert_eq!(deposits, Some(vec![(30, 75.0), (29, 56.0), (28, 42.0)]));
        assert!((sim.registry().resources[0].quantity() - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_failed_harvest_shuns_resource() {
        let (mut sim, worker) = forager((31, 30));

        sim.with_agent(worker, |agent, _, ctx| {
            ctx.registry.resources[0].harvest(1000.0);
            assert!(!agent.harvest(ctx));
            let shunned = agent.worker().map(|w| w.avoid.clone()).unwrap_or_default();
            assert_eq!(shunned, vec![Target::Resource(ResourceId(0))]);
            assert!(agent.worker().is_some_and(|w| w.payload.is_none()));
            assert_eq!(agent.status(), Status::Wandering);
        });
    }

    #[test]
    fn test_avoiding_worker_steps_away_from_danger() {
        let (mut sim, worker) = forager((30, 31));
        let start = Position::new(30, 30);

        let end = sim.with_agent(worker, |agent, me, ctx| {
            if let Some(worker) = agent.worker_mut() {
                worker.shun(Target::Resource(ResourceId(0)));
            }
            agent.scatter_or_travel(me, ctx);
            agent.position()
        });

        let end = end.expect("worker alive");
        assert_ne!(end, start);
        let danger = find_angle(start, Position::new(30, 31));
        assert!(angle_offset(danger, find_angle(start, end)) >= 90);
    }

    #[test]
    fn test_new_worker_has_no_payload() {
        let mut rng = rng();
        let worker = Worker::new(&WorkerConfig::default(), &mut rng);
        assert!(worker.payload.is_none());
        assert!(worker.avoid.is_empty());
        assert_eq!(worker.focus, Focus::Any);
    }

    #[test]
    fn test_shun_ignores_duplicates() {
        let mut rng = rng();
        let mut worker = Worker::new(&WorkerConfig::default(), &mut rng);
        let scent = Target::Scent(Scent {
            kind: PheromoneType::Threat,
            colony: None,
            position: Position::new(1, 1),
        });
        worker.shun(scent);
        worker.shun(scent);
        assert_eq!(worker.avoid.len(), 1);
    }
}
