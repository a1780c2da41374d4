use super::{Simulation, TickReport};
use crate::agent::Lifecycle;
use crate::field::Field;
use hecs::Entity;
use rand::seq::SliceRandom;
use unts_data::Species;

impl Simulation {
    /// Advances the simulation by one tick.
    ///
    /// 1. A fresh field receives every barrier, resource and hill.
    /// 2. Resources replenish.
    /// 3. Pheromones deposited last tick are stacked and decayed; survivors
    ///    become readable in the previous field and carry into the new one.
    /// 4. Threats act in shuffled order, then every unit in shuffled order.
    ///    Agents read the previous field and write into the new one.
    /// 5. Colonies advance their reproduction cycle.
    /// 6. The new field replaces the previous one.
    pub fn step(&mut self) -> TickReport {
        let mut next = Field::new(self.field.width(), self.field.height());
        self.registry.plant_inerts(&mut next);

        for resource in &mut self.registry.resources {
            resource.tick();
        }

        let signals = &self.config.signals;
        let pheromones_processed = next.flow_pheromones(
            &mut self.field,
            signals.dispersion_factor,
            signals.collision_factor,
        );

        let mut threats = self.registry.threats().to_vec();
        threats.shuffle(&mut self.rng);
        for threat in threats {
            self.run_agent(threat, &mut next);
        }

        let mut units = self.registry.units();
        units.shuffle(&mut self.rng);
        for unit in units {
            self.run_agent(unit, &mut next);
        }

        self.reproduce();

        self.field = next;
        self.tick += 1;
        TickReport {
            tick: self.tick,
            pheromones_processed,
            agents: self.agent_count(),
        }
    }

    /// Ages one agent and lets it act. Survivors that can be seen are
    /// recorded in the field being assembled.
    fn run_agent(&mut self, entity: Entity, next: &mut Field) {
        self.operate(entity, next, |agent, me, ctx| {
            if agent.tick(me, ctx) {
                agent.act(me, ctx);
            }
            if agent.is_visible() {
                ctx.new.add_agent(agent.sighting(me));
            }
        });
    }

    /// Ticks every colony and spawns the broods of those that complete a cycle.
    fn reproduce(&mut self) {
        let interval = self.config.reproduction.interval;
        let registry = &mut self.registry;

        for idx in 0..registry.colonies.len() {
            let restarting = registry.colonies[idx].unit_count(&registry.hills) == 0;
            let Some(brood) =
                registry.colonies[idx].tick(&registry.hills, &self.config.reproduction)
            else {
                continue;
            };
            let colony = registry.colonies[idx].id;
            if restarting {
                tracing::info!(colony = colony.0, brood, "Colony restarted");
            }

            let shares = registry.colonies[idx].allocate(&registry.hills, brood);
            tracing::debug!(colony = colony.0, brood, ?shares, "Brood allocated");

            for (hill, n) in shares {
                let Some(plan) = registry
                    .hill(hill)
                    .map(|h| h.plan_generation(n, &registry.colonies[idx].config))
                else {
                    continue;
                };
                tracing::debug!(
                    colony = colony.0,
                    hill = hill.0,
                    workers = plan.workers,
                    warriors = plan.warriors,
                    builders = plan.builders,
                    "Generation planned"
                );
                registry.generate(hill, plan, interval, &mut self.rng);

                let mature = registry
                    .hill(hill)
                    .is_some_and(|h| h.is_mature(&registry.colonies[idx].config));
                if mature {
                    registry.spawn_unt(hill, Species::Architect, interval, &mut self.rng);
                }
                if let Some(h) = registry.hill_mut(hill) {
                    h.close_generation(plan);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{AppConfig, ColonyConfig, HillSeed, ReproductionConfig};
    use crate::simulation::Simulation;
    use unts_data::Position;

    fn lone_hill(workers: u32, warriors: u32, builders: u32) -> AppConfig {
        AppConfig {
            colonies: vec![ColonyConfig {
                hills: vec![HillSeed {
                    position: Position::new(10, 10),
                    workers,
                    warriors,
                    builders,
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_counts_up() {
        let mut sim = Simulation::new(lone_hill(3, 1, 0)).expect("valid scene");
        let report = sim.step();
        assert_eq!(report.tick, 1);
        assert_eq!(sim.tick(), 1);
        assert_eq!(report.agents, 4);
    }

    #[test]
    fn test_empty_colony_restarts_on_schedule() {
        let mut config = lone_hill(0, 0, 0);
        config.reproduction = ReproductionConfig {
            interval: 3,
            restart_factor: 4,
            ..Default::default()
        };
        let mut sim = Simulation::new(config).expect("valid scene");
        assert_eq!(sim.agent_count(), 0);
        for _ in 0..3 {
            sim.step();
        }
        let units = sim.registry().colonies[0].unit_count(&sim.registry().hills);
        assert!(units > 0);
        assert_eq!(sim.registry().colonies[0].countdown(), 3);
    }
}
