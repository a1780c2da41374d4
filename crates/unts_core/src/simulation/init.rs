use super::Simulation;
use crate::agent::Agent;
use crate::colony::Colony;
use crate::config::AppConfig;
use crate::error::{Result, SimError};
use crate::field::Field;
use crate::hill::{Brood, Hill};
use crate::registry::Registry;
use crate::resource::Resource;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use unts_data::{BarrierKind, ColonyId, HillId, ResourceId, ResourceKind, Species};

impl Simulation {
    /// Builds the scene described by `config`: colonies and their seeded
    /// hills first, then threats, resources and barriers.
    pub fn new(config: AppConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| SimError::config(e.to_string()))?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.world.seed);
        let mut registry = Registry::new();
        let interval = config.reproduction.interval;

        for (idx, colony_config) in config.colonies.iter().enumerate() {
            let colony = ColonyId(idx as u32);
            registry.colonies.push(Colony::new(
                colony,
                colony_config.clone(),
                &config.reproduction,
            ));
            for seed in &colony_config.hills {
                let hill = HillId(registry.hills.len() as u32);
                registry.hills.push(Hill::new(hill, colony, seed.position));
                registry
                    .colony_mut(colony)
                    .ok_or(SimError::UnknownColony(colony.0))?
                    .hills
                    .push(hill);

                let brood = Brood {
                    workers: seed.workers,
                    warriors: seed.warriors,
                    builders: seed.builders,
                };
                registry.generate(hill, brood, interval, &mut rng);
                if let Some(seeded) = registry.hill_mut(hill) {
                    seeded.close_generation(brood);
                }
            }
        }

        let scene = &config.scene;
        for (species, positions) in [
            (Species::Predator, &scene.predators),
            (Species::Hunter, &scene.hunters),
            (Species::Stalker, &scene.stalkers),
        ] {
            let threat = config
                .threats
                .for_species(species)
                .ok_or_else(|| SimError::InvalidSpecies(format!("{species:?}")))?;
            for position in positions {
                registry.spawn_threat(species, *position, threat, &mut rng);
            }
        }

        for (kind, seeds) in [
            (ResourceKind::Food, &scene.food),
            (ResourceKind::Water, &scene.water),
        ] {
            for seed in seeds {
                let id = ResourceId(registry.resources.len() as u32);
                registry.resources.push(Resource::new(id, kind, seed));
            }
        }

        for (kind, segments) in [
            (BarrierKind::Wall, &scene.walls),
            (BarrierKind::Sponge, &scene.sponges),
        ] {
            for segment in segments {
                registry
                    .barriers
                    .extend(segment.cells().into_iter().map(|cell| (cell, kind)));
            }
        }

        let field = survey(config.world.width, config.world.height, &registry);
        for (position, _) in &registry.barriers {
            if !field.contains(*position) {
                return Err(SimError::OutOfBounds {
                    what: "barrier",
                    position: *position,
                });
            }
        }

        tracing::info!(
            width = config.world.width,
            height = config.world.height,
            seed = config.world.seed,
            colonies = registry.colonies.len(),
            hills = registry.hills.len(),
            threats = registry.threats().len(),
            resources = registry.resources.len(),
            agents = registry.ecs.len(),
            "Simulation initialised"
        );

        Ok(Self {
            config,
            field,
            registry,
            rng,
            tick: 0,
        })
    }
}

/// A field holding every inert and a sighting of every visible agent.
pub(super) fn survey(width: i32, height: i32, registry: &Registry) -> Field {
    let mut field = Field::new(width, height);
    registry.plant_inerts(&mut field);
    for (entity, agent) in registry.ecs.query::<&Agent>().iter() {
        if agent.is_visible() {
            field.add_agent(agent.sighting(entity));
        }
    }
    field
}
