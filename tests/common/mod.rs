use unts_lib::model::config::{AppConfig, ColonyConfig, HillSeed, ResourceSeed, Segment};
use unts_lib::model::state::Position;
use unts_lib::Simulation;

#[allow(dead_code)]
pub struct SimulationBuilder {
    config: AppConfig,
}

#[allow(dead_code)]
impl SimulationBuilder {
    /// An empty 100x100 field with default parameters.
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// The reference scene shipped in `config.toml`.
    pub fn reference() -> Self {
        let content = include_str!("../../config.toml");
        Self {
            config: AppConfig::from_toml(content).expect("Reference config must load"),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = seed;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_colony(mut self, x: i32, y: i32, workers: u32, warriors: u32) -> Self {
        self.config.colonies.push(ColonyConfig {
            name: format!("colony-{}", self.config.colonies.len()),
            hills: vec![HillSeed {
                position: Position::new(x, y),
                workers,
                warriors,
                builders: 0,
            }],
            ..Default::default()
        });
        self
    }

    pub fn with_food(mut self, x: i32, y: i32, capacity: f64) -> Self {
        self.config.scene.food.push(resource(x, y, capacity));
        self
    }

    pub fn with_water(mut self, x: i32, y: i32, capacity: f64) -> Self {
        self.config.scene.water.push(resource(x, y, capacity));
        self
    }

    pub fn with_predator(mut self, x: i32, y: i32) -> Self {
        self.config.scene.predators.push(Position::new(x, y));
        self
    }

    pub fn with_wall(mut self, from: (i32, i32), to: (i32, i32)) -> Self {
        self.config.scene.walls.push(Segment {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn build(self) -> Simulation {
        Simulation::new(self.config).expect("Failed to create simulation in test builder")
    }
}

fn resource(x: i32, y: i32, capacity: f64) -> ResourceSeed {
    ResourceSeed {
        position: Position::new(x, y),
        capacity,
        replenishment: 0.1,
        cooldown: 10,
    }
}
