//! Configuration management for simulation parameters.
//!
//! Every tunable of the engine lives here, together with the static scene the
//! simulation is seeded from. Structures map one-to-one onto `config.toml`;
//! any section left out of the document falls back to its `Default`.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 100
//! height = 100
//! seed = 0
//!
//! [signals]
//! dispersion_factor = 0.8
//! collision_factor = 0.25
//!
//! [[colonies]]
//! name = "blue"
//! hills = [{ position = [5, 5], workers = 20, warriors = 5, builders = 0 }]
//!
//! [scene]
//! predators = [[50, 49]]
//! walls = [{ from = [45, 0], to = [45, 39] }]
//! ```

use serde::{Deserialize, Serialize};
use unts_data::{Appearance, Boldness, Position, Species};

/// Field dimensions and global behavioural knobs.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: i32,
    pub height: i32,
    /// Seed of the single random source driving the run.
    pub seed: u64,
    /// Probability that an agent re-evaluates its state on a given tick.
    pub decision_frequency: f64,
    /// Hills of one colony are never founded closer than this.
    pub min_build_distance: i32,
    /// Probability that a wandering agent turns 45 degrees on a given step.
    pub wander_variance: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            seed: 0,
            decision_frequency: 1.0,
            min_build_distance: 20,
            wander_variance: 0.1,
        }
    }
}

/// Colony reproduction cycle.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ReproductionConfig {
    /// A brood smaller than this fraction of the population is deferred.
    pub generation_minimum: f64,
    /// Ticks between reproductive cycles.
    pub interval: u32,
    /// Ticks to wait after a deferred cycle.
    pub delay: u32,
    /// Scales stockpile surplus into brood size.
    pub resources_reserve: f64,
    /// Units per hill spawned to revive an empty colony.
    pub restart_factor: u32,
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            generation_minimum: 0.25,
            interval: 500,
            delay: 50,
            resources_reserve: 0.01,
            restart_factor: 5,
        }
    }
}

/// Pheromone physics.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SignalConfig {
    /// Fraction of intensity surviving each tick.
    pub dispersion_factor: f64,
    /// Fraction of a weaker signal absorbed when like signals stack.
    pub collision_factor: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            dispersion_factor: 0.8,
            collision_factor: 0.25,
        }
    }
}

/// Parameters of one threat species.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ThreatConfig {
    pub health_points: u32,
    /// Kills needed per additional offspring.
    pub nourishment: u32,
    pub sight: i32,
    pub smell: i32,
    pub lifespan: u32,
    /// Intensity of lures laid while wandering (hunters only).
    pub pheromones: f64,
    pub appearance: Appearance,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            health_points: 3,
            nourishment: 4,
            sight: 5,
            smell: 1,
            lifespan: 125,
            pheromones: 0.0,
            appearance: Appearance::rgb(1.0, 0.0, 1.0),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ThreatsConfig {
    pub kill_time_architect: u32,
    pub kill_time_warrior: u32,
    pub kill_time_worker: u32,
    pub predators: ThreatConfig,
    pub hunters: ThreatConfig,
    pub stalkers: ThreatConfig,
}

impl Default for ThreatsConfig {
    fn default() -> Self {
        Self {
            kill_time_architect: 3,
            kill_time_warrior: 5,
            kill_time_worker: 4,
            predators: ThreatConfig::default(),
            hunters: ThreatConfig {
                health_points: 2,
                sight: 4,
                lifespan: 100,
                pheromones: 50.0,
                appearance: Appearance::rgb(1.0, 0.5, 0.0),
                ..Default::default()
            },
            stalkers: ThreatConfig {
                health_points: 2,
                sight: 2,
                smell: 3,
                appearance: Appearance::rgb(0.5, 0.0, 0.5),
                ..Default::default()
            },
        }
    }
}

impl ThreatsConfig {
    /// Parameters of a threat species; `None` for unt species.
    pub fn for_species(&self, species: Species) -> Option<&ThreatConfig> {
        match species {
            Species::Predator => Some(&self.predators),
            Species::Hunter => Some(&self.hunters),
            Species::Stalker => Some(&self.stalkers),
            _ => None,
        }
    }

    /// Post-attack cooldown for a victim of `species`.
    pub fn kill_time(&self, species: Species) -> u32 {
        match species {
            Species::Architect => self.kill_time_architect,
            Species::Warrior => self.kill_time_warrior,
            _ => self.kill_time_worker,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ArchitectConfig {
    pub energy: i32,
    /// Builders per unit a hill must exceed to release an architect.
    pub spawning_builder_ratio: f64,
    pub sight: i32,
    pub appearance: Appearance,
}

impl Default for ArchitectConfig {
    fn default() -> Self {
        Self {
            energy: 75,
            spawning_builder_ratio: 0.1,
            sight: 10,
            appearance: Appearance::rgb(0.8, 0.8, 1.0),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BuilderConfig {
    pub energy: i32,
    pub consumption_food: f64,
    pub consumption_water: f64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            energy: 60,
            consumption_food: 1.5,
            consumption_water: 1.5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WarriorConfig {
    pub energy: i32,
    pub consumption_food: f64,
    pub consumption_water: f64,
    /// Growth factor applied to the warrior complement in peace time.
    pub decay: f64,
    /// Growth factor applied to the warrior complement under attack.
    pub growth: f64,
    /// Probability that a warrior escorts foragers.
    pub escort: f64,
    /// Smallest share of a hill's population that should be warriors.
    pub population_minimum: f64,
    pub sight: i32,
    pub smell: i32,
    pub appearance: Appearance,
}

impl Default for WarriorConfig {
    fn default() -> Self {
        Self {
            energy: 75,
            consumption_food: 3.0,
            consumption_water: 3.0,
            decay: 0.55,
            growth: 1.8,
            escort: 0.25,
            population_minimum: 0.1,
            sight: 3,
            smell: 5,
            appearance: Appearance::rgb(0.4, 0.4, 1.0),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorkerConfig {
    pub energy: i32,
    pub consumption_food: f64,
    pub consumption_water: f64,
    pub boldness: Boldness,
    pub carrying_capacity: f64,
    /// Probability of foraging for anything while the colony is safe.
    pub no_focus: f64,
    pub growth: f64,
    /// Probability that a worker ignores resource pheromones for life.
    pub stochastic_probability: f64,
    pub sight: i32,
    pub smell: i32,
    pub appearance: Appearance,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            energy: 60,
            consumption_food: 2.0,
            consumption_water: 2.0,
            boldness: Boldness::Assertive,
            carrying_capacity: 5.0,
            no_focus: 0.25,
            growth: 1.25,
            stochastic_probability: 0.1,
            sight: 3,
            smell: 8,
            appearance: Appearance::rgb(0.6, 0.6, 1.0),
        }
    }
}

/// A hill present when the simulation starts.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HillSeed {
    pub position: Position,
    #[serde(default)]
    pub workers: u32,
    #[serde(default)]
    pub warriors: u32,
    #[serde(default)]
    pub builders: u32,
}

/// One colony: its economy, its species parameters and its starting hills.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ColonyConfig {
    pub name: String,
    /// Intensity of resource trails.
    pub pheromones: f64,
    /// Per-step decay of a returning worker's trail.
    pub pheromones_gradient: f64,
    /// Intensity of threat signals left by fights.
    pub pheromones_attack: f64,
    /// Ticks a unit lives beyond one reproduction interval.
    pub lifespan: u32,
    pub importance_expansion: f64,
    pub importance_growth: f64,
    pub importance_resources: f64,
    pub importance_territory: f64,
    pub food: f64,
    pub water: f64,
    pub hill_appearance: Appearance,
    pub architects: ArchitectConfig,
    pub builders: BuilderConfig,
    pub warriors: WarriorConfig,
    pub workers: WorkerConfig,
    pub hills: Vec<HillSeed>,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            name: String::from("colony"),
            pheromones: 75.0,
            pheromones_gradient: 0.75,
            pheromones_attack: 100.0,
            lifespan: 100,
            importance_expansion: 0.5,
            importance_growth: 0.25,
            importance_resources: 1.0,
            importance_territory: 0.5,
            food: 25.0,
            water: 25.0,
            hill_appearance: Appearance::rgb(0.0, 0.0, 1.0),
            architects: ArchitectConfig::default(),
            builders: BuilderConfig::default(),
            warriors: WarriorConfig::default(),
            workers: WorkerConfig::default(),
            hills: Vec::new(),
        }
    }
}

/// A resource present when the simulation starts.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResourceSeed {
    pub position: Position,
    pub capacity: f64,
    /// Fraction of capacity restored per replenishment.
    pub replenishment: f64,
    /// Ticks between replenishments.
    pub cooldown: u32,
}

/// A straight run of barrier cells, endpoints included. Horizontal, vertical
/// and 45-degree runs are accepted.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Segment {
    pub from: Position,
    pub to: Position,
}

impl Segment {
    pub fn is_straight(&self) -> bool {
        let dx = (self.to.x - self.from.x).abs();
        let dy = (self.to.y - self.from.y).abs();
        dx == 0 || dy == 0 || dx == dy
    }

    pub fn cells(&self) -> Vec<Position> {
        let dx = (self.to.x - self.from.x).signum();
        let dy = (self.to.y - self.from.y).signum();
        let steps = (self.to.x - self.from.x)
            .abs()
            .max((self.to.y - self.from.y).abs());
        (0..=steps)
            .map(|i| self.from.offset(dx * i, dy * i))
            .collect()
    }
}

/// Static scene data.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SceneConfig {
    pub predators: Vec<Position>,
    pub hunters: Vec<Position>,
    pub stalkers: Vec<Position>,
    pub food: Vec<ResourceSeed>,
    pub water: Vec<ResourceSeed>,
    pub walls: Vec<Segment>,
    pub sponges: Vec<Segment>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LogConfig {
    /// Ticks between summary log lines.
    pub interval: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { interval: 100 }
    }
}

/// Root of the configuration document.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub reproduction: ReproductionConfig,
    pub signals: SignalConfig,
    pub threats: ThreatsConfig,
    pub colonies: Vec<ColonyConfig>,
    pub scene: SceneConfig,
    pub log: LogConfig,
}

fn probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        let world = &self.world;
        anyhow::ensure!(world.width > 0, "Field width must be positive");
        anyhow::ensure!(world.height > 0, "Field height must be positive");
        anyhow::ensure!(
            world.width <= 2000 && world.height <= 2000,
            "Field too large (max 2000x2000)"
        );
        anyhow::ensure!(
            probability(world.decision_frequency),
            "decision_frequency must be within [0, 1]"
        );
        anyhow::ensure!(
            probability(world.wander_variance),
            "wander_variance must be within [0, 1]"
        );
        anyhow::ensure!(
            world.min_build_distance >= 0,
            "min_build_distance must be non-negative"
        );

        let reproduction = &self.reproduction;
        anyhow::ensure!(
            reproduction.interval > 0,
            "Reproduction interval must be positive"
        );
        anyhow::ensure!(
            reproduction.delay > 0,
            "Reproduction delay must be positive"
        );
        anyhow::ensure!(
            reproduction.generation_minimum >= 0.0,
            "generation_minimum must be non-negative"
        );
        anyhow::ensure!(
            reproduction.resources_reserve >= 0.0,
            "resources_reserve must be non-negative"
        );

        let signals = &self.signals;
        anyhow::ensure!(
            signals.dispersion_factor > 0.0 && signals.dispersion_factor < 1.0,
            "dispersion_factor must be within (0, 1)"
        );
        anyhow::ensure!(
            signals.collision_factor >= 0.0,
            "collision_factor must be non-negative"
        );

        for (name, threat) in [
            ("predators", &self.threats.predators),
            ("hunters", &self.threats.hunters),
            ("stalkers", &self.threats.stalkers),
        ] {
            anyhow::ensure!(
                threat.health_points > 0,
                "{name}: health_points must be positive"
            );
            anyhow::ensure!(
                threat.nourishment > 0,
                "{name}: nourishment must be positive"
            );
            anyhow::ensure!(threat.lifespan > 0, "{name}: lifespan must be positive");
            anyhow::ensure!(
                threat.sight >= 1 && threat.smell >= 1,
                "{name}: senses must be at least 1"
            );
        }

        for colony in &self.colonies {
            let name = &colony.name;
            anyhow::ensure!(
                colony.pheromones_gradient >= 0.0 && colony.pheromones_gradient <= 1.0,
                "{name}: pheromones_gradient must be within [0, 1]"
            );
            anyhow::ensure!(
                colony.architects.energy > 0
                    && colony.builders.energy > 0
                    && colony.warriors.energy > 0
                    && colony.workers.energy > 0,
                "{name}: energy must be positive"
            );
            anyhow::ensure!(
                probability(colony.warriors.escort)
                    && probability(colony.warriors.population_minimum)
                    && probability(colony.workers.no_focus)
                    && probability(colony.workers.stochastic_probability),
                "{name}: probabilities must be within [0, 1]"
            );
            anyhow::ensure!(
                colony.builders.consumption_food >= 0.0
                    && colony.builders.consumption_water >= 0.0
                    && colony.warriors.consumption_food >= 0.0
                    && colony.warriors.consumption_water >= 0.0
                    && colony.workers.consumption_food >= 0.0
                    && colony.workers.consumption_water >= 0.0,
                "{name}: consumption must be non-negative"
            );
            anyhow::ensure!(
                colony.workers.carrying_capacity > 0.0,
                "{name}: carrying_capacity must be positive"
            );
            anyhow::ensure!(
                colony.architects.sight >= 1
                    && colony.warriors.sight >= 1
                    && colony.warriors.smell >= 1
                    && colony.workers.sight >= 1
                    && colony.workers.smell >= 1,
                "{name}: senses must be at least 1"
            );
            for hill in &colony.hills {
                self.ensure_inside(hill.position, "hill")?;
            }
        }

        let scene = &self.scene;
        for pos in scene
            .predators
            .iter()
            .chain(&scene.hunters)
            .chain(&scene.stalkers)
        {
            self.ensure_inside(*pos, "threat")?;
        }
        for resource in scene.food.iter().chain(&scene.water) {
            self.ensure_inside(resource.position, "resource")?;
            anyhow::ensure!(
                resource.capacity >= 0.0,
                "Resource capacity must be non-negative"
            );
            anyhow::ensure!(resource.cooldown > 0, "Resource cooldown must be positive");
        }
        for segment in scene.walls.iter().chain(&scene.sponges) {
            anyhow::ensure!(
                segment.is_straight(),
                "Barrier segment {:?} -> {:?} is not straight",
                segment.from,
                segment.to
            );
            self.ensure_inside(segment.from, "barrier")?;
            self.ensure_inside(segment.to, "barrier")?;
        }

        Ok(())
    }

    fn ensure_inside(&self, pos: Position, what: &str) -> anyhow::Result<()> {
        anyhow::ensure!(
            pos.x >= 0 && pos.y >= 0 && pos.x < self.world.width && pos.y < self.world.height,
            "{what} at ({}, {}) lies outside the {}x{} field",
            pos.x,
            pos.y,
            self.world.width,
            self.world.height
        );
        Ok(())
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Digest of every parameter that influences the outcome of a run.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world).as_bytes());
        hasher.update(format!("{:?}", self.reproduction).as_bytes());
        hasher.update(format!("{:?}", self.signals).as_bytes());
        hasher.update(format!("{:?}", self.threats).as_bytes());
        hasher.update(format!("{:?}", self.colonies).as_bytes());
        hasher.update(format!("{:?}", self.scene).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_world_width() {
        let config = AppConfig {
            world: WorldConfig {
                width: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_decision_frequency() {
        let config = AppConfig {
            world: WorldConfig {
                decision_frequency: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_dispersion() {
        let config = AppConfig {
            signals: SignalConfig {
                dispersion_factor: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_hill_outside_field() {
        let config = AppConfig {
            colonies: vec![ColonyConfig {
                hills: vec![HillSeed {
                    position: Position::new(100, 3),
                    workers: 1,
                    warriors: 0,
                    builders: 0,
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_crooked_segment_rejected() {
        let mut config = AppConfig::default();
        config.scene.walls.push(Segment {
            from: Position::new(0, 0),
            to: Position::new(3, 1),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_segment_cells() {
        let segment = Segment {
            from: Position::new(54, 99),
            to: Position::new(54, 96),
        };
        assert_eq!(
            segment.cells(),
            vec![
                Position::new(54, 99),
                Position::new(54, 98),
                Position::new(54, 97),
                Position::new(54, 96)
            ]
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [world]
            width = 30
            height = 20

            [[colonies]]
            name = "red"
            hills = [{ position = [5, 5], workers = 3 }]

            [scene]
            predators = [[10, 10]]
            food = [{ position = [2, 2], capacity = 100.0, replenishment = 0.1, cooldown = 10 }]
            "#,
        )
        .expect("valid document");
        assert_eq!(config.world.width, 30);
        assert_eq!(config.world.seed, 0);
        assert_eq!(config.colonies[0].hills[0].workers, 3);
        assert_eq!(config.colonies[0].warriors.sight, 3);
        assert_eq!(config.scene.predators, vec![Position::new(10, 10)]);
    }

    #[test]
    fn test_fingerprint_consistency() {
        let config1 = AppConfig::default();
        let config2 = AppConfig::default();
        assert_eq!(config1.fingerprint(), config2.fingerprint());

        let mut config3 = AppConfig::default();
        config3.world.seed = 7;
        assert_ne!(config1.fingerprint(), config3.fingerprint());
    }
}
