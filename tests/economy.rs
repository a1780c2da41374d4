mod common;
use common::SimulationBuilder;
use proptest::prelude::*;
use unts_lib::model::colony::Colony;
use unts_lib::model::config::{ColonyConfig, ReproductionConfig};
use unts_lib::model::hill::{Hill, HillStats};
use unts_lib::model::state::{ColonyId, HillId, Position, ResourceKind, Species};

fn populated_hills(
    world: &mut hecs::World,
    populations: &[(u32, f64)],
) -> (Colony, Vec<Hill>) {
    let mut colony = Colony::new(
        ColonyId(0),
        ColonyConfig::default(),
        &ReproductionConfig::default(),
    );
    let hills = populations
        .iter()
        .enumerate()
        .map(|(i, (units, food))| {
            let at = Position::new(i as i32 * 3, 0);
            let mut hill = Hill::new(HillId(i as u32), ColonyId(0), at);
            for _ in 0..*units {
                hill.attach(world.spawn(()), Species::Worker);
            }
            hill.stats.food_gathered = *food;
            colony.hills.push(hill.id);
            hill
        })
        .collect();
    (colony, hills)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_allocation_loses_no_units(
        populations in prop::collection::vec((1u32..40, 0.0f64..200.0), 1..6),
        n in 1u32..200,
    ) {
        let mut world = hecs::World::new();
        let (colony, hills) = populated_hills(&mut world, &populations);
        let shares = colony.allocate(&hills, f64::from(n));

        prop_assert_eq!(shares.len(), hills.len());
        let total: u32 = shares.iter().map(|(_, share)| share).sum();
        prop_assert!(total >= n, "allocated {} of {}", total, n);
        prop_assert!(total <= n + hills.len() as u32);
        prop_assert!(shares.iter().all(|(_, share)| *share >= 1));
    }

    #[test]
    fn test_generation_never_exceeds_allocation(
        n in 1u32..100,
        workers_killed in 0u32..30,
        warriors_killed in 0u32..30,
        returned in 0u32..50,
        unsuccessful in 0u32..50,
    ) {
        let config = ColonyConfig::default();
        let mut hill = Hill::new(HillId(0), ColonyId(0), Position::new(0, 0));
        hill.stats = HillStats {
            workers_killed,
            warriors_killed,
            workers_returned: returned,
            workers_unsuccessful: unsuccessful.min(returned),
            ..Default::default()
        };
        let brood = hill.plan_generation(n, &config);
        prop_assert!(brood.total() <= n, "{:?} from {}", brood, n);
    }
}

#[test]
fn test_risk_follows_stockpile() {
    let mut colony = Colony::new(
        ColonyId(0),
        ColonyConfig::default(),
        &ReproductionConfig::default(),
    );
    colony.add_consumption(20.0, 20.0);
    let before = colony.risk_food();
    assert!(before > 0.0);
    colony.deposit(ResourceKind::Food, 10.0);
    assert!(colony.risk_food() < before);
    assert!(colony.food() < 2.0 * colony.consumption_food());
}

#[test]
fn test_consumption_tracks_population() {
    let sim = SimulationBuilder::new().with_colony(10, 10, 4, 2).build();
    let colony = &sim.registry().colonies[0];
    let config = &colony.config;
    let expected_food =
        4.0 * config.workers.consumption_food + 2.0 * config.warriors.consumption_food;
    assert!((colony.consumption_food() - expected_food).abs() < 1e-9);
    assert_eq!(colony.unit_count(&sim.registry().hills), 6);
}

#[test]
fn test_colonies_reproduce_over_a_cycle() {
    let mut sim = SimulationBuilder::new()
        .with_colony(10, 10, 6, 2)
        .with_food(12, 10, 500.0)
        .with_water(10, 12, 500.0)
        .with_config(|c| {
            c.reproduction.interval = 20;
            c.colonies[0].food = 500.0;
            c.colonies[0].water = 500.0;
        })
        .build();
    let born_at_start = sim.registry().census.born;
    for _ in 0..20 {
        sim.step();
    }
    assert!(sim.registry().census.born > born_at_start);
}
