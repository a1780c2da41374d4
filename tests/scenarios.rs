mod common;
use common::SimulationBuilder;
use unts_lib::model::agent::{Caste, ColonyFilter};
use unts_lib::model::error::SimError;
use unts_lib::model::state::{ColonyId, Focus, HillId, Position, Species};
use unts_lib::model::{Lifecycle, Perception};

#[test]
fn test_worker_starves_without_stock() {
    let mut sim = SimulationBuilder::new().with_colony(10, 10, 1, 0).build();
    let worker = sim.registry().hills[0].workers()[0];

    let colony = sim.colony_mut(ColonyId(0)).unwrap();
    let (food, water) = (colony.food(), colony.water());
    colony.remove_food(food);
    colony.remove_water(water);

    let energy = sim
        .with_agent(worker, |agent, me, ctx| {
            agent.as_unt_mut().unwrap().energy = 1;
            agent.recover_energy(ctx);
            let after_meal = agent.as_unt().unwrap().energy;

            assert!(agent.exist(me, ctx), "one unit of energy is one more tick");
            assert_eq!(agent.as_unt().unwrap().energy, 0);
            assert!(!agent.exist(me, ctx), "an empty unit starves");
            after_meal
        })
        .unwrap();

    assert_eq!(energy, 1, "nothing to eat from an empty colony");
    assert!(sim.agent(worker).is_none());
    assert!(sim.registry().hills[0].workers().is_empty());
    assert_eq!(sim.registry().census.died, 1);
    assert_eq!(sim.registry().census.killed, 0);
}

#[test]
fn test_recovery_draws_from_colony() {
    let mut sim = SimulationBuilder::new().with_colony(10, 10, 1, 0).build();
    let worker = sim.registry().hills[0].workers()[0];
    let food_before = sim.registry().colonies[0].food();

    let energy = sim
        .with_agent(worker, |agent, _, ctx| {
            let unt = agent.as_unt_mut().unwrap();
            unt.energy = unt.max_energy / 2;
            agent.recover_energy(ctx);
            let unt = agent.as_unt().unwrap();
            (unt.energy, unt.max_energy)
        })
        .unwrap();

    assert_eq!(energy.0, energy.1);
    assert!(sim.registry().colonies[0].food() < food_before);
}

#[test]
fn test_architect_founds_hill_near_resource() {
    let mut sim = SimulationBuilder::new()
        .with_colony(5, 5, 0, 0)
        .with_food(52, 50, 100.0)
        .build();
    let architect = sim.spawn_unt(HillId(0), Species::Architect).unwrap();
    assert_eq!(sim.registry().colonies[0].architects(), &[architect]);

    sim.with_agent(architect, |agent, _, _| {
        agent.body.position = Position::new(50, 50);
        agent.as_unt_mut().unwrap().caste = Caste::Architect { focus: Focus::Food };
    })
    .unwrap();
    sim.step();

    let registry = sim.registry();
    assert_eq!(registry.hills.len(), 2);
    assert_eq!(registry.colonies[0].hills.len(), 2);
    assert_eq!(registry.census.hills_founded, 1);
    assert!(registry.colonies[0].architects().is_empty());
    assert!(sim.agent(architect).is_none());
}

#[test]
fn test_architect_keeps_distance_from_home() {
    let mut sim = SimulationBuilder::new()
        .with_colony(50, 50, 0, 0)
        .with_food(53, 50, 100.0)
        .build();
    let architect = sim.spawn_unt(HillId(0), Species::Architect).unwrap();
    sim.with_agent(architect, |agent, _, _| {
        agent.body.position = Position::new(51, 50);
        agent.as_unt_mut().unwrap().caste = Caste::Architect { focus: Focus::Food };
    })
    .unwrap();
    sim.step();

    assert_eq!(sim.registry().hills.len(), 1);
    assert!(sim.agent(architect).is_some());
}

#[test]
fn test_threat_expires_with_lifespan() {
    let mut sim = SimulationBuilder::new().build();
    let predator = sim
        .spawn_threat(Species::Predator, Position::new(30, 30))
        .unwrap();

    let alive = sim
        .with_agent(predator, |agent, me, ctx| {
            agent.body.life = 1;
            agent.tick(me, ctx)
        })
        .unwrap();

    assert!(!alive);
    assert!(sim.agent(predator).is_none());
    assert!(!sim.registry().threats().contains(&predator));
}

#[test]
fn test_resting_units_are_not_seen() {
    let mut sim = SimulationBuilder::new().with_colony(40, 40, 1, 0).build();
    let worker = sim.registry().hills[0].workers()[0];
    assert!(!sim.agent(worker).unwrap().is_visible());

    let predator = sim
        .spawn_threat(Species::Predator, Position::new(42, 40))
        .unwrap();
    let seen = sim
        .with_agent(predator, |agent, me, ctx| {
            agent.agents_in_sight(me, ctx, &[Species::Worker], ColonyFilter::Any)
        })
        .unwrap();
    assert!(seen.is_empty());
}

#[test]
fn test_spawning_rejects_bad_input() {
    let mut sim = SimulationBuilder::new().with_colony(10, 10, 0, 0).build();

    assert!(matches!(
        sim.spawn_threat(Species::Predator, Position::new(200, 5)),
        Err(SimError::OutOfBounds { .. })
    ));
    assert!(matches!(
        sim.spawn_threat(Species::Worker, Position::new(5, 5)),
        Err(SimError::InvalidSpecies(_))
    ));
    assert!(matches!(
        sim.spawn_unt(HillId(7), Species::Worker),
        Err(SimError::UnknownHill(7))
    ));
    assert!(matches!(
        sim.spawn_unt(HillId(0), Species::Hunter),
        Err(SimError::InvalidSpecies(_))
    ));
}
