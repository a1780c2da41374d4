use proptest::prelude::*;
use unts_lib::model::field::{Field, Obstruction};
use unts_lib::model::geometry::{
    angle_offset, calc_distance, find_angle, next_position_by_angle, COMPASS,
};
use unts_lib::model::pheromone::{stack, Pheromone};
use unts_lib::model::state::{ColonyId, PheromoneType, Position};

prop_compose! {
    fn arb_position()(x in 0i32..100, y in 0i32..100) -> Position {
        Position::new(x, y)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_distance_is_symmetric(p in arb_position(), q in arb_position()) {
        prop_assert_eq!(calc_distance(p, q), calc_distance(q, p));
        prop_assert_eq!(calc_distance(p, p), 0);
        prop_assert!(calc_distance(p, q) >= 0);
    }

    #[test]
    fn test_moore_neighbours_are_one_apart(p in arb_position(), dir in 0usize..8) {
        let (dx, dy) = COMPASS[dir];
        prop_assert_eq!(calc_distance(p, p.offset(dx, dy)), 1);
    }

    #[test]
    fn test_step_toward_target_gets_closer(p in arb_position(), q in arb_position()) {
        prop_assume!(p != q);
        let next = next_position_by_angle(p, find_angle(p, q));
        prop_assert!(
            calc_distance(next, q) < calc_distance(p, q),
            "stepping from {:?} toward {:?} landed on {:?}", p, q, next
        );
    }

    #[test]
    fn test_angles_stay_in_range(p in arb_position(), q in arb_position(), turn in -720i32..720) {
        let angle = find_angle(p, q);
        prop_assert!((0..360).contains(&angle));
        prop_assert!((0..=180).contains(&angle_offset(angle, angle + turn)));
    }

    #[test]
    fn test_open_field_paths_always_clear(p in arb_position(), q in arb_position()) {
        let field = Field::new(100, 100);
        prop_assert!(field.clear_path(p, q, Obstruction::Solid));
        prop_assert!(field.clear_path(p, q, Obstruction::Scent));
    }

    #[test]
    fn test_stacking_absorbs_weaker_signal(
        a in 1.0f64..500.0,
        b in 1.0f64..500.0,
        factor in 0.0f64..1.0,
    ) {
        let (strong, weak) = if a >= b { (a, b) } else { (b, a) };
        let at = Position::new(3, 3);
        let merged = stack(
            vec![
                Pheromone::new(PheromoneType::Water, Some(ColonyId(0)), at, weak),
                Pheromone::new(PheromoneType::Water, Some(ColonyId(0)), at, strong),
            ],
            factor,
        );
        prop_assert_eq!(merged.len(), 1);
        prop_assert!((merged[0].intensity() - (strong + weak * factor)).abs() < 1e-9);
    }

    #[test]
    fn test_decay_is_monotonic(intensity in 1.0f64..1000.0, factor in 0.1f64..0.99) {
        let mut p = Pheromone::new(PheromoneType::Food, None, Position::new(0, 0), intensity);
        let mut last = p.intensity();
        while p.decay(factor) {
            prop_assert!(p.intensity() < last);
            last = p.intensity();
        }
        prop_assert!(p.is_dispersed());
        prop_assert_eq!(p.intensity(), 0.0);
    }
}
