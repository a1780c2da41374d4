//! Grid geometry shared by every component.
//!
//! Bearings are integer degrees in `0..360` with `0` pointing north (toward
//! negative `y`) and increasing clockwise. Movement is always resolved to one
//! of the eight Moore steps, so every heading collapses into a compass octant.

use std::f64::consts::PI;
use unts_data::Position;

/// Moore offsets in clockwise order starting north. Even indices are
/// orthogonal steps, odd indices diagonal ones.
pub const COMPASS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Movement cost between two cells with 8-directional steps.
///
/// Adjacent cells (diagonals included) are `1` apart. Beyond that the
/// distance is `|dx| + |dy|`, minus one when the offset is not axis-aligned.
pub fn calc_distance(a: Position, b: Position) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    if dx == 0 && dy == 0 {
        return 0;
    }
    if dx <= 1 && dy <= 1 {
        return 1;
    }
    if dx != 0 && dy != 0 {
        dx + dy - 1
    } else {
        dx + dy
    }
}

/// Perceived strength of a signal of `intensity` at `distance` for an agent
/// with the given `sense_range`.
///
/// Inside the sense range the signal is perceived unscaled; beyond it the
/// strength falls off with the excess distance.
pub fn calc_inverse_square(distance: f64, sense_range: f64, intensity: f64) -> f64 {
    let radius = distance - sense_range;
    if radius <= 0.0 {
        return intensity;
    }
    intensity / (radius * 4.0 * PI)
}

/// Bearing from `start` to `end`.
pub fn find_angle(start: Position, end: Position) -> i32 {
    let adjacent = end.x - start.x;
    let opposite = end.y - start.y;

    if adjacent == 0 {
        return if opposite > 0 { 180 } else { 0 };
    }
    if opposite == 0 {
        return if adjacent > 0 { 90 } else { 270 };
    }

    let slope = f64::from(opposite) / f64::from(adjacent);
    let mut angle = (90.0 + slope.atan().to_degrees()) as i32;
    if adjacent < 0 {
        angle += 180;
    }
    angle.rem_euclid(360)
}

/// Index into [`COMPASS`] of the octant containing `angle`.
pub fn octant(angle: i32) -> usize {
    match angle.rem_euclid(360) {
        0..=22 | 338..=359 => 0,
        23..=67 => 1,
        68..=112 => 2,
        113..=157 => 3,
        158..=202 => 4,
        203..=247 => 5,
        248..=292 => 6,
        _ => 7,
    }
}

/// The adjacent cell reached by stepping from `start` along `angle`.
pub fn next_position_by_angle(start: Position, angle: i32) -> Position {
    let (dx, dy) = COMPASS[octant(angle)];
    start.offset(dx, dy)
}

/// The next cell on the greedy walk from `start` to `end`.
pub fn next_position_by_goal(start: Position, end: Position) -> Position {
    if start == end {
        return end;
    }
    next_position_by_angle(start, find_angle(start, end))
}

/// Smallest turn, in `0..=180`, that takes `orientation` to `bearing`.
pub fn angle_offset(orientation: i32, bearing: i32) -> i32 {
    let angle = (bearing - orientation).rem_euclid(360);
    if angle >= 180 {
        360 - angle
    } else {
        angle
    }
}

/// The item whose position is closest to `start`; ties keep the earliest.
pub fn find_closest<T, F>(start: Position, items: &[T], position_of: F) -> Option<&T>
where
    F: Fn(&T) -> Position,
{
    let mut best: Option<(&T, i32)> = None;
    for item in items {
        let distance = calc_distance(start, position_of(item));
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((item, distance)),
        }
    }
    best.map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_distance_metric() {
        assert_eq!(calc_distance(p(3, 3), p(3, 3)), 0);
        assert_eq!(calc_distance(p(3, 3), p(4, 4)), 1);
        assert_eq!(calc_distance(p(0, 0), p(5, 0)), 5);
        assert_eq!(calc_distance(p(0, 0), p(2, 2)), 3);
        assert_eq!(calc_distance(p(0, 0), p(4, 1)), 4);
    }

    #[test]
    fn test_cardinal_angles() {
        let origin = p(10, 10);
        assert_eq!(find_angle(origin, p(10, 5)), 0);
        assert_eq!(find_angle(origin, p(15, 10)), 90);
        assert_eq!(find_angle(origin, p(10, 15)), 180);
        assert_eq!(find_angle(origin, p(5, 10)), 270);
        assert_eq!(find_angle(origin, p(11, 9)), 45);
        assert_eq!(find_angle(origin, p(11, 11)), 135);
        assert_eq!(find_angle(origin, p(9, 11)), 225);
        assert_eq!(find_angle(origin, p(9, 9)), 315);
    }

    #[test]
    fn test_octant_boundaries() {
        let origin = p(0, 0);
        assert_eq!(next_position_by_angle(origin, 22), p(0, -1));
        assert_eq!(next_position_by_angle(origin, 23), p(1, -1));
        assert_eq!(next_position_by_angle(origin, 337), p(-1, -1));
        assert_eq!(next_position_by_angle(origin, 338), p(0, -1));
        assert_eq!(next_position_by_angle(origin, -90), p(-1, 0));
        assert_eq!(next_position_by_angle(origin, 450), p(1, 0));
    }

    #[test]
    fn test_inverse_square_branches() {
        assert_eq!(calc_inverse_square(2.0, 5.0, 40.0), 40.0);
        assert_eq!(calc_inverse_square(5.0, 5.0, 40.0), 40.0);
        let far = calc_inverse_square(7.0, 5.0, 40.0);
        assert!((far - 40.0 / (2.0 * 4.0 * PI)).abs() < 1e-9);
    }

    #[test]
    fn test_angle_offset_folds() {
        assert_eq!(angle_offset(0, 90), 90);
        assert_eq!(angle_offset(0, 270), 90);
        assert_eq!(angle_offset(350, 10), 20);
        assert_eq!(angle_offset(90, 270), 180);
    }

    #[test]
    fn test_find_closest_prefers_first_on_tie() {
        let items = [p(2, 0), p(0, 2), p(5, 5)];
        let closest = find_closest(p(0, 0), &items, |q| *q);
        assert_eq!(closest, Some(&p(2, 0)));
        let empty: [Position; 0] = [];
        assert!(find_closest(p(0, 0), &empty, |q| *q).is_none());
    }
}
