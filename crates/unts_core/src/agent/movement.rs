//! Movement resolution shared by every species.
//!
//! All moves resolve to one step into a Moore neighbour. Walls and the field
//! edge block a step; when that happens each strategy has its own way of
//! picking a new heading, and the step is retried on a later tick unless the
//! strategy says otherwise.

use super::perception::Perception;
use super::{Agent, Caste, Kind, Scent, Target};
use crate::field::Obstruction;
use crate::geometry::{angle_offset, find_angle, next_position_by_angle};
use crate::registry::TickContext;
use hecs::Entity;
use rand::seq::SliceRandom;
use rand::Rng;
use unts_data::{PheromoneType, Position, Status};

/// Turns tried once when a followed target lies behind an obstacle.
const DEVIATIONS: [i32; 4] = [-90, -45, 45, 90];

impl Agent {
    /// Takes one step along the current heading.
    pub(crate) fn advance(&mut self, ctx: &TickContext) -> bool {
        let next = next_position_by_angle(self.body.position, self.body.orientation);
        if !ctx.old.is_open(next, Obstruction::Solid) {
            return false;
        }
        self.body.position = next;
        true
    }

    pub(crate) fn orient_to(&mut self, at: Position) {
        self.body.set_orientation(find_angle(self.body.position, at));
    }

    /// Turn needed to face `at`, in `0..=180`.
    pub(crate) fn offset_to(&self, at: Position) -> i32 {
        angle_offset(self.body.orientation, find_angle(self.body.position, at))
    }

    /// Starts following `target` if it can be located.
    pub(crate) fn aim(&mut self, ctx: &TickContext, target: Target) -> bool {
        match ctx.position_of(target) {
            Some(at) => {
                self.follow(target, at);
                true
            }
            None => false,
        }
    }

    /// Starts following the nearest hill of this unit's colony.
    pub(crate) fn head_home(&mut self, ctx: &TickContext) -> bool {
        let Some(colony) = self.colony() else {
            return false;
        };
        match ctx.registry.nearest_hill(colony, self.body.position) {
            Some(hill) => self.aim(ctx, Target::Hill(hill)),
            None => false,
        }
    }

    fn open_neighbours(&self, ctx: &TickContext) -> Vec<Position> {
        ctx.old
            .moore(self.body.position)
            .filter(|(_, space)| space.is_open(Obstruction::Solid))
            .map(|(_, space)| space.position())
            .collect()
    }

    /// Resolves this tick's step from the current status.
    pub(crate) fn travel(&mut self, me: Entity, ctx: &mut TickContext) {
        let returning = self.as_unt().is_some_and(|unt| unt.returning);
        if returning {
            if let Some(Target::Hill(hill)) = self.body.target {
                if ctx.position_of(Target::Hill(hill)) == Some(self.body.position) {
                    self.arrive(me, hill, ctx);
                    return;
                }
            }
        }

        match (self.body.status, self.body.target) {
            (Status::Following | Status::Tracing, Some(Target::Scent(scent))) => {
                self.move_follow_scent(ctx, scent)
            }
            (Status::Following, Some(Target::Hill(_))) if returning => self.move_return(ctx),
            (Status::Following, Some(target)) => self.move_follow(ctx, target),
            (Status::Wandering, _) => self.move_wander(ctx),
            (Status::Detouring | Status::Backtracking | Status::Tracing, _) if returning => {
                self.move_return(ctx)
            }
            _ => {
                self.advance(ctx);
            }
        }
    }

    fn move_follow(&mut self, ctx: &mut TickContext, target: Target) {
        if self.can_sense(ctx, target) {
            if let Some(at) = ctx.position_of(target) {
                self.orient_to(at);
            }
        }
        if !self.advance(ctx) {
            let turn = DEVIATIONS[ctx.rng.gen_range(0..DEVIATIONS.len())];
            self.body.set_orientation(self.body.orientation + turn);
            self.advance(ctx);
        }
    }

    fn move_follow_scent(&mut self, ctx: &mut TickContext, scent: Scent) {
        if self.body.position == scent.position {
            if self.body.status == Status::Tracing {
                if !self.head_home(ctx) {
                    self.body.status = Status::Wandering;
                }
            } else {
                self.body.status = Status::Wandering;
                self.body.target = None;
            }
            return;
        }

        self.orient_to(scent.position);
        if self.advance(ctx) {
            return;
        }
        let tracing = self.body.status == Status::Tracing;
        let next = self
            .pheromones_by_strength(ctx, &[scent.kind], scent.colony)
            .into_iter()
            .next();
        if let Some(next) = next {
            self.follow(Target::Scent(next), next.position);
            if tracing {
                self.body.status = Status::Tracing;
            }
            self.advance(ctx);
        }
    }

    fn move_wander(&mut self, ctx: &mut TickContext) {
        if ctx.rng.gen::<f64>() < ctx.config.world.wander_variance {
            let turn = if ctx.rng.gen::<bool>() { -45 } else { 45 };
            self.body.set_orientation(self.body.orientation + turn);
        }
        if !self.advance(ctx) {
            let paths = self.open_neighbours(ctx);
            self.move_wall(ctx, paths);
        }
    }

    /// Picks a new heading after bumping into a wall while wandering.
    ///
    /// Workers only take openings that lead away from their hill.
    fn move_wall(&mut self, ctx: &mut TickContext, mut paths: Vec<Position>) {
        if let Kind::Unt(unt) = &self.kind {
            if let Caste::Worker(_) = unt.caste {
                if let Some(home) = ctx.registry.hill(unt.hill).map(|hill| hill.position) {
                    let here = self.body.position;
                    let bearing = find_angle(here, home);
                    paths.retain(|p| (find_angle(here, *p) - bearing).abs() >= 90);
                }
            }
        }

        match paths.choose(&mut *ctx.rng) {
            Some(path) => self.orient_to(*path),
            None => self.body.set_orientation(self.body.orientation + 180),
        }
    }

    /// Homeward movement with wall circumvention.
    fn move_return(&mut self, ctx: &mut TickContext) {
        match self.body.status {
            Status::Following => {
                if let Some(at) = self.body.target.and_then(|t| ctx.position_of(t)) {
                    self.orient_to(at);
                }
            }
            Status::Detouring => self.reconsider_detour(ctx),
            Status::Backtracking => {
                let here = self.body.position;
                let forks: Vec<Position> = self
                    .open_neighbours(ctx)
                    .into_iter()
                    .filter(|p| {
                        let offset = angle_offset(self.body.orientation, find_angle(here, *p));
                        offset != 0 && offset != 180
                    })
                    .collect();
                if let Some(fork) = forks.choose(&mut *ctx.rng) {
                    self.orient_to(*fork);
                    self.body.status = Status::Detouring;
                }
            }
            _ => {}
        }

        if !self.advance(ctx) {
            self.move_return_wall(ctx);
        }
    }

    /// A detouring unit heads straight home once the way is clear, or else
    /// traces one of its colony's trails that points roughly forward.
    fn reconsider_detour(&mut self, ctx: &mut TickContext) {
        let Some(colony) = self.colony() else {
            return;
        };
        let here = self.body.position;
        let Some(hill) = ctx.registry.nearest_hill(colony, here) else {
            return;
        };
        let Some(home) = ctx.position_of(Target::Hill(hill)) else {
            return;
        };

        if ctx.old.clear_path(here, home, Obstruction::Solid) {
            self.follow(Target::Hill(hill), home);
            return;
        }

        let trail = self
            .pheromones_by_strength(ctx, &PheromoneType::RESOURCES, Some(colony))
            .into_iter()
            .find(|scent| self.offset_to(scent.position) < 90);
        if let Some(scent) = trail {
            self.follow(Target::Scent(scent), scent.position);
            self.body.status = Status::Tracing;
        }
    }

    fn move_return_wall(&mut self, ctx: &mut TickContext) {
        let open = self.open_neighbours(ctx);
        let mut forks: Vec<Position> = open
            .iter()
            .copied()
            .filter(|p| self.offset_to(*p) < 90)
            .collect();
        if forks.is_empty() {
            forks = open
                .into_iter()
                .filter(|p| self.offset_to(*p) != 180)
                .collect();
        }

        match forks.choose(&mut *ctx.rng) {
            Some(fork) => {
                self.orient_to(*fork);
                self.body.status = Status::Detouring;
            }
            None => {
                self.body.set_orientation(self.body.orientation + 180);
                self.body.status = Status::Backtracking;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::fixtures::{deploy, scene};
    use crate::config::Segment;
    use crate::simulation::Simulation;
    use unts_data::{HillId, Species};

    fn wall(from: (i32, i32), to: (i32, i32)) -> Segment {
        Segment {
            from: from.into(),
            to: to.into(),
        }
    }

    /// A warrior heading home to (30, 10) from the closed end of a
    /// one-cell-wide pocket opening south at (30, 31).
    fn pocket() -> (Simulation, Entity) {
        let mut config = scene(&[(30, 10)]);
        config.scene.walls = vec![
            wall((29, 29), (31, 29)),
            wall((29, 30), (29, 31)),
            wall((31, 30), (31, 31)),
        ];
        let mut sim = Simulation::new(config).expect("valid scene");
        let warrior = deploy(&mut sim, HillId(0), Species::Warrior, Position::new(30, 30));
        sim.with_agent(warrior, |agent, _, _| {
            agent.body.status = Status::Detouring;
            agent.body.target = Some(Target::Hill(HillId(0)));
            agent.body.set_orientation(0);
            if let Some(unt) = agent.as_unt_mut() {
                unt.returning = true;
            }
        });
        (sim, warrior)
    }

    fn travel(sim: &mut Simulation, entity: Entity) -> (Status, Position) {
        sim.with_agent(entity, |agent, me, ctx| {
            agent.travel(me, ctx);
            (agent.status(), agent.position())
        })
        .expect("unit alive")
    }

    #[test]
    fn test_dead_end_turns_detour_into_backtrack_and_back() {
        let (mut sim, warrior) = pocket();

        assert_eq!(
            travel(&mut sim, warrior),
            (Status::Backtracking, Position::new(30, 30))
        );
        assert_eq!(
            travel(&mut sim, warrior),
            (Status::Backtracking, Position::new(30, 31))
        );

        let (status, at) = travel(&mut sim, warrior);
        assert_eq!(status, Status::Detouring);
        assert!(
            at == Position::new(29, 32) || at == Position::new(31, 32),
            "{at:?}"
        );
    }
}
