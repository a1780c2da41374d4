use super::perception::Perception;
use super::{Agent, Caste, Lifecycle};
use crate::geometry::calc_distance;
use crate::registry::TickContext;
use hecs::Entity;

impl Agent {
    /// Wanders until the wanted resource is in sight far enough from every
    /// hill of the colony, then founds a hill on the spot and dies.
    pub(super) fn act_architect(&mut self, me: Entity, ctx: &mut TickContext) {
        self.travel(me, ctx);

        let Some(unt) = self.as_unt() else {
            return;
        };
        let Caste::Architect { focus } = unt.caste else {
            return;
        };
        let (colony, origin) = (unt.colony, unt.hill);
        let here = self.body.position;

        let min_distance = ctx.config.world.min_build_distance;
        let crowded = ctx.registry.colony(colony).is_some_and(|c| {
            c.hills
                .iter()
                .filter_map(|id| ctx.registry.hill(*id))
                .any(|hill| calc_distance(here, hill.position) < min_distance)
        });
        if crowded || self.objects_in_sight(ctx, focus.resources()).is_empty() {
            return;
        }

        let interval = ctx.config.reproduction.interval;
        ctx.registry
            .found_hill(colony, origin, here, interval, &mut *ctx.new, &mut *ctx.rng);
        self.die(me, ctx, false);
    }
}
