//! What an agent can see and smell in the field being read.

use super::{Agent, Body, Scent, Target};
use crate::field::{Obstruction, Sighting};
use crate::geometry::{calc_distance, calc_inverse_square};
use crate::registry::TickContext;
use hecs::Entity;
use std::cmp::Ordering;
use unts_data::{ColonyId, PheromoneType, Position, ResourceId, ResourceKind, Species};

/// Restricts agent queries by allegiance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColonyFilter {
    Any,
    Only(ColonyId),
    /// Everyone not in the colony, including colony-less threats.
    Except(ColonyId),
}

impl ColonyFilter {
    fn admits(self, colony: Option<ColonyId>) -> bool {
        match self {
            ColonyFilter::Any => true,
            ColonyFilter::Only(id) => colony == Some(id),
            ColonyFilter::Except(id) => colony != Some(id),
        }
    }
}

/// Sensing queries. Every query reads the previous tick's field only.
pub trait Perception {
    fn body(&self) -> &Body;

    /// Visible agents of the given species in line of sight, nearest first.
    /// An empty `species` slice admits every species.
    fn agents_in_sight(
        &self,
        me: Entity,
        ctx: &TickContext,
        species: &[Species],
        filter: ColonyFilter,
    ) -> Vec<Sighting> {
        let body = self.body();
        let wanted = |sighting: &Sighting| {
            sighting.entity != me
                && (species.is_empty() || species.contains(&sighting.species))
                && filter.admits(sighting.colony)
                && ctx.registry.is_present(sighting.entity)
        };

        if body.sight == 1 {
            return ctx
                .old
                .accessible_spaces(body.position, 1, Obstruction::Solid)
                .into_iter()
                .flat_map(|space| space.agents().iter().copied())
                .filter(wanted)
                .collect();
        }

        let mut seen: Vec<(i32, Sighting)> = ctx
            .old
            .sightings()
            .iter()
            .filter(|sighting| wanted(sighting))
            .filter_map(|sighting| {
                let distance = calc_distance(body.position, sighting.position);
                (distance <= body.sight
                    && ctx
                        .old
                        .clear_path(body.position, sighting.position, Obstruction::Solid))
                .then_some((distance, *sighting))
            })
            .collect();
        seen.sort_by_key(|(distance, _)| *distance);
        seen.into_iter().map(|(_, sighting)| sighting).collect()
    }

    /// Resources of the given kinds in line of sight, nearest first.
    fn objects_in_sight(
        &self,
        ctx: &TickContext,
        kinds: &[ResourceKind],
    ) -> Vec<(ResourceId, Position)> {
        let body = self.body();
        ctx.old
            .accessible_spaces(body.position, body.sight, Obstruction::Solid)
            .into_iter()
            .flat_map(|space| {
                space
                    .resources()
                    .filter(|(_, kind)| kinds.contains(kind))
                    .map(move |(id, _)| (id, space.position()))
            })
            .collect()
    }

    /// Smellable pheromones of the given types, strongest first.
    ///
    /// With `colony` set, signals owned by other colonies are ignored;
    /// colony-less signals are always admitted.
    fn pheromones_by_strength(
        &self,
        ctx: &TickContext,
        kinds: &[PheromoneType],
        colony: Option<ColonyId>,
    ) -> Vec<Scent> {
        let body = self.body();
        let mut smelt: Vec<(f64, Scent)> = ctx
            .old
            .pheromones()
            .iter()
            .filter(|p| kinds.contains(&p.kind) && p.addressed_to(colony))
            .filter_map(|p| {
                let distance = calc_distance(body.position, p.position);
                let perceived =
                    calc_inverse_square(f64::from(distance), f64::from(body.smell), p.intensity());
                (perceived > 1.0
                    && ctx
                        .old
                        .clear_path(body.position, p.position, Obstruction::Scent))
                .then(|| (perceived, Scent::from(p)))
            })
            .collect();
        smelt.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        smelt.into_iter().map(|(_, scent)| scent).collect()
    }

    /// Whether `target` is still within reach of this agent's senses.
    fn can_sense(&self, ctx: &TickContext, target: Target) -> bool {
        let body = self.body();
        match target {
            Target::Hill(_) => true,
            Target::Agent(entity) => {
                if !ctx.registry.is_present(entity) {
                    return false;
                }
                ctx.registry.position_of(entity).is_some_and(|at| {
                    calc_distance(body.position, at) <= body.sight
                        && ctx.old.clear_path(body.position, at, Obstruction::Solid)
                })
            }
            Target::Resource(_) => ctx.position_of(target).is_some_and(|at| {
                calc_distance(body.position, at) <= body.sight
                    && ctx.old.clear_path(body.position, at, Obstruction::Solid)
            }),
            Target::Scent(scent) => {
                let Some(signal) = ctx
                    .old
                    .space(scent.position)
                    .and_then(|space| space.pheromone(scent.kind, scent.colony))
                else {
                    return false;
                };
                let distance = calc_distance(body.position, scent.position);
                calc_inverse_square(
                    f64::from(distance),
                    f64::from(body.smell),
                    signal.intensity(),
                ) >= 1.0
                    && ctx
                        .old
                        .clear_path(body.position, scent.position, Obstruction::Scent)
            }
        }
    }
}

impl Perception for Agent {
    fn body(&self) -> &Body {
        &self.body
    }
}
