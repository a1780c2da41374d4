//! One tick's spatial snapshot: a grid of [`Space`]s plus the pheromones
//! promoted for reading.
//!
//! The simulation keeps two fields alive. The previous tick's field is only
//! read; everything agents decide is written into the field being assembled
//! for the next tick, so no agent observes another agent's same-tick move.

use crate::geometry::{calc_distance, next_position_by_goal, COMPASS};
use crate::pheromone::{stack, Pheromone};
use hecs::Entity;
use std::collections::HashMap;
use unts_data::{
    BarrierKind, ColonyId, HillId, PheromoneType, Position, ResourceId, ResourceKind, Species,
};

/// Immobile things a space can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inert {
    Barrier(BarrierKind),
    Resource { id: ResourceId, kind: ResourceKind },
    Hill { id: HillId, colony: ColonyId },
}

/// What a field records about an agent placed in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sighting {
    pub entity: Entity,
    pub species: Species,
    pub colony: Option<ColonyId>,
    pub position: Position,
}

/// Which barriers interrupt a line of sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obstruction {
    /// Walls only. Used for seeing and moving.
    Solid,
    /// Walls and sponges. Used for smelling.
    Scent,
}

impl Obstruction {
    fn blocked_by(self, barrier: BarrierKind) -> bool {
        match self {
            Obstruction::Solid => barrier == BarrierKind::Wall,
            Obstruction::Scent => true,
        }
    }
}

/// A single grid cell.
#[derive(Debug, Clone)]
pub struct Space {
    position: Position,
    /// Moore neighbours clockwise from north, as indices into the owning field.
    neighbours: [Option<usize>; 8],
    agents: Vec<Sighting>,
    objects: Vec<Inert>,
    pheromones: Vec<Pheromone>,
    pending: Vec<Pheromone>,
}

impl Space {
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn agents(&self) -> &[Sighting] {
        &self.agents
    }

    pub fn objects(&self) -> &[Inert] {
        &self.objects
    }

    /// Merged pheromones readable this tick.
    pub fn pheromones(&self) -> &[Pheromone] {
        &self.pheromones
    }

    /// Whether nothing in this cell blocks the given kind of line.
    pub fn is_open(&self, mode: Obstruction) -> bool {
        !self.objects.iter().any(|object| match object {
            Inert::Barrier(barrier) => mode.blocked_by(*barrier),
            _ => false,
        })
    }

    pub fn has_pheromone(&self, kind: PheromoneType, colony: Option<ColonyId>) -> bool {
        self.pheromone(kind, colony).is_some()
    }

    /// The merged signal of exactly this type and owner, if any.
    pub fn pheromone(&self, kind: PheromoneType, colony: Option<ColonyId>) -> Option<&Pheromone> {
        self.pheromones
            .iter()
            .find(|p| p.kind == kind && p.colony == colony)
    }

    pub fn resources(&self) -> impl Iterator<Item = (ResourceId, ResourceKind)> + '_ {
        self.objects.iter().filter_map(|object| match object {
            Inert::Resource { id, kind } => Some((*id, *kind)),
            _ => None,
        })
    }
}

/// Grid of spaces for one tick.
#[derive(Debug, Clone)]
pub struct Field {
    width: i32,
    height: i32,
    spaces: Vec<Space>,
    pheromones: Vec<Pheromone>,
    sightings: Vec<Sighting>,
    located: HashMap<Entity, usize>,
    walled: bool,
}

impl Field {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let mut spaces = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let mut neighbours = [None; 8];
                for (slot, (dx, dy)) in neighbours.iter_mut().zip(COMPASS) {
                    let (nx, ny) = (x + dx, y + dy);
                    if nx >= 0 && ny >= 0 && nx < width && ny < height {
                        *slot = Some((ny * width + nx) as usize);
                    }
                }
                spaces.push(Space {
                    position: Position::new(x, y),
                    neighbours,
                    agents: Vec::new(),
                    objects: Vec::new(),
                    pheromones: Vec::new(),
                    pending: Vec::new(),
                });
            }
        }

        Self {
            width,
            height,
            spaces,
            pheromones: Vec::new(),
            sightings: Vec::new(),
            located: HashMap::new(),
            walled: false,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    /// Bounds-checked lookup. `None` behaves like an impassable edge.
    pub fn space(&self, pos: Position) -> Option<&Space> {
        self.index(pos).map(|idx| &self.spaces[idx])
    }

    /// Whether `pos` is inside the grid and not blocked for `mode`.
    pub fn is_open(&self, pos: Position, mode: Obstruction) -> bool {
        self.space(pos).is_some_and(|space| space.is_open(mode))
    }

    /// Whether any barrier has been planted anywhere.
    pub fn is_walled(&self) -> bool {
        self.walled
    }

    /// Places an immobile object. Out-of-bounds placements are ignored.
    pub fn place(&mut self, pos: Position, object: Inert) {
        if let Some(idx) = self.index(pos) {
            if matches!(object, Inert::Barrier(_)) {
                self.walled = true;
            }
            self.spaces[idx].objects.push(object);
        }
    }

    /// Registers an agent at its position for the readers of the next tick.
    pub fn add_agent(&mut self, sighting: Sighting) {
        if let Some(idx) = self.index(sighting.position) {
            if self.located.contains_key(&sighting.entity) {
                return;
            }
            self.located.insert(sighting.entity, self.sightings.len());
            self.sightings.push(sighting);
            self.spaces[idx].agents.push(sighting);
        }
    }

    /// Every agent placed in this field, in placement order.
    pub fn sightings(&self) -> &[Sighting] {
        &self.sightings
    }

    pub fn locate(&self, entity: Entity) -> Option<&Sighting> {
        self.located.get(&entity).map(|idx| &self.sightings[*idx])
    }

    /// Queues a pheromone in the space it names; it becomes readable once
    /// this field is flowed into its successor.
    pub fn deposit(&mut self, pheromone: Pheromone) {
        if let Some(idx) = self.index(pheromone.position) {
            self.spaces[idx].pending.push(pheromone);
        }
    }

    /// Pheromones promoted for reading this tick.
    pub fn pheromones(&self) -> &[Pheromone] {
        &self.pheromones
    }

    /// Moore neighbours of `pos` with their compass index.
    pub fn moore(&self, pos: Position) -> impl Iterator<Item = (usize, &Space)> + '_ {
        let neighbours = self
            .index(pos)
            .map(|idx| self.spaces[idx].neighbours)
            .unwrap_or([None; 8]);
        neighbours
            .into_iter()
            .enumerate()
            .filter_map(move |(dir, idx)| idx.map(|idx| (dir, &self.spaces[idx])))
    }

    /// Spaces within `radius` of `pos`, nearest first.
    ///
    /// A radius of one yields the orthogonal neighbours followed by the
    /// diagonal ones and leaves out `pos` itself.
    pub fn spaces_in_radius(&self, pos: Position, radius: i32) -> Vec<&Space> {
        if radius == 1 {
            let neighbours: Vec<(usize, &Space)> = self.moore(pos).collect();
            return neighbours
                .iter()
                .filter(|(dir, _)| dir % 2 == 0)
                .chain(neighbours.iter().filter(|(dir, _)| dir % 2 == 1))
                .map(|(_, space)| *space)
                .collect();
        }

        let radius = radius.max(0);
        let mut spaces = Vec::new();
        for y in (pos.y - radius)..=(pos.y + radius) {
            for x in (pos.x - radius)..=(pos.x + radius) {
                let candidate = Position::new(x, y);
                if calc_distance(pos, candidate) > radius {
                    continue;
                }
                if let Some(space) = self.space(candidate) {
                    spaces.push(space);
                }
            }
        }
        spaces.sort_by_key(|space| calc_distance(pos, space.position));
        spaces
    }

    /// Spaces within `radius` that have a clear line back to `pos`.
    pub fn accessible_spaces(&self, pos: Position, radius: i32, mode: Obstruction) -> Vec<&Space> {
        let spaces = self.spaces_in_radius(pos, radius);
        if !self.walled {
            return spaces;
        }

        // Every cell on a traced line shares that line's verdict.
        let mut verdicts: HashMap<Position, bool> = HashMap::with_capacity(spaces.len());
        for space in spaces.iter().rev() {
            if verdicts.contains_key(&space.position) {
                continue;
            }
            let (clear, path) = self.trace_path(space.position, pos, mode);
            for step in path {
                verdicts.entry(step).or_insert(clear);
            }
        }

        spaces
            .into_iter()
            .filter(|space| verdicts.get(&space.position).copied().unwrap_or(false))
            .collect()
    }

    /// Whether a greedy straight-ish walk from `start` reaches `end`.
    ///
    /// Cells reachable only by a detour are reported as blocked.
    pub fn clear_path(&self, start: Position, end: Position, mode: Obstruction) -> bool {
        if !self.walled {
            return true;
        }
        self.trace_path(start, end, mode).0
    }

    fn trace_path(
        &self,
        start: Position,
        end: Position,
        mode: Obstruction,
    ) -> (bool, Vec<Position>) {
        let limit = (self.width + self.height).max(1) as usize * 2;
        let mut path = vec![start];
        let mut current = start;
        while current != end {
            let next = next_position_by_goal(current, end);
            match self.space(next) {
                None => return (true, path),
                Some(space) if !space.is_open(mode) => return (false, path),
                Some(_) => {
                    path.push(next);
                    current = next;
                }
            }
            if path.len() > limit {
                return (false, path);
            }
        }
        (true, path)
    }

    /// Promotes the pheromones queued in `old`, decays them and carries the
    /// survivors into this field. Returns how many merged signals were processed.
    pub fn flow_pheromones(
        &mut self,
        old: &mut Field,
        dispersion_factor: f64,
        collision_factor: f64,
    ) -> usize {
        debug_assert_eq!(self.spaces.len(), old.spaces.len());

        let mut processed = 0;
        for idx in 0..old.spaces.len().min(self.spaces.len()) {
            let pending = std::mem::take(&mut old.spaces[idx].pending);
            if pending.is_empty() {
                continue;
            }
            for mut pheromone in stack(pending, collision_factor) {
                processed += 1;
                if pheromone.decay(dispersion_factor) {
                    old.pheromones.push(pheromone.clone());
                    old.spaces[idx].pheromones.push(pheromone.clone());
                    self.spaces[idx].pending.push(pheromone);
                }
            }
        }
        processed
    }
}
