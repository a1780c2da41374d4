//! Pheromone signals: deposition, stacking and geometric decay.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use unts_data::{ColonyId, PheromoneType, Position};

/// Signals weaker than this are gone.
pub const DISPERSAL_FLOOR: f64 = 1.0;

/// A positioned, decaying signal.
///
/// `colony` is `None` for signals addressed to everyone, such as the lures
/// hunters lay while wandering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pheromone {
    pub kind: PheromoneType,
    pub colony: Option<ColonyId>,
    pub position: Position,
    intensity: f64,
    dispersed: bool,
}

impl Pheromone {
    pub fn new(
        kind: PheromoneType,
        colony: Option<ColonyId>,
        position: Position,
        intensity: f64,
    ) -> Self {
        Self {
            kind,
            colony,
            position,
            intensity,
            dispersed: false,
        }
    }

    /// Current strength; zero once dispersed.
    pub fn intensity(&self) -> f64 {
        if self.dispersed {
            0.0
        } else {
            self.intensity
        }
    }

    pub fn is_dispersed(&self) -> bool {
        self.dispersed
    }

    /// Absorbs `amount` from a colliding signal.
    pub fn boost(&mut self, amount: f64) {
        self.intensity += amount;
    }

    /// Spends the signal. Only the first call returns its intensity.
    pub fn disperse(&mut self) -> f64 {
        if self.dispersed {
            return 0.0;
        }
        self.dispersed = true;
        self.intensity
    }

    /// Applies one tick of decay. Returns `false` once the signal has dispersed.
    pub fn decay(&mut self, dispersion_factor: f64) -> bool {
        if self.dispersed {
            return false;
        }
        self.intensity *= dispersion_factor;
        if self.intensity < DISPERSAL_FLOOR {
            self.disperse();
            return false;
        }
        true
    }

    /// Whether an agent of `colony` pays attention to this signal.
    /// Ownerless signals and ownerless observers match everything.
    pub fn addressed_to(&self, colony: Option<ColonyId>) -> bool {
        match (colony, self.colony) {
            (Some(observer), Some(owner)) => observer == owner,
            _ => true,
        }
    }
}

/// Merges deposits sharing an owner and a type into a single signal per group.
///
/// Each group collapses into its strongest member, which absorbs every other
/// member's intensity scaled by `collision_factor`.
pub fn stack(deposits: Vec<Pheromone>, collision_factor: f64) -> Vec<Pheromone> {
    let mut groups: BTreeMap<(Option<ColonyId>, PheromoneType), Vec<Pheromone>> = BTreeMap::new();
    for deposit in deposits {
        groups
            .entry((deposit.colony, deposit.kind))
            .or_default()
            .push(deposit);
    }

    groups
        .into_values()
        .filter_map(|mut group| {
            group.sort_by(|a, b| b.intensity().total_cmp(&a.intensity()));
            let mut members = group.into_iter();
            let mut lead = members.next()?;
            for mut other in members {
                lead.boost(other.disperse() * collision_factor);
            }
            Some(lead)
        })
        .collect()
}
