//! Harvestable, self-replenishing food and water sources.

use crate::config::ResourceSeed;
use crate::field::{Field, Inert};
use serde::{Deserialize, Serialize};
use unts_data::{Position, ResourceId, ResourceKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub kind: ResourceKind,
    pub position: Position,
    capacity: f64,
    quantity: f64,
    replenishment: f64,
    cooldown: u32,
    countdown: u32,
}

impl Resource {
    /// A full resource.
    pub fn new(id: ResourceId, kind: ResourceKind, seed: &ResourceSeed) -> Self {
        Self {
            id,
            kind,
            position: seed.position,
            capacity: seed.capacity,
            quantity: seed.capacity,
            replenishment: seed.replenishment,
            cooldown: seed.cooldown.max(1),
            countdown: seed.cooldown.max(1),
        }
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Takes up to `max` units, never more than are available.
    pub fn harvest(&mut self, max: f64) -> f64 {
        let taken = max.max(0.0).min(self.quantity);
        self.quantity -= taken;
        taken
    }

    /// Advances the replenishment countdown, refilling a share of the
    /// capacity each time it expires.
    pub fn tick(&mut self) {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.countdown = self.cooldown;
            self.quantity = (self.quantity + self.capacity * self.replenishment).min(self.capacity);
        }
    }

    pub fn plant(&self, field: &mut Field) {
        field.place(
            self.position,
            Inert::Resource {
                id: self.id,
                kind: self.kind,
            },
        );
    }
}
