use serde::{Deserialize, Serialize};

/// Integer grid coordinate. `(0, 0)` is the north-west corner; `y` grows southward.
///
/// Serialized as an `[x, y]` pair.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell displaced by `(dx, dy)`. No bounds are applied.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Position> for (i32, i32) {
    fn from(pos: Position) -> Self {
        (pos.x, pos.y)
    }
}

/// Static obstruction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarrierKind {
    /// Blocks movement, sight and scent.
    Wall,
    /// Blocks scent only.
    Sponge,
}

/// Index of a colony in the simulation's colony arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ColonyId(pub u32);

/// Index of a hill in the simulation's hill arena. Hills are never destroyed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct HillId(pub u32);

/// Index of a resource in the simulation's resource arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ResourceId(pub u32);

impl ColonyId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl HillId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ResourceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
