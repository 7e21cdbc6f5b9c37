use serde::{Deserialize, Serialize};

/// One board position.
///
/// `age` counts consecutive generations alive and is 0 for dead cells and
/// for cells born in the current generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Whether the cell is alive.
    pub alive: bool,
    /// Generations survived since birth.
    #[serde(default)]
    pub age: u32,
}

impl Cell {
    /// A dead cell.
    pub const DEAD: Cell = Cell { alive: false, age: 0 };

    /// A freshly born cell.
    pub const BORN: Cell = Cell { alive: true, age: 0 };

    /// Applies the survival/birth rule given the number of live neighbours.
    #[inline]
    pub fn step(self, neighbors: u8) -> Cell {
        match (self.alive, neighbors) {
            (true, 2 | 3) => Cell {
                alive: true,
                age: self.age.saturating_add(1),
            },
            (false, 3) => Cell::BORN,
            _ => Cell::DEAD,
        }
    }
}
