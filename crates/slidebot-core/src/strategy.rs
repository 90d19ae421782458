//! Move order handling.
//!
//! The cycle is an immutable preset plus a rotation count, so any point of a
//! run can be reproduced from `(preset, rotations)`.

use crate::direction::{Direction, Preset};

/// Ordered cycle of the four directions, rotated when the board is stuck
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveStrategy {
    preset: Preset,
    base: [Direction; 4],
    rotations: usize,
}

impl MoveStrategy {
    /// Start a fresh cycle from a named preset
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            preset,
            base: preset.order(),
            rotations: 0,
        }
    }

    /// Preset the cycle was created from
    pub fn preset(&self) -> Preset {
        self.preset
    }

    /// Number of rotations applied since the run started
    pub fn rotations(&self) -> usize {
        self.rotations
    }

    /// Current cycle order, first element first
    pub fn order(&self) -> [Direction; 4] {
        let offset = self.rotations % 4;
        std::array::from_fn(|i| self.base[(i + offset) % 4])
    }

    /// Direction to press at `step`
    pub fn next_input(&self, step: usize) -> Direction {
        self.order()[step % 4]
    }

    /// Move the first direction of the cycle to the end
    pub fn rotate(&mut self) {
        self.rotations += 1;
    }

    /// Every direction except `tried`, in current cycle order
    pub fn alternates(&self, tried: Direction) -> Vec<Direction> {
        self.order().into_iter().filter(|d| *d != tried).collect()
    }
}

/// Format a cycle the way it shows up in the run log
pub fn format_order(order: &[Direction]) -> String {
    let names: Vec<String> = order.iter().map(|d| d.to_string()).collect();
    format!("[{}]", names.join(", "))
}
