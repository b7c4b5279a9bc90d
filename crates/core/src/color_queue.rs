//! Color queue module - the three-slot rotating dig-color restriction
//!
//! The queue shows the color that may be dug now plus the next two. Fresh
//! picks are drawn uniformly from the set of distinct colors present on the
//! board. That set is never refreshed implicitly: callers run
//! [`ColorQueue::refresh`] whenever the board's color composition may have
//! changed, and a stale set is visible through [`ColorQueue::available`].
//!
//! Picks come from a seeded [`StdRng`], so a given seed, board and command
//! sequence always produce the same colors.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::grid::Grid;
use crate::types::{Cell, ColorQueueState};

#[derive(Debug, Clone)]
pub struct ColorQueue {
    state: ColorQueueState,
    /// Distinct non-empty colors as of the last refresh, ascending.
    available: Vec<Cell>,
    default_color: Cell,
    rng: StdRng,
    shifts: u64,
}

impl ColorQueue {
    pub fn new(seed: u64, default_color: Cell) -> Self {
        Self {
            state: ColorQueueState::uniform(default_color),
            available: Vec::new(),
            default_color,
            rng: StdRng::seed_from_u64(seed),
            shifts: 0,
        }
    }

    /// Recompute the available-color set from the grid.
    pub fn refresh(&mut self, grid: &Grid) {
        self.refresh_from(grid.distinct_colors());
    }

    pub(crate) fn refresh_from(&mut self, colors: BTreeSet<Cell>) {
        self.available = colors.into_iter().collect();
    }

    /// Seed `current`, `next` and `next_next` with three fresh picks.
    pub fn initialize(&mut self) {
        self.state = ColorQueueState {
            current: self.pick(),
            next: self.pick(),
            next_next: self.pick(),
        };
    }

    /// Rotate: current ← next, next ← next_next, next_next ← fresh pick.
    pub fn shift(&mut self) {
        self.state = ColorQueueState {
            current: self.state.next,
            next: self.state.next_next,
            next_next: self.pick(),
        };
        self.shifts += 1;
    }

    /// Uniform pick from the available set, or the default color if it is empty.
    pub fn pick(&mut self) -> Cell {
        if self.available.is_empty() {
            return self.default_color;
        }
        let i = self.rng.gen_range(0..self.available.len());
        self.available[i]
    }

    pub fn state(&self) -> ColorQueueState {
        self.state
    }

    pub fn current(&self) -> Cell {
        self.state.current
    }

    /// Colors available as of the last refresh.
    pub fn available(&self) -> &[Cell] {
        &self.available
    }

    /// Number of shifts performed since construction.
    pub fn shift_count(&self) -> u64 {
        self.shifts
    }
}
