//! Engine module - the facade that owns the board
//!
//! The engine exclusively owns the grid, the color queue and the Power
//! accumulator. Every command runs to completion before returning and hands
//! back plain value objects; nothing returned keeps a reference into the
//! engine.

use tracing::{debug, trace};

use crate::chain;
use crate::cluster::find_cluster;
use crate::color_queue::ColorQueue;
use crate::error::EngineError;
use crate::grid::Grid;
use crate::rules::Rules;
use crate::snapshot::{board_hash, EngineSnapshot};
use crate::types::{
    Cell, ChainResult, ColorQueueState, FallRecord, Position, DIG_MIN_SIZE, EMPTY,
};

/// Complete engine state
#[derive(Debug, Clone)]
pub struct Engine {
    grid: Grid,
    colors: ColorQueue,
    rules: Rules,
    /// Reset to 0 by a color mismatch.
    power: u64,
    /// Sum of every Power gain; never reset by a mismatch.
    total_score: u64,
    last_chain: u32,
}

impl Engine {
    /// Create an engine over an empty `height` x `width` board with the default rules.
    pub fn new(height: usize, width: usize, seed: u64) -> Result<Self, EngineError> {
        Self::with_rules(height, width, Rules::default(), seed)
    }

    pub fn with_rules(
        height: usize,
        width: usize,
        rules: Rules,
        seed: u64,
    ) -> Result<Self, EngineError> {
        Self::from_grid(Grid::new(height, width)?, rules, seed)
    }

    /// Create an engine over caller-supplied board content (row 0 first).
    pub fn from_rows<R: AsRef<[Cell]>>(
        rows: &[R],
        rules: Rules,
        seed: u64,
    ) -> Result<Self, EngineError> {
        Self::from_grid(Grid::from_rows(rows)?, rules, seed)
    }

    pub fn from_grid(grid: Grid, rules: Rules, seed: u64) -> Result<Self, EngineError> {
        rules.validate()?;
        Ok(Self {
            grid,
            colors: ColorQueue::new(seed, rules.default_color),
            rules,
            power: 0,
            total_score: 0,
            last_chain: 0,
        })
    }

    // ---- queries ----

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Cell value at (row, col), `None` when out of bounds.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.grid.get(Position::new(row, col))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn power(&self) -> u64 {
        self.power
    }

    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    /// Chain count of the most recent dig (0 after a no-op or mismatch).
    pub fn last_chain(&self) -> u32 {
        self.last_chain
    }

    pub fn colors(&self) -> ColorQueueState {
        self.colors.state()
    }

    pub fn color_queue(&self) -> &ColorQueue {
        &self.colors
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// True if any colored cell sits in row 0.
    ///
    /// Deciding what an occupied top row means (usually game over) is left to
    /// the caller.
    pub fn top_row_occupied(&self) -> bool {
        !self.grid.row_is_empty(0)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let cells = self.grid.cells().to_vec();
        EngineSnapshot {
            height: self.grid.height(),
            width: self.grid.width(),
            board_hash: board_hash(&cells),
            cells,
            power: self.power,
            total_score: self.total_score,
            last_chain: self.last_chain,
            colors: self.colors.state(),
        }
    }

    // ---- commands ----

    /// Recompute the set of colors the queue may pick from.
    pub fn refresh_colors(&mut self) {
        self.colors.refresh(&self.grid);
    }

    /// Fill all three queue slots with fresh picks.
    pub fn initialize_colors(&mut self) {
        self.colors.initialize();
    }

    /// Dig the cluster containing (row, col).
    ///
    /// - Out of bounds or empty: no-op, nothing changes except `last_chain` → 0.
    /// - Wrong color: the grid is untouched, Power drops to 0 and the queue
    ///   shifts once. The returned result is empty.
    /// - Otherwise the cluster is removed, the chain resolves, Power grows by the
    ///   result's `power_gained`, and the queue refreshes then shifts once.
    pub fn dig(&mut self, row: usize, col: usize) -> ChainResult {
        let pos = Position::new(row, col);
        let color = match self.grid.get(pos) {
            Some(c) if c != EMPTY => c,
            _ => {
                self.last_chain = 0;
                return ChainResult::default();
            }
        };

        let allowed = self.colors.current();
        if color != allowed {
            debug!(row, col, color, allowed, power_lost = self.power, "dig color mismatch");
            self.power = 0;
            self.last_chain = 0;
            self.colors.shift();
            return ChainResult::default();
        }

        let cluster = find_cluster(&self.grid, pos, DIG_MIN_SIZE);
        let result = chain::resolve(&mut self.grid, &cluster, &self.rules);

        self.power = self.power.saturating_add(result.power_gained);
        self.total_score = self.total_score.saturating_add(result.power_gained);
        self.last_chain = result.chain_count;

        self.colors.refresh(&self.grid);
        self.colors.shift();

        debug!(
            row,
            col,
            color,
            dug = cluster.len(),
            chain = result.chain_count,
            total = result.total_crushed,
            gained = result.power_gained,
            power = self.power,
            "dig resolved"
        );
        result
    }

    /// Drop `color` into the empty cell at (row, col) and let it settle.
    ///
    /// Rejected (empty result) when out of bounds, occupied, or `color` is 0.
    /// The single step has an empty removed set; no crush pass runs, Power and
    /// the queue position are never touched. The available-color set is
    /// refreshed since the color may be new to the board.
    pub fn place(&mut self, row: usize, col: usize, color: Cell) -> ChainResult {
        let pos = Position::new(row, col);
        if color == EMPTY || !self.grid.is_empty_at(pos) {
            return ChainResult::default();
        }

        self.grid.set(pos, color);
        let result = chain::resolve_placement(&mut self.grid);
        self.colors.refresh(&self.grid);
        trace!(row, col, color, falls = result.fall_count(), "placed");
        result
    }

    /// Push every row up by one and fill the bottom row with fresh colors.
    ///
    /// Row 0's previous content is lost. Returns one record per occupied cell
    /// that moved up (`to_row == from_row - 1`); the new bottom row is not
    /// recorded. The available-color set is refreshed before picking the new
    /// row and again afterwards. Power and chain state are untouched.
    pub fn raise_one_row(&mut self) -> Vec<FallRecord> {
        self.colors.refresh(&self.grid);

        let (height, width) = (self.grid.height(), self.grid.width());
        let mut moved = Vec::new();
        for row in 1..height {
            for col in 0..width {
                let from = Position::new(row, col);
                if self.grid.is_occupied(from) {
                    moved.push(FallRecord::new(from, Position::new(row - 1, col)));
                }
            }
        }

        self.grid.shift_rows_up();
        let bottom = height - 1;
        for col in 0..width {
            let color = self.colors.pick();
            self.grid.set(Position::new(bottom, col), color);
        }

        self.colors.refresh(&self.grid);
        trace!(moved = moved.len(), "raised one row");
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(rows: &[&[Cell]]) -> Engine {
        let mut e = Engine::from_rows(rows, Rules::default(), 5).unwrap();
        e.refresh_colors();
        e.initialize_colors();
        e
    }

    /// Rotate the queue until `color` is current without touching Power.
    fn force_current(e: &mut Engine, color: Cell) {
        for _ in 0..1000 {
            if e.colors().current == color {
                return;
            }
            e.colors.shift();
        }
        panic!("color {} never came up", color);
    }

    #[test]
    fn test_new_rejects_zero_dimensions() {
        assert!(matches!(
            Engine::new(0, 6, 1),
            Err(EngineError::InvalidDimensions { .. })
        ));
        assert!(Engine::new(6, 6, 1).is_ok());
    }

    #[test]
    fn test_from_grid_rejects_invalid_rules() {
        let rules = Rules {
            crush_threshold: 0,
            ..Rules::default()
        };
        assert!(Engine::with_rules(2, 2, rules, 1).is_err());
    }

    #[test]
    fn test_dig_empty_or_out_of_bounds_is_noop() {
        let mut e = engine(&[&[0, 1]]);
        let state = e.colors();
        let shifts = e.color_queue().shift_count();

        assert!(e.dig(0, 0).is_noop());
        assert!(e.dig(4, 4).is_noop());
        assert_eq!(e.colors(), state);
        assert_eq!(e.color_queue().shift_count(), shifts);
    }

    #[test]
    fn test_mismatch_resets_power_and_shifts() {
        let mut e = engine(&[&[1, 2]]);
        force_current(&mut e, 1);
        e.power = 40;
        let before = e.grid().clone();
        let state = e.colors();
        let shifts = e.color_queue().shift_count();

        let res = e.dig(0, 1);
        assert!(res.is_noop());
        assert_eq!(e.power(), 0);
        assert_eq!(e.grid(), &before);
        assert_eq!(e.color_queue().shift_count(), shifts + 1);
        assert_eq!(e.colors().current, state.next);
        assert_eq!(e.colors().next, state.next_next);
    }

    #[test]
    fn test_successful_dig_shifts_exactly_once() {
        let mut e = engine(&[&[1, 2], &[2, 1]]);
        force_current(&mut e, 1);
        let shifts = e.color_queue().shift_count();

        let res = e.dig(1, 1);
        assert_eq!(res.total_crushed, 1);
        assert_eq!(e.color_queue().shift_count(), shifts + 1);
    }

    #[test]
    fn test_dig_updates_power_and_total_score() {
        let mut e = engine(&[&[1, 0, 0], &[9, 1, 1], &[2, 2, 3]]);
        force_current(&mut e, 9);

        let res = e.dig(1, 0);
        assert_eq!(res.chain_count, 1);
        assert_eq!(e.power(), 6);
        assert_eq!(e.total_score(), 6);
        assert_eq!(e.last_chain(), 1);
        // The 9 and 1 are gone from the board and from the pick set.
        assert_eq!(e.color_queue().available(), &[2, 3]);
    }

    #[test]
    fn test_total_score_survives_mismatch() {
        let mut e = engine(&[&[1, 0, 0], &[9, 1, 1], &[2, 2, 3]]);
        force_current(&mut e, 9);
        e.dig(1, 0);
        force_current(&mut e, 2);
        e.dig(2, 2);
        assert_eq!(e.power(), 0);
        assert_eq!(e.total_score(), 6);
    }

    #[test]
    fn test_place_rejects_occupied_and_out_of_bounds() {
        let mut e = engine(&[&[0, 1]]);
        assert!(e.place(0, 1, 2).is_noop());
        assert!(e.place(3, 0, 2).is_noop());
        assert!(e.place(0, 0, EMPTY).is_noop());
    }

    #[test]
    fn test_place_never_shifts_or_scores() {
        let mut e = engine(&[&[0, 0], &[0, 0], &[1, 0]]);
        let state = e.colors();
        let res = e.place(0, 0, 4);
        assert_eq!(res.steps.len(), 1);
        assert_eq!(
            res.steps[0].falls,
            vec![FallRecord::new(Position::new(0, 0), Position::new(1, 0))]
        );
        assert_eq!(e.colors(), state);
        assert_eq!(e.power(), 0);
        assert_eq!(e.cell(1, 0), Some(4));
        assert_eq!(e.color_queue().available(), &[1, 4]);
    }

    #[test]
    fn test_raise_one_row_moves_and_fills() {
        let mut e = engine(&[&[7, 0], &[2, 0], &[3, 2]]);
        let moved = e.raise_one_row();

        assert_eq!(
            moved,
            vec![
                FallRecord::new(Position::new(1, 0), Position::new(0, 0)),
                FallRecord::new(Position::new(2, 0), Position::new(1, 0)),
                FallRecord::new(Position::new(2, 1), Position::new(1, 1)),
            ]
        );
        assert_eq!(e.cell(0, 0), Some(2));
        assert_eq!(e.cell(1, 0), Some(3));
        assert_eq!(e.cell(1, 1), Some(2));
        // The new row comes from the colors present before the raise.
        for col in 0..2 {
            let c = e.cell(2, col).unwrap();
            assert!([2, 3, 7].contains(&c), "unexpected color {}", c);
        }
        assert!(e.top_row_occupied());
    }

    #[test]
    fn test_raise_on_empty_board_uses_default_color() {
        let mut e = Engine::new(2, 3, 1).unwrap();
        let moved = e.raise_one_row();
        assert!(moved.is_empty());
        assert_eq!(e.grid().row(1), Some(&[1, 1, 1][..]));
        assert_eq!(e.color_queue().available(), &[1]);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let e = engine(&[&[0, 3], &[3, 3]]);
        let snap = e.snapshot();
        assert_eq!(snap.height, 2);
        assert_eq!(snap.width, 2);
        assert_eq!(snap.cells, vec![0, 3, 3, 3]);
        assert_eq!(snap.board_hash, board_hash(&[0, 3, 3, 3]));
        assert_eq!(snap.get(Position::new(1, 0)), Some(3));
        assert!(snap.top_row_occupied());
        assert_eq!(snap.colors, e.colors());
    }
}
