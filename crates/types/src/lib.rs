//! Core types module - shared data structures and constants
//!
//! This crate defines the plain data exchanged between the simulation core and
//! whatever drives it (a renderer, an AI agent, the JSON adapter). Everything
//! here is a value type with no behaviour beyond small helpers, and the crate
//! has no dependencies.
//!
//! # Coordinates
//!
//! Positions are `(row, col)` pairs. Row 0 is the top of the board and rows
//! grow downward, so gravity moves cells toward larger row indices.
//!
//! # Rule Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DIG_MIN_SIZE` | 1 | A dig removes any cluster, even a single cell |
//! | `CRUSH_THRESHOLD` | 3 | Minimum landed cluster size destroyed by a chain |
//! | `CHAIN_BASE` | 1.5 | Base of the exponential Power multiplier |
//! | `DEFAULT_COLOR` | 1 | Color used when the board holds no colors at all |
//!
//! # Examples
//!
//! ```
//! use dig_chain_types::{ChainResult, FallRecord, Position, EMPTY};
//!
//! let fall = FallRecord::new(Position::new(2, 4), Position::new(5, 4));
//! assert_eq!(fall.distance(), 3);
//! assert_eq!(fall.destination(), Position::new(5, 4));
//!
//! let nothing = ChainResult::default();
//! assert!(nothing.is_noop());
//! assert_eq!(EMPTY, 0);
//! ```

/// Cell value: `0` is empty, `1..=255` is a color id.
pub type Cell = u8;

/// The empty cell value.
pub const EMPTY: Cell = 0;

/// Minimum cluster size removed by a dig.
pub const DIG_MIN_SIZE: usize = 1;

/// Minimum cluster size auto-destroyed during the chain phase.
pub const CRUSH_THRESHOLD: usize = 3;

/// Exponential base of the chain multiplier (`total * CHAIN_BASE^chain`).
pub const CHAIN_BASE: f64 = 1.5;

/// Fallback color when no color is available on the board.
pub const DEFAULT_COLOR: Cell = 1;

/// A cell reference on the grid.
///
/// Ordering is row-major (row first, then column), which is the order sets of
/// positions are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// One cell's movement during a single gravity pass (or a row raise).
///
/// Gravity never moves a cell sideways, so `from_col == to_col` always holds.
/// Gravity records point downward (`to_row > from_row`); the records produced
/// by a row raise point one row upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FallRecord {
    pub from_row: usize,
    pub from_col: usize,
    pub to_row: usize,
    pub to_col: usize,
}

impl FallRecord {
    pub fn new(from: Position, to: Position) -> Self {
        Self {
            from_row: from.row,
            from_col: from.col,
            to_row: to.row,
            to_col: to.col,
        }
    }

    /// Where the cell was before the move.
    pub fn origin(&self) -> Position {
        Position::new(self.from_row, self.from_col)
    }

    /// Where the cell came to rest.
    pub fn destination(&self) -> Position {
        Position::new(self.to_row, self.to_col)
    }

    /// Number of rows travelled, in either direction.
    pub fn distance(&self) -> usize {
        self.to_row.abs_diff(self.from_row)
    }
}

/// One unit of the animated sequence.
///
/// `removed` is sorted and duplicate-free. It is empty for a placement step.
/// `falls` lists the moves of the gravity pass that ran right after the
/// removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    pub removed: Vec<Position>,
    pub falls: Vec<FallRecord>,
}

/// Full outcome of one triggering action (dig or placement).
///
/// `steps[0]` is the triggering action; `steps[1..]` are chain reactions, so
/// `chain_count == steps.len() - 1` whenever there is at least one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainResult {
    pub steps: Vec<Step>,
    /// Number of automatic crush passes after the triggering action.
    pub chain_count: u32,
    /// Cells removed across all steps, the dig itself included.
    pub total_crushed: usize,
    /// Power granted by this action (0 when no chain happened).
    pub power_gained: u64,
}

impl ChainResult {
    /// True when the action did nothing (no steps were recorded).
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total number of fall records across all steps.
    pub fn fall_count(&self) -> usize {
        self.steps.iter().map(|s| s.falls.len()).sum()
    }
}

/// The three visible slots of the color queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorQueueState {
    /// Only color that may legally be dug right now.
    pub current: Cell,
    pub next: Cell,
    pub next_next: Cell,
}

impl ColorQueueState {
    /// All three slots set to one color.
    pub const fn uniform(color: Cell) -> Self {
        Self {
            current: color,
            next: color,
            next_next: color,
        }
    }

    pub fn as_array(&self) -> [Cell; 3] {
        [self.current, self.next, self.next_next]
    }
}

impl Default for ColorQueueState {
    fn default() -> Self {
        Self::uniform(DEFAULT_COLOR)
    }
}
