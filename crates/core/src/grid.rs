//! Grid module - the mutable board of cell values
//!
//! The grid is an H×W array where each cell is empty (`0`) or holds a color id.
//! Uses a flat row-major vector for cache locality; dimensions are fixed at
//! construction and always non-zero.
//! Coordinates: (row, col) where row 0 is the top and rows grow downward.

use std::collections::BTreeSet;

use crate::error::EngineError;
use crate::types::{Cell, Position, EMPTY};

/// The game board - `height` rows x `width` columns using flat storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    height: usize,
    width: usize,
    /// Flat array of cells, row-major order (row * width + col)
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an empty grid.
    ///
    /// Fails if either dimension is zero.
    pub fn new(height: usize, width: usize) -> Result<Self, EngineError> {
        if height == 0 || width == 0 {
            return Err(EngineError::InvalidDimensions { height, width });
        }
        Ok(Self {
            height,
            width,
            cells: vec![EMPTY; height * width],
        })
    }

    /// Build a grid from raw rows of color ids (row 0 first).
    ///
    /// Every row must have the same, non-zero length.
    pub fn from_rows<R: AsRef<[Cell]>>(rows: &[R]) -> Result<Self, EngineError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut grid = Self::new(height, width)?;

        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != width {
                return Err(EngineError::RaggedRows {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
            let start = row * width;
            grid.cells[start..start + width].copy_from_slice(values);
        }
        Ok(grid)
    }

    /// Calculate flat index from (row, col)
    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(row * self.width + col)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    /// Get cell at `pos`.
    /// Returns None if out of bounds
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos.row, pos.col).map(|idx| self.cells[idx])
    }

    /// Set cell at `pos`.
    /// Returns false if out of bounds
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        match self.index(pos.row, pos.col) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is within bounds and empty
    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos) == Some(EMPTY)
    }

    /// Check if position is within bounds and filled
    pub fn is_occupied(&self, pos: Position) -> bool {
        matches!(self.get(pos), Some(c) if c != EMPTY)
    }

    /// Empty every listed position. Out-of-bounds entries are ignored.
    pub fn clear_positions<'a, I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = &'a Position>,
    {
        for &pos in positions {
            self.set(pos, EMPTY);
        }
    }

    /// True if the row holds no colored cell (out-of-bounds rows count as empty).
    pub fn row_is_empty(&self, row: usize) -> bool {
        self.row(row)
            .map(|cells| cells.iter().all(|&c| c == EMPTY))
            .unwrap_or(true)
    }

    /// Borrow one row as a slice.
    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        if row >= self.height {
            return None;
        }
        let start = row * self.width;
        Some(&self.cells[start..start + self.width])
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> Option<&mut [Cell]> {
        if row >= self.height {
            return None;
        }
        let start = row * self.width;
        Some(&mut self.cells[start..start + self.width])
    }

    /// Shift the whole board up by one row.
    ///
    /// Row 0 is discarded and the new bottom row is left empty.
    pub(crate) fn shift_rows_up(&mut self) {
        let width = self.width;
        self.cells.copy_within(width.., 0);
        let bottom = (self.height - 1) * width;
        self.cells[bottom..].fill(EMPTY);
    }

    /// Distinct non-empty colors currently on the board, ascending.
    pub fn distinct_colors(&self) -> BTreeSet<Cell> {
        self.cells.iter().copied().filter(|&c| c != EMPTY).collect()
    }

    /// Number of non-empty cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != EMPTY).count()
    }

    /// Get a reference to the internal cells array (row-major)
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Convert to a 2D vector (row 0 first)
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.cells.chunks(self.width).map(|r| r.to_vec()).collect()
    }
}
