//! Gravity module - per-column compaction
//!
//! Uses the same two-pointer sweep as a row clear, turned on its side: each
//! column is scanned bottom to top with a write pointer, so a pass costs
//! O(H) per column and never reorders cells within a column.

use crate::grid::Grid;
use crate::types::{FallRecord, Position, EMPTY};

/// Slide every non-empty cell down as far as it goes.
///
/// Returns one record per cell that changed row, grouped by column (left to
/// right) and, within a column, bottom-most cell first. Running `settle` on an
/// already settled grid returns no records.
pub fn settle(grid: &mut Grid) -> Vec<FallRecord> {
    let mut fallen = Vec::new();
    let height = grid.height();

    for col in 0..grid.width() {
        let mut write_row = height;

        for read_row in (0..height).rev() {
            let from = Position::new(read_row, col);
            let cell = grid.get(from).unwrap_or(EMPTY);
            if cell == EMPTY {
                continue;
            }
            write_row -= 1;
            if write_row != read_row {
                let to = Position::new(write_row, col);
                grid.set(to, cell);
                grid.set(from, EMPTY);
                fallen.push(FallRecord::new(from, to));
            }
        }

        // Everything above the packed run is empty.
        for row in 0..write_row {
            grid.set(Position::new(row, col), EMPTY);
        }
    }

    fallen
}

/// True if no cell in the grid could fall.
pub fn is_settled(grid: &Grid) -> bool {
    (0..grid.width()).all(|col| {
        let mut seen_filled = false;
        (0..grid.height()).all(|row| {
            let filled = grid.is_occupied(Position::new(row, col));
            // Once a filled cell is seen going down, no gap may follow.
            let ok = !(seen_filled && !filled);
            seen_filled |= filled;
            ok
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;
    use proptest::prelude::*;

    #[test]
    fn test_settle_packs_column_and_records_moves() {
        let mut g = Grid::from_rows(&[[1, 0], [0, 2], [3, 0], [0, 0]]).unwrap();
        let falls = settle(&mut g);

        assert_eq!(g.to_rows(), vec![vec![0, 0], vec![0, 0], vec![1, 0], vec![3, 2]]);
        assert_eq!(
            falls,
            vec![
                FallRecord::new(Position::new(2, 0), Position::new(3, 0)),
                FallRecord::new(Position::new(0, 0), Position::new(2, 0)),
                FallRecord::new(Position::new(1, 1), Position::new(3, 1)),
            ]
        );
    }

    #[test]
    fn test_settle_skips_resting_cells() {
        let mut g = Grid::from_rows(&[[0], [4], [5]]).unwrap();
        assert!(settle(&mut g).is_empty());
        assert!(is_settled(&g));
    }

    #[test]
    fn test_is_settled_detects_gap() {
        let g = Grid::from_rows(&[[1], [0], [2]]).unwrap();
        assert!(!is_settled(&g));
    }

    fn arb_rows() -> impl Strategy<Value = Vec<Vec<Cell>>> {
        (1usize..8, 1usize..8).prop_flat_map(|(h, w)| {
            prop::collection::vec(prop::collection::vec(0u8..4, w), h)
        })
    }

    fn column(g: &Grid, col: usize) -> Vec<Cell> {
        (0..g.height())
            .map(|row| g.get(Position::new(row, col)).unwrap())
            .collect()
    }

    proptest! {
        #[test]
        fn prop_settle_is_idempotent(rows in arb_rows()) {
            let mut g = Grid::from_rows(&rows).unwrap();
            let _ = settle(&mut g);
            prop_assert!(settle(&mut g).is_empty());
            prop_assert!(is_settled(&g));
        }

        #[test]
        fn prop_settle_packs_bottom_and_keeps_order(rows in arb_rows()) {
            let mut g = Grid::from_rows(&rows).unwrap();
            let before: Vec<Vec<Cell>> = (0..g.width()).map(|c| column(&g, c)).collect();
            let falls = settle(&mut g);

            for (col, old) in before.iter().enumerate() {
                let kept: Vec<Cell> = old.iter().copied().filter(|&c| c != EMPTY).collect();
                let now = column(&g, col);
                let gap = now.len() - kept.len();
                prop_assert!(now[..gap].iter().all(|&c| c == EMPTY));
                prop_assert_eq!(&now[gap..], &kept[..]);
            }
            for f in falls {
                prop_assert_eq!(f.from_col, f.to_col);
                prop_assert!(f.to_row > f.from_row);
            }
        }
    }
}
