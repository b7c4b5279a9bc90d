use crate::types::{Cell, ColorQueueState, Position, EMPTY};

/// Owned, read-only copy of everything an observer may look at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineSnapshot {
    pub height: usize,
    pub width: usize,
    /// Row-major cells (row 0 first).
    pub cells: Vec<Cell>,
    /// FNV-1a hash of `cells`.
    pub board_hash: u64,
    pub power: u64,
    pub total_score: u64,
    pub last_chain: u32,
    pub colors: ColorQueueState,
}

impl EngineSnapshot {
    pub fn get(&self, pos: Position) -> Option<Cell> {
        if pos.row >= self.height || pos.col >= self.width {
            return None;
        }
        self.cells.get(pos.row * self.width + pos.col).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    /// True if any colored cell sits in row 0.
    pub fn top_row_occupied(&self) -> bool {
        self.rows()
            .next()
            .map(|r| r.iter().any(|&c| c != EMPTY))
            .unwrap_or(false)
    }
}

/// Stable 64-bit FNV-1a over the board bytes.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions, so
/// board identity uses this instead.
pub fn board_hash(cells: &[Cell]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    cells.iter().fold(OFFSET_BASIS, |h, &b| {
        (h ^ u64::from(b)).wrapping_mul(PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_hash_known_values() {
        // FNV-1a of the empty input is the offset basis.
        assert_eq!(board_hash(&[]), 0xcbf29ce484222325);
        // FNV-1a("a")
        assert_eq!(board_hash(b"a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn test_board_hash_changes_with_content() {
        assert_ne!(board_hash(&[0, 1, 2]), board_hash(&[0, 2, 1]));
    }
}
