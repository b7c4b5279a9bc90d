//! Cluster module - connected-component search
//!
//! A cluster is a maximal 4-directionally connected set of same-colored,
//! non-empty cells. Discovery never mutates the grid; removal is the caller's
//! job.

use std::collections::VecDeque;

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::types::{Position, EMPTY};

/// Up, down, left, right neighbours of `pos` that lie on the grid.
pub fn neighbors(grid: &Grid, pos: Position) -> ArrayVec<Position, 4> {
    let mut out = ArrayVec::new();
    if pos.row > 0 {
        out.push(Position::new(pos.row - 1, pos.col));
    }
    if pos.row + 1 < grid.height() {
        out.push(Position::new(pos.row + 1, pos.col));
    }
    if pos.col > 0 {
        out.push(Position::new(pos.row, pos.col - 1));
    }
    if pos.col + 1 < grid.width() {
        out.push(Position::new(pos.row, pos.col + 1));
    }
    out
}

/// Breadth-first component search with a visited map shared across calls.
///
/// Reusing one finder for several start cells guarantees no cell is reported
/// twice, which is what a chain pass needs when two seeds land in the same
/// cluster.
#[derive(Debug)]
pub struct ClusterFinder {
    height: usize,
    width: usize,
    visited: Vec<bool>,
    queue: VecDeque<Position>,
}

impl ClusterFinder {
    pub fn new(grid: &Grid) -> Self {
        Self {
            height: grid.height(),
            width: grid.width(),
            visited: vec![false; grid.height() * grid.width()],
            queue: VecDeque::new(),
        }
    }

    #[inline]
    fn slot(&self, pos: Position) -> usize {
        pos.row * self.width + pos.col
    }

    /// True if `pos` was already reached by an earlier search.
    pub fn is_visited(&self, pos: Position) -> bool {
        if pos.row >= self.height || pos.col >= self.width {
            return false;
        }
        self.visited.get(self.slot(pos)).copied().unwrap_or(false)
    }

    /// Collect the component containing `start`, in discovery order.
    ///
    /// Returns `None` when `start` is out of bounds, empty, or already visited,
    /// and when `grid` is not the size the finder was built for.
    /// Every returned cell is marked visited.
    pub fn component(&mut self, grid: &Grid, start: Position) -> Option<Vec<Position>> {
        let dims = (grid.height(), grid.width());
        debug_assert_eq!(dims, (self.height, self.width), "finder built for another grid");
        if dims != (self.height, self.width) {
            return None;
        }
        let color = grid.get(start)?;
        if color == EMPTY || self.is_visited(start) {
            return None;
        }

        let mut comp = Vec::new();
        let first = self.slot(start);
        self.visited[first] = true;
        self.queue.clear();
        self.queue.push_back(start);

        while let Some(pos) = self.queue.pop_front() {
            comp.push(pos);
            for next in neighbors(grid, pos) {
                let slot = self.slot(next);
                if self.visited[slot] || grid.get(next) != Some(color) {
                    continue;
                }
                self.visited[slot] = true;
                self.queue.push_back(next);
            }
        }

        Some(comp)
    }
}

/// Find the cluster containing `start` if it has at least `min_size` cells.
///
/// Returns an empty vector for an out-of-bounds or empty start cell, or when
/// the component is smaller than `min_size`. The result is sorted row-major.
pub fn find_cluster(grid: &Grid, start: Position, min_size: usize) -> Vec<Position> {
    let mut finder = ClusterFinder::new(grid);
    match finder.component(grid, start) {
        Some(mut comp) if comp.len() >= min_size => {
            comp.sort_unstable();
            comp
        }
        _ => Vec::new(),
    }
}
