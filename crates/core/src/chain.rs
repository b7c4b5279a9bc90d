//! Chain module - the dig → gravity → (crush → gravity)* loop
//!
//! Each pass of the loop:
//! 1. seeds a component search from every cell that just landed,
//! 2. crushes every qualifying component (size ≥ the crush threshold) at once,
//! 3. settles the board and records the step.
//!
//! The loop ends on the first pass that crushes nothing. It always terminates:
//! every pass removes at least `crush_threshold` cells from a finite board.

use tracing::trace;

use crate::cluster::ClusterFinder;
use crate::gravity::settle;
use crate::grid::Grid;
use crate::rules::Rules;
use crate::scoring::power_gain;
use crate::types::{ChainResult, FallRecord, Position, Step};

/// Remove `trigger`, settle, then run chain passes until the board is stable.
///
/// An empty trigger is a no-op and returns an empty result without touching
/// the grid. `power_gained` is filled in but not applied anywhere; the caller
/// owns the accumulator.
pub fn resolve(grid: &mut Grid, trigger: &[Position], rules: &Rules) -> ChainResult {
    let mut removed: Vec<Position> = trigger
        .iter()
        .copied()
        .filter(|&p| grid.is_occupied(p))
        .collect();
    removed.sort_unstable();
    removed.dedup();

    if removed.is_empty() {
        return ChainResult::default();
    }

    let mut result = ChainResult::default();

    grid.clear_positions(&removed);
    let falls = settle(grid);
    trace!(removed = removed.len(), falls = falls.len(), "trigger step");
    result.total_crushed += removed.len();
    let mut seeds = landing_spots(&falls);
    result.steps.push(Step { removed, falls });

    loop {
        let crushed = crush_pass(grid, &seeds, rules.crush_threshold);
        if crushed.is_empty() {
            break;
        }

        grid.clear_positions(&crushed);
        result.chain_count += 1;
        result.total_crushed += crushed.len();

        let falls = settle(grid);
        trace!(
            chain = result.chain_count,
            crushed = crushed.len(),
            falls = falls.len(),
            "chain step"
        );
        seeds = landing_spots(&falls);
        result.steps.push(Step {
            removed: crushed,
            falls,
        });
    }

    result.power_gained = power_gain(result.total_crushed, result.chain_count, rules.chain_base);
    result
}

/// Settle the board after a placement and record it as a single step.
///
/// No crush pass runs, so the step's removed set is always empty.
pub fn resolve_placement(grid: &mut Grid) -> ChainResult {
    let falls = settle(grid);
    ChainResult {
        steps: vec![Step {
            removed: Vec::new(),
            falls,
        }],
        chain_count: 0,
        total_crushed: 0,
        power_gained: 0,
    }
}

/// Union of every component of size ≥ `threshold` reachable from `seeds`.
///
/// The grid is not modified. The result is sorted row-major.
pub fn crush_pass(grid: &Grid, seeds: &[Position], threshold: usize) -> Vec<Position> {
    let mut finder = ClusterFinder::new(grid);
    let mut crushed = Vec::new();

    for &seed in seeds {
        if let Some(comp) = finder.component(grid, seed) {
            if comp.len() >= threshold {
                crushed.extend(comp);
            }
        }
    }

    crushed.sort_unstable();
    crushed
}

fn landing_spots(falls: &[FallRecord]) -> Vec<Position> {
    falls.iter().map(FallRecord::destination).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::find_cluster;
    use crate::types::Cell;

    fn grid(rows: &[&[Cell]]) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn test_empty_trigger_is_noop() {
        let mut g = grid(&[&[1, 2], &[3, 4]]);
        let before = g.clone();
        let res = resolve(&mut g, &[], &Rules::default());
        assert!(res.is_noop());
        assert_eq!(res.total_crushed, 0);
        assert_eq!(g, before);
    }

    #[test]
    fn test_dig_without_chain() {
        let mut g = grid(&[&[1, 0], &[2, 0], &[3, 4]]);
        let res = resolve(&mut g, &[Position::new(1, 0)], &Rules::default());

        assert_eq!(res.steps.len(), 1);
        assert_eq!(res.chain_count, 0);
        assert_eq!(res.total_crushed, 1);
        assert_eq!(res.power_gained, 0);
        assert_eq!(
            res.steps[0].falls,
            vec![FallRecord::new(Position::new(0, 0), Position::new(1, 0))]
        );
        assert_eq!(g.to_rows(), vec![vec![0, 0], vec![1, 0], vec![3, 4]]);
    }

    #[test]
    fn test_single_chain_step() {
        // Digging the 9 drops the 1 above it next to two more 1s.
        let mut g = grid(&[&[1, 0, 0], &[9, 1, 1], &[2, 2, 3]]);
        let trigger = find_cluster(&g, Position::new(1, 0), 1);
        let res = resolve(&mut g, &trigger, &Rules::default());

        assert_eq!(res.chain_count, 1);
        assert_eq!(res.steps.len(), 2);
        assert_eq!(
            res.steps[1].removed,
            vec![Position::new(1, 0), Position::new(1, 1), Position::new(1, 2)]
        );
        assert!(res.steps[1].falls.is_empty());
        assert_eq!(res.total_crushed, 4);
        // 4 * 1.5 = 6
        assert_eq!(res.power_gained, 6);
        assert_eq!(g.to_rows(), vec![vec![0, 0, 0], vec![0, 0, 0], vec![2, 2, 3]]);
    }

    #[test]
    fn test_two_step_cascade() {
        // Dig 9 → the 1 lands on two 1s (chain 1) → the 2 above lands on two 2s (chain 2).
        let mut g = grid(&[&[2, 0, 0], &[1, 0, 0], &[9, 0, 0], &[1, 1, 0], &[2, 2, 3]]);
        let res = resolve(&mut g, &[Position::new(2, 0)], &Rules::default());

        assert_eq!(res.chain_count, 2);
        assert_eq!(res.steps.len(), 3);
        assert_eq!(res.total_crushed, 1 + 3 + 3);
        // 7 * 2.25 = 15.75 -> 16
        assert_eq!(res.power_gained, 16);
        assert_eq!(g.occupied_count(), 1);
        assert_eq!(g.get(Position::new(4, 2)), Some(3));
    }

    #[test]
    fn test_crush_pass_dedups_shared_component() {
        let g = grid(&[&[5, 5, 5]]);
        let seeds = [Position::new(0, 0), Position::new(0, 2), Position::new(0, 1)];
        let crushed = crush_pass(&g, &seeds, 3);
        assert_eq!(crushed.len(), 3);
    }

    #[test]
    fn test_crush_pass_only_touches_seeded_clusters() {
        // The 3-cluster on the right is never seeded, so it survives.
        let g = grid(&[&[6, 6, 6, 0, 7, 7, 7]]);
        let crushed = crush_pass(&g, &[Position::new(0, 5)], 3);
        assert_eq!(
            crushed,
            vec![Position::new(0, 4), Position::new(0, 5), Position::new(0, 6)]
        );
    }

    #[test]
    fn test_placement_records_single_fall() {
        let mut g = grid(&[&[4, 0], &[0, 0], &[1, 0]]);
        let res = resolve_placement(&mut g);
        assert_eq!(res.steps.len(), 1);
        assert!(res.steps[0].removed.is_empty());
        assert_eq!(
            res.steps[0].falls,
            vec![FallRecord::new(Position::new(0, 0), Position::new(1, 0))]
        );
        assert_eq!(res.power_gained, 0);
    }

    #[test]
    fn test_custom_threshold() {
        let rules = Rules {
            crush_threshold: 4,
            ..Rules::default()
        };
        let mut g = grid(&[&[1, 0, 0], &[9, 1, 1], &[2, 2, 3]]);
        let res = resolve(&mut g, &[Position::new(1, 0)], &rules);
        assert_eq!(res.chain_count, 0);
        assert_eq!(res.power_gained, 0);
    }
}
