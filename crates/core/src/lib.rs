//! Core game logic module - pure, deterministic, and testable
//!
//! This crate holds the grid model and every rule of the dig/chain puzzle.
//! It has **no dependencies** on networking, rendering or timing; the adapter
//! drives it through the [`Engine`] facade.
//!
//! # Module Structure
//!
//! - [`grid`]: H x W cell matrix, row 0 at the top
//! - [`cluster`]: 4-connected same-color component search
//! - [`gravity`]: column compaction with per-cell fall records
//! - [`chain`]: the dig → gravity → (crush → gravity)* loop
//! - [`scoring`]: exponential Power payout
//! - [`color_queue`]: three-slot rotating dig-color restriction
//! - [`engine`]: facade owning grid, queue and Power
//! - [`snapshot`]: owned read-only copy of engine state
//!
//! # Game Rules
//!
//! - **Dig**: only a cell of the queue's current color may be dug; its whole
//!   cluster goes, whatever its size
//! - **Mismatch**: digging another color drops Power to 0 and shifts the queue
//! - **Chain**: after every settle, landed cells that join a cluster of 3 or
//!   more are crushed, repeatedly, until nothing lands in such a cluster
//! - **Power**: `round(total_crushed * 1.5^chain)`, 0 with no chain
//! - **Rise**: the board is pushed up one row and a fresh bottom row appears
//!
//! # Example
//!
//! ```
//! use dig_chain_core::{Engine, Rules};
//!
//! let mut engine = Engine::from_rows(
//!     &[[1, 0, 0], [9, 1, 1], [2, 2, 3]],
//!     Rules::default(),
//!     7,
//! )
//! .unwrap();
//! engine.refresh_colors();
//! engine.initialize_colors();
//!
//! let allowed = engine.colors().current;
//! let result = engine.dig(1, 0);
//! if allowed == 9 {
//!     // The 1 above the dug 9 lands next to two more 1s and is crushed.
//!     assert_eq!(result.chain_count, 1);
//!     assert_eq!(engine.power(), 6);
//! } else {
//!     // Digging the wrong color costs Power and rotates the queue.
//!     assert!(result.is_noop());
//!     assert_eq!(engine.power(), 0);
//! }
//! ```

pub mod chain;
pub mod cluster;
pub mod color_queue;
pub mod engine;
pub mod error;
pub mod gravity;
pub mod grid;
pub mod rules;
pub mod scoring;
pub mod snapshot;

pub use dig_chain_types as types;

// Re-export commonly used types for convenience
pub use chain::{crush_pass, resolve, resolve_placement};
pub use cluster::{find_cluster, neighbors, ClusterFinder};
pub use color_queue::ColorQueue;
pub use engine::Engine;
pub use error::EngineError;
pub use gravity::{is_settled, settle};
pub use grid::Grid;
pub use rules::Rules;
pub use scoring::{chain_multiplier, power_gain};
pub use snapshot::{board_hash, EngineSnapshot};
