//! Dig/chain puzzle (workspace facade crate).
//!
//! Re-exports the workspace crates as `dig_chain::{types,core,adapter}`; the
//! implementation lives in dedicated crates under `crates/`.

pub use dig_chain_adapter as adapter;
pub use dig_chain_core as core;
pub use dig_chain_types as types;
