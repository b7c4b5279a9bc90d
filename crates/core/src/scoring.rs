//! Scoring module - Power gain for chain resolutions
//!
//! Power rewards cascades only:
//! - A dig that triggers no chain grants nothing, however large the cluster.
//! - Otherwise the gain is `total_crushed * base^chain_count`, where
//!   `total_crushed` counts the dug cluster plus every crushed cell.
//! - Rounding is half-to-even, so `3 * 1.5 = 4.5` rounds to 4.

/// Calculate the Power granted by one resolved action.
pub fn power_gain(total_crushed: usize, chain_count: u32, base: f64) -> u64 {
    if chain_count == 0 || total_crushed == 0 {
        return 0;
    }
    let raw = total_crushed as f64 * chain_multiplier(chain_count, base);
    if !raw.is_finite() || raw >= u64::MAX as f64 {
        return u64::MAX;
    }
    raw.round_ties_even() as u64
}

/// The multiplier applied for a given chain length.
pub fn chain_multiplier(chain_count: u32, base: f64) -> f64 {
    base.powi(i32::try_from(chain_count).unwrap_or(i32::MAX))
}
