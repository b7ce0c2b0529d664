//! Monetary and time scalars.
//!
//! All amounts are integer base units of their asset; all fractional
//! arithmetic truncates toward zero.

/// Amount of an asset in its smallest base unit.
pub type Amount = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Index into the epoch sequence (0 = the epoch the ledger was created in).
pub type EpochIndex = usize;

/// Ratio denominator for basis-point style fractions (fees, bands, kick rates).
/// A ratio of `DENOMINATOR` is 100%.
pub const DENOMINATOR: Amount = 10_000;

/// Fixed-point scale for reward-per-weight accounting (1e18).
pub const SCALE: Amount = 1_000_000_000_000_000_000;

/// Align a timestamp down to the start of its epoch bucket.
pub fn epoch_start(time: Timestamp, epoch_length: u64) -> Timestamp {
    time / epoch_length * epoch_length
}
