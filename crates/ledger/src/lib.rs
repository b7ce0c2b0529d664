//! Lockstream Ledger — time-locked staking with boosted weights and
//! multi-asset reward streaming.
//!
//! Deposits are locked for a fixed duration, bucketed into fixed-length
//! epochs, and accrue each registered reward asset continuously in
//! proportion to their boosted (or raw) weight. The ledger enforces strict
//! conservation: principal in equals principal out plus kick rewards and
//! boost fees, and every reward unit notified is eventually claimable.

pub mod balancer;
pub mod epoch;
pub mod errors;
pub mod ledger;
pub mod locks;
pub mod params;
pub mod rewards;
pub mod traits;

pub use balancer::*;
pub use epoch::*;
pub use errors::*;
pub use ledger::*;
pub use locks::*;
pub use params::*;
pub use rewards::*;
pub use traits::*;
