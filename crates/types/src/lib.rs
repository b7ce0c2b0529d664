//! Shared types for the lockstream staking ledger.
//!
//! Defines monetary scalars, account and asset identifiers, and the
//! fixed-point constants used by the lock and reward arithmetic.

pub mod account;
pub mod asset;
pub mod scalars;

pub use account::*;
pub use asset::*;
pub use scalars::*;
