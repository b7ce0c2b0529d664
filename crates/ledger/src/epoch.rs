//! Epoch index — append-only, gapless sequence of supply snapshots.
//!
//! One epoch per reward period. Each epoch's `supply` is the boosted weight
//! newly locked into it; the active total at any point is a trailing-window
//! sum over exactly one lock duration's worth of epochs.

use lockstream_types::{epoch_start, Amount, EpochIndex, Timestamp};
use serde::{Deserialize, Serialize};

/// Upper bound on binary-search iterations in [`EpochLedger::find_epoch_id`].
/// 2^128 epochs outgrows any realistic history.
const MAX_SEARCH_ROUNDS: usize = 128;

/// One reward-period bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epoch {
    /// Epoch-aligned start timestamp.
    pub date: Timestamp,
    /// Total boosted weight newly locked into this epoch.
    pub supply: Amount,
}

/// The append-only epoch sequence. Index 0 is created at ledger
/// initialization; gaps are backfilled with zero-supply epochs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EpochLedger {
    epochs: Vec<Epoch>,
    rewards_duration: u64,
    lock_duration: u64,
}

impl EpochLedger {
    pub fn new(now: Timestamp, rewards_duration: u64, lock_duration: u64) -> Self {
        Self {
            epochs: vec![Epoch {
                date: epoch_start(now, rewards_duration),
                supply: 0,
            }],
            rewards_duration,
            lock_duration,
        }
    }

    /// Backfill zero-supply epochs up to the boundary of `now` plus one
    /// period, so locks entering the next epoch always have a bucket.
    ///
    /// Returns true when at least one epoch was created; boost parameter
    /// changes roll forward only on that edge. Iterations are bounded by
    /// elapsed time between calls divided by the period length.
    pub fn checkpoint(&mut self, now: Timestamp) -> bool {
        let target = epoch_start(now, self.rewards_duration) + self.rewards_duration;
        let mut created = false;
        while self.last().date < target {
            let date = self.last().date + self.rewards_duration;
            self.epochs.push(Epoch { date, supply: 0 });
            created = true;
        }
        created
    }

    /// Add newly locked boosted weight to the epoch starting at `date`.
    /// The bucket must already exist (callers checkpoint first); returns
    /// false if it does not.
    pub fn add_supply(&mut self, date: Timestamp, amount: Amount) -> bool {
        // the target is always the last or second-to-last epoch
        for epoch in self.epochs.iter_mut().rev() {
            if epoch.date == date {
                epoch.supply = epoch.supply.saturating_add(amount);
                return true;
            }
            if epoch.date < date {
                break;
            }
        }
        false
    }

    /// Active boosted supply at `now`: the trailing-window sum described in
    /// the module docs, excluding the not-yet-active future epoch. Walks
    /// backward because recent queries dominate.
    pub fn total_supply(&self, now: Timestamp) -> Amount {
        let reference = epoch_start(now, self.rewards_duration);
        self.window_sum(reference)
    }

    /// Active boosted supply as of a past epoch.
    pub fn total_supply_at_epoch(&self, index: EpochIndex) -> Amount {
        match self.epochs.get(index) {
            Some(epoch) => self.window_sum(epoch.date),
            None => 0,
        }
    }

    fn window_sum(&self, reference: Timestamp) -> Amount {
        let cutoff = reference.saturating_sub(self.lock_duration);
        let mut total: Amount = 0;
        for epoch in self.epochs.iter().rev() {
            if epoch.date > reference {
                continue; // not yet active
            }
            if epoch.date <= cutoff {
                break; // aged out of the lock window
            }
            total = total.saturating_add(epoch.supply);
        }
        total
    }

    /// Boosted weight queued into the not-yet-active future epoch.
    pub fn pending_supply(&self, now: Timestamp) -> Amount {
        let reference = epoch_start(now, self.rewards_duration);
        let last = self.last();
        if last.date > reference {
            last.supply
        } else {
            0
        }
    }

    /// Binary search for the epoch aligned to the period boundary containing
    /// `time`; returns the nearest epoch at or before it if no exact match.
    pub fn find_epoch_id(&self, time: Timestamp) -> EpochIndex {
        let target = epoch_start(time, self.rewards_duration);
        let mut min = 0usize;
        let mut max = self.epochs.len() - 1;
        for _ in 0..MAX_SEARCH_ROUNDS {
            if min >= max {
                break;
            }
            let mid = (min + max + 1) / 2;
            if self.epochs[mid].date <= target {
                min = mid;
            } else {
                max = mid - 1;
            }
        }
        min
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        false // index 0 always exists
    }

    pub fn get(&self, index: EpochIndex) -> Option<&Epoch> {
        self.epochs.get(index)
    }

    pub fn last(&self) -> &Epoch {
        // the vec is never empty by construction
        &self.epochs[self.epochs.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUR: u64 = 100;
    const LOCK: u64 = 400; // 4 epochs

    fn ledger_at(now: Timestamp) -> EpochLedger {
        EpochLedger::new(now, DUR, LOCK)
    }

    #[test]
    fn test_initial_epoch_aligned() {
        let ledger = ledger_at(250);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(0).unwrap().date, 200);
    }

    #[test]
    fn test_checkpoint_backfills_gaps() {
        let mut ledger = ledger_at(0);
        assert!(ledger.checkpoint(0));
        assert_eq!(ledger.len(), 2); // epochs 0 and 100

        // long silence: jump five periods forward
        assert!(ledger.checkpoint(550));
        assert_eq!(ledger.len(), 7); // up to date 600
        assert_eq!(ledger.last().date, 600);
        for i in 0..ledger.len() {
            assert_eq!(ledger.get(i).unwrap().supply, 0);
        }
    }

    #[test]
    fn test_checkpoint_idempotent() {
        let mut ledger = ledger_at(0);
        assert!(ledger.checkpoint(130));
        let len = ledger.len();
        assert!(!ledger.checkpoint(130));
        assert_eq!(ledger.len(), len);
    }

    #[test]
    fn test_window_sum_excludes_future_and_aged() {
        let mut ledger = ledger_at(0);
        ledger.checkpoint(0);
        // lock queued into the next epoch (date 100) while now = 50
        assert!(ledger.add_supply(100, 1_000));
        assert_eq!(ledger.total_supply(50), 0); // not yet active
        assert_eq!(ledger.pending_supply(50), 1_000);

        // active once its epoch starts
        ledger.checkpoint(150);
        assert_eq!(ledger.total_supply(150), 1_000);
        assert_eq!(ledger.pending_supply(150), 0);

        // still active through the last epoch of the window (date 400)
        ledger.checkpoint(450);
        assert_eq!(ledger.total_supply(450), 1_000);

        // aged out at date 500: 500 - 400 = 100 is excluded boundary
        ledger.checkpoint(550);
        assert_eq!(ledger.total_supply(550), 0);
    }

    #[test]
    fn test_total_supply_at_epoch() {
        let mut ledger = ledger_at(0);
        ledger.checkpoint(0);
        ledger.add_supply(100, 700);
        ledger.checkpoint(950);
        // epoch with date 100 is index 1
        assert_eq!(ledger.total_supply_at_epoch(1), 700);
        assert_eq!(ledger.total_supply_at_epoch(4), 700); // date 400, last in window
        assert_eq!(ledger.total_supply_at_epoch(5), 0); // date 500, aged out
        assert_eq!(ledger.total_supply_at_epoch(99), 0); // out of range
    }

    #[test]
    fn test_find_epoch_id() {
        let mut ledger = ledger_at(0);
        ledger.checkpoint(850);
        assert_eq!(ledger.find_epoch_id(0), 0);
        assert_eq!(ledger.find_epoch_id(99), 0);
        assert_eq!(ledger.find_epoch_id(100), 1);
        assert_eq!(ledger.find_epoch_id(437), 4);
        // beyond the last epoch: nearest at or before
        assert_eq!(ledger.find_epoch_id(5_000), ledger.len() - 1);
    }

    #[test]
    fn test_add_supply_requires_bucket() {
        let mut ledger = ledger_at(0);
        ledger.checkpoint(0);
        assert!(!ledger.add_supply(900, 1)); // bucket not yet created
    }
}
