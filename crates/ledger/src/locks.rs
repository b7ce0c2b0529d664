//! Per-account lock schedules.
//!
//! Lock records are append-only: expired entries are never deleted, only
//! skipped by a monotonically advancing cursor. A record's lifecycle is
//! Active (unlock in the future) -> Matured (unlock passed, unprocessed)
//! -> Processed (cursor advanced past it), and never runs backward.

use crate::rewards::AccountRewardState;
use lockstream_types::{epoch_start, Amount, AssetId, Timestamp, DENOMINATOR};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One deposit: principal, reward weight, and the epoch-aligned unlock time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub amount: Amount,
    pub boosted: Amount,
    pub unlock_time: Timestamp,
}

/// Kick pricing inputs for expiry processing.
#[derive(Clone, Copy, Debug)]
pub struct KickTerms {
    /// Reward per overdue epoch, in DENOMINATORths of the matured amount.
    pub reward_per_epoch: Amount,
    /// Epoch length used to count overdue epochs.
    pub rewards_duration: u64,
    /// `now - grace`, the eligibility cutoff the kick was checked against.
    pub cutoff: Timestamp,
}

impl KickTerms {
    /// `min(reward_per_epoch * (epochs_overdue + 1), DENOMINATOR)`ths of `amount`.
    fn reward_for(&self, amount: Amount, unlock_time: Timestamp) -> Amount {
        let current_epoch = epoch_start(self.cutoff, self.rewards_duration);
        let epochs_over = (current_epoch.saturating_sub(unlock_time) / self.rewards_duration) as Amount;
        let rate = (self.reward_per_epoch.saturating_mul(epochs_over + 1)).min(DENOMINATOR);
        amount * rate / DENOMINATOR
    }
}

/// Totals collapsed out of an account by one expiry pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaturedTotals {
    pub locked: Amount,
    pub boosted: Amount,
    pub kick_reward: Amount,
}

/// Balances and lock schedule for one account.
///
/// Invariant: `locked`/`boosted` equal the sums over `locks[next_unlock_index..]`;
/// entries before the cursor are already processed and excluded by construction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountState {
    pub locked: Amount,
    pub boosted: Amount,
    pub next_unlock_index: usize,
    pub locks: Vec<LockRecord>,
    /// Per-reward-asset checkpoint and pending balances.
    pub rewards: HashMap<AssetId, AccountRewardState>,
}

impl AccountState {
    /// Record a new lock, keeping the list sorted by unlock time.
    ///
    /// Merges into the tail when unlock times match. When the tail unlocks
    /// strictly later than the new record (a relock landing behind an
    /// already-queued fresh lock), the tail is copied forward and the new
    /// record overwrites its old slot, avoiding a full shift.
    pub fn add_lock(&mut self, amount: Amount, boosted: Amount, unlock_time: Timestamp) {
        let record = LockRecord {
            amount,
            boosted,
            unlock_time,
        };
        let slot = self.locks.len().saturating_sub(1);
        match self.locks.last().copied() {
            Some(tail) if tail.unlock_time == unlock_time => {
                self.locks[slot].amount += amount;
                self.locks[slot].boosted += boosted;
            }
            Some(tail) if tail.unlock_time > unlock_time => {
                self.locks.push(tail);
                self.locks[slot] = record;
            }
            _ => self.locks.push(record),
        }
        self.locked += amount;
        self.boosted += boosted;
    }

    /// Fast path: collapse the entire remaining balance and jump the cursor
    /// to the end. Used when everything is expired (or on shutdown); the
    /// kick reward is priced from the newest record only — a deliberate
    /// O(1) approximation that under-rewards multi-record kicks.
    pub fn collapse_all(&mut self, kick: Option<&KickTerms>) -> MaturedTotals {
        let mut totals = MaturedTotals {
            locked: self.locked,
            boosted: self.boosted,
            kick_reward: 0,
        };
        if let (Some(terms), Some(newest)) = (kick, self.locks.last()) {
            totals.kick_reward = terms.reward_for(newest.amount, newest.unlock_time);
        }
        self.next_unlock_index = self.locks.len();
        totals
    }

    /// Scan path: walk forward from the cursor over records with
    /// `unlock_time <= cutoff`, advancing the cursor past each.
    pub fn collapse_expired(&mut self, cutoff: Timestamp, kick: Option<&KickTerms>) -> MaturedTotals {
        let mut totals = MaturedTotals::default();
        while let Some(record) = self.locks.get(self.next_unlock_index) {
            if record.unlock_time > cutoff {
                break;
            }
            totals.locked += record.amount;
            totals.boosted += record.boosted;
            if let Some(terms) = kick {
                totals.kick_reward += terms.reward_for(record.amount, record.unlock_time);
            }
            self.next_unlock_index += 1;
        }
        totals
    }

    /// Newest record, if any.
    pub fn newest_lock(&self) -> Option<&LockRecord> {
        self.locks.last()
    }

    /// Unprocessed records (active or matured), cursor forward.
    pub fn unprocessed(&self) -> &[LockRecord] {
        &self.locks[self.next_unlock_index..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(cutoff: Timestamp) -> KickTerms {
        KickTerms {
            reward_per_epoch: 100,
            rewards_duration: 100,
            cutoff,
        }
    }

    #[test]
    fn test_add_lock_merges_same_unlock() {
        let mut state = AccountState::default();
        state.add_lock(100, 110, 500);
        state.add_lock(50, 55, 500);
        assert_eq!(state.locks.len(), 1);
        assert_eq!(state.locks[0].amount, 150);
        assert_eq!(state.locks[0].boosted, 165);
        assert_eq!(state.locked, 150);
        assert_eq!(state.boosted, 165);
    }

    #[test]
    fn test_add_lock_appends_later_unlock() {
        let mut state = AccountState::default();
        state.add_lock(100, 100, 500);
        state.add_lock(200, 200, 600);
        assert_eq!(state.locks.len(), 2);
        assert!(state.locks[0].unlock_time < state.locks[1].unlock_time);
    }

    #[test]
    fn test_add_lock_inserts_before_later_tail() {
        // a fresh lock is queued for unlock 600, then a relock lands at 500
        let mut state = AccountState::default();
        state.add_lock(300, 300, 600);
        state.add_lock(100, 100, 500);
        let unlocks: Vec<_> = state.locks.iter().map(|l| l.unlock_time).collect();
        assert_eq!(unlocks, vec![500, 600]);
        assert_eq!(state.locks[0].amount, 100);
        assert_eq!(state.locks[1].amount, 300);
        assert_eq!(state.locked, 400);
    }

    #[test]
    fn test_collapse_expired_stops_at_active() {
        let mut state = AccountState::default();
        state.add_lock(100, 110, 500);
        state.add_lock(200, 220, 600);
        state.add_lock(400, 440, 700);

        let totals = state.collapse_expired(600, None);
        assert_eq!(totals.locked, 300);
        assert_eq!(totals.boosted, 330);
        assert_eq!(totals.kick_reward, 0);
        assert_eq!(state.next_unlock_index, 2);

        // cursor never rewinds; a second pass at the same cutoff finds nothing
        let again = state.collapse_expired(600, None);
        assert_eq!(again, MaturedTotals::default());
    }

    #[test]
    fn test_kick_reward_per_record_and_cap() {
        let mut state = AccountState::default();
        state.add_lock(10_000, 10_000, 100);
        // cutoff 500 -> record is 4 epochs overdue -> rate 100 * 5 = 500
        let totals = state.collapse_expired(500, Some(&terms(500)));
        assert_eq!(totals.kick_reward, 10_000 * 500 / 10_000);

        // rate saturates at DENOMINATOR
        let mut state = AccountState::default();
        state.add_lock(10_000, 10_000, 100);
        let totals = state.collapse_expired(1_000_000, Some(&terms(1_000_000)));
        assert_eq!(totals.kick_reward, 10_000);
    }

    #[test]
    fn test_collapse_all_prices_newest_only() {
        let mut state = AccountState::default();
        state.add_lock(1_000, 1_000, 100);
        state.add_lock(2_000, 2_000, 200);
        let totals = state.collapse_all(Some(&terms(700)));
        // both records collapse, but the reward comes from the newest amount
        assert_eq!(totals.locked, 3_000);
        // epochs over for unlock 200 at cutoff 700: (700-200)/100 = 5 -> rate 600
        assert_eq!(totals.kick_reward, 2_000 * 600 / 10_000);
        assert_eq!(state.next_unlock_index, 2);
    }
}
