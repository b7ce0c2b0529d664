use crate::errors::{LedgerError, Result};
use lockstream_types::{Amount, DENOMINATOR};
use serde::{Deserialize, Serialize};

/// Configurable parameters controlling lock duration, boost pricing,
/// kick incentives, and the delegated-stake band.
///
/// Ratios are expressed in `DENOMINATOR`ths (10_000 = 100%). Boost
/// parameter changes are staged into the `next_*` fields and only take
/// effect when a new epoch is checkpointed, so mid-epoch locks are all
/// priced identically.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LockerParams {
    /// Length of one reward period / epoch bucket, in seconds.
    pub rewards_duration: u64,
    /// Time a deposit stays locked. Must be a multiple of `rewards_duration`.
    pub lock_duration: u64,
    /// Active boost weight per unit of spend ratio (DENOMINATORths).
    pub boost_rate: Amount,
    /// Active ceiling on the lock-time spend ratio (DENOMINATORths).
    pub maximum_boost_payment: Amount,
    /// Staged boost rate, applied at the next epoch boundary.
    pub next_boost_rate: Amount,
    /// Staged spend-ratio ceiling, applied at the next epoch boundary.
    pub next_maximum_boost_payment: Amount,
    /// Kick reward per overdue epoch (DENOMINATORths of the matured amount).
    pub kick_reward_per_epoch: Amount,
    /// Extra grace, in epochs, before a third party may kick.
    pub kick_reward_epoch_delay: u64,
    /// Lower bound of the delegated-stake band (DENOMINATORths).
    pub minimum_stake: Amount,
    /// Upper bound of the delegated-stake band (DENOMINATORths).
    pub maximum_stake: Amount,
}

impl Default for LockerParams {
    fn default() -> Self {
        let rewards_duration = 7 * 86_400;
        Self {
            rewards_duration,
            lock_duration: rewards_duration * 16,
            boost_rate: 10_000,
            maximum_boost_payment: 0,
            next_boost_rate: 10_000,
            next_maximum_boost_payment: 0,
            kick_reward_per_epoch: 100,
            kick_reward_epoch_delay: 4,
            minimum_stake: 10_000,
            maximum_stake: 10_000,
        }
    }
}

impl LockerParams {
    /// Check structural validity at ledger construction.
    pub fn validate(&self) -> Result<()> {
        if self.rewards_duration == 0 {
            return Err(LedgerError::InvalidInput("rewards_duration must be > 0"));
        }
        if self.lock_duration == 0 || self.lock_duration % self.rewards_duration != 0 {
            return Err(LedgerError::InvalidInput(
                "lock_duration must be a positive multiple of rewards_duration",
            ));
        }
        if self.minimum_stake > self.maximum_stake || self.maximum_stake > DENOMINATOR {
            return Err(LedgerError::InvalidInput("invalid stake band"));
        }
        Ok(())
    }

    /// Stage new boost parameters; they roll in at the next epoch boundary.
    pub fn stage_boost(&mut self, rate: Amount, max_payment: Amount) -> Result<()> {
        if max_payment > 1_500 {
            return Err(LedgerError::InvalidInput("boost payment over 15%"));
        }
        if rate > 30_000 {
            return Err(LedgerError::InvalidInput("boost rate over 3x"));
        }
        self.next_boost_rate = rate;
        self.next_maximum_boost_payment = max_payment;
        Ok(())
    }

    /// Activate any staged boost parameters. Called on new-epoch checkpoints.
    pub fn roll_boost(&mut self) {
        self.boost_rate = self.next_boost_rate;
        self.maximum_boost_payment = self.next_maximum_boost_payment;
    }

    pub fn set_kick_incentive(&mut self, rate: Amount, delay: u64) -> Result<()> {
        if rate > 500 {
            return Err(LedgerError::InvalidInput("kick rate over 5% per epoch"));
        }
        if delay < 2 {
            return Err(LedgerError::InvalidInput("kick delay under 2 epochs"));
        }
        self.kick_reward_per_epoch = rate;
        self.kick_reward_epoch_delay = delay;
        Ok(())
    }

    pub fn set_stake_limits(&mut self, minimum: Amount, maximum: Amount) -> Result<()> {
        if minimum > maximum {
            return Err(LedgerError::InvalidInput("minimum stake above maximum"));
        }
        if maximum > DENOMINATOR {
            return Err(LedgerError::InvalidInput("maximum stake above 100%"));
        }
        self.minimum_stake = minimum;
        self.maximum_stake = maximum;
        Ok(())
    }

    /// Grace period granted before third-party kicks, in seconds.
    pub fn kick_grace_period(&self) -> u64 {
        self.rewards_duration * self.kick_reward_epoch_delay
    }
}
