//! Lock/unlock orchestrator and the ledger's public surface.
//!
//! `StakeLocker` owns all mutable state (accounts, epoch index, reward
//! state, supplies) and mutates it only inside atomic calls: each public
//! operation runs to completion or fails with no observable side effect.
//! Outbound transfers happen only after all bookkeeping is final, and a
//! call-in-progress flag rejects nested mutating entry.

use crate::balancer::{rebalance_plan, BalancerAction};
use crate::epoch::EpochLedger;
use crate::errors::{LedgerError, Result};
use crate::locks::{AccountState, KickTerms, LockRecord};
use crate::params::LockerParams;
use crate::rewards::RewardState;
use crate::traits::{AssetTransfer, Clock, PermissionOracle, Role, StakingProxy};
use lockstream_types::{
    epoch_start, AccountId, Amount, AssetId, EpochIndex, Timestamp, DENOMINATOR,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Snapshot of one account's balances, per the ledger's stored fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalances {
    /// Total unprocessed principal (active or matured-unprocessed).
    pub locked: Amount,
    /// Total unprocessed boosted weight.
    pub boosted: Amount,
    /// Cursor into the account's lock list.
    pub next_unlock_index: usize,
}

/// Breakdown of an account's lock schedule at a point in time.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LockSummary {
    /// All unprocessed principal.
    pub total: Amount,
    /// Matured but not yet processed.
    pub unlockable: Amount,
    /// Still actively locked.
    pub locked: Amount,
    /// The active records, in unlock order.
    pub active: Vec<LockRecord>,
}

/// The time-locked staking ledger.
pub struct StakeLocker {
    params: LockerParams,
    staking_asset: AssetId,
    /// Custody account the ledger holds assets under.
    ledger_account: AccountId,
    /// Receiver of boost fees.
    boost_receiver: AccountId,

    epochs: EpochLedger,
    accounts: HashMap<AccountId, AccountState>,
    locked_supply: Amount,
    boosted_supply: Amount,

    /// Registration order; checkpoints iterate in this order.
    reward_assets: Vec<AssetId>,
    reward_data: HashMap<AssetId, RewardState>,
    distributors: HashMap<AssetId, HashSet<AccountId>>,

    shutdown: bool,
    /// Call-in-progress flag for the reentrancy guard.
    entered: bool,

    oracle: Arc<dyn PermissionOracle>,
    assets: Arc<dyn AssetTransfer>,
    proxy: Option<(Arc<dyn StakingProxy>, AccountId)>,
    clock: Arc<dyn Clock>,
}

impl StakeLocker {
    pub fn new(
        params: LockerParams,
        staking_asset: AssetId,
        ledger_account: AccountId,
        boost_receiver: AccountId,
        oracle: Arc<dyn PermissionOracle>,
        assets: Arc<dyn AssetTransfer>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        params.validate()?;
        let epochs = EpochLedger::new(clock.now(), params.rewards_duration, params.lock_duration);
        Ok(Self {
            params,
            staking_asset,
            ledger_account,
            boost_receiver,
            epochs,
            accounts: HashMap::new(),
            locked_supply: 0,
            boosted_supply: 0,
            reward_assets: Vec::new(),
            reward_data: HashMap::new(),
            distributors: HashMap::new(),
            shutdown: false,
            entered: false,
            oracle,
            assets,
            proxy: None,
            clock,
        })
    }

    // -------------------------------------------------------------------
    // Guard and policy checks
    // -------------------------------------------------------------------

    /// Run a mutating entry point behind the reentrancy guard. The flag is
    /// cleared on both success and error so a failed call never wedges the
    /// ledger.
    fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.entered {
            return Err(LedgerError::Reentrant);
        }
        self.entered = true;
        let result = f(self);
        self.entered = false;
        result
    }

    fn ensure_not_paused(&self) -> Result<()> {
        if self.oracle.is_paused() {
            return Err(LedgerError::Paused);
        }
        Ok(())
    }

    fn ensure_admin(&self, caller: &AccountId) -> Result<()> {
        if !self.oracle.has_role(Role::Admin, caller) {
            return Err(LedgerError::Unauthorized("admin role required"));
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Checkpoints
    // -------------------------------------------------------------------

    /// Bring every reward asset's index, and optionally one account's
    /// pending rewards, up to `now`. Must run before any weight change so
    /// past accrual is priced at the pre-change weight.
    fn checkpoint_rewards(&mut self, account: Option<&AccountId>, now: Timestamp) {
        for i in 0..self.reward_assets.len() {
            let asset = self.reward_assets[i].clone();
            let Some(state) = self.reward_data.get_mut(&asset) else {
                continue;
            };
            let supply = if state.use_boost {
                self.boosted_supply
            } else {
                self.locked_supply
            };
            state.settle(supply, now);
            if let Some(owner) = account {
                let stored = state.reward_per_weight_stored;
                let use_boost = state.use_boost;
                let acct = self.accounts.entry(*owner).or_default();
                let weight = if use_boost { acct.boosted } else { acct.locked };
                acct.rewards.entry(asset).or_default().settle(weight, stored);
            }
        }
    }

    /// Ensure the epoch index is gapless up to the next epoch; staged boost
    /// parameters activate only when a new epoch is actually created.
    fn checkpoint_epochs(&mut self, now: Timestamp) {
        if self.epochs.checkpoint(now) {
            self.params.roll_boost();
            debug!(
                target: "locker",
                epochs = self.epochs.len(),
                boost_rate = %self.params.boost_rate,
                "epoch checkpoint advanced"
            );
        }
    }

    // -------------------------------------------------------------------
    // Lock / unlock operations
    // -------------------------------------------------------------------

    /// Pull `amount` of the staked asset from `caller` and lock it for
    /// `account`. `spend_ratio` (DENOMINATORths) is paid out as a boost fee
    /// in exchange for extra reward weight.
    pub fn lock(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        amount: Amount,
        spend_ratio: Amount,
    ) -> Result<()> {
        self.guarded(|this| {
            this.ensure_not_paused()?;
            // validate before pulling so a failed lock moves nothing
            this.validate_lock(amount, spend_ratio)?;
            let ledger_account = this.ledger_account;
            this.assets
                .transfer_from(&this.staking_asset, caller, &ledger_account, amount)?;
            let now = this.clock.now();
            this.lock_internal(account, amount, spend_ratio, false, now)
        })
    }

    /// Withdraw all matured locks to an arbitrary address. No grace, no kick.
    pub fn withdraw_expired_locks_to(
        &mut self,
        caller: &AccountId,
        withdraw_to: &AccountId,
    ) -> Result<()> {
        self.guarded(|this| {
            this.ensure_not_paused()?;
            this.process_expired(caller, false, 0, withdraw_to, withdraw_to, 0)
        })
    }

    /// Withdraw or relock the caller's matured locks. `spend_ratio` applies
    /// only on the relock path.
    pub fn process_expired_locks(
        &mut self,
        caller: &AccountId,
        relock: bool,
        spend_ratio: Amount,
    ) -> Result<()> {
        self.guarded(|this| {
            this.ensure_not_paused()?;
            this.process_expired(caller, relock, spend_ratio, caller, caller, 0)
        })
    }

    /// Third-party forced expiry after the configured extra grace period.
    /// The kick reward is paid to `caller` out of the matured principal.
    pub fn kick_expired_locks(&mut self, caller: &AccountId, account: &AccountId) -> Result<()> {
        self.guarded(|this| {
            this.ensure_not_paused()?;
            let grace = this.params.kick_grace_period();
            this.process_expired(account, false, 0, account, caller, grace)
        })
    }

    fn validate_lock(&self, amount: Amount, spend_ratio: Amount) -> Result<()> {
        if amount == 0 {
            return Err(LedgerError::InvalidInput("amount must be > 0"));
        }
        if spend_ratio > self.params.maximum_boost_payment {
            return Err(LedgerError::InvalidInput(
                "spend ratio over maximum boost payment",
            ));
        }
        if self.shutdown {
            return Err(LedgerError::ShutdownActive);
        }
        Ok(())
    }

    /// Core lock path; principal is already in custody when this runs.
    fn lock_internal(
        &mut self,
        account: &AccountId,
        amount: Amount,
        spend_ratio: Amount,
        is_relock: bool,
        now: Timestamp,
    ) -> Result<()> {
        self.validate_lock(amount, spend_ratio)?;
        self.checkpoint_rewards(Some(account), now);
        self.checkpoint_epochs(now);

        let spend_amount = amount * spend_ratio / DENOMINATOR;
        let boost_denominator = self.params.maximum_boost_payment.max(1);
        let boost_ratio = self.params.boost_rate * spend_ratio / boost_denominator;
        let lock_amount = amount - spend_amount;
        let boosted_amount = amount + amount * boost_ratio / DENOMINATOR;

        // fresh locks activate at the next epoch; relocks re-enter the
        // current one
        let duration = self.params.rewards_duration;
        let mut lock_epoch = epoch_start(now, duration);
        if !is_relock {
            lock_epoch += duration;
        }
        let unlock_time = lock_epoch + self.params.lock_duration;

        let state = self.accounts.entry(*account).or_default();
        state.add_lock(lock_amount, boosted_amount, unlock_time);
        self.locked_supply += lock_amount;
        self.boosted_supply += boosted_amount;

        if !self.epochs.add_supply(lock_epoch, boosted_amount) {
            // unreachable after checkpoint_epochs; surfaced loudly if it ever drifts
            warn!(target: "locker", date = lock_epoch, "missing epoch bucket for new lock");
        }

        info!(
            target: "locker",
            account = %account,
            amount,
            lock_amount,
            boosted_amount,
            unlock_time,
            relock = is_relock,
            "locked"
        );

        if spend_amount > 0 {
            let ledger_account = self.ledger_account;
            let boost_receiver = self.boost_receiver;
            self.assets.transfer_from(
                &self.staking_asset,
                &ledger_account,
                &boost_receiver,
                spend_amount,
            )?;
        }
        Ok(())
    }

    /// The expiry engine. Collapses matured locks (fast path when everything
    /// is expired or the ledger is shut down, scan path otherwise), prices
    /// any kick reward, then relocks or pays out.
    fn process_expired(
        &mut self,
        account: &AccountId,
        relock: bool,
        spend_ratio: Amount,
        withdraw_to: &AccountId,
        reward_recipient: &AccountId,
        grace: u64,
    ) -> Result<()> {
        // relock preconditions are checked up front: once records collapse
        // the cursor cannot be rewound, so a late failure would strand the
        // matured principal
        if relock {
            if self.shutdown {
                return Err(LedgerError::ShutdownActive);
            }
            if spend_ratio > self.params.maximum_boost_payment {
                return Err(LedgerError::InvalidInput(
                    "spend ratio over maximum boost payment",
                ));
            }
        }
        let now = self.clock.now();
        self.checkpoint_rewards(Some(account), now);

        let cutoff = now.saturating_sub(grace);
        let kick = (grace > 0).then(|| KickTerms {
            reward_per_epoch: self.params.kick_reward_per_epoch,
            rewards_duration: self.params.rewards_duration,
            cutoff,
        });

        let shutdown = self.shutdown;
        let state = self.accounts.entry(*account).or_default();
        let fully_expired = state
            .newest_lock()
            .is_some_and(|newest| newest.unlock_time <= cutoff);
        let totals = if shutdown || fully_expired {
            state.collapse_all(kick.as_ref())
        } else {
            state.collapse_expired(cutoff, kick.as_ref())
        };
        if totals.locked == 0 {
            return Err(LedgerError::NothingToProcess);
        }
        state.locked -= totals.locked;
        state.boosted -= totals.boosted;
        self.locked_supply -= totals.locked;
        self.boosted_supply -= totals.boosted;

        info!(
            target: "locker",
            account = %account,
            locked = totals.locked,
            boosted = totals.boosted,
            kick_reward = totals.kick_reward,
            relock,
            "expired locks processed"
        );

        let ledger_account = self.ledger_account;
        let mut returned = totals.locked;
        if totals.kick_reward > 0 {
            returned -= totals.kick_reward;
            self.allocate_for_transfer(totals.kick_reward)?;
            self.assets.transfer_from(
                &self.staking_asset,
                &ledger_account,
                reward_recipient,
                totals.kick_reward,
            )?;
            info!(
                target: "locker",
                recipient = %reward_recipient,
                amount = totals.kick_reward,
                "kick reward paid"
            );
        } else if relock && spend_ratio > 0 {
            // make sure local custody covers the relock's boost fee
            let reserve = totals.locked * spend_ratio / DENOMINATOR;
            self.allocate_for_transfer(reserve)?;
        }

        if relock {
            self.lock_internal(withdraw_to, returned, spend_ratio, true, now)
        } else {
            self.allocate_for_transfer(returned)?;
            self.assets
                .transfer_from(&self.staking_asset, &ledger_account, withdraw_to, returned)?;
            Ok(())
        }
    }

    /// Pull any shortfall of the staked asset back from the delegated proxy
    /// so an outbound transfer of `amount` cannot fail for lack of custody.
    fn allocate_for_transfer(&self, amount: Amount) -> Result<()> {
        let held = self.assets.balance_of(&self.staking_asset, &self.ledger_account);
        if held >= amount {
            return Ok(());
        }
        let shortfall = amount - held;
        let Some((proxy, proxy_account)) = self.proxy.as_ref() else {
            return Err(LedgerError::Transfer(anyhow::anyhow!(
                "insufficient local principal and no staking proxy configured"
            )));
        };
        proxy.withdraw(shortfall)?;
        self.assets
            .transfer_from(&self.staking_asset, proxy_account, &self.ledger_account, shortfall)?;
        debug!(target: "locker", shortfall, "pulled principal from staking proxy");
        Ok(())
    }

    // -------------------------------------------------------------------
    // Reward operations
    // -------------------------------------------------------------------

    /// Stream `amount` of `asset` over the next period. Restricted to
    /// approved distributors; the asset is pulled from the caller in the
    /// same call so promised rewards are always backed.
    pub fn notify_reward_amount(
        &mut self,
        caller: &AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<()> {
        self.guarded(|this| {
            this.ensure_not_paused()?;
            if amount == 0 {
                return Err(LedgerError::InvalidInput("amount must be > 0"));
            }
            if !this.reward_data.contains_key(asset) {
                return Err(LedgerError::InvalidInput("unregistered reward asset"));
            }
            let approved = this
                .distributors
                .get(asset)
                .is_some_and(|set| set.contains(caller));
            if !approved {
                return Err(LedgerError::Unauthorized(
                    "not an approved distributor for this asset",
                ));
            }

            let now = this.clock.now();
            this.checkpoint_rewards(None, now);
            let duration = this.params.rewards_duration;
            let ledger_account = this.ledger_account;
            let Some(state) = this.reward_data.get_mut(asset) else {
                return Err(LedgerError::InvalidInput("unregistered reward asset"));
            };
            state.notify(amount, duration, now);
            let reward_rate = state.reward_rate;
            this.assets.transfer_from(asset, caller, &ledger_account, amount)?;
            info!(
                target: "locker",
                asset = %asset,
                amount,
                reward_rate,
                "reward notified"
            );
            Ok(())
        })
    }

    /// Pay out and zero every asset's pending reward for `account`.
    /// Callable by anyone; rewards always go to their owner.
    pub fn claim(&mut self, account: &AccountId) -> Result<()> {
        self.guarded(|this| {
            this.ensure_not_paused()?;
            let now = this.clock.now();
            this.checkpoint_rewards(Some(account), now);
            let ledger_account = this.ledger_account;
            for i in 0..this.reward_assets.len() {
                let asset = this.reward_assets[i].clone();
                let Some(state) = this.accounts.get_mut(account) else {
                    break;
                };
                let Some(reward) = state.rewards.get_mut(&asset) else {
                    continue;
                };
                let amount = reward.pending_reward;
                if amount == 0 {
                    continue;
                }
                reward.pending_reward = 0;
                reward.cumulative_claimed += amount;
                this.assets.transfer_from(&asset, &ledger_account, account, amount)?;
                info!(
                    target: "locker",
                    account = %account,
                    asset = %asset,
                    amount,
                    "reward claimed"
                );
            }
            Ok(())
        })
    }

    // -------------------------------------------------------------------
    // Admin surface
    // -------------------------------------------------------------------

    /// Register a reward asset with its first approved distributor.
    pub fn add_reward_asset(
        &mut self,
        caller: &AccountId,
        asset: AssetId,
        distributor: AccountId,
        use_boost: bool,
    ) -> Result<()> {
        self.guarded(|this| {
            this.ensure_not_paused()?;
            this.ensure_admin(caller)?;
            if asset == this.staking_asset {
                return Err(LedgerError::InvalidInput(
                    "staking asset cannot be a reward asset",
                ));
            }
            if this.reward_data.contains_key(&asset) {
                return Err(LedgerError::AlreadyConfigured("reward asset"));
            }
            let now = this.clock.now();
            this.reward_data
                .insert(asset.clone(), RewardState::new(use_boost, now));
            this.reward_assets.push(asset.clone());
            this.distributors
                .entry(asset.clone())
                .or_default()
                .insert(distributor);
            info!(target: "locker", asset = %asset, use_boost, "reward asset registered");
            Ok(())
        })
    }

    pub fn approve_reward_distributor(
        &mut self,
        caller: &AccountId,
        asset: &AssetId,
        distributor: AccountId,
        approved: bool,
    ) -> Result<()> {
        self.guarded(|this| {
            this.ensure_not_paused()?;
            this.ensure_admin(caller)?;
            if !this.reward_data.contains_key(asset) {
                return Err(LedgerError::InvalidInput("unregistered reward asset"));
            }
            let set = this.distributors.entry(asset.clone()).or_default();
            if approved {
                set.insert(distributor);
            } else {
                set.remove(&distributor);
            }
            info!(
                target: "locker",
                asset = %asset,
                distributor = %distributor,
                approved,
                "distributor approval updated"
            );
            Ok(())
        })
    }

    /// Attach the delegated-staking proxy. One-shot: reassignment is refused.
    pub fn set_staking_proxy(
        &mut self,
        caller: &AccountId,
        proxy: Arc<dyn StakingProxy>,
        proxy_account: AccountId,
    ) -> Result<()> {
        self.guarded(|this| {
            this.ensure_not_paused()?;
            this.ensure_admin(caller)?;
            if this.proxy.is_some() {
                return Err(LedgerError::AlreadyConfigured("staking proxy"));
            }
            this.proxy = Some((proxy, proxy_account));
            info!(target: "locker", proxy = %proxy_account, "staking proxy set");
            Ok(())
        })
    }

    pub fn set_stake_limits(
        &mut self,
        caller: &AccountId,
        minimum: Amount,
        maximum: Amount,
    ) -> Result<()> {
        self.guarded(|this| {
            this.ensure_not_paused()?;
            this.ensure_admin(caller)?;
            this.params.set_stake_limits(minimum, maximum)?;
            info!(target: "locker", minimum, maximum, "stake band updated");
            Ok(())
        })
    }

    /// Stage boost parameters; they activate at the next epoch boundary.
    pub fn set_boost(
        &mut self,
        caller: &AccountId,
        rate: Amount,
        max_payment: Amount,
    ) -> Result<()> {
        self.guarded(|this| {
            this.ensure_not_paused()?;
            this.ensure_admin(caller)?;
            this.params.stage_boost(rate, max_payment)?;
            info!(target: "locker", rate, max_payment, "boost parameters staged");
            Ok(())
        })
    }

    pub fn set_kick_incentive(&mut self, caller: &AccountId, rate: Amount, delay: u64) -> Result<()> {
        self.guarded(|this| {
            this.ensure_not_paused()?;
            this.ensure_admin(caller)?;
            this.params.set_kick_incentive(rate, delay)?;
            info!(target: "locker", rate, delay, "kick incentive updated");
            Ok(())
        })
    }

    /// Irreversibly stop new locks and recall all delegated principal;
    /// existing balances become withdrawable immediately.
    pub fn shutdown(&mut self, caller: &AccountId) -> Result<()> {
        self.guarded(|this| {
            this.ensure_not_paused()?;
            this.ensure_admin(caller)?;
            if this.shutdown {
                return Err(LedgerError::ShutdownActive);
            }
            if let Some((proxy, proxy_account)) = this.proxy.as_ref() {
                let delegated = proxy.balance();
                if delegated > 0 {
                    proxy.withdraw(delegated)?;
                    this.assets.transfer_from(
                        &this.staking_asset,
                        proxy_account,
                        &this.ledger_account,
                        delegated,
                    )?;
                }
            }
            this.shutdown = true;
            info!(target: "locker", "ledger shut down");
            Ok(())
        })
    }

    /// Rebalance principal between local custody and the delegated proxy.
    /// Skipped entirely while shut down.
    pub fn update_stake_ratio(&mut self, caller: &AccountId, offset: Amount) -> Result<()> {
        self.guarded(|this| {
            this.ensure_not_paused()?;
            this.ensure_admin(caller)?;
            if this.shutdown {
                debug!(target: "locker", "stake ratio update skipped: shut down");
                return Ok(());
            }
            let Some((proxy, proxy_account)) = this.proxy.as_ref() else {
                return Ok(());
            };
            let local = this.assets.balance_of(&this.staking_asset, &this.ledger_account);
            let delegated = proxy.balance();
            match rebalance_plan(local, delegated, &this.params, offset) {
                Some(BalancerAction::Stake(amount)) if amount > 0 => {
                    this.assets.transfer_from(
                        &this.staking_asset,
                        &this.ledger_account,
                        proxy_account,
                        amount,
                    )?;
                    proxy.stake(amount)?;
                    info!(target: "locker", amount, "principal delegated to proxy");
                }
                Some(BalancerAction::Withdraw(amount)) if amount > 0 => {
                    proxy.withdraw(amount)?;
                    this.assets.transfer_from(
                        &this.staking_asset,
                        proxy_account,
                        &this.ledger_account,
                        amount,
                    )?;
                    info!(target: "locker", amount, "principal recalled from proxy");
                }
                _ => debug!(target: "locker", "stake ratio within band"),
            }
            Ok(())
        })
    }

    // -------------------------------------------------------------------
    // Read-only views
    // -------------------------------------------------------------------

    /// Cumulative reward per weight unit for `asset` as of now (SCALE-fixed).
    pub fn reward_per_weight(&self, asset: &AssetId) -> Amount {
        let now = self.clock.now();
        self.reward_data
            .get(asset)
            .map(|state| {
                let supply = if state.use_boost {
                    self.boosted_supply
                } else {
                    self.locked_supply
                };
                state.reward_per_weight(supply, now)
            })
            .unwrap_or(0)
    }

    pub fn last_time_reward_applicable(&self, asset: &AssetId) -> Timestamp {
        let now = self.clock.now();
        self.reward_data
            .get(asset)
            .map(|state| state.last_time_applicable(now))
            .unwrap_or(now)
    }

    /// Earned-but-unclaimed amounts across all reward assets.
    pub fn claimable(&self, account: &AccountId) -> Vec<(AssetId, Amount)> {
        let now = self.clock.now();
        let Some(state) = self.accounts.get(account) else {
            return Vec::new();
        };
        self.reward_assets
            .iter()
            .filter_map(|asset| {
                let reward = self.reward_data.get(asset)?;
                let supply = if reward.use_boost {
                    self.boosted_supply
                } else {
                    self.locked_supply
                };
                let index = reward.reward_per_weight(supply, now);
                let weight = if reward.use_boost {
                    state.boosted
                } else {
                    state.locked
                };
                let earned = state
                    .rewards
                    .get(asset)
                    .cloned()
                    .unwrap_or_default()
                    .earned(weight, index);
                Some((asset.clone(), earned))
            })
            .collect()
    }

    /// Stored balances snapshot for `account`.
    pub fn account_balances(&self, account: &AccountId) -> AccountBalances {
        self.accounts
            .get(account)
            .map(|state| AccountBalances {
                locked: state.locked,
                boosted: state.boosted,
                next_unlock_index: state.next_unlock_index,
            })
            .unwrap_or_default()
    }

    /// Total unprocessed principal for `account` (active or matured).
    pub fn locked_balance_of(&self, account: &AccountId) -> Amount {
        self.account_balances(account).locked
    }

    /// Time-weighted boosted balance as of now: stored boosted weight minus
    /// matured-unprocessed records and minus a lock still queued for the
    /// not-yet-active epoch.
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        let Some(state) = self.accounts.get(account) else {
            return 0;
        };
        let now = self.clock.now();
        let mut amount = state.boosted;
        for record in state.unprocessed() {
            if record.unlock_time <= now {
                amount -= record.boosted;
            } else {
                break;
            }
        }
        let current = epoch_start(now, self.params.rewards_duration);
        if let Some(newest) = state.unprocessed().last() {
            if newest.unlock_time.saturating_sub(self.params.lock_duration) > current {
                amount -= newest.boosted;
            }
        }
        amount
    }

    /// Boosted balance the account carried during a past epoch.
    pub fn balance_at_epoch_of(&self, index: EpochIndex, account: &AccountId) -> Amount {
        let Some(epoch) = self.epochs.get(index) else {
            return 0;
        };
        let Some(state) = self.accounts.get(account) else {
            return 0;
        };
        let reference = epoch.date;
        let cutoff = reference.saturating_sub(self.params.lock_duration);
        state
            .locks
            .iter()
            .filter(|record| {
                let lock_epoch = record.unlock_time.saturating_sub(self.params.lock_duration);
                lock_epoch <= reference && lock_epoch > cutoff
            })
            .map(|record| record.boosted)
            .sum()
    }

    /// Principal queued into the not-yet-active epoch for `account`.
    pub fn pending_lock_of(&self, account: &AccountId) -> Amount {
        let Some(state) = self.accounts.get(account) else {
            return 0;
        };
        let now = self.clock.now();
        let current = epoch_start(now, self.params.rewards_duration);
        match state.unprocessed().last() {
            Some(newest)
                if newest.unlock_time.saturating_sub(self.params.lock_duration) > current =>
            {
                newest.amount
            }
            _ => 0,
        }
    }

    /// Lock schedule breakdown for `account` at the current time.
    pub fn lock_records(&self, account: &AccountId) -> LockSummary {
        let Some(state) = self.accounts.get(account) else {
            return LockSummary::default();
        };
        let now = self.clock.now();
        let mut summary = LockSummary {
            total: state.locked,
            ..Default::default()
        };
        for record in state.unprocessed() {
            if record.unlock_time > now {
                summary.locked += record.amount;
                summary.active.push(*record);
            } else {
                summary.unlockable += record.amount;
            }
        }
        summary
    }

    /// Active boosted supply as of now (trailing epoch window).
    pub fn total_supply(&self) -> Amount {
        self.epochs.total_supply(self.clock.now())
    }

    pub fn total_supply_at_epoch(&self, index: EpochIndex) -> Amount {
        self.epochs.total_supply_at_epoch(index)
    }

    /// Boosted weight queued ledger-wide into the not-yet-active epoch.
    pub fn pending_epoch_supply(&self) -> Amount {
        self.epochs.pending_supply(self.clock.now())
    }

    pub fn find_epoch_id(&self, time: Timestamp) -> EpochIndex {
        self.epochs.find_epoch_id(time)
    }

    pub fn epoch_count(&self) -> usize {
        self.epochs.len()
    }

    pub fn epoch(&self, index: EpochIndex) -> Option<crate::epoch::Epoch> {
        self.epochs.get(index).copied()
    }

    pub fn cumulative_claimed(&self, account: &AccountId, asset: &AssetId) -> Amount {
        self.accounts
            .get(account)
            .and_then(|state| state.rewards.get(asset))
            .map(|reward| reward.cumulative_claimed)
            .unwrap_or(0)
    }

    pub fn cumulative_distributed(&self, asset: &AssetId) -> Amount {
        self.reward_data
            .get(asset)
            .map(|state| state.cumulative_distributed)
            .unwrap_or(0)
    }

    pub fn reward_asset_count(&self) -> usize {
        self.reward_assets.len()
    }

    pub fn locked_supply(&self) -> Amount {
        self.locked_supply
    }

    pub fn boosted_supply(&self) -> Amount {
        self.boosted_supply
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    pub fn params(&self) -> &LockerParams {
        &self.params
    }
}
