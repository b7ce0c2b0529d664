//! Collaborator interfaces consumed by the ledger.
//!
//! The ledger never owns transfer mechanics, permission policy, delegated
//! staking, or wall-clock time; it calls these traits. In-memory
//! implementations are provided for node runtime wiring and tests.

use anyhow::{bail, Result};
use lockstream_types::{AccountId, Amount, AssetId, Timestamp};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Privileged roles recognized by the permission oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// May register reward assets, tune parameters, and shut the ledger down.
    Admin,
}

/// Permission and pause policy, queried at the top of every mutating call.
pub trait PermissionOracle: Send + Sync {
    fn has_role(&self, role: Role, caller: &AccountId) -> bool;
    fn is_paused(&self) -> bool;
}

/// Value-transfer interface for the staked asset and each reward asset.
/// Any failure aborts the ledger call that triggered it.
pub trait AssetTransfer: Send + Sync {
    fn transfer_from(
        &self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<()>;
    fn balance_of(&self, asset: &AssetId, holder: &AccountId) -> Amount;
}

/// Delegated-staking proxy holding principal off-ledger.
///
/// The ledger pairs `stake`/`withdraw` with the matching asset transfers;
/// the proxy only tracks custody and reports it back via `balance`.
pub trait StakingProxy: Send + Sync {
    fn balance(&self) -> Amount;
    fn stake(&self, amount: Amount) -> Result<()>;
    fn withdraw(&self, amount: Amount) -> Result<()>;
}

/// Time source. Read once per ledger call.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

// -----------------------------------------------------------------------------
// In-memory implementations
// -----------------------------------------------------------------------------

/// Fixed admin set with a flippable pause switch.
#[derive(Debug, Default)]
pub struct StaticOracle {
    admins: HashSet<AccountId>,
    paused: AtomicBool,
}

impl StaticOracle {
    pub fn new(admins: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
            paused: AtomicBool::new(false),
        }
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }
}

impl PermissionOracle for StaticOracle {
    fn has_role(&self, role: Role, caller: &AccountId) -> bool {
        match role {
            Role::Admin => self.admins.contains(caller),
        }
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

/// In-memory multi-asset balance book.
///
/// Runtime/test fixture: transfers are not allowance-gated, and `mint`
/// conjures balances for scenario setup.
#[derive(Debug, Default)]
pub struct InMemoryAssets {
    balances: RwLock<HashMap<AssetId, HashMap<AccountId, Amount>>>,
}

impl InMemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&self, asset: &AssetId, to: &AccountId, amount: Amount) {
        let mut book = self.balances.write();
        let entry = book.entry(asset.clone()).or_default().entry(*to).or_insert(0);
        *entry = entry.saturating_add(amount);
    }
}

impl AssetTransfer for InMemoryAssets {
    fn transfer_from(
        &self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let mut book = self.balances.write();
        let holders = book.entry(asset.clone()).or_default();
        let from_balance = holders.get(from).copied().unwrap_or(0);
        if from_balance < amount {
            bail!(
                "insufficient {} balance: have {}, need {}",
                asset,
                from_balance,
                amount
            );
        }
        holders.insert(*from, from_balance - amount);
        let to_balance = holders.entry(*to).or_insert(0);
        *to_balance = to_balance.saturating_add(amount);
        Ok(())
    }

    fn balance_of(&self, asset: &AssetId, holder: &AccountId) -> Amount {
        self.balances
            .read()
            .get(asset)
            .and_then(|holders| holders.get(holder))
            .copied()
            .unwrap_or(0)
    }
}

/// Proxy that only tracks the custody amount it was handed.
#[derive(Debug, Default)]
pub struct MockProxy {
    staked: RwLock<Amount>,
}

impl MockProxy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StakingProxy for MockProxy {
    fn balance(&self) -> Amount {
        *self.staked.read()
    }

    fn stake(&self, amount: Amount) -> Result<()> {
        let mut staked = self.staked.write();
        *staked = staked.saturating_add(amount);
        Ok(())
    }

    fn withdraw(&self, amount: Amount) -> Result<()> {
        let mut staked = self.staked.write();
        if *staked < amount {
            bail!("proxy custody {} below requested {}", *staked, amount);
        }
        *staked -= amount;
        Ok(())
    }
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Settable clock for deterministic tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
