//! Conservation invariants checked over randomized lock/expiry sequences.

use lockstream_ledger::*;
use lockstream_types::*;
use proptest::prelude::*;
use std::sync::Arc;

const DUR: u64 = 1_000;
const LOCK: u64 = 4_000;
const MAX_SPEND: u128 = 500;

#[derive(Clone, Debug)]
enum Op {
    Lock { account: usize, amount: u128, spend: u128 },
    Advance { seconds: u64 },
    Withdraw { account: usize },
    Relock { account: usize, spend: u128 },
    Kick { kicker: usize, account: usize },
    Shutdown,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        // spend ratios past MAX_SPEND exercise the rejected-input paths
        4 => (0..3usize, 1..10_000u128, 0..700u128)
            .prop_map(|(account, amount, spend)| Op::Lock { account, amount, spend }),
        4 => (0..8_000u64).prop_map(|seconds| Op::Advance { seconds }),
        3 => (0..3usize).prop_map(|account| Op::Withdraw { account }),
        3 => (0..3usize, 0..700u128)
            .prop_map(|(account, spend)| Op::Relock { account, spend }),
        3 => (0..3usize, 0..3usize).prop_map(|(kicker, account)| Op::Kick { kicker, account }),
        1 => Just(Op::Shutdown),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_conservation_holds(ops in proptest::collection::vec(op_strategy(), 1..50)) {
        let accounts: Vec<AccountId> = (0..3)
            .map(|i| AccountId::from_seed(&format!("account-{i}")))
            .collect();
        let admin = AccountId::from_seed("admin");
        let ledger_account = AccountId::from_seed("custody");
        let stake = AssetId::new("STAKE");
        let clock = Arc::new(ManualClock::new(0));
        let assets = Arc::new(InMemoryAssets::new());
        let oracle = Arc::new(StaticOracle::new([admin]));
        for account in &accounts {
            assets.mint(&stake, account, 1_000_000);
        }
        let mut locker = StakeLocker::new(
            LockerParams {
                rewards_duration: DUR,
                lock_duration: LOCK,
                maximum_boost_payment: MAX_SPEND,
                next_maximum_boost_payment: MAX_SPEND,
                ..Default::default()
            },
            stake.clone(),
            ledger_account,
            AccountId::from_seed("fees"),
            oracle,
            assets.clone(),
            clock.clone(),
        )
        .unwrap();

        for op in ops {
            // individual operations may legitimately fail (nothing matured,
            // grace not elapsed, shut down, spend ratio over the cap); the
            // invariants must hold either way
            let _ = match op {
                Op::Lock { account, amount, spend } => {
                    locker.lock(&accounts[account], &accounts[account], amount, spend)
                }
                Op::Advance { seconds } => {
                    clock.advance(seconds);
                    Ok(())
                }
                Op::Withdraw { account } => {
                    locker.withdraw_expired_locks_to(&accounts[account], &accounts[account])
                }
                Op::Relock { account, spend } => {
                    locker.process_expired_locks(&accounts[account], true, spend)
                }
                Op::Kick { kicker, account } => {
                    locker.kick_expired_locks(&accounts[kicker], &accounts[account])
                }
                Op::Shutdown => locker.shutdown(&admin),
            };

            let mut locked_sum = 0u128;
            let mut boosted_sum = 0u128;
            for account in &accounts {
                let balances = locker.account_balances(account);
                locked_sum += balances.locked;
                boosted_sum += balances.boosted;
                // stored balances equal the record sums past the cursor
                let summary = locker.lock_records(account);
                prop_assert_eq!(summary.locked + summary.unlockable, balances.locked);
                prop_assert_eq!(summary.total, balances.locked);
                // views stay well defined whatever the cursor position
                prop_assert!(locker.balance_of(account) <= balances.boosted);
                prop_assert!(locker.pending_lock_of(account) <= balances.locked);
            }
            prop_assert_eq!(locked_sum, locker.locked_supply());
            prop_assert_eq!(boosted_sum, locker.boosted_supply());
            // custody covers outstanding principal exactly
            prop_assert_eq!(
                assets.balance_of(&stake, &ledger_account),
                locker.locked_supply()
            );
        }
    }
}
