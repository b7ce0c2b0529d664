//! Stake-ratio balancer.
//!
//! Pure planning logic: given local and delegated principal and the
//! configured band, decide how much to move toward the band's mean.
//! Capital-efficiency only; never touches reward accounting.

use crate::params::LockerParams;
use lockstream_types::{Amount, DENOMINATOR};

/// Movement decided by one rebalance pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalancerAction {
    /// Move this much principal to the delegated proxy.
    Stake(Amount),
    /// Pull this much principal back from the proxy.
    Withdraw(Amount),
}

/// Compare the proxy-held ratio against `[minimum_stake - offset,
/// maximum_stake + offset]` and, when outside, target the band mean.
pub fn rebalance_plan(
    local: Amount,
    delegated: Amount,
    params: &LockerParams,
    offset: Amount,
) -> Option<BalancerAction> {
    let total = local.checked_add(delegated)?;
    if total == 0 {
        return None;
    }
    let ratio = delegated * DENOMINATOR / total;
    let low = params.minimum_stake.saturating_sub(offset);
    let high = (params.maximum_stake + offset).min(DENOMINATOR);
    let mean = (params.minimum_stake + params.maximum_stake) / 2;
    let target = total * mean / DENOMINATOR;

    if ratio < low {
        Some(BalancerAction::Stake(target.saturating_sub(delegated)))
    } else if ratio > high {
        Some(BalancerAction::Withdraw(delegated.saturating_sub(target)))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banded(minimum: Amount, maximum: Amount) -> LockerParams {
        LockerParams {
            minimum_stake: minimum,
            maximum_stake: maximum,
            ..Default::default()
        }
    }

    #[test]
    fn test_in_band_is_noop() {
        let params = banded(4_000, 6_000);
        assert_eq!(rebalance_plan(500, 500, &params, 0), None);
    }

    #[test]
    fn test_under_staked_moves_to_mean() {
        let params = banded(4_000, 6_000);
        // 10% delegated of 1_000 total; mean target is 50% = 500
        assert_eq!(
            rebalance_plan(900, 100, &params, 0),
            Some(BalancerAction::Stake(400))
        );
    }

    #[test]
    fn test_over_staked_withdraws_to_mean() {
        let params = banded(4_000, 6_000);
        assert_eq!(
            rebalance_plan(100, 900, &params, 0),
            Some(BalancerAction::Withdraw(400))
        );
    }

    #[test]
    fn test_offset_widens_band() {
        let params = banded(4_000, 6_000);
        // 30% delegated is outside [40%, 60%] but inside [20%, 80%]
        assert_eq!(rebalance_plan(700, 300, &params, 2_000), None);
        assert!(rebalance_plan(700, 300, &params, 0).is_some());
    }

    #[test]
    fn test_zero_total_is_noop() {
        let params = banded(4_000, 6_000);
        assert_eq!(rebalance_plan(0, 0, &params, 0), None);
    }
}
