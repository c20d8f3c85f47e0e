//! Property tests for the fee-liquidation math

use cinder_amm::{BasisPoints, FeeSplitter, SwapAdvisor, V2Math, WithdrawalCalculator, U256};
use proptest::prelude::*;

prop_compose! {
    fn reserve()(units in 1u64..1_000_000_000u64, scale in 0usize..19) -> U256 {
        U256::from(units) * U256::exp10(scale)
    }
}

prop_compose! {
    fn tolerance()(value in 0u16..10_000u16) -> BasisPoints {
        BasisPoints::new(value).unwrap()
    }
}

prop_compose! {
    fn ratio()(value in 0u16..=10_000u16) -> BasisPoints {
        BasisPoints::new(value).unwrap()
    }
}

proptest! {
    /// Property: split never creates or strands shares
    #[test]
    fn split_accounts_for_every_share(total in any::<u128>(), team in ratio()) {
        let total = U256::from(total);
        let split = FeeSplitter::split(total, team).unwrap();
        prop_assert_eq!(split.team + split.handler, total);
        prop_assert!(split.team <= total);
    }

    /// Property: withdrawal floors never exceed the proportional claim
    #[test]
    fn withdrawal_floor_bounded_by_claim(
        reserve_a in reserve(),
        reserve_b in reserve(),
        supply in reserve(),
        share_pct in 0u64..=100,
        tol in tolerance(),
    ) {
        let shares = supply * U256::from(share_pct) / U256::from(100);
        let quote = WithdrawalCalculator::quote(reserve_a, reserve_b, shares, supply, tol).unwrap();
        prop_assert!(quote.amount_a_min <= quote.amount_a);
        prop_assert!(quote.amount_b_min <= quote.amount_b);
        prop_assert!(quote.amount_a <= reserve_a);
        prop_assert!(quote.amount_b <= reserve_b);
    }

    /// Property: burning more shares never lowers the floor
    #[test]
    fn withdrawal_floor_monotonic_in_shares(
        reserve_a in reserve(),
        reserve_b in reserve(),
        supply in reserve(),
        low_pct in 0u64..=100,
        extra_pct in 0u64..=100,
        tol in tolerance(),
    ) {
        let low = supply * U256::from(low_pct) / U256::from(100);
        let high = low + supply * U256::from(extra_pct) / U256::from(100);
        let (a_low, b_low) =
            WithdrawalCalculator::min_amounts(reserve_a, reserve_b, low, supply, tol).unwrap();
        let (a_high, b_high) =
            WithdrawalCalculator::min_amounts(reserve_a, reserve_b, high, supply, tol).unwrap();
        prop_assert!(a_low <= a_high);
        prop_assert!(b_low <= b_high);
    }

    /// Property: a larger reserve never lowers the floor on that side
    #[test]
    fn withdrawal_floor_monotonic_in_reserve(
        reserve_a in reserve(),
        bump in reserve(),
        supply in reserve(),
        tol in tolerance(),
    ) {
        let shares = supply / U256::from(3);
        let (low, _) =
            WithdrawalCalculator::min_amounts(reserve_a, reserve_a, shares, supply, tol).unwrap();
        let (high, _) =
            WithdrawalCalculator::min_amounts(reserve_a + bump, reserve_a, shares, supply, tol)
                .unwrap();
        prop_assert!(low <= high);
    }

    /// Property: swap output stays below the output reserve and above its floor
    #[test]
    fn swap_quote_bounded(
        amount_in in reserve(),
        reserve_in in reserve(),
        reserve_out in reserve(),
        fee in 9_000u16..=10_000u16,
        tol in tolerance(),
    ) {
        let fee = BasisPoints::new(fee).unwrap();
        let quote = SwapAdvisor::quote(amount_in, reserve_in, reserve_out, fee, tol).unwrap();
        prop_assert!(quote.amount_out < reserve_out);
        prop_assert!(quote.amount_out_min <= quote.amount_out);
    }

    /// Property: tolerance floor equals the ceiling of the retained ratio
    #[test]
    fn tolerance_floor_is_ceiling_of_retained_ratio(amount in any::<u128>(), tol in tolerance()) {
        let amount = U256::from(amount);
        let floor = V2Math::apply_tolerance(amount, tol).unwrap();
        let retained = amount * tol.complement().as_u256();
        let denominator = U256::from(10_000u64);
        let ceiling = (retained + denominator - U256::one()) / denominator;
        prop_assert_eq!(floor, ceiling);
    }
}
