//! Liquidity provision and redemption planning
//!
//! Computes the paired deposit that preserves a pool's price ratio, a
//! deliberately skewed variant for exercising pool rebalancing behavior,
//! and proportional payout amounts for LP redemptions. Planning is advisory:
//! the pool itself is the arbiter of what a deposit actually mints.

use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

use crate::error::AmmError;
use crate::quote::BPS_DENOMINATOR;

/// Default skew applied by the sub-optimal path: 5000 bps = half of optimal.
pub const DEFAULT_SKEW_BPS: u32 = 5_000;

/// Tuning for the deliberately imbalanced contribution path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Fraction of the optimal paired amount the sub-optimal path returns,
    /// in basis points.
    pub skew_bps: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            skew_bps: DEFAULT_SKEW_BPS,
        }
    }
}

/// Plans contribution and redemption amounts against observed reserves.
pub struct LiquidityPlanner {
    config: PlannerConfig,
}

impl LiquidityPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Calculate the paired amount that preserves the pool's reserve ratio:
    /// `desired_a * reserve_b / reserve_a`, floored.
    ///
    /// A brand-new pool (both reserves zero) has no ratio to preserve, so
    /// `desired_a` passes through unchanged and the first deposit sets the
    /// price. Exactly one empty reserve is a broken pool and is rejected.
    pub fn optimal_amount(
        &self,
        reserve_a: U256,
        reserve_b: U256,
        desired_a: U256,
    ) -> Result<U256, AmmError> {
        if desired_a.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        if reserve_a.is_zero() && reserve_b.is_zero() {
            return Ok(desired_a);
        }
        if reserve_a.is_zero() || reserve_b.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }

        let numerator = desired_a.checked_mul(reserve_b).ok_or(AmmError::Overflow)?;
        Ok(numerator / reserve_a)
    }

    /// Calculate a deliberately ratio-violating paired amount:
    /// `optimal * skew_bps / 10000`, floored.
    ///
    /// Exists to exercise how a pool handles imbalanced deposits. Not a
    /// strategy.
    pub fn sub_optimal_amount(
        &self,
        reserve_a: U256,
        reserve_b: U256,
        desired_a: U256,
    ) -> Result<U256, AmmError> {
        let optimal = self.optimal_amount(reserve_a, reserve_b, desired_a)?;
        let scaled = optimal
            .checked_mul(U256::from(self.config.skew_bps))
            .ok_or(AmmError::Overflow)?;
        Ok(scaled / U256::from(BPS_DENOMINATOR))
    }

    /// Calculate the proportional payout for burning `lp_amount` out of
    /// `total_supply`: `reserve * lp_amount / total_supply` per side, floored.
    pub fn remove_liquidity_amounts(
        &self,
        lp_amount: U256,
        total_supply: U256,
        reserve_a: U256,
        reserve_b: U256,
    ) -> Result<(U256, U256), AmmError> {
        if lp_amount.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        if total_supply.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        if lp_amount > total_supply {
            return Err(AmmError::InsufficientBalance {
                requested: lp_amount,
                available: total_supply,
            });
        }

        let amount_a = reserve_a.checked_mul(lp_amount).ok_or(AmmError::Overflow)? / total_supply;
        let amount_b = reserve_b.checked_mul(lp_amount).ok_or(AmmError::Overflow)? / total_supply;
        Ok((amount_a, amount_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(n: u64) -> U256 {
        U256::from(n)
    }

    fn planner() -> LiquidityPlanner {
        LiquidityPlanner::new(PlannerConfig::default())
    }

    #[test]
    fn test_optimal_amount_preserves_ratio() {
        // 1000:2000 pool, depositing 10 of A needs 20 of B
        let amount = planner().optimal_amount(u(1000), u(2000), u(10)).unwrap();
        assert_eq!(amount, u(20));

        // Inverse direction
        let amount = planner().optimal_amount(u(2000), u(1000), u(10)).unwrap();
        assert_eq!(amount, u(5));
    }

    #[test]
    fn test_optimal_amount_floors() {
        // 10 * 1000 / 3000 = 3.33 floors to 3
        let amount = planner().optimal_amount(u(3000), u(1000), u(10)).unwrap();
        assert_eq!(amount, u(3));
    }

    #[test]
    fn test_optimal_amount_empty_pool_passthrough() {
        // First deposit defines the price, desired amount is returned as-is
        let amount = planner()
            .optimal_amount(U256::zero(), U256::zero(), u(10))
            .unwrap();
        assert_eq!(amount, u(10));
    }

    #[test]
    fn test_optimal_amount_one_sided_pool_rejected() {
        assert_eq!(
            planner().optimal_amount(U256::zero(), u(1000), u(10)),
            Err(AmmError::InsufficientLiquidity)
        );
        assert_eq!(
            planner().optimal_amount(u(1000), U256::zero(), u(10)),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_optimal_amount_zero_desired_rejected() {
        assert_eq!(
            planner().optimal_amount(u(1000), u(2000), U256::zero()),
            Err(AmmError::ZeroAmount)
        );
    }

    #[test]
    fn test_sub_optimal_amount_default_skew_halves() {
        let optimal = planner().optimal_amount(u(1000), u(2000), u(10)).unwrap();
        let skewed = planner()
            .sub_optimal_amount(u(1000), u(2000), u(10))
            .unwrap();

        assert_eq!(optimal, u(20));
        assert_eq!(skewed, u(10));
    }

    #[test]
    fn test_sub_optimal_amount_custom_skew() {
        let planner = LiquidityPlanner::new(PlannerConfig { skew_bps: 2_500 });
        let skewed = planner.sub_optimal_amount(u(1000), u(2000), u(10)).unwrap();
        assert_eq!(skewed, u(5)); // quarter of the optimal 20
    }

    #[test]
    fn test_remove_liquidity_proportional() {
        // Burning 10% of supply pays out 10% of each reserve
        let (a, b) = planner()
            .remove_liquidity_amounts(u(100), u(1000), u(5000), u(9000))
            .unwrap();
        assert_eq!(a, u(500));
        assert_eq!(b, u(900));
    }

    #[test]
    fn test_remove_liquidity_full_supply_drains_pool() {
        let (a, b) = planner()
            .remove_liquidity_amounts(u(1414), u(1414), u(1000), u(2000))
            .unwrap();
        assert_eq!(a, u(1000));
        assert_eq!(b, u(2000));
    }

    #[test]
    fn test_remove_liquidity_over_supply_rejected() {
        assert_eq!(
            planner().remove_liquidity_amounts(u(2000), u(1414), u(1000), u(2000)),
            Err(AmmError::InsufficientBalance {
                requested: u(2000),
                available: u(1414),
            })
        );
    }

    #[test]
    fn test_remove_liquidity_degenerate_inputs() {
        assert_eq!(
            planner().remove_liquidity_amounts(U256::zero(), u(1414), u(1000), u(2000)),
            Err(AmmError::ZeroAmount)
        );
        assert_eq!(
            planner().remove_liquidity_amounts(u(10), U256::zero(), u(1000), u(2000)),
            Err(AmmError::InsufficientLiquidity)
        );
    }
}
