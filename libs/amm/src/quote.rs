//! Constant-product swap quoting with exact integer arithmetic
//!
//! All amounts are unsigned 256-bit integers in token base units. Divisions
//! floor, and any operation that would wrap returns [`AmmError::Overflow`]
//! instead of a silently wrong number.

use ethers_core::types::U256;

use crate::error::AmmError;

/// Basis-point denominator shared by fee and slippage math.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Canonical V2 swap fee: 30 bps = 0.3%.
pub const DEFAULT_FEE_BPS: u32 = 30;

/// Default slippage tolerance applied to quoted minimums: 50 bps = 0.5%.
pub const DEFAULT_SLIPPAGE_BPS: u32 = 50;

/// Quote math over observed pool reserves.
pub struct QuoteEngine;

impl QuoteEngine {
    /// Calculate the exact swap output using the x*y=k formula with the fee
    /// taken on the input side.
    ///
    /// # Arguments
    /// * `reserve_in` - Reserve of the asset being sold (in token base units)
    /// * `reserve_out` - Reserve of the asset being bought
    /// * `amount_in` - Input amount
    /// * `fee_bps` - Fee in basis points (30 = 0.3%)
    ///
    /// # Returns
    /// Floored output amount:
    /// `(amount_in * (10000 - fee) * reserve_out) / (reserve_in * 10000 + amount_in * (10000 - fee))`
    pub fn quote_output(
        reserve_in: U256,
        reserve_out: U256,
        amount_in: U256,
        fee_bps: u32,
    ) -> Result<U256, AmmError> {
        // Validate inputs
        if amount_in.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }

        let fee_factor = U256::from(BPS_DENOMINATOR.saturating_sub(fee_bps));
        let amount_in_with_fee = amount_in.checked_mul(fee_factor).ok_or(AmmError::Overflow)?;
        let numerator = amount_in_with_fee
            .checked_mul(reserve_out)
            .ok_or(AmmError::Overflow)?;
        let denominator = reserve_in
            .checked_mul(U256::from(BPS_DENOMINATOR))
            .and_then(|scaled| scaled.checked_add(amount_in_with_fee))
            .ok_or(AmmError::Overflow)?;

        // denominator >= reserve_in * 10000 > 0, so plain division is safe
        Ok(numerator / denominator)
    }

    /// Calculate the input required to receive exactly `amount_out`,
    /// rounded up so the computed input is always sufficient.
    pub fn quote_input(
        reserve_in: U256,
        reserve_out: U256,
        amount_out: U256,
        fee_bps: u32,
    ) -> Result<U256, AmmError> {
        // Validate inputs
        if amount_out.is_zero() {
            return Err(AmmError::ZeroAmount);
        }
        if reserve_in.is_zero() || amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity);
        }

        let numerator = reserve_in
            .checked_mul(amount_out)
            .and_then(|v| v.checked_mul(U256::from(BPS_DENOMINATOR)))
            .ok_or(AmmError::Overflow)?;
        let denominator = (reserve_out - amount_out)
            .checked_mul(U256::from(BPS_DENOMINATOR.saturating_sub(fee_bps)))
            .ok_or(AmmError::Overflow)?;

        // fee_bps >= 10000 zeroes the denominator; config validation keeps fees below that
        let amount_in = numerator
            .checked_div(denominator)
            .ok_or(AmmError::InsufficientLiquidity)?;

        // Add 1 to round up (ensures sufficient input)
        amount_in.checked_add(U256::one()).ok_or(AmmError::Overflow)
    }

    /// Minimum acceptable output for `amount_in`: the expected output with a
    /// slippage haircut applied.
    ///
    /// The result is always `<=` the plain quote. Flooring both steps means
    /// the guaranteed minimum is never overstated, which is the side a swap
    /// bound must err on.
    pub fn min_output_amount(
        reserve_in: U256,
        reserve_out: U256,
        amount_in: U256,
        fee_bps: u32,
        slippage_bps: u32,
    ) -> Result<U256, AmmError> {
        let expected = Self::quote_output(reserve_in, reserve_out, amount_in, fee_bps)?;
        Self::with_slippage(expected, slippage_bps)
    }

    /// Apply a floor haircut of `slippage_bps` to an already-computed amount:
    /// `amount * (10000 - slippage_bps) / 10000`.
    pub fn with_slippage(amount: U256, slippage_bps: u32) -> Result<U256, AmmError> {
        let keep = U256::from(BPS_DENOMINATOR.saturating_sub(slippage_bps));
        let scaled = amount.checked_mul(keep).ok_or(AmmError::Overflow)?;
        Ok(scaled / U256::from(BPS_DENOMINATOR))
    }

    /// Price impact of the trade in basis points: how far the fee-free
    /// execution price falls below the spot price `reserve_out / reserve_in`.
    pub fn price_impact_bps(
        reserve_in: U256,
        reserve_out: U256,
        amount_in: U256,
    ) -> Result<u32, AmmError> {
        // No fee for impact calculation
        let out = Self::quote_output(reserve_in, reserve_out, amount_in, 0)?;

        let ideal = amount_in.checked_mul(reserve_out).ok_or(AmmError::Overflow)?;
        let actual = out.checked_mul(reserve_in).ok_or(AmmError::Overflow)?;
        let shortfall = ideal.saturating_sub(actual);

        let impact = shortfall
            .checked_mul(U256::from(BPS_DENOMINATOR))
            .ok_or(AmmError::Overflow)?
            / ideal;

        // actual <= ideal, so the ratio is capped at the full denominator
        Ok(impact.min(U256::from(BPS_DENOMINATOR)).as_u32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(n: u64) -> U256 {
        U256::from(n)
    }

    #[test]
    fn test_quote_output_balanced_pool() {
        // 100 in against 1000:1000 at 30 bps floors to 90
        let out = QuoteEngine::quote_output(u(1000), u(1000), u(100), 30).unwrap();
        assert_eq!(out, u(90));
    }

    #[test]
    fn test_quote_output_skewed_pool() {
        // 100 in against 1000:2000 at 30 bps: exact value ~181.32, floored
        let out = QuoteEngine::quote_output(u(1000), u(2000), u(100), 30).unwrap();
        assert_eq!(out, u(181));
    }

    #[test]
    fn test_quote_output_fee_reduces_proceeds() {
        let with_fee =
            QuoteEngine::quote_output(u(1_000_000), u(1_000_000), u(100_000), 30).unwrap();
        let fee_free =
            QuoteEngine::quote_output(u(1_000_000), u(1_000_000), u(100_000), 0).unwrap();

        assert_eq!(with_fee, u(90_661));
        assert_eq!(fee_free, u(90_909)); // plain x*y=k, floored
    }

    #[test]
    fn test_quote_output_rejects_degenerate_inputs() {
        assert_eq!(
            QuoteEngine::quote_output(u(1000), u(1000), U256::zero(), 30),
            Err(AmmError::ZeroAmount)
        );
        assert_eq!(
            QuoteEngine::quote_output(U256::zero(), u(1000), u(100), 30),
            Err(AmmError::InsufficientLiquidity)
        );
        assert_eq!(
            QuoteEngine::quote_output(u(1000), U256::zero(), u(100), 30),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_quote_output_never_wraps_at_extremes() {
        let max = U256::MAX;
        assert_eq!(
            QuoteEngine::quote_output(max, max, max, 30),
            Err(AmmError::Overflow)
        );
    }

    #[test]
    fn test_quote_input_covers_requested_output() {
        let amount_in = QuoteEngine::quote_input(u(10_000), u(20_000), u(500), 30).unwrap();
        assert_eq!(amount_in, u(258));

        // Feeding the computed input back must clear the requested output
        let out = QuoteEngine::quote_output(u(10_000), u(20_000), amount_in, 30).unwrap();
        assert!(out >= u(500));
    }

    #[test]
    fn test_quote_input_rejects_draining_reserve() {
        assert_eq!(
            QuoteEngine::quote_input(u(1000), u(1000), u(1000), 30),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_min_output_amount_haircut() {
        // Quote is 90; a 50 bps haircut floors to 89
        let min = QuoteEngine::min_output_amount(u(1000), u(1000), u(100), 30, 50).unwrap();
        assert_eq!(min, u(89));

        let quote = QuoteEngine::quote_output(u(1000), u(1000), u(100), 30).unwrap();
        assert!(min <= quote);
    }

    #[test]
    fn test_with_slippage_zero_tolerance_is_identity() {
        assert_eq!(QuoteEngine::with_slippage(u(12_345), 0).unwrap(), u(12_345));
    }

    #[test]
    fn test_price_impact_grows_with_trade_size() {
        let small = QuoteEngine::price_impact_bps(u(1_000_000), u(2_000_000), u(100)).unwrap();
        let large = QuoteEngine::price_impact_bps(u(1_000_000), u(2_000_000), u(100_000)).unwrap();

        assert!(small < large);
        // A trade of 10% of reserve_in lands near 10% impact
        assert!(large > 800 && large < 1100);
    }
}
