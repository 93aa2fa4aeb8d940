//! The caller-facing exchange facade.
//!
//! Every operation follows the same shape: read live reserves through the
//! oracle, compute amounts and bounds with the pure math, then issue at most
//! one instruction to the pool. Nothing is held between calls and nothing
//! retries. A failed instruction surfaces unmodified, because by the time a
//! retry ran the reserves would have moved and the caller's accepted price
//! would no longer mean anything.

use std::sync::Arc;

use ethers::types::{Address, U256};
use swapdesk_amm::{LiquidityPlanner, PairKey, QuoteEngine};
use tracing::{debug, info, warn};

use crate::config::ExchangeConfig;
use crate::error::{ExchangeError, Result};
use crate::oracle::ReserveOracle;
use crate::pool::{LiquidityContribution, LiquidityRedemption, PoolClient, SwapRequest};

/// Facade over an AMM pool: swaps, liquidity provision, and redemption.
pub struct ExchangeFacade {
    pool: Arc<dyn PoolClient>,
    oracle: ReserveOracle,
    planner: LiquidityPlanner,
    config: ExchangeConfig,
}

impl ExchangeFacade {
    pub fn new(pool: Arc<dyn PoolClient>, config: ExchangeConfig) -> Self {
        Self {
            oracle: ReserveOracle::new(pool.clone()),
            planner: LiquidityPlanner::new(config.planner),
            pool,
            config,
        }
    }

    /// Swap `amount_in` of `token_in` for at least `min_amount_out` of
    /// `token_out`, delivered to the recipient.
    ///
    /// The caller's minimum is authoritative. The current quote is checked
    /// against it before anything is issued, so a stale price fails here
    /// instead of on the pool, and the bound is passed through to the pool
    /// unchanged rather than replaced with a recomputed one.
    pub async fn perform_swap(&self, request: SwapRequest) -> Result<U256> {
        if request.amount_in.is_zero() {
            return Err(ExchangeError::ZeroAmount);
        }

        let pair = request.pair();
        let reserves = self.oracle.reserves(pair).await?;
        let (reserve_in, reserve_out) =
            reserves
                .oriented(request.token_in)
                .ok_or(ExchangeError::PairNotFound {
                    token_a: request.token_in,
                    token_b: request.token_out,
                })?;

        let expected = QuoteEngine::quote_output(
            reserve_in,
            reserve_out,
            request.amount_in,
            self.config.quote.fee_bps,
        )
        .map_err(|e| ExchangeError::from_amm(e, pair))?;

        if expected < request.min_amount_out {
            warn!(
                "❌ swap rejected before issuing: expected {} below minimum {}",
                expected, request.min_amount_out
            );
            return Err(ExchangeError::SlippageExceeded {
                expected,
                minimum: request.min_amount_out,
            });
        }

        if let Ok(impact_bps) =
            QuoteEngine::price_impact_bps(reserve_in, reserve_out, request.amount_in)
        {
            debug!(
                "swap quote on {}: {} expected for {} in, price impact {} bps",
                pair, expected, request.amount_in, impact_bps
            );
        }

        let amount_out = self.pool.swap(&request).await?;
        info!(
            "🔄 swap executed on {}: {} in, {} out",
            pair, request.amount_in, amount_out
        );
        Ok(amount_out)
    }

    /// Minimum acceptable output for a swap at the configured slippage
    /// tolerance. Read-only: no instruction is issued.
    pub async fn min_output_amount(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256> {
        let pair = PairKey::new(token_in, token_out);
        let reserves = self.oracle.reserves(pair).await?;
        let (reserve_in, reserve_out) =
            reserves
                .oriented(token_in)
                .ok_or(ExchangeError::PairNotFound {
                    token_a: token_in,
                    token_b: token_out,
                })?;

        QuoteEngine::min_output_amount(
            reserve_in,
            reserve_out,
            amount_in,
            self.config.quote.fee_bps,
            self.config.quote.slippage_bps,
        )
        .map_err(|e| ExchangeError::from_amm(e, pair))
    }

    /// Deposit exactly the caller-supplied amounts.
    ///
    /// Planner output is advisory input to this call, never enforced inside
    /// it: a deliberately skewed contribution goes through and the pool
    /// decides what it mints.
    pub async fn add_liquidity(&self, contribution: LiquidityContribution) -> Result<U256> {
        if contribution.amount_a.is_zero() || contribution.amount_b.is_zero() {
            return Err(ExchangeError::ZeroAmount);
        }

        let pair = contribution.pair();
        // A pair missing from the pool is created by its first deposit
        let reserves = self.oracle.reserves_or_empty(pair).await?;
        if !reserves.is_empty() {
            if let Some((reserve_a, reserve_b)) = reserves.oriented(contribution.token_a) {
                if let Ok(matched) =
                    self.planner
                        .optimal_amount(reserve_a, reserve_b, contribution.amount_a)
                {
                    if matched != contribution.amount_b {
                        debug!(
                            "contribution to {} is off-ratio: {} of B supplied, {} would match",
                            pair, contribution.amount_b, matched
                        );
                    }
                }
            }
        }

        let minted = self.pool.add_liquidity(&contribution).await?;
        info!(
            "➕ liquidity added to {}: {} / {}, {} LP minted",
            pair, contribution.amount_a, contribution.amount_b, minted
        );
        Ok(minted)
    }

    /// Deposit `amount` of `token` plus the ratio-preserving amount of
    /// `paired_token` computed from live reserves.
    pub async fn add_optimal_liquidity(
        &self,
        token: Address,
        amount: U256,
        paired_token: Address,
    ) -> Result<U256> {
        let paired_amount = self
            .planned_amount(token, amount, paired_token, false)
            .await?;
        self.add_liquidity(LiquidityContribution {
            token_a: token,
            token_b: paired_token,
            amount_a: amount,
            amount_b: paired_amount,
            deadline: None,
        })
        .await
    }

    /// Deposit with a deliberately ratio-violating paired amount, to
    /// exercise how the pool handles imbalanced contributions. Not a
    /// strategy path.
    pub async fn add_sub_optimal_liquidity(
        &self,
        token: Address,
        amount: U256,
        paired_token: Address,
    ) -> Result<U256> {
        let paired_amount = self
            .planned_amount(token, amount, paired_token, true)
            .await?;
        self.add_liquidity(LiquidityContribution {
            token_a: token,
            token_b: paired_token,
            amount_a: amount,
            amount_b: paired_amount,
            deadline: None,
        })
        .await
    }

    /// Redeem LP units for both underlying assets. `lp_amount: None` in the
    /// instruction redeems the full held balance.
    pub async fn remove_liquidity(&self, redemption: LiquidityRedemption) -> Result<(U256, U256)> {
        let pair = redemption.pair();
        let lp_amount = match redemption.lp_amount {
            Some(amount) => amount,
            None => self.pool.lp_balance(pair).await?,
        };
        if lp_amount.is_zero() {
            return Err(ExchangeError::ZeroAmount);
        }

        let resolved = LiquidityRedemption {
            lp_amount: Some(lp_amount),
            ..redemption
        };
        let (amount_a, amount_b) = self.pool.remove_liquidity(&resolved).await?;
        info!(
            "➖ liquidity removed from {}: {} LP redeemed for {} / {}",
            pair, lp_amount, amount_a, amount_b
        );
        Ok((amount_a, amount_b))
    }

    /// Amounts a redemption would pay out against current reserves.
    /// Read-only; results are in `(token_a, token_b)` argument order.
    pub async fn preview_remove_liquidity(
        &self,
        token_a: Address,
        token_b: Address,
        lp_amount: Option<U256>,
    ) -> Result<(U256, U256)> {
        let pair = PairKey::new(token_a, token_b);
        let reserves = self.oracle.reserves(pair).await?;
        let total_supply = self.pool.lp_total_supply(pair).await?;
        let lp_amount = match lp_amount {
            Some(amount) => amount,
            None => self.pool.lp_balance(pair).await?,
        };

        let (amount0, amount1) = self
            .planner
            .remove_liquidity_amounts(
                lp_amount,
                total_supply,
                reserves.reserve0(),
                reserves.reserve1(),
            )
            .map_err(|e| ExchangeError::from_amm(e, pair))?;

        if token_a == pair.token0() {
            Ok((amount0, amount1))
        } else {
            Ok((amount1, amount0))
        }
    }

    /// Pool contract address for the pair.
    pub async fn retrieve_pair(&self, token_a: Address, token_b: Address) -> Result<Address> {
        self.pool.get_pair(token_a, token_b).await
    }

    /// Ratio-preserving (or skewed) paired amount for a deposit of `amount`.
    async fn planned_amount(
        &self,
        token: Address,
        amount: U256,
        paired_token: Address,
        skewed: bool,
    ) -> Result<U256> {
        let pair = PairKey::new(token, paired_token);
        let reserves = self.oracle.reserves_or_empty(pair).await?;
        let (reserve_token, reserve_paired) =
            reserves
                .oriented(token)
                .ok_or(ExchangeError::PairNotFound {
                    token_a: token,
                    token_b: paired_token,
                })?;

        let planned = if skewed {
            self.planner
                .sub_optimal_amount(reserve_token, reserve_paired, amount)
        } else {
            self.planner
                .optimal_amount(reserve_token, reserve_paired, amount)
        }
        .map_err(|e| ExchangeError::from_amm(e, pair))?;

        debug!(
            "planned pairing for {} of {:?}: {} of {:?}{}",
            amount,
            token,
            planned,
            paired_token,
            if skewed { " (skewed)" } else { "" }
        );
        Ok(planned)
    }
}
