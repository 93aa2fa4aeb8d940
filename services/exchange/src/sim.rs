//! Deterministic in-memory pool for tests and local development.
//!
//! Implements the pool behavior the facade is measured against: fee-on-input
//! constant-product swaps, ratio-free first deposits, proportional LP mints
//! and burns, and deadline checks against a settable logical clock. State
//! lives behind a `parking_lot::RwLock`; per-operation counters let tests
//! assert that a rejected precondition issued no instruction at all.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use ethers::types::{Address, U256};
use parking_lot::RwLock;
use swapdesk_amm::{
    LiquidityPlanner, PairKey, PairReserves, PlannerConfig, QuoteEngine, DEFAULT_FEE_BPS,
};
use tracing::debug;

use crate::error::{ExchangeError, Result};
use crate::pool::{LiquidityContribution, LiquidityRedemption, PoolClient, SwapRequest};

/// Synthetic pair addresses are allocated upward from here, clear of the
/// low addresses tests use for tokens.
const PAIR_ADDRESS_BASE: u64 = 0xff00_0000;

#[derive(Debug)]
struct SimPool {
    address: Address,
    reserve0: U256,
    reserve1: U256,
    lp_total_supply: U256,
    /// LP units held by the facade identity, the only holder the simulator
    /// tracks individually.
    lp_held: U256,
}

impl SimPool {
    fn new(address: Address) -> Self {
        Self {
            address,
            reserve0: U256::zero(),
            reserve1: U256::zero(),
            lp_total_supply: U256::zero(),
            lp_held: U256::zero(),
        }
    }
}

/// In-memory constant-product pool registry.
pub struct PoolSimulator {
    pools: RwLock<HashMap<PairKey, SimPool>>,
    planner: LiquidityPlanner,
    fee_bps: u32,
    /// Logical unix time used for deadline checks.
    now: AtomicU64,
    next_pair: AtomicU64,
    swaps_applied: AtomicUsize,
    adds_applied: AtomicUsize,
    removes_applied: AtomicUsize,
}

impl PoolSimulator {
    pub fn new(fee_bps: u32) -> Self {
        Self {
            pools: RwLock::new(HashMap::new()),
            planner: LiquidityPlanner::new(PlannerConfig::default()),
            fee_bps,
            now: AtomicU64::new(0),
            next_pair: AtomicU64::new(1),
            swaps_applied: AtomicUsize::new(0),
            adds_applied: AtomicUsize::new(0),
            removes_applied: AtomicUsize::new(0),
        }
    }

    /// Move the logical clock. Instructions whose deadline is behind the
    /// clock are rejected with [`ExchangeError::DeadlineExpired`].
    pub fn set_time(&self, unix_secs: u64) {
        self.now.store(unix_secs, Ordering::Relaxed);
    }

    pub fn now(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }

    /// Register an empty pool for the pair and return its synthetic address.
    pub fn register_pair(&self, token_a: Address, token_b: Address) -> Address {
        let pair = PairKey::new(token_a, token_b);
        let mut pools = self.pools.write();
        let n = &self.next_pair;
        pools
            .entry(pair)
            .or_insert_with(|| SimPool::new(Self::alloc_address(n)))
            .address
    }

    /// Install pool state directly: reserves plus an LP supply credited to
    /// an unnamed external holder, so held balance and total supply can
    /// differ in tests. Replaces any existing state for the pair.
    pub fn seed_liquidity(
        &self,
        token_a: Address,
        token_b: Address,
        reserve_a: U256,
        reserve_b: U256,
    ) -> Result<Address> {
        let pair = PairKey::new(token_a, token_b);
        let (reserve0, reserve1) = if token_a == pair.token0() {
            (reserve_a, reserve_b)
        } else {
            (reserve_b, reserve_a)
        };
        let supply = isqrt(
            reserve0
                .checked_mul(reserve1)
                .ok_or(ExchangeError::ArithmeticOverflow)?,
        );

        let mut pools = self.pools.write();
        let n = &self.next_pair;
        let pool = pools
            .entry(pair)
            .or_insert_with(|| SimPool::new(Self::alloc_address(n)));
        pool.reserve0 = reserve0;
        pool.reserve1 = reserve1;
        pool.lp_total_supply = supply;
        pool.lp_held = U256::zero();
        Ok(pool.address)
    }

    /// Swap instructions applied (rejected instructions do not count).
    pub fn swaps_applied(&self) -> usize {
        self.swaps_applied.load(Ordering::Relaxed)
    }

    /// Deposit instructions applied.
    pub fn adds_applied(&self) -> usize {
        self.adds_applied.load(Ordering::Relaxed)
    }

    /// Redemption instructions applied.
    pub fn removes_applied(&self) -> usize {
        self.removes_applied.load(Ordering::Relaxed)
    }

    fn alloc_address(counter: &AtomicU64) -> Address {
        let n = counter.fetch_add(1, Ordering::Relaxed);
        Address::from_low_u64_be(PAIR_ADDRESS_BASE + n)
    }

    fn check_deadline(&self, deadline: Option<u64>) -> Result<()> {
        if let Some(deadline) = deadline {
            let now = self.now();
            // Pool-side rule: an instruction arriving exactly at its
            // deadline still executes.
            if deadline < now {
                return Err(ExchangeError::DeadlineExpired { deadline, now });
            }
        }
        Ok(())
    }
}

impl Default for PoolSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_FEE_BPS)
    }
}

#[async_trait]
impl PoolClient for PoolSimulator {
    async fn get_reserves(&self, pair: PairKey) -> Result<PairReserves> {
        let pools = self.pools.read();
        let pool = pools.get(&pair).ok_or(ExchangeError::PairNotFound {
            token_a: pair.token0(),
            token_b: pair.token1(),
        })?;
        Ok(PairReserves::new(pair, pool.reserve0, pool.reserve1))
    }

    async fn get_pair(&self, token_a: Address, token_b: Address) -> Result<Address> {
        let pair = PairKey::new(token_a, token_b);
        let pools = self.pools.read();
        pools
            .get(&pair)
            .map(|pool| pool.address)
            .ok_or(ExchangeError::PairNotFound { token_a, token_b })
    }

    async fn swap(&self, request: &SwapRequest) -> Result<U256> {
        let pair = request.pair();
        let mut pools = self.pools.write();
        let pool = pools.get_mut(&pair).ok_or(ExchangeError::PairNotFound {
            token_a: request.token_in,
            token_b: request.token_out,
        })?;

        let selling_token0 = request.token_in == pair.token0();
        let (reserve_in, reserve_out) = if selling_token0 {
            (pool.reserve0, pool.reserve1)
        } else {
            (pool.reserve1, pool.reserve0)
        };

        let amount_out =
            QuoteEngine::quote_output(reserve_in, reserve_out, request.amount_in, self.fee_bps)
                .map_err(|e| ExchangeError::from_amm(e, pair))?;
        if amount_out < request.min_amount_out {
            return Err(ExchangeError::SlippageExceeded {
                expected: amount_out,
                minimum: request.min_amount_out,
            });
        }

        let new_in = reserve_in
            .checked_add(request.amount_in)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        // amount_out < reserve_out always holds for a constant-product quote
        let new_out = reserve_out
            .checked_sub(amount_out)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        if selling_token0 {
            pool.reserve0 = new_in;
            pool.reserve1 = new_out;
        } else {
            pool.reserve1 = new_in;
            pool.reserve0 = new_out;
        }

        self.swaps_applied.fetch_add(1, Ordering::Relaxed);
        debug!(
            "sim swap on {}: {} in, {} out to {:?}",
            pair, request.amount_in, amount_out, request.recipient
        );
        Ok(amount_out)
    }

    async fn add_liquidity(&self, contribution: &LiquidityContribution) -> Result<U256> {
        self.check_deadline(contribution.deadline)?;
        if contribution.amount_a.is_zero() || contribution.amount_b.is_zero() {
            return Err(ExchangeError::ZeroAmount);
        }

        let pair = contribution.pair();
        let (amount0, amount1) = if contribution.token_a == pair.token0() {
            (contribution.amount_a, contribution.amount_b)
        } else {
            (contribution.amount_b, contribution.amount_a)
        };

        let mut pools = self.pools.write();
        let n = &self.next_pair;
        let pool = pools
            .entry(pair)
            .or_insert_with(|| SimPool::new(Self::alloc_address(n)));

        let minted = if pool.lp_total_supply.is_zero() {
            // First deposit defines the price; mint the geometric mean
            isqrt(
                amount0
                    .checked_mul(amount1)
                    .ok_or(ExchangeError::ArithmeticOverflow)?,
            )
        } else {
            let share0 = amount0
                .checked_mul(pool.lp_total_supply)
                .ok_or(ExchangeError::ArithmeticOverflow)?
                .checked_div(pool.reserve0)
                .ok_or(ExchangeError::InsufficientLiquidity { pair })?;
            let share1 = amount1
                .checked_mul(pool.lp_total_supply)
                .ok_or(ExchangeError::ArithmeticOverflow)?
                .checked_div(pool.reserve1)
                .ok_or(ExchangeError::InsufficientLiquidity { pair })?;
            // The imbalanced side of a skewed deposit is donated to the pool
            share0.min(share1)
        };
        if minted.is_zero() {
            return Err(ExchangeError::InsufficientLiquidity { pair });
        }

        pool.reserve0 = pool
            .reserve0
            .checked_add(amount0)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        pool.reserve1 = pool
            .reserve1
            .checked_add(amount1)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        pool.lp_total_supply = pool
            .lp_total_supply
            .checked_add(minted)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        pool.lp_held = pool
            .lp_held
            .checked_add(minted)
            .ok_or(ExchangeError::ArithmeticOverflow)?;

        self.adds_applied.fetch_add(1, Ordering::Relaxed);
        debug!(
            "sim deposit on {}: {} / {}, minted {} LP",
            pair, contribution.amount_a, contribution.amount_b, minted
        );
        Ok(minted)
    }

    async fn remove_liquidity(&self, redemption: &LiquidityRedemption) -> Result<(U256, U256)> {
        self.check_deadline(redemption.deadline)?;

        let pair = redemption.pair();
        let mut pools = self.pools.write();
        let pool = pools.get_mut(&pair).ok_or(ExchangeError::PairNotFound {
            token_a: redemption.token_a,
            token_b: redemption.token_b,
        })?;

        let lp_amount = redemption.lp_amount.unwrap_or(pool.lp_held);
        if lp_amount.is_zero() {
            return Err(ExchangeError::ZeroAmount);
        }
        if lp_amount > pool.lp_held {
            return Err(ExchangeError::InsufficientBalance {
                requested: lp_amount,
                available: pool.lp_held,
            });
        }

        let (amount0, amount1) = self
            .planner
            .remove_liquidity_amounts(lp_amount, pool.lp_total_supply, pool.reserve0, pool.reserve1)
            .map_err(|e| ExchangeError::from_amm(e, pair))?;

        // Orient the payout to the instruction's token order before
        // checking the caller's minimums
        let (amount_a, amount_b) = if redemption.token_a == pair.token0() {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        if amount_a < redemption.min_amount_a {
            return Err(ExchangeError::SlippageExceeded {
                expected: amount_a,
                minimum: redemption.min_amount_a,
            });
        }
        if amount_b < redemption.min_amount_b {
            return Err(ExchangeError::SlippageExceeded {
                expected: amount_b,
                minimum: redemption.min_amount_b,
            });
        }

        pool.reserve0 = pool
            .reserve0
            .checked_sub(amount0)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        pool.reserve1 = pool
            .reserve1
            .checked_sub(amount1)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        pool.lp_total_supply = pool
            .lp_total_supply
            .checked_sub(lp_amount)
            .ok_or(ExchangeError::ArithmeticOverflow)?;
        pool.lp_held = pool
            .lp_held
            .checked_sub(lp_amount)
            .ok_or(ExchangeError::ArithmeticOverflow)?;

        self.removes_applied.fetch_add(1, Ordering::Relaxed);
        debug!(
            "sim redemption on {}: {} LP burned for {} / {}",
            pair, lp_amount, amount_a, amount_b
        );
        Ok((amount_a, amount_b))
    }

    async fn lp_balance(&self, pair: PairKey) -> Result<U256> {
        let pools = self.pools.read();
        let pool = pools.get(&pair).ok_or(ExchangeError::PairNotFound {
            token_a: pair.token0(),
            token_b: pair.token1(),
        })?;
        Ok(pool.lp_held)
    }

    async fn lp_total_supply(&self, pair: PairKey) -> Result<U256> {
        let pools = self.pools.read();
        let pool = pools.get(&pair).ok_or(ExchangeError::PairNotFound {
            token_a: pair.token0(),
            token_b: pair.token1(),
        })?;
        Ok(pool.lp_total_supply)
    }
}

/// Integer square root by Newton's method, floored.
fn isqrt(value: U256) -> U256 {
    if value < U256::from(2u8) {
        return value;
    }
    let mut x = value >> 1;
    let mut y = (x + value / x) >> 1;
    while y < x {
        x = y;
        y = (x + value / x) >> 1;
    }
    x
}
