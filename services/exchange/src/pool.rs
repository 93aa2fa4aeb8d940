//! The external-pool capability and its instruction types.
//!
//! The pool/factory/router is modeled as a trait so the facade can drive
//! either a live V2 deployment ([`crate::live::LivePool`]) or the
//! deterministic in-memory simulator ([`crate::sim::PoolSimulator`])
//! without knowing which it has.

use async_trait::async_trait;
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use swapdesk_amm::{PairKey, PairReserves};

use crate::error::Result;

/// One exact-input swap instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    /// Caller-authoritative floor. The pool must fail the swap rather than
    /// deliver less.
    pub min_amount_out: U256,
    pub recipient: Address,
}

impl SwapRequest {
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.token_in, self.token_out)
    }
}

/// Exact caller-chosen amounts for a liquidity deposit.
///
/// Planner output feeds this from the caller's side; nothing in here
/// re-balances the amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityContribution {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a: U256,
    pub amount_b: U256,
    /// Unix seconds. Enforced by the pool against its own clock, never by
    /// the facade.
    pub deadline: Option<u64>,
}

impl LiquidityContribution {
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.token_a, self.token_b)
    }
}

/// LP redemption instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityRedemption {
    pub token_a: Address,
    pub token_b: Address,
    /// `None` redeems the caller's entire LP balance.
    pub lp_amount: Option<U256>,
    pub min_amount_a: U256,
    pub min_amount_b: U256,
    /// `None` pays out to the facade identity.
    pub recipient: Option<Address>,
    pub deadline: Option<u64>,
}

impl LiquidityRedemption {
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.token_a, self.token_b)
    }
}

/// Capability surface of the external pool.
///
/// Reads are side-effect free. The three instruction operations are atomic
/// on the pool side: they apply fully or fail, and a failure reaches the
/// caller unmodified.
#[async_trait]
pub trait PoolClient: Send + Sync {
    /// Current reserves in canonical [`PairKey`] order.
    async fn get_reserves(&self, pair: PairKey) -> Result<PairReserves>;

    /// Pool contract address for the pair, if one exists.
    async fn get_pair(&self, token_a: Address, token_b: Address) -> Result<Address>;

    /// Execute a swap. Returns the delivered output amount.
    async fn swap(&self, request: &SwapRequest) -> Result<U256>;

    /// Deposit both assets. Returns the LP units minted to the caller.
    async fn add_liquidity(&self, contribution: &LiquidityContribution) -> Result<U256>;

    /// Burn LP units. Returns the redeemed `(amount_a, amount_b)` in the
    /// instruction's token order, not canonical order.
    async fn remove_liquidity(&self, redemption: &LiquidityRedemption) -> Result<(U256, U256)>;

    /// LP units the facade identity holds for the pair.
    async fn lp_balance(&self, pair: PairKey) -> Result<U256>;

    /// Total LP supply for the pair.
    async fn lp_total_supply(&self, pair: PairKey) -> Result<U256>;
}
