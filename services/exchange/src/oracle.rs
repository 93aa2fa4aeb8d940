//! Reserve reads over the pool capability.

use std::sync::Arc;

use swapdesk_amm::{PairKey, PairReserves};
use tracing::debug;

use crate::error::{ExchangeError, Result};
use crate::pool::PoolClient;

/// Stateless reader for current pool reserves.
///
/// Reserves are re-read on every call. Nothing is cached, so every quote
/// and plan prices against live state.
#[derive(Clone)]
pub struct ReserveOracle {
    pool: Arc<dyn PoolClient>,
}

impl ReserveOracle {
    pub fn new(pool: Arc<dyn PoolClient>) -> Self {
        Self { pool }
    }

    /// Current reserves for the pair in canonical order.
    pub async fn reserves(&self, pair: PairKey) -> Result<PairReserves> {
        let reserves = self.pool.get_reserves(pair).await?;
        debug!(
            "reserves for {}: ({}, {})",
            pair,
            reserves.reserve0(),
            reserves.reserve1()
        );
        Ok(reserves)
    }

    /// Like [`reserves`](Self::reserves), but a missing pair reads as a pool
    /// with zero liquidity.
    ///
    /// Deposit paths use this: the pool creates the pair on the first
    /// deposit, so "not found" there means "no price ratio yet", not an
    /// error.
    pub async fn reserves_or_empty(&self, pair: PairKey) -> Result<PairReserves> {
        match self.pool.get_reserves(pair).await {
            Ok(reserves) => Ok(reserves),
            Err(ExchangeError::PairNotFound { .. }) => {
                debug!("pair {} not registered yet, treating as empty", pair);
                Ok(PairReserves::empty(pair))
            }
            Err(e) => Err(e),
        }
    }
}
