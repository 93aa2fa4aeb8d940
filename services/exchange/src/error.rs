//! Caller-facing error taxonomy for exchange operations.
//!
//! Every failure carries the context a caller needs to decide what to do
//! next (pair, amounts, bounds). The facade never retries on its own:
//! reserves move between attempts, so a blind retry could execute at a
//! price the caller never accepted.

use ethers::types::{Address, U256};
use swapdesk_amm::{AmmError, PairKey};
use thiserror::Error;

/// Failures surfaced by the exchange facade and the pool collaborators
/// behind it.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// No pool exists for the asset pair.
    #[error("no pair registered for {token_a:?} / {token_b:?}")]
    PairNotFound { token_a: Address, token_b: Address },

    /// The pool's current reserves cannot support the operation.
    #[error("insufficient liquidity in pair {pair}")]
    InsufficientLiquidity { pair: PairKey },

    /// Output fell below the caller's required minimum.
    #[error("slippage exceeded: expected output {expected} below required minimum {minimum}")]
    SlippageExceeded { expected: U256, minimum: U256 },

    /// A checked 256-bit operation overflowed.
    #[error("arithmetic overflow computing exchange amounts")]
    ArithmeticOverflow,

    /// The instruction's deadline had already passed when the pool
    /// processed it.
    #[error("deadline {deadline} expired (pool time {now})")]
    DeadlineExpired { deadline: u64, now: u64 },

    /// Redemption asked for more LP units than are held.
    #[error("insufficient balance: requested {requested} LP units, {available} held")]
    InsufficientBalance { requested: U256, available: U256 },

    /// An amount that must be positive was zero.
    #[error("amount must be positive")]
    ZeroAmount,

    /// Opaque failure reported by the external pool, passed through
    /// unmodified.
    #[error(transparent)]
    ExternalPool(#[from] anyhow::Error),
}

impl ExchangeError {
    /// Lift a math error into the exchange taxonomy, attaching the pair the
    /// operation was working on.
    pub(crate) fn from_amm(err: AmmError, pair: PairKey) -> Self {
        match err {
            AmmError::ZeroAmount => Self::ZeroAmount,
            AmmError::InsufficientLiquidity => Self::InsufficientLiquidity { pair },
            AmmError::InsufficientBalance {
                requested,
                available,
            } => Self::InsufficientBalance {
                requested,
                available,
            },
            AmmError::Overflow => Self::ArithmeticOverflow,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
