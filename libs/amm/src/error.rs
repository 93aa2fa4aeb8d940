//! Error taxonomy for the pure reserve/amount arithmetic.

use ethers_core::types::U256;
use thiserror::Error;

/// Failures of quote and liquidity-planning math.
///
/// These carry no pair identity. The service layer attaches the pair it was
/// operating on when it lifts them into its own error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    /// An amount that must be positive was zero.
    #[error("amount must be positive")]
    ZeroAmount,

    /// Reserves cannot support the requested operation.
    #[error("insufficient liquidity for this operation")]
    InsufficientLiquidity,

    /// Redemption asked for more LP units than exist or are held.
    #[error("insufficient balance: requested {requested} LP units, {available} available")]
    InsufficientBalance { requested: U256, available: U256 },

    /// A checked 256-bit operation overflowed.
    #[error("arithmetic overflow in pool calculation")]
    Overflow,
}
