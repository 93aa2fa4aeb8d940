//! # SwapDesk AMM Library - Constant-Product Exchange Mathematics
//!
//! ## Purpose
//!
//! Mathematical core for constant-product (x*y=k) pool interaction: swap
//! quoting, slippage-bounded minimums, price impact, ratio-preserving
//! liquidity provision, and proportional LP redemption. All arithmetic is
//! unsigned 256-bit with explicit checked operations so results are exact,
//! floored the way V2 pool contracts floor, and overflow is a typed error
//! rather than a wrapped value.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Reserve snapshots observed from pool contracts or a
//!   simulator, amounts chosen by callers
//! - **Output Destinations**: The exchange facade, which turns computed
//!   amounts and bounds into pool instructions
//! - **Statelessness**: No reserve state is held here. Callers pass the
//!   reserves they observed, and two calls with the same inputs always
//!   produce the same outputs
//!
//! ## Architecture Role
//!
//! This library decides *amounts*; it never talks to a pool. Keeping the
//! math free of I/O is what lets the same formulas back live quoting,
//! simulation, and property tests.

pub mod error;
pub mod liquidity;
pub mod pair;
pub mod quote;

pub use error::AmmError;
pub use liquidity::{LiquidityPlanner, PlannerConfig, DEFAULT_SKEW_BPS};
pub use pair::{PairKey, PairReserves};
pub use quote::{QuoteEngine, BPS_DENOMINATOR, DEFAULT_FEE_BPS, DEFAULT_SLIPPAGE_BPS};

/// Common types for amounts, reserves, and asset identity
pub use ethers_core::types::{Address, U256};
