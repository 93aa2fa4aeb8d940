//! # SwapDesk Exchange - AMM Facade Service
//!
//! ## Purpose
//!
//! Orchestrates swap and liquidity operations against a V2-style
//! constant-product pool. Each operation reads live reserves through the
//! [`ReserveOracle`], computes amounts and bounds with the `swapdesk-amm`
//! math, and issues at most one instruction to a [`PoolClient`] collaborator.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Caller requests (CLI or library), JSON/env
//!   configuration
//! - **Output Destinations**: A live factory/router deployment via
//!   [`LivePool`], or the deterministic in-memory [`PoolSimulator`]
//! - **Failure Policy**: No retries and no caching. Quotes always price
//!   against freshly read reserves, and failures surface with the context
//!   needed to adjust tolerances and re-invoke
//!
//! ## Architecture Role
//!
//! The facade owns orchestration and precondition checks; the pool owns
//! settlement. The caller's minimums travel through unchanged, so the
//! strictest bound wins no matter which side enforces it first.

pub mod config;
pub mod error;
pub mod facade;
pub mod live;
pub mod oracle;
pub mod pool;
pub mod sim;

pub use config::{ExchangeConfig, NetworkConfig, QuoteConfig};
pub use error::{ExchangeError, Result};
pub use facade::ExchangeFacade;
pub use live::LivePool;
pub use oracle::ReserveOracle;
pub use pool::{LiquidityContribution, LiquidityRedemption, PoolClient, SwapRequest};
pub use sim::PoolSimulator;
