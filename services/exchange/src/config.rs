//! # Exchange Configuration - Runtime Parameter Management
//!
//! ## Purpose
//!
//! Configuration for the exchange facade and its live pool adapter with no
//! hardcoded values in the operating code: quote parameters, planner tuning,
//! and network connectivity all flow from here. Supports JSON file loading,
//! environment variable overrides, and validation up front so a bad
//! parameter fails at startup instead of inside an instruction.
//!
//! ## Integration Points
//!
//! - **Input Sources**: JSON configuration files, `SWAPDESK_*` environment
//!   variables, CLI arguments
//! - **Output Destinations**: Facade (quote/planner parameters), live pool
//!   adapter (endpoint, contracts, signing key)
//! - **Default Management**: Production-ready defaults for every parameter

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use swapdesk_amm::{PlannerConfig, BPS_DENOMINATOR, DEFAULT_FEE_BPS, DEFAULT_SLIPPAGE_BPS};

/// Complete configuration for the exchange service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Quote parameters
    pub quote: QuoteConfig,
    /// Liquidity planner tuning
    pub planner: PlannerConfig,
    /// Network and contract configuration
    pub network: NetworkConfig,
}

/// Parameters applied to every quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Pool swap fee in basis points (30 = 0.3%)
    pub fee_bps: u32,
    /// Slippage tolerance applied to quoted minimums in basis points (50 = 0.5%)
    pub slippage_bps: u32,
}

/// Connectivity for the live pool adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// RPC endpoint for pool interaction
    pub rpc_url: String,
    /// V2 factory contract address
    pub factory: String, // Parsed to Address when needed
    /// V2 router contract address
    pub router: String,
    /// Private key for signing instructions. Prefer the SWAPDESK_PRIVATE_KEY
    /// override to a key sitting in a config file.
    pub private_key: String,
    /// Default instruction deadline, in seconds from submission
    pub deadline_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            quote: QuoteConfig::default(),
            planner: PlannerConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            fee_bps: DEFAULT_FEE_BPS,
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://polygon-rpc.com".to_string(),
            // QuickSwap V2 deployment on Polygon
            factory: "0x5757371414417b8C6CAad45bAeF941aBc7d3Ab32".to_string(),
            router: "0xa5E0829CaCEd8fFDD4De3c43696c57F7D7A678ff".to_string(),
            private_key: "0x0000000000000000000000000000000000000000000000000000000000000001"
                .to_string(),
            deadline_secs: 300, // 5 minutes
        }
    }
}

impl ExchangeConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `SWAPDESK_*` environment variables over the current values
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(fee) = std::env::var("SWAPDESK_FEE_BPS") {
            if let Ok(value) = fee.parse::<u32>() {
                self.quote.fee_bps = value;
            }
        }

        if let Ok(slippage) = std::env::var("SWAPDESK_SLIPPAGE_BPS") {
            if let Ok(value) = slippage.parse::<u32>() {
                self.quote.slippage_bps = value;
            }
        }

        if let Ok(skew) = std::env::var("SWAPDESK_SKEW_BPS") {
            if let Ok(value) = skew.parse::<u32>() {
                self.planner.skew_bps = value;
            }
        }

        if let Ok(rpc_url) = std::env::var("SWAPDESK_RPC_URL") {
            self.network.rpc_url = rpc_url;
        }

        if let Ok(factory) = std::env::var("SWAPDESK_FACTORY") {
            self.network.factory = factory;
        }

        if let Ok(router) = std::env::var("SWAPDESK_ROUTER") {
            self.network.router = router;
        }

        if let Ok(private_key) = std::env::var("SWAPDESK_PRIVATE_KEY") {
            self.network.private_key = private_key;
        }

        if let Ok(deadline) = std::env::var("SWAPDESK_DEADLINE_SECS") {
            if let Ok(value) = deadline.parse::<u64>() {
                self.network.deadline_secs = value;
            }
        }

        self
    }

    /// Save configuration to a JSON file
    pub fn save_to_file(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> anyhow::Result<()> {
        // Validate quote config
        if self.quote.fee_bps >= BPS_DENOMINATOR {
            anyhow::bail!("fee_bps must be below 10000 (100%)");
        }

        if self.quote.slippage_bps > BPS_DENOMINATOR {
            anyhow::bail!("slippage_bps must be <= 10000 (100%)");
        }

        // Validate planner config
        if self.planner.skew_bps > BPS_DENOMINATOR {
            anyhow::bail!("skew_bps must be <= 10000 (100%)");
        }

        // Validate network config
        if self.network.factory.parse::<Address>().is_err() {
            anyhow::bail!("Invalid factory address format");
        }

        if self.network.router.parse::<Address>().is_err() {
            anyhow::bail!("Invalid router address format");
        }

        if self.network.deadline_secs == 0 {
            anyhow::bail!("deadline_secs must be positive");
        }

        Ok(())
    }
}
