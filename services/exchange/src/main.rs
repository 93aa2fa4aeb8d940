use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ethers::types::{Address, U256};
use tracing::info;
use tracing_subscriber::EnvFilter;

use swapdesk_exchange::{
    ExchangeConfig, ExchangeFacade, LiquidityContribution, LiquidityRedemption, LivePool,
    SwapRequest,
};

/// Facade over a V2-style AMM pool: swaps, liquidity, and quotes.
#[derive(Parser)]
#[command(name = "swapdesk", version, about)]
struct Cli {
    /// Path to a JSON configuration file. Without it, defaults plus
    /// SWAPDESK_* environment overrides apply.
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the minimum acceptable swap output at the configured slippage
    Quote {
        token_in: Address,
        token_out: Address,
        #[arg(value_parser = parse_amount)]
        amount_in: U256,
    },
    /// Execute a swap with a caller-chosen output floor
    Swap {
        token_in: Address,
        token_out: Address,
        #[arg(value_parser = parse_amount)]
        amount_in: U256,
        #[arg(value_parser = parse_amount)]
        min_amount_out: U256,
        recipient: Address,
    },
    /// Deposit exact amounts of both assets
    AddLiquidity {
        token_a: Address,
        token_b: Address,
        #[arg(value_parser = parse_amount)]
        amount_a: U256,
        #[arg(value_parser = parse_amount)]
        amount_b: U256,
        /// Unix deadline in seconds; the configured horizon applies if omitted
        #[arg(long)]
        deadline: Option<u64>,
    },
    /// Deposit one asset plus the ratio-preserving amount of the other
    AddOptimal {
        token: Address,
        #[arg(value_parser = parse_amount)]
        amount: U256,
        paired_token: Address,
    },
    /// Deposit with a deliberately skewed paired amount (rebalancing exercise)
    AddSubOptimal {
        token: Address,
        #[arg(value_parser = parse_amount)]
        amount: U256,
        paired_token: Address,
    },
    /// Redeem LP units for both assets
    RemoveLiquidity {
        token_a: Address,
        token_b: Address,
        /// LP units to burn; the full held balance if omitted
        #[arg(long, value_parser = parse_amount)]
        lp_amount: Option<U256>,
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        min_amount_a: U256,
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        min_amount_b: U256,
        /// Payout address; the signing account if omitted
        #[arg(long)]
        recipient: Option<Address>,
        #[arg(long)]
        deadline: Option<u64>,
    },
    /// Print the amounts a redemption would return right now
    PreviewRemove {
        token_a: Address,
        token_b: Address,
        #[arg(long, value_parser = parse_amount)]
        lp_amount: Option<U256>,
    },
    /// Print the pool contract address for a pair
    Pair {
        token_a: Address,
        token_b: Address,
    },
}

fn parse_amount(s: &str) -> std::result::Result<U256, String> {
    U256::from_dec_str(s).map_err(|e| format!("invalid decimal amount: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ExchangeConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {path}"))?
            .with_env_overrides(),
        None => ExchangeConfig::from_env(),
    };
    config.validate().context("Invalid configuration")?;

    info!("🚀 Starting SwapDesk exchange facade...");
    let pool = Arc::new(
        LivePool::connect(&config.network)
            .await
            .context("Failed to connect to pool endpoint")?,
    );
    let facade = ExchangeFacade::new(pool, config);
    info!("✅ Exchange facade initialized");

    match cli.command {
        Command::Quote {
            token_in,
            token_out,
            amount_in,
        } => {
            let min_out = facade
                .min_output_amount(token_in, token_out, amount_in)
                .await?;
            println!("{min_out}");
        }
        Command::Swap {
            token_in,
            token_out,
            amount_in,
            min_amount_out,
            recipient,
        } => {
            let out = facade
                .perform_swap(SwapRequest {
                    token_in,
                    token_out,
                    amount_in,
                    min_amount_out,
                    recipient,
                })
                .await?;
            println!("{out}");
        }
        Command::AddLiquidity {
            token_a,
            token_b,
            amount_a,
            amount_b,
            deadline,
        } => {
            let minted = facade
                .add_liquidity(LiquidityContribution {
                    token_a,
                    token_b,
                    amount_a,
                    amount_b,
                    deadline,
                })
                .await?;
            println!("{minted}");
        }
        Command::AddOptimal {
            token,
            amount,
            paired_token,
        } => {
            let minted = facade
                .add_optimal_liquidity(token, amount, paired_token)
                .await?;
            println!("{minted}");
        }
        Command::AddSubOptimal {
            token,
            amount,
            paired_token,
        } => {
            let minted = facade
                .add_sub_optimal_liquidity(token, amount, paired_token)
                .await?;
            println!("{minted}");
        }
        Command::RemoveLiquidity {
            token_a,
            token_b,
            lp_amount,
            min_amount_a,
            min_amount_b,
            recipient,
            deadline,
        } => {
            let (amount_a, amount_b) = facade
                .remove_liquidity(LiquidityRedemption {
                    token_a,
                    token_b,
                    lp_amount,
                    min_amount_a,
                    min_amount_b,
                    recipient,
                    deadline,
                })
                .await?;
            println!("{amount_a} {amount_b}");
        }
        Command::PreviewRemove {
            token_a,
            token_b,
            lp_amount,
        } => {
            let (amount_a, amount_b) = facade
                .preview_remove_liquidity(token_a, token_b, lp_amount)
                .await?;
            println!("{amount_a} {amount_b}");
        }
        Command::Pair { token_a, token_b } => {
            let address = facade.retrieve_pair(token_a, token_b).await?;
            println!("{address:?}");
        }
    }

    Ok(())
}
