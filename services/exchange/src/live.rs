//! Live adapter over a deployed V2-style factory/pair/router.
//!
//! Connection handling follows the same recipe as the rest of the stack: a
//! pooled reqwest client behind the ethers HTTP transport, and a
//! `SignerMiddleware` wrapping a local wallet bound to the endpoint's chain
//! id. Pool-side failures (reverts, transport errors) pass through as
//! [`ExchangeError::ExternalPool`] without reinterpretation.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use async_trait::async_trait;
use ethers::contract::abigen;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, U256};
use swapdesk_amm::{PairKey, PairReserves};
use tracing::{debug, info};
use url::Url;

use crate::config::NetworkConfig;
use crate::error::{ExchangeError, Result};
use crate::pool::{LiquidityContribution, LiquidityRedemption, PoolClient, SwapRequest};

abigen!(
    IUniswapV2Factory,
    r#"[
        function getPair(address tokenA, address tokenB) external view returns (address pair)
    ]"#
);

abigen!(
    IUniswapV2Pair,
    r#"[
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast)
        function balanceOf(address owner) external view returns (uint256)
        function totalSupply() external view returns (uint256)
    ]"#
);

abigen!(
    IUniswapV2Router,
    r#"[
        function swapExactTokensForTokens(uint256 amountIn, uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external returns (uint256[] memory amounts)
        function addLiquidity(address tokenA, address tokenB, uint256 amountADesired, uint256 amountBDesired, uint256 amountAMin, uint256 amountBMin, address to, uint256 deadline) external returns (uint256 amountA, uint256 amountB, uint256 liquidity)
        function removeLiquidity(address tokenA, address tokenB, uint256 liquidity, uint256 amountAMin, uint256 amountBMin, address to, uint256 deadline) external returns (uint256 amountA, uint256 amountB)
    ]"#
);

type LiveClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Pool client backed by deployed factory/pair/router contracts.
pub struct LivePool {
    client: Arc<LiveClient>,
    factory: IUniswapV2Factory<LiveClient>,
    router: IUniswapV2Router<LiveClient>,
    /// Address instructions settle to when the caller names no recipient.
    account: Address,
    deadline_secs: u64,
}

impl LivePool {
    /// Connect to the configured endpoint and bind the factory and router.
    pub async fn connect(config: &NetworkConfig) -> anyhow::Result<Self> {
        // Pooled HTTP client, reused across every RPC call
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(5)
            .timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .build()
            .context("Failed to create pooled HTTP client")?;

        let url: Url = config.rpc_url.parse().context("Invalid RPC URL")?;
        let provider = Provider::<Http>::new(Http::new_with_client(url, http_client));

        let chain_id = provider
            .get_chainid()
            .await
            .context("Failed to read chain id from endpoint")?;
        let wallet = config
            .private_key
            .parse::<LocalWallet>()
            .context("Invalid private key format")?
            .with_chain_id(chain_id.as_u64());
        let account = wallet.address();
        let client = Arc::new(SignerMiddleware::new(provider, wallet));

        let factory_address: Address = config
            .factory
            .parse()
            .context("Invalid factory address format")?;
        let router_address: Address = config
            .router
            .parse()
            .context("Invalid router address format")?;

        info!(
            "🌐 Connected to pool endpoint {} (chain {}, account {:?})",
            config.rpc_url, chain_id, account
        );

        Ok(Self {
            factory: IUniswapV2Factory::new(factory_address, client.clone()),
            router: IUniswapV2Router::new(router_address, client.clone()),
            client,
            account,
            deadline_secs: config.deadline_secs,
        })
    }

    fn deadline_or_default(&self, deadline: Option<u64>) -> U256 {
        U256::from(deadline.unwrap_or_else(|| unix_now() + self.deadline_secs))
    }

    async fn pair_contract(&self, pair: PairKey) -> Result<IUniswapV2Pair<LiveClient>> {
        let address = self.get_pair(pair.token0(), pair.token1()).await?;
        Ok(IUniswapV2Pair::new(address, self.client.clone()))
    }
}

#[async_trait]
impl PoolClient for LivePool {
    async fn get_reserves(&self, pair: PairKey) -> Result<PairReserves> {
        let contract = self.pair_contract(pair).await?;
        let (reserve0, reserve1, _last_update) = contract
            .get_reserves()
            .call()
            .await
            .map_err(pool_err("getReserves call failed"))?;
        Ok(PairReserves::new(
            pair,
            U256::from(reserve0),
            U256::from(reserve1),
        ))
    }

    async fn get_pair(&self, token_a: Address, token_b: Address) -> Result<Address> {
        let address = self
            .factory
            .get_pair(token_a, token_b)
            .call()
            .await
            .map_err(pool_err("getPair call failed"))?;
        // The factory reports missing pairs as the zero address
        if address == Address::zero() {
            return Err(ExchangeError::PairNotFound { token_a, token_b });
        }
        Ok(address)
    }

    async fn swap(&self, request: &SwapRequest) -> Result<U256> {
        let path = vec![request.token_in, request.token_out];
        let call = self.router.swap_exact_tokens_for_tokens(
            request.amount_in,
            request.min_amount_out,
            path,
            request.recipient,
            self.deadline_or_default(None),
        );

        // State-changing calls only yield a receipt; the preview is what
        // captures the router's return values
        let amounts = call
            .call()
            .await
            .map_err(pool_err("swap preview failed"))?;
        let receipt = call
            .send()
            .await
            .map_err(pool_err("swap submission failed"))?
            .await
            .map_err(pool_err("swap confirmation failed"))?;

        let amount_out = amounts.last().copied().unwrap_or_default();
        debug!(
            "🔄 swap confirmed (tx {:?}): {} in, {} out",
            receipt.map(|r| r.transaction_hash),
            request.amount_in,
            amount_out
        );
        Ok(amount_out)
    }

    async fn add_liquidity(&self, contribution: &LiquidityContribution) -> Result<U256> {
        // The deposit surface takes the amounts as-is; the router's own
        // minimums are left open
        let call = self.router.add_liquidity(
            contribution.token_a,
            contribution.token_b,
            contribution.amount_a,
            contribution.amount_b,
            U256::zero(),
            U256::zero(),
            self.account,
            self.deadline_or_default(contribution.deadline),
        );

        let (amount_a, amount_b, liquidity) = call
            .call()
            .await
            .map_err(pool_err("addLiquidity preview failed"))?;
        call.send()
            .await
            .map_err(pool_err("addLiquidity submission failed"))?
            .await
            .map_err(pool_err("addLiquidity confirmation failed"))?;

        debug!(
            "➕ deposit confirmed: {} / {} accepted, {} LP minted",
            amount_a, amount_b, liquidity
        );
        Ok(liquidity)
    }

    async fn remove_liquidity(&self, redemption: &LiquidityRedemption) -> Result<(U256, U256)> {
        let lp_amount = match redemption.lp_amount {
            Some(amount) => amount,
            None => self.lp_balance(redemption.pair()).await?,
        };
        if lp_amount.is_zero() {
            return Err(ExchangeError::ZeroAmount);
        }

        let call = self.router.remove_liquidity(
            redemption.token_a,
            redemption.token_b,
            lp_amount,
            redemption.min_amount_a,
            redemption.min_amount_b,
            redemption.recipient.unwrap_or(self.account),
            self.deadline_or_default(redemption.deadline),
        );

        let (amount_a, amount_b) = call
            .call()
            .await
            .map_err(pool_err("removeLiquidity preview failed"))?;
        call.send()
            .await
            .map_err(pool_err("removeLiquidity submission failed"))?
            .await
            .map_err(pool_err("removeLiquidity confirmation failed"))?;

        debug!(
            "➖ redemption confirmed: {} LP burned for {} / {}",
            lp_amount, amount_a, amount_b
        );
        Ok((amount_a, amount_b))
    }

    async fn lp_balance(&self, pair: PairKey) -> Result<U256> {
        let contract = self.pair_contract(pair).await?;
        contract
            .balance_of(self.account)
            .call()
            .await
            .map_err(pool_err("balanceOf call failed"))
    }

    async fn lp_total_supply(&self, pair: PairKey) -> Result<U256> {
        let contract = self.pair_contract(pair).await?;
        contract
            .total_supply()
            .call()
            .await
            .map_err(pool_err("totalSupply call failed"))
    }
}

/// Wrap a pool-side failure with a short operation tag.
fn pool_err<E>(operation: &'static str) -> impl FnOnce(E) -> ExchangeError
where
    E: std::error::Error + Send + Sync + 'static,
{
    move |e| ExchangeError::ExternalPool(anyhow::Error::new(e).context(operation))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
