//! End-to-end facade scenarios against the in-memory pool.
//!
//! Unit tests cover single operations; these walk multi-step flows and the
//! guarantees that only show up across operations, like quote staleness
//! protection and exact redemption round-trips.

use std::sync::Arc;

use ethers::types::{Address, U256};
use swapdesk_amm::{PairKey, PlannerConfig};
use swapdesk_exchange::{
    ExchangeConfig, ExchangeError, ExchangeFacade, LiquidityContribution, LiquidityRedemption,
    PoolClient, PoolSimulator, QuoteConfig, SwapRequest,
};

fn u(n: u64) -> U256 {
    U256::from(n)
}

fn addr(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

fn setup(config: ExchangeConfig) -> (ExchangeFacade, Arc<PoolSimulator>) {
    let sim = Arc::new(PoolSimulator::new(config.quote.fee_bps));
    let facade = ExchangeFacade::new(sim.clone(), config);
    (facade, sim)
}

fn swap(amount_in: u64, min_amount_out: u64) -> SwapRequest {
    SwapRequest {
        token_in: addr(1),
        token_out: addr(2),
        amount_in: u(amount_in),
        min_amount_out: u(min_amount_out),
        recipient: addr(9),
    }
}

fn redemption(lp_amount: Option<U256>) -> LiquidityRedemption {
    LiquidityRedemption {
        token_a: addr(1),
        token_b: addr(2),
        lp_amount,
        min_amount_a: U256::zero(),
        min_amount_b: U256::zero(),
        recipient: None,
        deadline: None,
    }
}

#[tokio::test]
async fn full_liquidity_lifecycle_round_trips_exactly() {
    let (facade, sim) = setup(ExchangeConfig::default());
    let pair = PairKey::new(addr(1), addr(2));

    // First deposit creates the pool and defines the 1:2 price
    let minted = facade
        .add_liquidity(LiquidityContribution {
            token_a: addr(1),
            token_b: addr(2),
            amount_a: u(10_000),
            amount_b: u(20_000),
            deadline: None,
        })
        .await
        .unwrap();
    assert_eq!(minted, u(14_142)); // isqrt(200_000_000)

    // Swap against it at the facade-advertised minimum
    let min_out = facade
        .min_output_amount(addr(1), addr(2), u(1_000))
        .await
        .unwrap();
    assert_eq!(min_out, u(1_803));
    let out = facade
        .perform_swap(swap(1_000, min_out.as_u64()))
        .await
        .unwrap();
    assert_eq!(out, u(1_813));

    // Top up at the post-swap ratio
    let minted_more = facade
        .add_optimal_liquidity(addr(1), u(1_100), addr(2))
        .await
        .unwrap();
    assert_eq!(minted_more, u(1_413));

    // Preview the full redemption, then execute it
    let preview = facade
        .preview_remove_liquidity(addr(1), addr(2), None)
        .await
        .unwrap();
    assert_eq!(preview, (u(12_100), u(20_005)));

    let redeemed = facade.remove_liquidity(redemption(None)).await.unwrap();
    assert_eq!(redeemed, preview);

    // Sole LP redeeming everything drains the pool completely
    let reserves = sim.get_reserves(pair).await.unwrap();
    assert!(reserves.is_empty());
    assert_eq!(sim.lp_total_supply(pair).await.unwrap(), U256::zero());
}

#[tokio::test]
async fn stale_minimum_fails_locally_after_price_moves() {
    let (facade, sim) = setup(ExchangeConfig::default());
    sim.seed_liquidity(addr(1), addr(2), u(1_000), u(1_000)).unwrap();

    // Quote a minimum, then let another trader move the price before we act
    let min_out = facade
        .min_output_amount(addr(1), addr(2), u(100))
        .await
        .unwrap();
    assert_eq!(min_out, u(89));

    sim.swap(&swap(200, 0)).await.unwrap();

    // The stale bound now fails the pre-issue check; the pool never sees it
    let err = facade
        .perform_swap(swap(100, min_out.as_u64()))
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::SlippageExceeded { .. }));
    assert_eq!(sim.swaps_applied(), 1); // only the other trader's swap
}

#[tokio::test]
async fn configured_tolerances_flow_through_quotes_and_planning() {
    let config = ExchangeConfig {
        quote: QuoteConfig {
            fee_bps: 30,
            slippage_bps: 200,
        },
        planner: PlannerConfig { skew_bps: 2_500 },
        ..ExchangeConfig::default()
    };
    let (facade, sim) = setup(config);
    sim.seed_liquidity(addr(1), addr(2), u(1_000), u(2_000)).unwrap();

    // Wider slippage tolerance: quote 181 at 200 bps floors to 177
    let min_out = facade
        .min_output_amount(addr(1), addr(2), u(100))
        .await
        .unwrap();
    assert_eq!(min_out, u(177));

    // Tighter skew: optimal pairing is 20, a quarter of it is 5
    facade
        .add_sub_optimal_liquidity(addr(1), u(10), addr(2))
        .await
        .unwrap();
    let reserves = sim
        .get_reserves(PairKey::new(addr(1), addr(2)))
        .await
        .unwrap();
    assert_eq!(reserves.reserve0(), u(1_010));
    assert_eq!(reserves.reserve1(), u(2_005));
}

#[tokio::test]
async fn deadline_travels_with_the_instruction() {
    let (facade, sim) = setup(ExchangeConfig::default());
    sim.set_time(1_000);

    facade
        .add_liquidity(LiquidityContribution {
            token_a: addr(1),
            token_b: addr(2),
            amount_a: u(1_000),
            amount_b: u(1_000),
            deadline: Some(2_000),
        })
        .await
        .unwrap();

    // The facade passes the deadline through untouched; the pool's clock
    // decides
    let mut expired = redemption(Some(u(100)));
    expired.deadline = Some(999);
    let err = facade.remove_liquidity(expired).await.unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::DeadlineExpired { deadline: 999, now: 1_000 }
    ));
    assert_eq!(sim.removes_applied(), 0);
}

#[tokio::test]
async fn pool_enforces_redemption_minimums() {
    let (facade, sim) = setup(ExchangeConfig::default());

    facade
        .add_liquidity(LiquidityContribution {
            token_a: addr(1),
            token_b: addr(2),
            amount_a: u(1_000),
            amount_b: u(2_000),
            deadline: None,
        })
        .await
        .unwrap();

    // Burning 100 of 1414 LP pays out (70, 141); asking for 200 of token A
    // must fail on the pool side
    let mut strict = redemption(Some(u(100)));
    strict.min_amount_a = u(200);
    let err = facade.remove_liquidity(strict).await.unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::SlippageExceeded { expected, minimum }
            if expected == u(70) && minimum == u(200)
    ));
    assert_eq!(sim.removes_applied(), 0);

    // The same burn with honest minimums clears
    let mut honest = redemption(Some(u(100)));
    honest.min_amount_a = u(70);
    honest.min_amount_b = u(141);
    let (amount_a, amount_b) = facade.remove_liquidity(honest).await.unwrap();
    assert_eq!(amount_a, u(70));
    assert_eq!(amount_b, u(141));
}
