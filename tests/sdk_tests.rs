use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use meridian_sdk::{
    IntegerEncoding, MeridianSDK, PoolStateSource, RawPoolState, Session, SessionEvent,
    SlippageBound, SwapBound, SwapMode, TokenAddress,
};
use num_bigint::BigUint;
use num_traits::Num;

const TOKEN_AA: &str = "0x00000000000000000000000000000000000000aa";
const TOKEN_BB: &str = "0x00000000000000000000000000000000000000bb";
const ROUTER: &str = "0x00000000000000000000000000000000000000fe";
const ACCOUNT: &str = "0x00000000000000000000000000000000000000cd";

fn big(s: &str) -> BigUint {
    BigUint::from_str_radix(s, 10).unwrap()
}

fn addr(s: &str) -> TokenAddress {
    TokenAddress::new(s).unwrap()
}

fn session() -> Session {
    Session {
        account: addr(ACCOUNT),
        chain_id: 1,
    }
}

/// Serves a fixed pool state and counts fetches.
struct StaticPool {
    state: RawPoolState,
    fetches: AtomicU32,
}

impl StaticPool {
    fn new(state: RawPoolState) -> Arc<Self> {
        Arc::new(Self {
            state,
            fetches: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl PoolStateSource for StaticPool {
    async fn fetch_pool_state(
        &self,
        _token0: &TokenAddress,
        _token1: &TokenAddress,
    ) -> Result<RawPoolState> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.clone())
    }
}

mod support;
use support::{PendingReceipts, RecordingSubmitter};

fn swap_pool_state() -> RawPoolState {
    RawPoolState {
        token_a: TOKEN_AA.to_string(),
        token_b: TOKEN_BB.to_string(),
        reserve_a: "1000000000000000000000".to_string(),
        reserve_b: "2000000000000000000000".to_string(),
        balance_a: "1000000000000000000000".to_string(),
        balance_b: "2000000000000000000000".to_string(),
        total_supply: "1414213562373095048801".to_string(),
        k_last: "0".to_string(),
        encoding: IntegerEncoding::Decimal,
    }
}

fn sdk_with(state: RawPoolState) -> (MeridianSDK, Arc<StaticPool>) {
    let pool = StaticPool::new(state);
    let sdk = MeridianSDK::new(
        pool.clone(),
        Arc::new(RecordingSubmitter::default()),
        Arc::new(PendingReceipts::default()),
        addr(ROUTER),
    );
    (sdk, pool)
}

fn data_word(data: &[u8], index: usize) -> &[u8] {
    &data[4 + index * 32..4 + (index + 1) * 32]
}

fn be_word(value: &BigUint) -> [u8; 32] {
    let bytes = value.to_bytes_be();
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    word
}

#[tokio::test]
async fn exact_in_quote_matches_the_fixed_expectation() {
    let (mut sdk, pool) = sdk_with(swap_pool_state());
    let (aa, bb) = (addr(TOKEN_AA), addr(TOKEN_BB));

    let quote = sdk
        .quote(&aa, &bb, &big("100000000000000000000"))
        .await
        .unwrap();
    assert_eq!(quote.out_amount, big("180432157148053837759"));
    assert_eq!(pool.fetches.load(Ordering::SeqCst), 1);

    // quoting again prices against a fresh snapshot
    sdk.quote(&aa, &bb, &big("100000000000000000000"))
        .await
        .unwrap();
    assert_eq!(pool.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn quoting_is_direction_sensitive() {
    let (mut sdk, _pool) = sdk_with(swap_pool_state());
    let (aa, bb) = (addr(TOKEN_AA), addr(TOKEN_BB));

    let forward = sdk
        .quote(&aa, &bb, &big("1000000000000000000"))
        .await
        .unwrap();
    let backward = sdk
        .quote(&bb, &aa, &big("1000000000000000000"))
        .await
        .unwrap();
    // 1:2 pool - selling the scarce token buys more than selling the
    // plentiful one
    assert!(forward.out_amount > backward.out_amount);
}

#[tokio::test]
async fn exact_in_swap_call_encodes_the_minimum_out() {
    let (mut sdk, _pool) = sdk_with(swap_pool_state());
    let (aa, bb) = (addr(TOKEN_AA), addr(TOKEN_BB));
    let amount_in = big("100000000000000000000");

    let quote = sdk.quote(&aa, &bb, &amount_in).await.unwrap();
    let swap = sdk
        .swap_call(
            &session(),
            &aa,
            &bb,
            &quote,
            SwapMode::ExactIn,
            SlippageBound::resolve(Some("5"), true),
            1_700_000_000,
        )
        .unwrap();

    let min_out = big("171410549290651145871");
    assert_eq!(swap.bound, SwapBound::MinimumOut(min_out.clone()));

    let data = &swap.call.data;
    assert_eq!(data.len(), 4 + 8 * 32);
    assert_eq!(&data[..4], &[0x38, 0xed, 0x17, 0x39]);
    assert_eq!(data_word(data, 0), &be_word(&amount_in)[..]);
    assert_eq!(data_word(data, 1), &be_word(&min_out)[..]);
    // recipient word carries the session account, left-padded
    assert_eq!(&data_word(data, 3)[12..], &addr(ACCOUNT).to_bytes());
    // two-hop path: token_in then token_out
    assert_eq!(data_word(data, 5), &be_word(&big("2"))[..]);
    assert_eq!(&data_word(data, 6)[12..], &aa.to_bytes());
    assert_eq!(&data_word(data, 7)[12..], &bb.to_bytes());

    assert_eq!(swap.call.to, addr(ROUTER));
    assert!(swap.call.value.is_none());
    assert!(swap.call.data_hex().starts_with("0x38ed1739"));
}

#[tokio::test]
async fn exact_out_swap_call_caps_the_input() {
    let (mut sdk, _pool) = sdk_with(swap_pool_state());
    let (aa, bb) = (addr(TOKEN_AA), addr(TOKEN_BB));
    let amount_out = big("100000000000000000000");

    let quote = sdk.quote_exact_out(&aa, &bb, &amount_out).await.unwrap();
    assert_eq!(quote.in_amount, big("53066388174261528143"));

    let swap = sdk
        .swap_call(
            &session(),
            &aa,
            &bb,
            &quote,
            SwapMode::ExactOut,
            SlippageBound::resolve(Some("5"), true),
            1_700_000_000,
        )
        .unwrap();

    let max_in = big("55719707582974604551");
    assert_eq!(swap.bound, SwapBound::MaximumIn(max_in.clone()));

    let data = &swap.call.data;
    assert_eq!(&data[..4], &[0x88, 0x03, 0xdb, 0xee]);
    assert_eq!(data_word(data, 0), &be_word(&amount_out)[..]);
    assert_eq!(data_word(data, 1), &be_word(&max_in)[..]);
}

#[tokio::test]
async fn add_liquidity_bounds_both_deposits_below() {
    let (mut sdk, _pool) = sdk_with(swap_pool_state());
    let (aa, bb) = (addr(TOKEN_AA), addr(TOKEN_BB));
    sdk.load_pool(&aa, &bb).await.unwrap();

    let amount_a = big("1000000");
    let amount_b = sdk.deposit_counter_amount(&aa, &amount_a).unwrap();
    assert_eq!(amount_b, big("2000000"));

    let call = sdk
        .add_liquidity_call(
            &session(),
            &aa,
            &bb,
            &amount_a,
            &amount_b,
            SlippageBound::resolve(Some("5"), true),
            1_700_000_000,
        )
        .unwrap();

    assert_eq!(call.min_amount_a, big("950000"));
    assert_eq!(call.min_amount_b, big("1900000"));

    let data = &call.call.data;
    assert_eq!(data.len(), 4 + 8 * 32);
    assert_eq!(&data[..4], &[0xe8, 0xe3, 0x37, 0x00]);
    assert_eq!(data_word(data, 2), &be_word(&amount_a)[..]);
    assert_eq!(data_word(data, 3), &be_word(&amount_b)[..]);
    assert_eq!(data_word(data, 4), &be_word(&call.min_amount_a)[..]);
    assert_eq!(data_word(data, 5), &be_word(&call.min_amount_b)[..]);
}

#[tokio::test]
async fn remove_liquidity_attributes_amounts_to_caller_order() {
    // token balances exceed tracked reserves; fee tracking off
    let state = RawPoolState {
        token_a: TOKEN_AA.to_string(),
        token_b: TOKEN_BB.to_string(),
        reserve_a: "1000".to_string(),
        reserve_b: "3000".to_string(),
        balance_a: "1005".to_string(),
        balance_b: "3005".to_string(),
        total_supply: "500".to_string(),
        k_last: "0".to_string(),
        encoding: IntegerEncoding::Decimal,
    };
    let (mut sdk, _pool) = sdk_with(state);
    let (aa, bb) = (addr(TOKEN_AA), addr(TOKEN_BB));
    sdk.load_pool(&aa, &bb).await.unwrap();

    // caller passes the pair in reverse sorted order
    let call = sdk
        .remove_liquidity_call(
            &session(),
            &bb,
            &aa,
            &big("100"),
            SlippageBound::resolve(Some("5"), true),
            1_700_000_000,
        )
        .unwrap();

    // amount_a belongs to bb (token1), amount_b to aa (token0)
    assert_eq!(call.amount_a, big("601"));
    assert_eq!(call.amount_b, big("201"));
    assert_eq!(call.min_amount_a, big("570"));
    assert_eq!(call.min_amount_b, big("190"));

    let data = &call.call.data;
    assert_eq!(data.len(), 4 + 7 * 32);
    assert_eq!(&data[..4], &[0xba, 0xa2, 0xab, 0xde]);
    assert_eq!(&data_word(data, 0)[12..], &bb.to_bytes());
    assert_eq!(&data_word(data, 1)[12..], &aa.to_bytes());
    assert_eq!(data_word(data, 2), &be_word(&big("100"))[..]);
    assert_eq!(data_word(data, 3), &be_word(&big("570"))[..]);
    assert_eq!(data_word(data, 4), &be_word(&big("190"))[..]);
}

#[tokio::test]
async fn remove_liquidity_applies_protocol_fee_dilution() {
    let state = RawPoolState {
        token_a: TOKEN_AA.to_string(),
        token_b: TOKEN_BB.to_string(),
        reserve_a: "1100".to_string(),
        reserve_b: "1100".to_string(),
        balance_a: "1100".to_string(),
        balance_b: "1100".to_string(),
        total_supply: "1000".to_string(),
        k_last: "1000000".to_string(),
        encoding: IntegerEncoding::Decimal,
    };
    let (mut sdk, _pool) = sdk_with(state);
    let (aa, bb) = (addr(TOKEN_AA), addr(TOKEN_BB));
    sdk.load_pool(&aa, &bb).await.unwrap();

    let call = sdk
        .remove_liquidity_call(
            &session(),
            &aa,
            &bb,
            &big("1000"),
            SlippageBound::resolve(Some("5"), true),
            1_700_000_000,
        )
        .unwrap();

    // the protocol's accrued fee share dilutes a full withdrawal below the
    // pool balances
    assert_eq!(call.amount_a, big("1083"));
    assert_eq!(call.amount_b, big("1083"));
}

#[tokio::test]
async fn hex_encoded_state_parses_with_the_explicit_flag() {
    let state = RawPoolState {
        token_a: TOKEN_AA.to_string(),
        token_b: TOKEN_BB.to_string(),
        reserve_a: "0x3e8".to_string(),
        reserve_b: "0xbb8".to_string(),
        balance_a: "3e8".to_string(),
        balance_b: "bb8".to_string(),
        total_supply: "0x1f4".to_string(),
        k_last: "0x0".to_string(),
        encoding: IntegerEncoding::Hex,
    };
    let (mut sdk, _pool) = sdk_with(state);
    let (aa, bb) = (addr(TOKEN_AA), addr(TOKEN_BB));
    sdk.load_pool(&aa, &bb).await.unwrap();

    // 0x3e8 = 1000, 0xbb8 = 3000
    let counter = sdk.deposit_counter_amount(&aa, &big("10")).unwrap();
    assert_eq!(counter, big("30"));
}

#[tokio::test]
async fn session_changes_invalidate_the_cached_pool() {
    let (mut sdk, _pool) = sdk_with(swap_pool_state());
    let (aa, bb) = (addr(TOKEN_AA), addr(TOKEN_BB));

    let quote = sdk
        .quote(&aa, &bb, &big("1000000000000000000"))
        .await
        .unwrap();
    let slippage = SlippageBound::resolve(None, true);
    assert!(
        sdk.swap_call(&session(), &aa, &bb, &quote, SwapMode::ExactIn, slippage, 0)
            .is_ok()
    );

    sdk.on_session_event(&SessionEvent::ChainChanged(56));
    assert!(
        sdk.swap_call(&session(), &aa, &bb, &quote, SwapMode::ExactIn, slippage, 0)
            .is_err()
    );
}

#[tokio::test]
async fn foreign_tokens_are_rejected_against_the_loaded_pool() {
    let (mut sdk, _pool) = sdk_with(swap_pool_state());
    let (aa, bb) = (addr(TOKEN_AA), addr(TOKEN_BB));
    let other = addr("0x00000000000000000000000000000000000000cc");

    let quote = sdk
        .quote(&aa, &bb, &big("1000000000000000000"))
        .await
        .unwrap();
    let slippage = SlippageBound::resolve(None, true);
    assert!(
        sdk.swap_call(&session(), &aa, &other, &quote, SwapMode::ExactIn, slippage, 0)
            .is_err()
    );
    assert!(
        sdk.swap_call(&session(), &aa, &aa, &quote, SwapMode::ExactIn, slippage, 0)
            .is_err()
    );
}
