#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use bigdecimal::BigDecimal;

use lp_transfer_classifier::core::constants::NULL_ADDRESS;
use lp_transfer_classifier::{
    ClassificationContext, InMemoryChainData, TransactionTransfers, TransferEvent,
};

pub const USER: &str = "0x1111111111111111111111111111111111111111";
pub const OTHER_USER: &str = "0x2222222222222222222222222222222222222222";
pub const POOL: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const ROUTER: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
pub const TOKEN_A: &str = "0xa0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0";
pub const TOKEN_B: &str = "0xb0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0";
pub const TOKEN_C: &str = "0xc0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0";
pub const TX_HASH: &str = "0xdeadbeef";
pub const BLOCK: u64 = 17_000_000;

pub const NULL: &str = NULL_ADDRESS;

pub fn dec(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).expect("valid decimal literal")
}

pub fn transfer(token: &str, from: &str, to: &str, value: &str) -> TransferEvent {
    TransferEvent::new(token, from, to, dec(value)).expect("non-negative transfer")
}

pub fn tx(events: Vec<TransferEvent>) -> TransactionTransfers {
    TransactionTransfers::from_ordered_events(TX_HASH, USER, BLOCK, events)
}

pub fn context(chain_data: InMemoryChainData) -> ClassificationContext {
    ClassificationContext::from_provider(Arc::new(chain_data))
}

/// Pool-token deposit through a zap: the user pays A and B to the pool and the
/// pool token is minted to the user.
pub fn zap_deposit_events() -> Vec<TransferEvent> {
    vec![
        transfer(TOKEN_A, USER, POOL, "1000000000000000000"),
        transfer(TOKEN_B, USER, POOL, "2000000000000000000"),
        transfer(POOL, NULL, USER, "500000000000000000"),
    ]
}

/// Reverse of [`zap_deposit_events`].
pub fn zap_withdraw_events() -> Vec<TransferEvent> {
    vec![
        transfer(POOL, USER, POOL, "500000000000000000"),
        transfer(POOL, POOL, NULL, "500000000000000000"),
        transfer(TOKEN_A, POOL, USER, "1000000000000000000"),
        transfer(TOKEN_B, POOL, USER, "2000000000000000000"),
    ]
}

pub fn priced_chain_data() -> InMemoryChainData {
    InMemoryChainData::new()
        .with_price(TOKEN_A, 1.0, "coingecko")
        .with_price(TOKEN_B, 2.5, "coingecko")
        .with_decimals(TOKEN_B, 6)
        .with_receipt_token_price(POOL, 42.0, "lp_oracle")
        .with_gas_cost(TX_HASH, dec("0.0021"))
}

pub fn assert_decimal_eq(actual: &BigDecimal, expected: &str) -> Result<()> {
    assert_eq!(actual, &BigDecimal::from_str(expected)?);
    Ok(())
}
