/// Canonical null address used as the mint source and burn destination.
pub const NULL_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

pub const DEFAULT_PROTOCOL_KEY: &str = "uniswap_v2_eth";

/// Key the price and position providers index this protocol under.
pub const DEFAULT_PROVIDER_KEY: &str = "uniswap_eth";

/// Contract names reported for smart-contract wallets.
pub const SMART_WALLET_CONTRACT_NAMES: &[&str] = &["Proxy", "InstaAccount"];

/// A zap deposit pairs one receipt token with this many underlying tokens.
pub const ZAP_COUNTER_TOKENS: usize = 2;

/// Number of distinct tokens in a swap-mediated mint or burn.
pub const MINT_BURN_TOKEN_COUNT: usize = 3;

/// Length of a `0x`-prefixed function selector.
pub const METHOD_ID_LEN: usize = 10;

pub fn is_null_address(address: &str) -> bool {
    address == NULL_ADDRESS
}
