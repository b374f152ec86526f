use anyhow::Result;
use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::{ContractInspector, GasOracle, PositionDirectory, PriceOracle, TokenAmountResolver};
use crate::types::TokenPrice;

pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

/// Static chain data implementing every capability.
///
/// Backs the CLI fixtures and tests. All keys are lowercased on the way in, so
/// lookups are case-insensitive.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ChainDataRecord")]
pub struct InMemoryChainData {
    decimals: FxHashMap<String, u32>,
    prices: FxHashMap<String, TokenPrice>,
    receipt_token_prices: FxHashMap<String, TokenPrice>,
    contracts: FxHashSet<String>,
    contract_names: FxHashMap<String, String>,
    gas_costs: FxHashMap<String, BigDecimal>,
    positions: FxHashMap<String, Vec<String>>,
}

impl InMemoryChainData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decimals(mut self, token: &str, decimals: u32) -> Self {
        self.decimals.insert(token.to_lowercase(), decimals);
        self
    }

    pub fn with_price(mut self, token: &str, price: f64, source: &str) -> Self {
        self.prices
            .insert(token.to_lowercase(), TokenPrice::new(price, source));
        self
    }

    pub fn with_receipt_token_price(mut self, token: &str, price: f64, source: &str) -> Self {
        self.receipt_token_prices
            .insert(token.to_lowercase(), TokenPrice::new(price, source));
        self
    }

    pub fn with_contract(mut self, address: &str) -> Self {
        self.contracts.insert(address.to_lowercase());
        self
    }

    pub fn with_contract_name(mut self, address: &str, name: &str) -> Self {
        self.contract_names
            .insert(address.to_lowercase(), name.to_string());
        self
    }

    pub fn with_gas_cost(mut self, tx_hash: &str, cost: BigDecimal) -> Self {
        self.gas_costs.insert(tx_hash.to_lowercase(), cost);
        self
    }

    pub fn with_positions(mut self, user: &str, positions: &[&str]) -> Self {
        self.positions.insert(
            user.to_lowercase(),
            positions.iter().map(|p| p.to_lowercase()).collect(),
        );
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChainDataRecord {
    #[serde(default)]
    decimals: FxHashMap<String, u32>,
    #[serde(default)]
    prices: FxHashMap<String, TokenPrice>,
    #[serde(default)]
    receipt_token_prices: FxHashMap<String, TokenPrice>,
    #[serde(default)]
    contracts: FxHashSet<String>,
    #[serde(default)]
    contract_names: FxHashMap<String, String>,
    #[serde(default)]
    gas_costs: FxHashMap<String, BigDecimal>,
    #[serde(default)]
    positions: FxHashMap<String, Vec<String>>,
}

fn lowercase_keys<V>(map: FxHashMap<String, V>) -> FxHashMap<String, V> {
    map.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect()
}

impl From<ChainDataRecord> for InMemoryChainData {
    fn from(record: ChainDataRecord) -> Self {
        Self {
            decimals: lowercase_keys(record.decimals),
            prices: lowercase_keys(record.prices),
            receipt_token_prices: lowercase_keys(record.receipt_token_prices),
            contracts: record
                .contracts
                .into_iter()
                .map(|c| c.to_lowercase())
                .collect(),
            contract_names: lowercase_keys(record.contract_names),
            gas_costs: lowercase_keys(record.gas_costs),
            positions: record
                .positions
                .into_iter()
                .map(|(user, held)| {
                    (
                        user.to_lowercase(),
                        held.into_iter().map(|p| p.to_lowercase()).collect(),
                    )
                })
                .collect(),
        }
    }
}

#[async_trait]
impl TokenAmountResolver for InMemoryChainData {
    async fn decimal_amount(
        &self,
        token_address: &str,
        raw_value: &BigDecimal,
    ) -> Result<BigDecimal> {
        let decimals = self
            .decimals
            .get(&token_address.to_lowercase())
            .copied()
            .unwrap_or(DEFAULT_TOKEN_DECIMALS);
        let (digits, scale) = raw_value.as_bigint_and_exponent();
        Ok(BigDecimal::new(digits, scale + i64::from(decimals)))
    }
}

#[async_trait]
impl PriceOracle for InMemoryChainData {
    async fn price_at(
        &self,
        token_address: &str,
        _provider_key: &str,
        _block_number: u64,
    ) -> Result<TokenPrice> {
        Ok(self
            .prices
            .get(&token_address.to_lowercase())
            .cloned()
            .unwrap_or_else(TokenPrice::missing))
    }

    async fn receipt_token_price_at(
        &self,
        receipt_token_address: &str,
        _provider_key: &str,
        _block_number: u64,
    ) -> Result<TokenPrice> {
        Ok(self
            .receipt_token_prices
            .get(&receipt_token_address.to_lowercase())
            .cloned()
            .unwrap_or_else(TokenPrice::missing))
    }
}

#[async_trait]
impl ContractInspector for InMemoryChainData {
    async fn is_contract_address(&self, address: &str) -> Result<bool> {
        Ok(self.contracts.contains(&address.to_lowercase()))
    }

    async fn contract_name(&self, address: &str) -> Result<Option<String>> {
        Ok(self.contract_names.get(&address.to_lowercase()).cloned())
    }
}

#[async_trait]
impl GasOracle for InMemoryChainData {
    async fn gas_cost(&self, tx_hash: &str) -> Result<BigDecimal> {
        Ok(self
            .gas_costs
            .get(&tx_hash.to_lowercase())
            .cloned()
            .unwrap_or_else(BigDecimal::zero))
    }
}

#[async_trait]
impl PositionDirectory for InMemoryChainData {
    async fn known_positions(
        &self,
        user_address: &str,
        _provider_key: &str,
    ) -> Result<Vec<String>> {
        Ok(self
            .positions
            .get(&user_address.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}
