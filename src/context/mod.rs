//! Injected capabilities the classifiers depend on.
//!
//! Chain access lives outside this crate; classifiers only see these traits.

pub mod cache;
pub mod memory;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::types::TokenPrice;

pub use cache::CachedPositionDirectory;
pub use memory::InMemoryChainData;

/// Decimal normalization of raw integer transfer values.
#[async_trait]
pub trait TokenAmountResolver: Send + Sync {
    async fn decimal_amount(&self, token_address: &str, raw_value: &BigDecimal)
        -> Result<BigDecimal>;
}

/// USD price lookups. Implementations return [`TokenPrice::missing`] for
/// tokens they cannot price instead of failing.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn price_at(
        &self,
        token_address: &str,
        provider_key: &str,
        block_number: u64,
    ) -> Result<TokenPrice>;

    async fn receipt_token_price_at(
        &self,
        receipt_token_address: &str,
        provider_key: &str,
        block_number: u64,
    ) -> Result<TokenPrice>;
}

#[async_trait]
pub trait ContractInspector: Send + Sync {
    async fn is_contract_address(&self, address: &str) -> Result<bool>;

    /// Verified contract name, if any.
    async fn contract_name(&self, address: &str) -> Result<Option<String>>;

    async fn is_contract_or_smart_wallet(
        &self,
        address: &str,
        smart_wallet_names: &[String],
    ) -> Result<bool> {
        if self.is_contract_address(address).await? {
            return Ok(true);
        }
        Ok(self
            .contract_name(address)
            .await?
            .is_some_and(|name| smart_wallet_names.iter().any(|known| *known == name)))
    }
}

#[async_trait]
pub trait GasOracle: Send + Sync {
    async fn gas_cost(&self, tx_hash: &str) -> Result<BigDecimal>;
}

/// Position addresses a user is known to hold for a protocol.
#[async_trait]
pub trait PositionDirectory: Send + Sync {
    async fn known_positions(&self, user_address: &str, provider_key: &str) -> Result<Vec<String>>;
}

/// Bundle of capabilities shared by all classifiers of a pipeline.
#[derive(Clone)]
pub struct ClassificationContext {
    pub amounts: Arc<dyn TokenAmountResolver>,
    pub prices: Arc<dyn PriceOracle>,
    pub contracts: Arc<dyn ContractInspector>,
    pub gas: Arc<dyn GasOracle>,
    pub positions: Arc<dyn PositionDirectory>,
}

impl ClassificationContext {
    pub fn new(
        amounts: Arc<dyn TokenAmountResolver>,
        prices: Arc<dyn PriceOracle>,
        contracts: Arc<dyn ContractInspector>,
        gas: Arc<dyn GasOracle>,
        positions: Arc<dyn PositionDirectory>,
    ) -> Self {
        Self {
            amounts,
            prices,
            contracts,
            gas,
            positions,
        }
    }

    /// Uses one provider for every capability.
    pub fn from_provider<P>(provider: Arc<P>) -> Self
    where
        P: TokenAmountResolver
            + PriceOracle
            + ContractInspector
            + GasOracle
            + PositionDirectory
            + 'static,
    {
        Self {
            amounts: provider.clone(),
            prices: provider.clone(),
            contracts: provider.clone(),
            gas: provider.clone(),
            positions: provider,
        }
    }

    pub fn with_positions(mut self, positions: Arc<dyn PositionDirectory>) -> Self {
        self.positions = positions;
        self
    }
}
