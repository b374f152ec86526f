use anyhow::Context;
use futures::future::try_join_all;
use rustc_hash::FxHashSet;

use crate::config::ClassifierConfig;
use crate::context::ClassificationContext;
use crate::core::constants::MINT_BURN_TOKEN_COUNT;
use crate::core::error::ClassifierError;
use crate::core::event_relations::EventRelations;
use crate::core::token_groups::TokenGroups;
use crate::core::utils::add_tracked_underlying_tag;
use crate::types::{OperationType, TokenInfo, TransferEvent};

/// Shared primitives used by the concrete classifiers.
#[derive(Clone)]
pub struct BaseClassifier {
    context: ClassificationContext,
    provider_key: String,
    smart_wallet_names: Vec<String>,
}

impl BaseClassifier {
    pub fn new(context: ClassificationContext, config: &ClassifierConfig) -> Self {
        Self {
            context,
            provider_key: config.provider_key.clone(),
            smart_wallet_names: config.smart_wallet_contract_names.clone(),
        }
    }

    pub fn context(&self) -> &ClassificationContext {
        &self.context
    }

    /// Key used for price and known-position lookups.
    pub fn provider_key(&self) -> &str {
        &self.provider_key
    }

    /// Infers the operation type; `None` means the events cannot be classified.
    pub async fn infer_operation_type(
        &self,
        relations: &EventRelations,
        events: &[&TransferEvent],
    ) -> Result<Option<OperationType>, ClassifierError> {
        if let Some(operation) = Self::deposit_or_withdraw_type(relations, events) {
            return Ok(Some(operation));
        }
        self.transfer_or_null_type(relations, events).await
    }

    /// Swap-mediated mint or burn: three distinct tokens, one of them the
    /// receipt token minted to the user or burned.
    pub fn deposit_or_withdraw_type(
        relations: &EventRelations,
        events: &[&TransferEvent],
    ) -> Option<OperationType> {
        let groups = TokenGroups::new(events.iter().copied());
        if groups.len() != MINT_BURN_TOKEN_COUNT {
            return None;
        }
        if events.iter().any(|e| relations.is_receipt_token_mint(e)) {
            return Some(OperationType::Deposit);
        }
        if events.iter().any(|e| relations.is_receipt_token_burn(e)) {
            return Some(OperationType::Withdraw);
        }
        None
    }

    async fn transfer_or_null_type(
        &self,
        relations: &EventRelations,
        events: &[&TransferEvent],
    ) -> Result<Option<OperationType>, ClassifierError> {
        let sent = relations.events_from_user(events.iter().copied());
        if !sent.is_empty() {
            let recipients = sent.iter().map(|e| e.to());
            return Ok(Some(if self.any_contract_counterparty(recipients).await? {
                OperationType::NullOp
            } else {
                OperationType::TransferOut
            }));
        }

        let received = relations.events_to_user(events.iter().copied());
        if !received.is_empty() {
            let senders = received.iter().map(|e| e.from());
            return Ok(Some(if self.any_contract_counterparty(senders).await? {
                OperationType::NullOp
            } else {
                OperationType::TransferIn
            }));
        }

        tracing::debug!("no transfer involves user {}", relations.user_address());
        Ok(None)
    }

    async fn any_contract_counterparty<'a>(
        &self,
        addresses: impl Iterator<Item = &'a str>,
    ) -> Result<bool, ClassifierError> {
        let mut checked: FxHashSet<&str> = FxHashSet::default();
        for address in addresses {
            if !checked.insert(address) {
                continue;
            }
            let flagged = self
                .context
                .contracts
                .is_contract_or_smart_wallet(address, &self.smart_wallet_names)
                .await
                .with_context(|| format!("contract lookup failed for {address}"))?;
            if flagged {
                tracing::debug!("counterparty {address} is a contract or smart wallet");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Events that count as inputs for the given operation type.
    pub fn select_input_events<'a>(
        relations: &EventRelations,
        events: &[&'a TransferEvent],
        operation_type: OperationType,
    ) -> Vec<&'a TransferEvent> {
        events
            .iter()
            .copied()
            .filter(|event| {
                let receipt = relations.is_receipt_token_transfer(event);
                if operation_type == OperationType::NullOp {
                    if receipt && relations.is_from_user(event) {
                        return true;
                    }
                } else if relations.is_to_protocol(event) && !receipt {
                    return true;
                }
                relations.is_to_null(event) && receipt
            })
            .collect()
    }

    /// Events that count as outputs for the given operation type.
    pub fn select_output_events<'a>(
        relations: &EventRelations,
        events: &[&'a TransferEvent],
        operation_type: OperationType,
    ) -> Vec<&'a TransferEvent> {
        events
            .iter()
            .copied()
            .filter(|event| {
                if operation_type == OperationType::NullOp {
                    relations.is_to_user(event) && relations.is_receipt_token_transfer(event)
                } else {
                    relations.is_underlying_token_transfer(event)
                        || (relations.is_from_null(event) && relations.is_to_user(event))
                }
            })
            .collect()
    }

    pub async fn extract_input_tokens(
        &self,
        relations: &EventRelations,
        events: &[&TransferEvent],
        operation_type: OperationType,
        block_number: u64,
    ) -> Result<Vec<TokenInfo>, ClassifierError> {
        let selected = Self::select_input_events(relations, events, operation_type);
        let tokens = self.resolve_token_infos(relations, &selected, block_number).await?;
        Ok(if operation_type.is_deposit_or_transfer_in() {
            add_tracked_underlying_tag(tokens)
        } else {
            tokens
        })
    }

    pub async fn extract_output_tokens(
        &self,
        relations: &EventRelations,
        events: &[&TransferEvent],
        operation_type: OperationType,
        block_number: u64,
    ) -> Result<Vec<TokenInfo>, ClassifierError> {
        let selected = Self::select_output_events(relations, events, operation_type);
        let tokens = self.resolve_token_infos(relations, &selected, block_number).await?;
        Ok(if operation_type.is_withdraw_or_transfer_out() {
            add_tracked_underlying_tag(tokens)
        } else {
            tokens
        })
    }

    /// Resolves all events concurrently, keeping input order.
    pub async fn resolve_token_infos(
        &self,
        relations: &EventRelations,
        events: &[&TransferEvent],
        block_number: u64,
    ) -> Result<Vec<TokenInfo>, ClassifierError> {
        try_join_all(
            events
                .iter()
                .map(|event| self.token_info(relations, event, block_number)),
        )
        .await
    }

    /// Decimal-normalized amount priced at `block_number`.
    pub async fn token_info(
        &self,
        relations: &EventRelations,
        event: &TransferEvent,
        block_number: u64,
    ) -> Result<TokenInfo, ClassifierError> {
        let token = event.token_address();
        let amount = self
            .context
            .amounts
            .decimal_amount(token, event.value())
            .await
            .with_context(|| format!("decimal lookup failed for {token}"))?;

        let prices = &self.context.prices;
        let lookup = if relations.is_receipt_token_transfer(event) {
            prices
                .receipt_token_price_at(token, &self.provider_key, block_number)
                .await
        } else {
            prices.price_at(token, &self.provider_key, block_number).await
        };
        let price = lookup
            .with_context(|| format!("price lookup failed for {token} at block {block_number}"))?;

        if price.is_missing() {
            tracing::warn!("no price for {token} at block {block_number}, using zero");
        }

        Ok(TokenInfo::new(token, amount, price))
    }
}
