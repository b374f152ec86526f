use anyhow::Context;
use async_trait::async_trait;
use rustc_hash::FxHashSet;

use crate::config::ClassifierConfig;
use crate::context::ClassificationContext;
use crate::core::base_classifier::BaseClassifier;
use crate::core::error::ClassifierError;
use crate::core::event_relations::EventRelations;
use crate::core::token_groups::TokenGroups;
use crate::core::utils::{
    extract_operation_default_strategy, extract_position_shares_default_strategy,
};
use crate::types::{Classification, TransactionTransfers, TransferEvent};

use super::{ClassifierOutcome, TransferLogClassifier};

/// Generic classifier keyed off the positions the user is known to hold.
pub struct FallbackClassifier {
    base: BaseClassifier,
}

impl FallbackClassifier {
    pub fn new(context: ClassificationContext, config: &ClassifierConfig) -> Self {
        Self {
            base: BaseClassifier::new(context, config),
        }
    }

    pub fn boxed(
        context: ClassificationContext,
        config: &ClassifierConfig,
    ) -> Box<dyn TransferLogClassifier> {
        Box::new(Self::new(context, config))
    }

    /// First transferred token, in first-appearance order, that is a known
    /// position of the user.
    pub fn match_position_identifier<'a>(
        events: &[&'a TransferEvent],
        known_positions: &[String],
    ) -> Option<&'a str> {
        let known: FxHashSet<String> = known_positions
            .iter()
            .map(|position| position.to_lowercase())
            .collect();
        let groups = TokenGroups::new(events.iter().copied());
        for token in groups.tokens() {
            if known.contains(token) {
                return Some(token);
            }
        }
        None
    }

    async fn resolve_position_identifier(
        &self,
        tx: &TransactionTransfers,
        events: &[&TransferEvent],
    ) -> Result<Option<String>, ClassifierError> {
        let provider_key = self.base.provider_key();
        let known_positions = self
            .base
            .context()
            .positions
            .known_positions(tx.sender(), provider_key)
            .await
            .with_context(|| {
                format!(
                    "position lookup failed for {} on {}",
                    tx.sender(),
                    provider_key
                )
            })?;
        Ok(Self::match_position_identifier(events, &known_positions).map(str::to_string))
    }
}

#[async_trait]
impl TransferLogClassifier for FallbackClassifier {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn classify(
        &self,
        tx: &TransactionTransfers,
    ) -> Result<ClassifierOutcome, ClassifierError> {
        let events = tx.events();
        let Some(position_identifier) = self.resolve_position_identifier(tx, &events).await? else {
            tracing::debug!("{}: no known position among transferred tokens", tx.tx_hash());
            return Ok(ClassifierOutcome::Declined);
        };

        let relations = EventRelations::new(tx.sender(), &position_identifier);
        let Some(operation_type) = self.base.infer_operation_type(&relations, &events).await?
        else {
            tracing::debug!(
                "{}: no operation type for position {}",
                tx.tx_hash(),
                position_identifier
            );
            return Ok(ClassifierOutcome::Declined);
        };

        let block_number = tx.block_number();
        let (input_tokens, output_tokens, gas_cost) = tokio::try_join!(
            self.base
                .extract_input_tokens(&relations, &events, operation_type, block_number),
            self.base
                .extract_output_tokens(&relations, &events, operation_type, block_number),
            async {
                self.base
                    .context()
                    .gas
                    .gas_cost(tx.tx_hash())
                    .await
                    .map_err(ClassifierError::from)
            },
        )?;

        let position_shares =
            extract_position_shares_default_strategy(&input_tokens, &output_tokens, &position_identifier);
        let operation = extract_operation_default_strategy(
            input_tokens,
            output_tokens,
            &position_identifier,
            operation_type,
        );

        tracing::debug!(
            "{}: {:?} on position {}",
            tx.tx_hash(),
            operation_type,
            relations.position_identifier()
        );

        Ok(ClassifierOutcome::Classified(Classification {
            operations: vec![operation],
            position_identifier,
            gas_cost,
            position_shares,
        }))
    }
}
