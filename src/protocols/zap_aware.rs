use async_trait::async_trait;

use crate::config::{ClassifierConfig, ZapConfig};
use crate::context::ClassificationContext;
use crate::core::base_classifier::BaseClassifier;
use crate::core::constants::is_null_address;
use crate::core::error::ClassifierError;
use crate::core::event_relations::EventRelations;
use crate::core::token_groups::TokenGroups;
use crate::core::utils::{
    add_tracked_underlying_tag, extract_operation_default_strategy,
    extract_position_shares_default_strategy,
};
use crate::types::{Classification, OperationType, TransactionTransfers, TransferEvent};

use super::{ClassifierOutcome, TransferLogClassifier};

/// Classifies swap-mediated deposits and withdrawals without knowing the
/// receipt token up front.
///
/// The receipt token is the one whose transfers open with a mint and end at
/// the sender (deposit), or open at the sender and end in a burn (withdraw).
pub struct ZapAwareClassifier {
    base: BaseClassifier,
    zap: ZapConfig,
}

/// Events picked out of a transaction that matched the zap pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct ZapShape<'a> {
    pub receipt_token: &'a str,
    pub operation_type: OperationType,
    pub receipt_event: &'a TransferEvent,
    pub underlying_events: Vec<&'a TransferEvent>,
}

impl ZapAwareClassifier {
    pub fn new(context: ClassificationContext, config: &ClassifierConfig) -> Self {
        Self {
            base: BaseClassifier::new(context, config),
            zap: config.zap.clone(),
        }
    }

    pub fn boxed(
        context: ClassificationContext,
        config: &ClassifierConfig,
    ) -> Box<dyn TransferLogClassifier> {
        Box::new(Self::new(context, config))
    }

    /// First transfer comes from the null address, last one lands at the user.
    pub fn is_mint(events: &[&TransferEvent], user: &str) -> bool {
        match (events.first(), events.last()) {
            (Some(first), Some(last)) => is_null_address(first.from()) && last.to() == user,
            _ => false,
        }
    }

    /// First transfer leaves the user, last one lands at the null address.
    pub fn is_burn(events: &[&TransferEvent], user: &str) -> bool {
        match (events.first(), events.last()) {
            (Some(first), Some(last)) => first.from() == user && is_null_address(last.to()),
            _ => false,
        }
    }

    /// Token whose group matches the mint or burn pattern, in first-appearance
    /// order.
    pub fn detect_receipt_token<'a>(
        groups: &TokenGroups<'a>,
        user: &str,
    ) -> Option<(&'a str, OperationType)> {
        groups.iter().find_map(|(token, events)| {
            if Self::is_mint(events, user) {
                Some((token, OperationType::Deposit))
            } else if Self::is_burn(events, user) {
                Some((token, OperationType::Withdraw))
            } else {
                None
            }
        })
    }

    /// Matches the zap pattern and enforces the counter-token count.
    pub fn match_shape<'a>(
        events: &[&'a TransferEvent],
        user: &str,
        required_counter_tokens: usize,
    ) -> Option<ZapShape<'a>> {
        let groups = TokenGroups::new(events.iter().copied());
        let (receipt_token, operation_type) = Self::detect_receipt_token(&groups, user)?;
        let relations = EventRelations::new(user, receipt_token);

        let receipt_event = groups.get(receipt_token)?.last().copied()?;
        let underlying_events: Vec<&'a TransferEvent> = groups
            .iter()
            .filter(|(token, _)| *token != receipt_token)
            .filter_map(|(_, group)| {
                group
                    .iter()
                    .rev()
                    .find(|event| match operation_type {
                        OperationType::Deposit => relations.is_to_protocol(event),
                        _ => relations.is_from_protocol(event),
                    })
                    .copied()
            })
            .collect();

        if underlying_events.len() != required_counter_tokens {
            tracing::debug!(
                "zap {:?} on {} rejected: {} counter tokens, expected {}",
                operation_type,
                receipt_token,
                underlying_events.len(),
                required_counter_tokens
            );
            return None;
        }

        Some(ZapShape {
            receipt_token,
            operation_type,
            receipt_event,
            underlying_events,
        })
    }
}

#[async_trait]
impl TransferLogClassifier for ZapAwareClassifier {
    fn name(&self) -> &'static str {
        "zap_aware"
    }

    async fn classify(
        &self,
        tx: &TransactionTransfers,
    ) -> Result<ClassifierOutcome, ClassifierError> {
        if !self.zap.accepts_input(tx.input_data()) {
            tracing::debug!("{}: method id not in zap allowlist", tx.tx_hash());
            return Ok(ClassifierOutcome::Declined);
        }

        let events = tx.events();
        let Some(shape) =
            Self::match_shape(&events, tx.sender(), self.zap.required_counter_tokens)
        else {
            return Ok(ClassifierOutcome::Declined);
        };

        let relations = EventRelations::new(tx.sender(), shape.receipt_token);
        let block_number = tx.block_number();
        let receipt_events = [shape.receipt_event];

        let (receipt_tokens, underlying_tokens, gas_cost) = tokio::try_join!(
            self.base
                .resolve_token_infos(&relations, &receipt_events, block_number),
            self.base
                .resolve_token_infos(&relations, &shape.underlying_events, block_number),
            async {
                self.base
                    .context()
                    .gas
                    .gas_cost(tx.tx_hash())
                    .await
                    .map_err(ClassifierError::from)
            },
        )?;
        let underlying_tokens = add_tracked_underlying_tag(underlying_tokens);

        let (input_tokens, output_tokens) = match shape.operation_type {
            OperationType::Deposit => (underlying_tokens, receipt_tokens),
            _ => (receipt_tokens, underlying_tokens),
        };

        let position_identifier = shape.receipt_token.to_string();
        let position_shares =
            extract_position_shares_default_strategy(&input_tokens, &output_tokens, &position_identifier);
        let operation = extract_operation_default_strategy(
            input_tokens,
            output_tokens,
            &position_identifier,
            shape.operation_type,
        );

        tracing::debug!(
            "{}: zap {:?} on {}",
            tx.tx_hash(),
            shape.operation_type,
            position_identifier
        );

        Ok(ClassifierOutcome::Classified(Classification {
            operations: vec![operation],
            position_identifier,
            gas_cost,
            position_shares,
        }))
    }
}
