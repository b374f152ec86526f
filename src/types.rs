use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use crate::core::error::ClassifierError;

/// Single decoded ERC-20 style transfer with lowercased addresses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TransferEventRecord")]
pub struct TransferEvent {
    token_address: String,
    from: String,
    to: String,
    value: BigDecimal,
}

impl TransferEvent {
    pub fn new(
        token_address: impl AsRef<str>,
        from: impl AsRef<str>,
        to: impl AsRef<str>,
        value: BigDecimal,
    ) -> Result<Self, ClassifierError> {
        let token_address = token_address.as_ref().to_lowercase();
        if value < BigDecimal::zero() {
            return Err(ClassifierError::negative_value(token_address, &value));
        }
        Ok(Self {
            token_address,
            from: from.as_ref().to_lowercase(),
            to: to.as_ref().to_lowercase(),
            value,
        })
    }

    pub fn token_address(&self) -> &str {
        &self.token_address
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn value(&self) -> &BigDecimal {
        &self.value
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferEventRecord {
    token_address: String,
    from: String,
    to: String,
    value: BigDecimal,
}

impl TryFrom<TransferEventRecord> for TransferEvent {
    type Error = ClassifierError;

    fn try_from(record: TransferEventRecord) -> Result<Self, Self::Error> {
        Self::new(record.token_address, record.from, record.to, record.value)
    }
}

/// Transfer event tagged with its position in the transaction receipt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferLog {
    pub log_index: u64,
    #[serde(flatten)]
    pub event: TransferEvent,
}

impl TransferLog {
    pub fn new(log_index: u64, event: TransferEvent) -> Self {
        Self { log_index, event }
    }
}

/// All transfer logs emitted by one transaction, ordered by log index.
///
/// The zap-aware classifier relies on the first and last transfer of each
/// token, so the ordering is established here once rather than trusted from
/// the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TransactionTransfersRecord")]
pub struct TransactionTransfers {
    tx_hash: String,
    sender: String,
    block_number: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_data: Option<String>,
    logs: Vec<TransferLog>,
}

impl TransactionTransfers {
    pub fn new(
        tx_hash: impl Into<String>,
        sender: impl AsRef<str>,
        block_number: u64,
        mut logs: Vec<TransferLog>,
    ) -> Self {
        logs.sort_by_key(|log| log.log_index);
        Self {
            tx_hash: tx_hash.into(),
            sender: sender.as_ref().to_lowercase(),
            block_number,
            input_data: None,
            logs,
        }
    }

    /// Builds the transfer list from events already in receipt order.
    pub fn from_ordered_events(
        tx_hash: impl Into<String>,
        sender: impl AsRef<str>,
        block_number: u64,
        events: Vec<TransferEvent>,
    ) -> Self {
        let logs = events
            .into_iter()
            .enumerate()
            .map(|(idx, event)| TransferLog::new(idx as u64, event))
            .collect();
        Self::new(tx_hash, sender, block_number, logs)
    }

    pub fn with_input_data(mut self, input_data: impl AsRef<str>) -> Self {
        self.input_data = Some(input_data.as_ref().to_lowercase());
        self
    }

    pub fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn input_data(&self) -> Option<&str> {
        self.input_data.as_deref()
    }

    pub fn logs(&self) -> &[TransferLog] {
        &self.logs
    }

    pub fn events(&self) -> Vec<&TransferEvent> {
        self.logs.iter().map(|log| &log.event).collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionTransfersRecord {
    tx_hash: String,
    sender: String,
    block_number: u64,
    #[serde(default)]
    input_data: Option<String>,
    #[serde(default)]
    logs: Vec<TransferLog>,
}

impl From<TransactionTransfersRecord> for TransactionTransfers {
    fn from(record: TransactionTransfersRecord) -> Self {
        let tx = Self::new(record.tx_hash, record.sender, record.block_number, record.logs);
        match record.input_data {
            Some(data) => tx.with_input_data(data),
            None => tx,
        }
    }
}

/// Position-affecting operation kinds.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Deposit,
    Withdraw,
    TransferIn,
    TransferOut,
    NullOp,
}

impl OperationType {
    pub fn is_deposit_or_transfer_in(self) -> bool {
        matches!(self, Self::Deposit | Self::TransferIn)
    }

    pub fn is_withdraw_or_transfer_out(self) -> bool {
        matches!(self, Self::Withdraw | Self::TransferOut)
    }

    pub fn is_deposit_or_withdraw(self) -> bool {
        matches!(self, Self::Deposit | Self::Withdraw)
    }
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenTag {
    TrackedUnderlying,
}

/// Price quote returned by a [`crate::context::PriceOracle`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    pub price: f64,
    pub source: String,
}

impl TokenPrice {
    pub const MISSING_SOURCE: &'static str = "not_found";

    pub fn new(price: f64, source: impl Into<String>) -> Self {
        Self {
            price,
            source: source.into(),
        }
    }

    /// Zero-price sentinel for tokens the oracle cannot price.
    pub fn missing() -> Self {
        Self::new(0.0, Self::MISSING_SOURCE)
    }

    pub fn is_missing(&self) -> bool {
        self.source == Self::MISSING_SOURCE
    }
}

/// Priced, decimal-normalized token movement.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub address: String,
    pub price_usd: f64,
    pub amount: BigDecimal,
    pub price_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<TokenTag>,
}

impl TokenInfo {
    pub fn new(address: impl Into<String>, amount: BigDecimal, price: TokenPrice) -> Self {
        Self {
            address: address.into(),
            price_usd: price.price,
            amount,
            price_source: price.source,
            tag: None,
        }
    }

    pub fn is_tracked_underlying(&self) -> bool {
        self.tag == Some(TokenTag::TrackedUnderlying)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(rename = "type")]
    pub operation_type: OperationType,
    pub input_tokens: Vec<TokenInfo>,
    pub output_tokens: Vec<TokenInfo>,
    pub share_amount_delta: BigDecimal,
}

/// Position-share token priced at classification time.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionShares {
    pub position_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<f64>,
}

impl PositionShares {
    pub fn priced(position_identifier: impl Into<String>, price_usd: f64) -> Self {
        Self {
            position_identifier: position_identifier.into(),
            price_usd: Some(price_usd),
        }
    }

    /// Placeholder used when the share token did not move in the transaction.
    pub fn nil(position_identifier: impl Into<String>) -> Self {
        Self {
            position_identifier: position_identifier.into(),
            price_usd: None,
        }
    }

    pub fn is_nil(&self) -> bool {
        self.price_usd.is_none()
    }
}

/// Result of classifying one transaction for one protocol.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub operations: Vec<Operation>,
    pub position_identifier: String,
    pub gas_cost: BigDecimal,
    pub position_shares: PositionShares,
}

impl Classification {
    /// Operation type of the primary operation.
    pub fn operation_type(&self) -> Option<OperationType> {
        self.operations.first().map(|op| op.operation_type)
    }
}
