//! Classifies the ERC-20 transfer logs of a transaction into liquidity-position
//! operations (deposit, withdraw, transfer in/out) for downstream accounting.

pub mod config;
pub mod context;
pub mod core;
pub mod protocols;
pub mod types;

pub use crate::config::{ClassifierConfig, ZapConfig};
pub use crate::context::{ClassificationContext, InMemoryChainData};
pub use crate::core::error::ClassifierError;
pub use crate::core::pipeline::{ClassificationPipeline, TransactionClassification};
pub use crate::protocols::{ClassifierOutcome, TransferLogClassifier};
pub use crate::types::{
    Classification, Operation, OperationType, PositionShares, TokenInfo, TokenPrice, TokenTag,
    TransactionTransfers, TransferEvent, TransferLog,
};
