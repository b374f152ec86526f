use bigdecimal::BigDecimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("negative transfer value {value} for token {token}")]
    NegativeTransferValue { token: String, value: String },
    #[error("invalid classifier configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to deserialize value: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    External(#[from] anyhow::Error),
}

impl ClassifierError {
    pub fn negative_value(token: impl Into<String>, value: &BigDecimal) -> Self {
        Self::NegativeTransferValue {
            token: token.into(),
            value: value.to_string(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
