use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::constants::{
    DEFAULT_PROTOCOL_KEY, DEFAULT_PROVIDER_KEY, METHOD_ID_LEN, SMART_WALLET_CONTRACT_NAMES,
    ZAP_COUNTER_TOKENS,
};
use crate::core::error::ClassifierError;

/// Classifier configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    /// Identifies the classified protocol.
    #[serde(default = "ClassifierConfig::default_protocol_key")]
    pub protocol_key: String,
    /// Key passed to price and known-position lookups.
    #[serde(default = "ClassifierConfig::default_provider_key")]
    pub provider_key: String,
    #[serde(default)]
    pub zap: ZapConfig,
    #[serde(default = "ClassifierConfig::default_fallback_enabled")]
    pub fallback_enabled: bool,
    #[serde(default = "ClassifierConfig::default_smart_wallet_names")]
    pub smart_wallet_contract_names: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ZapConfig {
    #[serde(default = "ZapConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "ZapConfig::default_required_counter_tokens")]
    pub required_counter_tokens: usize,
    /// When set, only transactions calling one of these selectors are
    /// considered zaps.
    #[serde(default)]
    pub method_ids: Option<Vec<String>>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            protocol_key: Self::default_protocol_key(),
            provider_key: Self::default_provider_key(),
            zap: ZapConfig::default(),
            fallback_enabled: Self::default_fallback_enabled(),
            smart_wallet_contract_names: Self::default_smart_wallet_names(),
        }
    }
}

impl Default for ZapConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            required_counter_tokens: Self::default_required_counter_tokens(),
            method_ids: None,
        }
    }
}

impl ClassifierConfig {
    fn default_protocol_key() -> String {
        DEFAULT_PROTOCOL_KEY.to_string()
    }

    fn default_provider_key() -> String {
        DEFAULT_PROVIDER_KEY.to_string()
    }

    const fn default_fallback_enabled() -> bool {
        true
    }

    fn default_smart_wallet_names() -> Vec<String> {
        SMART_WALLET_CONTRACT_NAMES
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn for_protocol(protocol_key: impl Into<String>) -> Self {
        Self {
            protocol_key: protocol_key.into(),
            ..Self::default()
        }
    }

    pub fn with_provider_key(mut self, provider_key: impl Into<String>) -> Self {
        self.provider_key = provider_key.into();
        self
    }

    pub fn from_json_str(data: &str) -> Result<Self, ClassifierError> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.protocol_key.trim().is_empty() {
            return Err(ClassifierError::invalid_config("protocolKey must not be empty"));
        }
        if self.provider_key.trim().is_empty() {
            return Err(ClassifierError::invalid_config("providerKey must not be empty"));
        }
        if self.zap.required_counter_tokens == 0 {
            return Err(ClassifierError::invalid_config(
                "zap.requiredCounterTokens must be at least 1",
            ));
        }
        if let Some(method_ids) = &self.zap.method_ids {
            for method_id in method_ids {
                let valid = method_id.len() == METHOD_ID_LEN
                    && method_id.starts_with("0x")
                    && hex::decode(&method_id[2..]).is_ok();
                if !valid {
                    return Err(ClassifierError::invalid_config(format!(
                        "invalid zap method id {method_id}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl ZapConfig {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_required_counter_tokens() -> usize {
        ZAP_COUNTER_TOKENS
    }

    /// True when the transaction input passes the method-id allowlist.
    pub fn accepts_input(&self, input_data: Option<&str>) -> bool {
        let Some(method_ids) = &self.method_ids else {
            return true;
        };
        let Some(input) = input_data else {
            return false;
        };
        method_ids
            .iter()
            .any(|id| input.starts_with(id.to_lowercase().as_str()))
    }
}
