use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::PositionDirectory;

/// Memoizes [`PositionDirectory`] lookups per user and protocol.
///
/// Failed lookups are not cached, so a transient error is retried on the next
/// call.
pub struct CachedPositionDirectory {
    inner: Arc<dyn PositionDirectory>,
    entries: RwLock<HashMap<String, Vec<String>>>,
}

impl CachedPositionDirectory {
    pub fn new(inner: Arc<dyn PositionDirectory>) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn cache_key(user_address: &str, provider_key: &str) -> String {
        format!(
            "USER_LP_POSITIONS_{}_{}",
            user_address.to_lowercase(),
            provider_key
        )
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn invalidate(&self, user_address: &str, provider_key: &str) {
        self.entries
            .write()
            .await
            .remove(&Self::cache_key(user_address, provider_key));
    }
}

#[async_trait]
impl PositionDirectory for CachedPositionDirectory {
    async fn known_positions(&self, user_address: &str, provider_key: &str) -> Result<Vec<String>> {
        let key = Self::cache_key(user_address, provider_key);
        if let Some(positions) = self.entries.read().await.get(&key) {
            tracing::debug!("position cache hit: {key}");
            return Ok(positions.clone());
        }

        let positions = self
            .inner
            .known_positions(user_address, provider_key)
            .await?;
        self.entries.write().await.insert(key, positions.clone());
        Ok(positions)
    }
}
