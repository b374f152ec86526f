mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use common::*;
use lp_transfer_classifier::context::{CachedPositionDirectory, PositionDirectory};
use lp_transfer_classifier::{ClassificationPipeline, ClassifierConfig};

#[derive(Default)]
struct Directory {
    calls: AtomicUsize,
    fail_first: bool,
}

#[async_trait]
impl PositionDirectory for Directory {
    async fn known_positions(&self, _user: &str, _protocol: &str) -> Result<Vec<String>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_first && call == 0 {
            bail!("directory offline");
        }
        Ok(vec![POOL.to_string()])
    }
}

#[test]
fn cache_key_is_per_user_and_protocol() {
    let key = CachedPositionDirectory::cache_key(
        "0xAbCdEf0000000000000000000000000000000000",
        "uniswap_v2_eth",
    );
    insta::assert_snapshot!(key, @"USER_LP_POSITIONS_0xabcdef0000000000000000000000000000000000_uniswap_v2_eth");
}

#[tokio::test]
async fn repeated_lookups_hit_the_cache() -> Result<()> {
    let inner = Arc::new(Directory::default());
    let cached = CachedPositionDirectory::new(inner.clone());

    assert_eq!(cached.known_positions(USER, "uniswap_v2_eth").await?, vec![POOL]);
    assert_eq!(cached.known_positions(USER, "uniswap_v2_eth").await?, vec![POOL]);
    assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

    cached.known_positions(USER, "sushiswap_eth").await?;
    assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    assert_eq!(cached.len().await, 2);

    cached.invalidate(USER, "uniswap_v2_eth").await;
    cached.known_positions(USER, "uniswap_v2_eth").await?;
    assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    Ok(())
}

#[tokio::test]
async fn failures_are_not_cached() -> Result<()> {
    let inner = Arc::new(Directory {
        fail_first: true,
        ..Directory::default()
    });
    let cached = CachedPositionDirectory::new(inner.clone());

    assert!(cached.known_positions(USER, "uniswap_v2_eth").await.is_err());
    assert_eq!(cached.len().await, 0);
    assert_eq!(cached.known_positions(USER, "uniswap_v2_eth").await?, vec![POOL]);
    assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn fallback_caches_under_provider_key() -> Result<()> {
    let inner = Arc::new(Directory::default());
    let cached = Arc::new(CachedPositionDirectory::new(inner.clone()));
    let mut config = ClassifierConfig::default();
    config.zap.enabled = false;
    let pipeline = ClassificationPipeline::new(
        context(priced_chain_data()).with_positions(cached.clone()),
        &config,
    )?;

    pipeline.classify(&tx(zap_deposit_events())).await?;
    pipeline.classify(&tx(zap_deposit_events())).await?;
    assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

    cached.invalidate(USER, "uniswap_v2_eth").await;
    assert_eq!(cached.len().await, 1);
    cached.invalidate(USER, "uniswap_eth").await;
    assert_eq!(cached.len().await, 0);
    Ok(())
}
