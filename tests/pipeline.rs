mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use bigdecimal::BigDecimal;

use common::*;
use lp_transfer_classifier::context::{GasOracle, PositionDirectory, PriceOracle};
use lp_transfer_classifier::{
    ClassificationContext, ClassificationPipeline, ClassifierConfig, ClassifierError,
    ClassifierOutcome, InMemoryChainData, OperationType, TokenPrice, TransactionTransfers,
    TransferLogClassifier,
};

/// Records the provider key of every price and position lookup.
struct KeyRecorder {
    chain_data: InMemoryChainData,
    keys: Mutex<Vec<String>>,
}

impl KeyRecorder {
    fn record(&self, entry: String) {
        self.keys.lock().expect("key log").push(entry);
    }

    fn keys(&self) -> Vec<String> {
        self.keys.lock().expect("key log").clone()
    }
}

#[async_trait]
impl PriceOracle for KeyRecorder {
    async fn price_at(&self, token: &str, provider_key: &str, block: u64) -> Result<TokenPrice> {
        self.record(format!("price:{provider_key}"));
        self.chain_data.price_at(token, provider_key, block).await
    }

    async fn receipt_token_price_at(
        &self,
        token: &str,
        provider_key: &str,
        block: u64,
    ) -> Result<TokenPrice> {
        self.record(format!("receipt_price:{provider_key}"));
        self.chain_data
            .receipt_token_price_at(token, provider_key, block)
            .await
    }
}

#[async_trait]
impl PositionDirectory for KeyRecorder {
    async fn known_positions(&self, user: &str, provider_key: &str) -> Result<Vec<String>> {
        self.record(format!("positions:{provider_key}"));
        self.chain_data.known_positions(user, provider_key).await
    }
}

fn recording_context(recorder: &Arc<KeyRecorder>) -> ClassificationContext {
    let chain_data = Arc::new(recorder.chain_data.clone());
    ClassificationContext::new(
        chain_data.clone(),
        recorder.clone(),
        chain_data.clone(),
        chain_data,
        recorder.clone(),
    )
}

struct FlakyGas {
    failing_tx: &'static str,
}

#[async_trait]
impl GasOracle for FlakyGas {
    async fn gas_cost(&self, tx_hash: &str) -> Result<BigDecimal> {
        if tx_hash == self.failing_tx {
            bail!("gas oracle unavailable");
        }
        Ok(BigDecimal::from(1))
    }
}

struct Counting {
    name: &'static str,
    calls: Arc<AtomicUsize>,
    outcome: ClassifierOutcome,
}

#[async_trait]
impl TransferLogClassifier for Counting {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn classify(
        &self,
        _tx: &TransactionTransfers,
    ) -> Result<ClassifierOutcome, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.outcome.clone())
    }
}

fn counting(
    name: &'static str,
    calls: &Arc<AtomicUsize>,
    outcome: ClassifierOutcome,
) -> Box<dyn TransferLogClassifier> {
    Box::new(Counting {
        name,
        calls: calls.clone(),
        outcome,
    })
}

#[test]
fn default_pipeline_order() -> Result<()> {
    let pipeline =
        ClassificationPipeline::new(context(priced_chain_data()), &ClassifierConfig::default())?;
    assert_eq!(pipeline.classifier_names(), vec!["zap_aware", "fallback"]);

    let mut config = ClassifierConfig::default();
    config.zap.enabled = false;
    let pipeline = ClassificationPipeline::new(context(priced_chain_data()), &config)?;
    assert_eq!(pipeline.classifier_names(), vec!["fallback"]);
    Ok(())
}

#[test]
fn invalid_config_is_rejected() {
    let config = ClassifierConfig::for_protocol("");
    let result = ClassificationPipeline::new(context(priced_chain_data()), &config);
    assert!(matches!(result, Err(ClassifierError::InvalidConfig(_))));
}

#[tokio::test]
async fn first_classification_wins() -> Result<()> {
    let first_calls = Arc::new(AtomicUsize::new(0));
    let second_calls = Arc::new(AtomicUsize::new(0));

    let zap_result = ClassificationPipeline::new(
        context(priced_chain_data()),
        &ClassifierConfig::default(),
    )?
    .classify(&tx(zap_deposit_events()))
    .await?
    .expect("zap deposit");

    let pipeline = ClassificationPipeline::from_classifiers("uniswap_v2_eth", vec![
        counting("declines", &first_calls, ClassifierOutcome::Declined),
        counting(
            "classifies",
            &second_calls,
            ClassifierOutcome::Classified(zap_result.clone()),
        ),
        counting("never", &first_calls, ClassifierOutcome::Declined),
    ]);

    let classification = pipeline.classify(&tx(vec![])).await?;
    assert_eq!(classification, Some(zap_result));
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn unclassifiable_transaction_is_none() -> Result<()> {
    let chain_data = priced_chain_data().with_positions(USER, &[POOL]);
    let pipeline = ClassificationPipeline::new(context(chain_data), &ClassifierConfig::default())?;
    let events = vec![transfer(TOKEN_C, ROUTER, OTHER_USER, "1")];
    assert_eq!(pipeline.classify(&tx(events)).await?, None);
    Ok(())
}

#[tokio::test]
async fn fallback_covers_disabled_zap() -> Result<()> {
    let mut config = ClassifierConfig::default();
    config.zap.enabled = false;
    let chain_data = priced_chain_data().with_positions(USER, &[POOL]);
    let pipeline = ClassificationPipeline::new(context(chain_data), &config)?;

    let classification = pipeline
        .classify(&tx(zap_withdraw_events()))
        .await?
        .expect("withdraw");
    assert_eq!(classification.operation_type(), Some(OperationType::Withdraw));
    Ok(())
}

#[tokio::test]
async fn batch_failures_are_isolated() -> Result<()> {
    let chain_data = Arc::new(priced_chain_data());
    let base = ClassificationContext::from_provider(chain_data);
    let context = ClassificationContext {
        gas: Arc::new(FlakyGas { failing_tx: "0xbad" }),
        ..base
    };
    let pipeline = ClassificationPipeline::new(context, &ClassifierConfig::default())?;

    let txs = vec![
        TransactionTransfers::from_ordered_events("0xbad", USER, BLOCK, zap_deposit_events()),
        TransactionTransfers::from_ordered_events("0xgood", USER, BLOCK, zap_withdraw_events()),
        TransactionTransfers::from_ordered_events("0xnone", USER, BLOCK, vec![]),
    ];
    let results = pipeline.classify_batch(&txs).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].tx_hash, "0xbad");
    assert!(matches!(results[0].result, Err(ClassifierError::External(_))));

    let good = results[1].result.as_ref().expect("good tx classified");
    assert_eq!(
        good.as_ref().and_then(|c| c.operation_type()),
        Some(OperationType::Withdraw)
    );
    assert!(matches!(results[2].result, Ok(None)));
    Ok(())
}

#[tokio::test]
async fn zap_result_wins_over_disagreeing_fallback() -> Result<()> {
    // The fallback alone would pick TOKEN_A as the position.
    let chain_data = priced_chain_data().with_positions(USER, &[TOKEN_A]);
    let pipeline =
        ClassificationPipeline::new(context(chain_data.clone()), &ClassifierConfig::default())?;
    let classification = pipeline
        .classify(&tx(zap_deposit_events()))
        .await?
        .expect("zap deposit");
    assert_eq!(classification.position_identifier, POOL);
    assert_eq!(classification.operation_type(), Some(OperationType::Deposit));

    let mut fallback_only = ClassifierConfig::default();
    fallback_only.zap.enabled = false;
    let fallback = ClassificationPipeline::new(context(chain_data), &fallback_only)?
        .classify(&tx(zap_deposit_events()))
        .await?
        .expect("fallback classification");
    assert_eq!(fallback.position_identifier, TOKEN_A);
    Ok(())
}

#[tokio::test]
async fn lookups_use_provider_key() -> Result<()> {
    let recorder = Arc::new(KeyRecorder {
        chain_data: priced_chain_data().with_positions(USER, &[POOL]),
        keys: Mutex::new(Vec::new()),
    });
    let mut config = ClassifierConfig::default();
    config.zap.enabled = false;
    let pipeline = ClassificationPipeline::new(recording_context(&recorder), &config)?;
    assert_eq!(pipeline.protocol_key(), "uniswap_v2_eth");

    pipeline
        .classify(&tx(zap_deposit_events()))
        .await?
        .expect("deposit");

    let mut keys = recorder.keys();
    keys.sort();
    insta::assert_debug_snapshot!(keys, @r###"
    [
        "positions:uniswap_eth",
        "price:uniswap_eth",
        "price:uniswap_eth",
        "receipt_price:uniswap_eth",
    ]
    "###);
    Ok(())
}

#[tokio::test]
async fn configured_provider_key_reaches_zap_pricing() -> Result<()> {
    let recorder = Arc::new(KeyRecorder {
        chain_data: priced_chain_data(),
        keys: Mutex::new(Vec::new()),
    });
    let config = ClassifierConfig::default().with_provider_key("sushiswap_eth");
    let pipeline = ClassificationPipeline::new(recording_context(&recorder), &config)?;

    pipeline
        .classify(&tx(zap_withdraw_events()))
        .await?
        .expect("withdraw");

    let keys = recorder.keys();
    assert_eq!(keys.len(), 3);
    assert!(keys.iter().all(|key| key.ends_with(":sushiswap_eth")));
    Ok(())
}
