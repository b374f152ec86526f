use futures::future::join_all;

use crate::config::ClassifierConfig;
use crate::context::ClassificationContext;
use crate::core::error::ClassifierError;
use crate::protocols::{
    build_fallback_classifier, build_zap_aware_classifier, ClassifierOutcome,
    TransferLogClassifier,
};
use crate::types::{Classification, TransactionTransfers};

type ClassifierBuilder =
    fn(ClassificationContext, &ClassifierConfig) -> Box<dyn TransferLogClassifier>;

/// Tries each classifier in priority order; the first classification wins.
pub struct ClassificationPipeline {
    protocol_key: String,
    classifiers: Vec<Box<dyn TransferLogClassifier>>,
}

/// Per-transaction result of [`ClassificationPipeline::classify_batch`].
#[derive(Debug)]
pub struct TransactionClassification {
    pub tx_hash: String,
    pub result: Result<Option<Classification>, ClassifierError>,
}

impl ClassificationPipeline {
    /// Zap-aware first, then the known-position fallback, each subject to config.
    pub fn new(
        context: ClassificationContext,
        config: &ClassifierConfig,
    ) -> Result<Self, ClassifierError> {
        config.validate()?;

        let mut builders: Vec<ClassifierBuilder> = Vec::new();
        if config.zap.enabled {
            builders.push(build_zap_aware_classifier);
        }
        if config.fallback_enabled {
            builders.push(build_fallback_classifier);
        }
        if builders.is_empty() {
            tracing::warn!("all classifiers disabled; every transaction will be unclassifiable");
        }

        let classifiers = builders
            .into_iter()
            .map(|build| build(context.clone(), config))
            .collect();
        Ok(Self {
            protocol_key: config.protocol_key.clone(),
            classifiers,
        })
    }

    pub fn from_classifiers(
        protocol_key: impl Into<String>,
        classifiers: Vec<Box<dyn TransferLogClassifier>>,
    ) -> Self {
        Self {
            protocol_key: protocol_key.into(),
            classifiers,
        }
    }

    pub fn protocol_key(&self) -> &str {
        &self.protocol_key
    }

    pub fn classifier_names(&self) -> Vec<&'static str> {
        self.classifiers.iter().map(|c| c.name()).collect()
    }

    /// `Ok(None)` means no classifier recognised the transaction.
    pub async fn classify(
        &self,
        tx: &TransactionTransfers,
    ) -> Result<Option<Classification>, ClassifierError> {
        let start = std::time::Instant::now();
        for classifier in &self.classifiers {
            match classifier.classify(tx).await? {
                ClassifierOutcome::Classified(classification) => {
                    tracing::info!(
                        "{} classified for {} by {} as {:?} in {:.3}ms",
                        tx.tx_hash(),
                        self.protocol_key,
                        classifier.name(),
                        classification.operation_type(),
                        start.elapsed().as_secs_f64() * 1000.0
                    );
                    return Ok(Some(classification));
                }
                ClassifierOutcome::Declined => {
                    tracing::debug!("{} declined by {}", tx.tx_hash(), classifier.name());
                }
            }
        }
        tracing::info!("{} is unclassifiable for {}", tx.tx_hash(), self.protocol_key);
        Ok(None)
    }

    /// Classifies transactions concurrently; a failure only affects its own entry.
    pub async fn classify_batch(
        &self,
        txs: &[TransactionTransfers],
    ) -> Vec<TransactionClassification> {
        let results = join_all(txs.iter().map(|tx| self.classify(tx))).await;
        txs.iter()
            .zip(results)
            .map(|(tx, result)| {
                if let Err(err) = &result {
                    tracing::error!("failed to classify {}: {err}", tx.tx_hash());
                }
                TransactionClassification {
                    tx_hash: tx.tx_hash().to_string(),
                    result,
                }
            })
            .collect()
    }
}
