pub mod fallback;
pub mod zap_aware;

use async_trait::async_trait;

use crate::config::ClassifierConfig;
use crate::context::ClassificationContext;
use crate::core::error::ClassifierError;
use crate::types::{Classification, TransactionTransfers};

pub use fallback::FallbackClassifier;
pub use zap_aware::ZapAwareClassifier;

/// Outcome of a single strategy. `Declined` hands the transaction to the next
/// strategy in the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum ClassifierOutcome {
    Classified(Classification),
    Declined,
}

impl ClassifierOutcome {
    pub fn into_classification(self) -> Option<Classification> {
        match self {
            Self::Classified(classification) => Some(classification),
            Self::Declined => None,
        }
    }

    pub fn is_declined(&self) -> bool {
        matches!(self, Self::Declined)
    }
}

#[async_trait]
pub trait TransferLogClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn classify(
        &self,
        tx: &TransactionTransfers,
    ) -> Result<ClassifierOutcome, ClassifierError>;
}

pub fn build_zap_aware_classifier(
    context: ClassificationContext,
    config: &ClassifierConfig,
) -> Box<dyn TransferLogClassifier> {
    ZapAwareClassifier::boxed(context, config)
}

pub fn build_fallback_classifier(
    context: ClassificationContext,
    config: &ClassifierConfig,
) -> Box<dyn TransferLogClassifier> {
    FallbackClassifier::boxed(context, config)
}
