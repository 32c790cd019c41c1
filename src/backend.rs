//! Intent classification and transaction submission services
//!
//! The session runtime talks to these through traits so a real model or
//! chain client can replace the simulated ones without touching the state
//! machine.

mod error;
mod simulated;

pub use error::{ClassifyError, ClassifyErrorKind, SubmitError, SubmitErrorKind};
pub use simulated::{KeywordClassifier, SimulatedSubmitter, NETWORK_NAME, WALLET_ADDRESS};

use crate::intent::Classification;
use crate::session::state::PendingTransaction;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Proof of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
}

/// Maps free text to an intent and optional transaction preview
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifyError>;

    /// Identifier for logs
    fn name(&self) -> &str;
}

/// Sends a confirmed transaction to the network
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, transaction: &PendingTransaction) -> Result<TxReceipt, SubmitError>;

    /// Network the submitter targets
    fn network(&self) -> &str;
}

#[async_trait]
impl<T: IntentClassifier + ?Sized> IntentClassifier for Arc<T> {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        (**self).classify(text).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: TransactionSubmitter + ?Sized> TransactionSubmitter for Arc<T> {
    async fn submit(&self, transaction: &PendingTransaction) -> Result<TxReceipt, SubmitError> {
        (**self).submit(transaction).await
    }

    fn network(&self) -> &str {
        (**self).network()
    }
}

/// Logging wrapper for classifiers
pub struct LoggingClassifier {
    inner: Arc<dyn IntentClassifier>,
    name: String,
}

impl LoggingClassifier {
    pub fn new(inner: Arc<dyn IntentClassifier>) -> Self {
        let name = inner.name().to_string();
        Self { inner, name }
    }
}

#[async_trait]
impl IntentClassifier for LoggingClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        let start = std::time::Instant::now();
        let result = self.inner.classify(text).await;
        let duration = start.elapsed();

        match &result {
            Ok(classification) => {
                tracing::info!(
                    classifier = %self.name,
                    duration_ms = %duration.as_millis(),
                    intent = classification.intent.as_str(),
                    transactional = classification.transaction.is_some(),
                    "Classification completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    classifier = %self.name,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "Classification failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Logging wrapper for submitters
pub struct LoggingSubmitter {
    inner: Arc<dyn TransactionSubmitter>,
    network: String,
}

impl LoggingSubmitter {
    pub fn new(inner: Arc<dyn TransactionSubmitter>) -> Self {
        let network = inner.network().to_string();
        Self { inner, network }
    }
}

#[async_trait]
impl TransactionSubmitter for LoggingSubmitter {
    async fn submit(&self, transaction: &PendingTransaction) -> Result<TxReceipt, SubmitError> {
        let start = std::time::Instant::now();
        let result = self.inner.submit(transaction).await;
        let duration = start.elapsed();

        match &result {
            Ok(receipt) => {
                tracing::info!(
                    network = %self.network,
                    function = %transaction.function_name,
                    duration_ms = %duration.as_millis(),
                    tx_hash = %receipt.tx_hash,
                    "Transaction submitted"
                );
            }
            Err(e) => {
                tracing::error!(
                    network = %self.network,
                    function = %transaction.function_name,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Transaction submission failed"
                );
            }
        }

        result
    }

    fn network(&self) -> &str {
        &self.network
    }
}
