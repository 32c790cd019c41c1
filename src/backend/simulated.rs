//! Simulated classifier and submitter
//!
//! Stand-ins for a real intent model and chain client: fixed latency,
//! keyword rules and random transaction hashes.

use super::{ClassifyError, IntentClassifier, SubmitError, TransactionSubmitter, TxReceipt};
use crate::intent::{Classification, RuleTable};
use crate::session::state::PendingTransaction;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Write as _;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Network name shown in previews and logs
pub const NETWORK_NAME: &str = "BlockDAG Primordial Testnet";

/// Address the simulated wallet connects as and signs from
pub const WALLET_ADDRESS: &str = "0x742d35Cc6C3F3f6a9C6bB7F7B8e6F8Df2E4F8B1";

fn seeded_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

/// Keyword rule classifier with artificial latency
pub struct KeywordClassifier {
    rules: RuleTable,
    latency: Duration,
    rng: Mutex<StdRng>,
}

impl KeywordClassifier {
    pub fn new(rules: RuleTable, latency: Duration, seed: Option<u64>) -> Self {
        Self {
            rules,
            latency,
            rng: Mutex::new(seeded_rng(seed)),
        }
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        tokio::time::sleep(self.latency).await;
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.rules.classify(text, chrono::Utc::now(), &mut *rng))
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Submitter that always succeeds after a delay
pub struct SimulatedSubmitter {
    latency: Duration,
    rng: Mutex<StdRng>,
}

impl SimulatedSubmitter {
    pub fn new(latency: Duration, seed: Option<u64>) -> Self {
        Self {
            latency,
            rng: Mutex::new(seeded_rng(seed)),
        }
    }

    fn random_hash(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let bytes: [u8; 32] = rng.gen();
        let mut hash = String::with_capacity(66);
        hash.push_str("0x");
        for byte in bytes {
            let _ = write!(hash, "{byte:02x}");
        }
        hash
    }
}

#[async_trait]
impl TransactionSubmitter for SimulatedSubmitter {
    async fn submit(&self, _transaction: &PendingTransaction) -> Result<TxReceipt, SubmitError> {
        tokio::time::sleep(self.latency).await;
        Ok(TxReceipt {
            tx_hash: self.random_hash(),
        })
    }

    fn network(&self) -> &str {
        NETWORK_NAME
    }
}
