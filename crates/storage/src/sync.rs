use std::io;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use tally_core::Transaction;
use tally_engine::RuleSet;

use crate::codec;
use crate::object::ObjectStore;

/// Object keys, matching the original export layout.
pub const TRANSACTIONS_KEY: &str = "all_transactions.csv";
pub const RULES_KEY: &str = "category_rules.json";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Bounded retry for transient storage errors. Attempts are total tries,
/// with linear backoff between them.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 3,
            backoff: Duration::from_millis(50),
        }
    }
}

/// Reconciles in-memory state with the durable store. The sole writer of
/// the transaction and rule files; the engine never persists on its own.
pub struct SyncStore<S: ObjectStore> {
    store: S,
    retry: RetryPolicy,
}

impl<S: ObjectStore> SyncStore<S> {
    pub fn new(store: S) -> Self {
        SyncStore {
            store,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(store: S, retry: RetryPolicy) -> Self {
        SyncStore { store, retry }
    }

    /// Commits both files as one logical write. Serialization happens first,
    /// so an encoding failure touches nothing durable; the store then stages
    /// both payloads before swapping either in.
    pub fn commit(
        &self,
        transactions: &[Transaction],
        rules: &RuleSet,
    ) -> Result<(), PersistenceError> {
        let tx_bytes = codec::transactions_to_csv(transactions)?;
        let rule_bytes = codec::rules_to_json(rules)?;

        self.with_retries(|| {
            self.store.put_many(&[
                (TRANSACTIONS_KEY, tx_bytes.as_slice()),
                (RULES_KEY, rule_bytes.as_slice()),
            ])
        })?;

        info!(
            transactions = transactions.len(),
            rules = rules.len(),
            "committed durable state"
        );
        Ok(())
    }

    /// Loads both files. Missing keys are first-run state and yield empty
    /// containers.
    pub fn load_all(&self) -> Result<(Vec<Transaction>, RuleSet), PersistenceError> {
        let transactions = match self.with_retries(|| self.store.get(TRANSACTIONS_KEY))? {
            Some(bytes) => codec::transactions_from_csv(&bytes)?,
            None => Vec::new(),
        };
        let rules = match self.with_retries(|| self.store.get(RULES_KEY))? {
            Some(bytes) => codec::rules_from_json(&bytes)?,
            None => RuleSet::new(),
        };
        Ok((transactions, rules))
    }

    fn with_retries<T>(&self, op: impl Fn() -> io::Result<T>) -> Result<T, PersistenceError> {
        let attempts = self.retry.attempts.max(1);
        let mut last = None;

        for attempt in 1..=attempts {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "storage operation failed");
                    last = Some(e);
                    if attempt < attempts {
                        thread::sleep(self.retry.backoff * attempt);
                    }
                }
            }
        }

        Err(PersistenceError::Io(last.expect("at least one attempt")))
    }
}
