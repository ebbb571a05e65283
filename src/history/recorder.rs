//! Bounded request history mirrored to an external store.

use super::models::{HistoryError, Transaction};
use super::ui::format_transcript;
use crate::config::{HistoryConfig, StoreFailurePolicy};
use crate::models::{HttpRequest, HttpResponse};
use crate::pipeline::{PipelineError, PipelineEvent, Plugin, Subscription};
use crate::store::{HistoryStore, StoreError};
use chrono::Utc;
use log::{debug, warn};
use std::collections::VecDeque;
use std::fmt;

/// Default number of transactions kept in memory.
pub const DEFAULT_LIMIT: usize = 10;

/// Default expiry of the external collection, in seconds.
pub const DEFAULT_EXPIRE_SECONDS: u64 = 86_400;

/// Priority of the history hook on the request-sent event.
pub const HISTORY_PRIORITY: i32 = 9999;

/// Keeps the most recent request/response pairs.
///
/// Every recorded transaction is also written to an external sorted-set
/// store under the recorder's record id, scored by the Unix time of the
/// write, and the collection's expiry is refreshed. The in-memory list holds
/// at most `limit` transactions; recording past the limit evicts the oldest.
///
/// Clearing the history only empties the in-memory list. Entries already in
/// the store stay there until the collection expires.
pub struct HistoryRecorder {
    transactions: VecDeque<Transaction>,
    limit: usize,
    expire_seconds: u64,
    record_id: String,
    store: Box<dyn HistoryStore>,
    failure_policy: StoreFailurePolicy,
    store_attempts: u32,
}

impl HistoryRecorder {
    /// Creates a recorder with default settings that mirrors into `store`.
    pub fn new(store: Box<dyn HistoryStore>) -> Self {
        Self::from_config(&HistoryConfig::default(), store)
    }

    /// Creates a recorder from history settings.
    pub fn from_config(config: &HistoryConfig, store: Box<dyn HistoryStore>) -> Self {
        Self {
            transactions: VecDeque::new(),
            limit: config.limit.max(1),
            expire_seconds: config.expire_seconds.max(1),
            record_id: config.record_id.clone(),
            store,
            failure_policy: config.store_failure_policy,
            store_attempts: config.store_attempts.max(1),
        }
    }

    /// Records a completed request.
    ///
    /// If `response` is `None`, the response attached to `request` is used.
    /// The transaction is always added to the in-memory history, even when
    /// the store write fails.
    ///
    /// # Errors
    ///
    /// Under [`StoreFailurePolicy::Propagate`], returns the store or
    /// serialization error after the transaction has been added locally.
    pub fn record(
        &mut self,
        request: HttpRequest,
        response: Option<HttpResponse>,
    ) -> Result<(), HistoryError> {
        let response = response.or_else(|| request.response().cloned());
        let transaction = Transaction::new(request, response);

        let mirrored = self.mirror(&transaction);

        debug!(
            "Recording {} {} in history '{}'",
            transaction.request.method,
            transaction.request.url(),
            self.record_id
        );
        self.transactions.push_back(transaction);
        if self.transactions.len() > self.limit {
            self.transactions.pop_front();
        }

        match mirrored {
            Ok(()) => Ok(()),
            Err(err) => match self.failure_policy {
                StoreFailurePolicy::LocalOnly => {
                    warn!(
                        "History '{}' kept locally only, store write failed: {}",
                        self.record_id, err
                    );
                    Ok(())
                }
                StoreFailurePolicy::Propagate => Err(err),
            },
        }
    }

    fn mirror(&mut self, transaction: &Transaction) -> Result<(), HistoryError> {
        let member = transaction.to_mirror_entry().to_json()?;
        let score = Utc::now().timestamp();

        let mut attempt = 1;
        loop {
            match self.write_member(&member, score) {
                Ok(()) => return Ok(()),
                Err(err) if attempt < self.store_attempts => {
                    warn!(
                        "Store write for '{}' failed (attempt {}/{}): {}",
                        self.record_id, attempt, self.store_attempts, err
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    // ZADD of an identical member only moves its score, so a retry after a
    // partial failure does not duplicate the entry.
    fn write_member(&mut self, member: &str, score: i64) -> Result<(), StoreError> {
        self.store.add_to_sorted_set(&self.record_id, member, score)?;
        self.store.expire(&self.record_id, self.expire_seconds)
    }

    /// All transactions, oldest first.
    pub fn get_all(&self) -> &VecDeque<Transaction> {
        &self.transactions
    }

    /// Requests in history order, each carrying its paired response.
    ///
    /// The iterator reads the history as it is now and yields clones.
    pub fn iter(&self) -> impl Iterator<Item = HttpRequest> + '_ {
        self.transactions.iter().map(|transaction| {
            let mut request = transaction.request.clone();
            request.set_response(transaction.response.clone());
            request
        })
    }

    /// Number of transactions in history.
    pub fn count(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The most recently recorded request.
    pub fn last_request(&self) -> Result<&HttpRequest, HistoryError> {
        self.transactions
            .back()
            .map(|t| &t.request)
            .ok_or(HistoryError::EmptyHistory)
    }

    /// The response of the most recently recorded transaction, which may
    /// have none.
    pub fn last_response(&self) -> Result<Option<&HttpResponse>, HistoryError> {
        self.transactions
            .back()
            .map(|t| t.response.as_ref())
            .ok_or(HistoryError::EmptyHistory)
    }

    /// Empties the in-memory history.
    pub fn clear(&mut self) -> &mut Self {
        self.transactions.clear();
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn expire_seconds(&self) -> u64 {
        self.expire_seconds
    }

    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn failure_policy(&self) -> StoreFailurePolicy {
        self.failure_policy
    }

    /// Sets the maximum history size (at least 1). Drops the oldest
    /// transactions if the history is already longer.
    pub fn set_limit(&mut self, limit: usize) -> &mut Self {
        self.limit = limit.max(1);
        while self.transactions.len() > self.limit {
            self.transactions.pop_front();
        }
        self
    }

    /// Sets the expiry applied on future store writes (at least 1 second).
    pub fn set_expire(&mut self, seconds: u64) -> &mut Self {
        self.expire_seconds = seconds.max(1);
        self
    }

    /// Sets the key future transactions are mirrored under.
    pub fn set_id(&mut self, record_id: impl Into<String>) -> &mut Self {
        self.record_id = record_id.into();
        self
    }

    /// Replaces the store. The previous store is closed.
    pub fn set_store(&mut self, store: Box<dyn HistoryStore>) -> &mut Self {
        let mut previous = std::mem::replace(&mut self.store, store);
        if let Err(err) = previous.close() {
            warn!("Failed to close previous history store: {}", err);
        }
        self
    }

    pub fn set_failure_policy(&mut self, policy: StoreFailurePolicy) -> &mut Self {
        self.failure_policy = policy;
        self
    }

    /// Sets how many times a store write is attempted (at least 1).
    pub fn set_store_attempts(&mut self, attempts: u32) -> &mut Self {
        self.store_attempts = attempts.max(1);
        self
    }

    /// Closes the store. Recording afterwards keeps working locally; store
    /// writes fail with [`StoreError::Closed`] and follow the failure policy.
    pub fn close(&mut self) -> Result<(), HistoryError> {
        self.store.close()?;
        Ok(())
    }
}

impl fmt::Display for HistoryRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_transcript(&self.transactions))
    }
}

impl fmt::Debug for HistoryRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryRecorder")
            .field("record_id", &self.record_id)
            .field("count", &self.transactions.len())
            .field("limit", &self.limit)
            .field("expire_seconds", &self.expire_seconds)
            .field("failure_policy", &self.failure_policy)
            .finish()
    }
}

impl Plugin for HistoryRecorder {
    fn subscriptions(&self) -> Vec<Subscription> {
        vec![Subscription::new(PipelineEvent::RequestSent, HISTORY_PRIORITY)]
    }

    fn request_sent(
        &mut self,
        request: &HttpRequest,
        response: Option<&HttpResponse>,
    ) -> Result<(), PipelineError> {
        self.record(request.clone(), response.cloned())?;
        Ok(())
    }
}
