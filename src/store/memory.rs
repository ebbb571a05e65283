//! In-process sorted-set store.
//!
//! Behaves like the Redis subset the recorder uses: members are unique per
//! collection, re-adding a member updates its score, and an expired
//! collection disappears on the next access.

use super::{HistoryStore, StoreError};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct SortedSet {
    /// Kept ordered by (score, member).
    members: Vec<(i64, String)>,
    expires_at: Option<DateTime<Utc>>,
}

impl SortedSet {
    fn insert(&mut self, member: &str, score: i64) {
        self.members.retain(|(_, m)| m != member);
        let entry = (score, member.to_string());
        let pos = self
            .members
            .binary_search(&entry)
            .unwrap_or_else(|pos| pos);
        self.members.insert(pos, entry);
    }
}

/// Sorted-set store held in memory. Useful for tests and for running without
/// an external service.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sets: HashMap<String, SortedSet>,
    closed: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Members of `key` in ascending score order. Empty if the collection is
    /// missing or expired.
    pub fn members(&self, key: &str) -> Vec<String> {
        self.live_set(key, Utc::now())
            .map(|set| set.members.iter().map(|(_, m)| m.clone()).collect())
            .unwrap_or_default()
    }

    /// Members of `key` with their scores, in ascending score order.
    pub fn members_with_scores(&self, key: &str) -> Vec<(String, i64)> {
        self.live_set(key, Utc::now())
            .map(|set| {
                set.members
                    .iter()
                    .map(|(score, m)| (m.clone(), *score))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Seconds until `key` expires, or `None` if it has no expiry or does
    /// not exist.
    pub fn ttl(&self, key: &str) -> Option<i64> {
        let now = Utc::now();
        self.live_set(key, now)
            .and_then(|set| set.expires_at)
            .map(|at| (at - now).num_seconds())
    }

    /// Whether `key` would be gone at time `at`.
    pub fn is_expired_at(&self, key: &str, at: DateTime<Utc>) -> bool {
        self.live_set(key, at).is_none()
    }

    fn live_set(&self, key: &str, now: DateTime<Utc>) -> Option<&SortedSet> {
        self.sets
            .get(key)
            .filter(|set| set.expires_at.map_or(true, |at| at > now))
    }

    fn purge_expired(&mut self, key: &str) {
        let now = Utc::now();
        let expired = self
            .sets
            .get(key)
            .and_then(|set| set.expires_at)
            .map_or(false, |at| at <= now);
        if expired {
            self.sets.remove(key);
        }
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl HistoryStore for MemoryStore {
    fn add_to_sorted_set(&mut self, key: &str, member: &str, score: i64) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.purge_expired(key);
        self.sets
            .entry(key.to_string())
            .or_default()
            .insert(member, score);
        Ok(())
    }

    fn expire(&mut self, key: &str, seconds: u64) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.purge_expired(key);
        let expires_at = i64::try_from(seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                StoreError::Command(format!("invalid expire time: {} seconds", seconds))
            })?;
        if let Some(set) = self.sets.get_mut(key) {
            set.expires_at = Some(expires_at);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.closed = true;
        Ok(())
    }
}
