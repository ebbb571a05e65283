//! External sorted-set stores that mirror request history.
//!
//! A store keeps one collection per record id. Members are scored by their
//! insertion time, and the collection as a whole carries an expiry that is
//! refreshed on every write.

pub mod memory;
#[cfg(feature = "redis-store")]
pub mod redis;

pub use memory::MemoryStore;
#[cfg(feature = "redis-store")]
pub use self::redis::RedisStore;

use crate::config::HistoryConfig;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Operations the history recorder needs from its external store.
pub trait HistoryStore {
    /// Inserts `member` into the sorted collection `key` with the given score.
    fn add_to_sorted_set(&mut self, key: &str, member: &str, score: i64) -> Result<(), StoreError>;

    /// Sets (or refreshes) the expiry of the whole collection `key`.
    fn expire(&mut self, key: &str, seconds: u64) -> Result<(), StoreError>;

    /// Releases the underlying connection. Later calls fail with
    /// [`StoreError::Closed`].
    fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// One store shared by several owners, e.g. two recorders mirroring into the
/// same server, or a test that inspects what a recorder wrote.
impl<S: HistoryStore + ?Sized> HistoryStore for Rc<RefCell<S>> {
    fn add_to_sorted_set(&mut self, key: &str, member: &str, score: i64) -> Result<(), StoreError> {
        self.borrow_mut().add_to_sorted_set(key, member, score)
    }

    fn expire(&mut self, key: &str, seconds: u64) -> Result<(), StoreError> {
        self.borrow_mut().expire(key, seconds)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.borrow_mut().close()
    }
}

/// Errors reported by a [`HistoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    Connection(String),

    /// The store rejected or failed a command.
    Command(String),

    /// The store was used after `close()`.
    Closed,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Connection(msg) => write!(f, "Store connection error: {}", msg),
            StoreError::Command(msg) => write!(f, "Store command failed: {}", msg),
            StoreError::Closed => write!(f, "Store is closed"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Opens the store described by `config`: Redis when a URL is configured,
/// otherwise an in-process [`MemoryStore`].
pub fn open(config: &HistoryConfig) -> Result<Box<dyn HistoryStore>, StoreError> {
    match &config.redis_url {
        None => Ok(Box::new(MemoryStore::new())),
        #[cfg(feature = "redis-store")]
        Some(url) => Ok(Box::new(RedisStore::connect_with_timeout(
            url,
            config.timeout_duration(),
        )?)),
        #[cfg(not(feature = "redis-store"))]
        Some(url) => Err(StoreError::Connection(format!(
            "cannot open {}: built without the redis-store feature",
            url
        ))),
    }
}
