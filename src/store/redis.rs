//! Redis-backed history store.
//!
//! Uses a synchronous connection: the recorder runs inside the request
//! pipeline and has no runtime to await on.

use super::{HistoryStore, StoreError};
use log::debug;
use redis::Commands;
use std::time::Duration;

/// Default connect/read/write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Sorted-set store on a Redis server (`ZADD` + `EXPIRE`).
pub struct RedisStore {
    conn: Option<redis::Connection>,
}

impl RedisStore {
    /// Opens a connection to `url` with the default timeout.
    pub fn connect(url: &str) -> Result<Self, StoreError> {
        Self::connect_with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Opens a connection; `timeout` bounds connecting and every command.
    pub fn connect_with_timeout(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(url).map_err(|e| StoreError::Connection(e.to_string()))?;
        let conn = client
            .get_connection_with_timeout(timeout)
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        conn.set_read_timeout(Some(timeout))
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        conn.set_write_timeout(Some(timeout))
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        debug!("Connected history store to {}", url);
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&mut self) -> Result<&mut redis::Connection, StoreError> {
        self.conn.as_mut().ok_or(StoreError::Closed)
    }
}

fn command_error(err: redis::RedisError) -> StoreError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_timeout() {
        StoreError::Connection(err.to_string())
    } else {
        StoreError::Command(err.to_string())
    }
}

impl HistoryStore for RedisStore {
    fn add_to_sorted_set(&mut self, key: &str, member: &str, score: i64) -> Result<(), StoreError> {
        let _: () = self.conn()?.zadd(key, member, score).map_err(command_error)?;
        Ok(())
    }

    fn expire(&mut self, key: &str, seconds: u64) -> Result<(), StoreError> {
        let seconds = i64::try_from(seconds)
            .map_err(|_| StoreError::Command(format!("invalid expire time: {} seconds", seconds)))?;
        let _: () = self.conn()?.expire(key, seconds).map_err(command_error)?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.conn = None;
        Ok(())
    }
}
