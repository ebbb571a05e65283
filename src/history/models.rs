//! Data models for request history.

use crate::models::{HttpRequest, HttpResponse};
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A request paired with the response it received, if any.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub request: HttpRequest,
    pub response: Option<HttpResponse>,
}

impl Transaction {
    pub fn new(request: HttpRequest, response: Option<HttpResponse>) -> Self {
        Self { request, response }
    }

    /// The serialized form written to the external store.
    pub fn to_mirror_entry(&self) -> MirrorEntry {
        MirrorEntry {
            request: self.request.raw_headers(),
            response: self.response.as_ref().map(|response| MirrorResponse {
                headers: response.raw_headers(),
                body: response.body_text(),
            }),
        }
    }
}

/// One member of the external history collection.
///
/// Serialized as
/// `{"request": "<raw headers>", "response": {"headers": "<raw headers>", "body": "<text>"}}`.
/// `response` is omitted when the transaction has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorEntry {
    pub request: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<MirrorResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorResponse {
    pub headers: String,
    pub body: String,
}

impl MirrorEntry {
    pub fn to_json(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, HistoryError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Errors that can occur during history operations.
#[derive(Debug)]
pub enum HistoryError {
    /// The last transaction was requested from an empty history.
    EmptyHistory,

    /// A transaction could not be serialized for the external store.
    SerializationError(serde_json::Error),

    /// The external store rejected the write.
    ///
    /// Only returned under [`StoreFailurePolicy::Propagate`](crate::config::StoreFailurePolicy);
    /// the transaction is already in the local history when this is reported.
    StoreError(StoreError),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::EmptyHistory => write!(f, "History is empty"),
            HistoryError::SerializationError(err) => {
                write!(f, "History serialization error: {}", err)
            }
            HistoryError::StoreError(err) => write!(f, "History store error: {}", err),
        }
    }
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HistoryError::EmptyHistory => None,
            HistoryError::SerializationError(err) => Some(err),
            HistoryError::StoreError(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(err: serde_json::Error) -> Self {
        HistoryError::SerializationError(err)
    }
}

impl From<StoreError> for HistoryError {
    fn from(err: StoreError) -> Self {
        HistoryError::StoreError(err)
    }
}
