//! Pipeline error types.

use crate::history::HistoryError;
use crate::transport::TransportError;
use std::fmt;

/// Errors surfaced by [`Client::send`](super::Client::send).
#[derive(Debug)]
pub enum PipelineError {
    /// The transport failed to deliver the request.
    Transport(TransportError),

    /// The history hook failed to record the transaction.
    History(HistoryError),

    /// Any other plugin failure.
    Plugin(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Transport(err) => write!(f, "Transport failed: {}", err),
            PipelineError::History(err) => write!(f, "History hook failed: {}", err),
            PipelineError::Plugin(msg) => write!(f, "Plugin failed: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Transport(err) => Some(err),
            PipelineError::History(err) => Some(err),
            PipelineError::Plugin(_) => None,
        }
    }
}

impl From<TransportError> for PipelineError {
    fn from(err: TransportError) -> Self {
        PipelineError::Transport(err)
    }
}

impl From<HistoryError> for PipelineError {
    fn from(err: HistoryError) -> Self {
        PipelineError::History(err)
    }
}
