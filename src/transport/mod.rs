//! Request transmission.
//!
//! The pipeline hands a fully decorated request to a [`Transport`] and gets a
//! response back. Any `Fn(&HttpRequest) -> Result<HttpResponse, TransportError>`
//! is a transport, which keeps stubs in tests trivial. With the `http` feature,
//! [`ReqwestTransport`] sends over the network.

#[cfg(feature = "http")]
mod native;

#[cfg(feature = "http")]
pub use native::ReqwestTransport;

use crate::models::{HttpRequest, HttpResponse};
use std::fmt;

/// Sends a request and returns its response.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Errors that can occur while transmitting a request.
#[derive(Debug)]
pub enum TransportError {
    /// Connection failures, DNS errors and other network-level issues.
    NetworkError(String),

    /// The request did not complete within the configured timeout.
    Timeout,

    /// The URL could not be used for a request.
    InvalidUrl(String),

    /// The request could not be built from the request handle.
    BuildError(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            TransportError::Timeout => write!(f, "Request timed out"),
            TransportError::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            TransportError::BuildError(msg) => write!(f, "Request build error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        TransportError::InvalidUrl(err.to_string())
    }
}
