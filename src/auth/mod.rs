//! Authentication decoration for outgoing requests.
//!
//! An [`AuthDecorator`] holds an ordered list of [`AuthParameter`] rules and
//! applies them to every request just before it is transmitted. Each rule
//! injects a credential as a query-string parameter, a header, or HTTP Basic
//! credentials.

pub mod basic;
pub mod placeholders;

use crate::config::PluginConfig;
use crate::models::request::HttpRequest;
use crate::pipeline::{PipelineError, PipelineEvent, Plugin, Subscription};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use placeholders::resolve_placeholders;

/// Priority of the auth hook on the before-send event.
///
/// Lower than any other before-send hook so that auth parameters are the
/// last mutation applied to a request.
pub const AUTH_PRIORITY: i32 = -9999;

/// Where an auth parameter is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthKind {
    /// Query-string parameter, overwriting any existing value.
    Query,
    /// Request header, appended next to any existing header of the same name.
    Header,
    /// HTTP Basic credentials; the parameter key is the username and the
    /// value is the password.
    #[serde(alias = "httpAuth")]
    BasicAuth,
    /// Any unrecognised `type`. Ignored when decorating.
    #[serde(other)]
    Unknown,
}

/// One credential injection rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthParameter {
    #[serde(rename = "type")]
    pub kind: AuthKind,
    pub key: String,
    pub value: String,
}

impl AuthParameter {
    pub fn new(kind: AuthKind, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn query(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(AuthKind::Query, key, value)
    }

    pub fn header(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(AuthKind::Header, key, value)
    }

    pub fn basic_auth(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(AuthKind::BasicAuth, username, password)
    }
}

/// Applies each auth parameter to the request, in list order.
///
/// Parameters of an unknown kind are skipped.
///
/// # Examples
///
/// ```
/// use rest_plugins::auth::{decorate, AuthParameter};
/// use rest_plugins::models::{HttpMethod, HttpRequest};
///
/// let mut request = HttpRequest::new(HttpMethod::GET, "https://api.example.com/data").unwrap();
/// decorate(&mut request, &[AuthParameter::header("X-Api-Key", "abc")]);
///
/// assert_eq!(request.header("X-Api-Key"), Some("abc"));
/// ```
pub fn decorate(request: &mut HttpRequest, params: &[AuthParameter]) {
    for param in params {
        match param.kind {
            AuthKind::Query => request.set_query_param(&param.key, &param.value),
            AuthKind::Header => request.add_header(param.key.as_str(), param.value.as_str()),
            AuthKind::BasicAuth => request.set_auth(param.key.as_str(), param.value.as_str()),
            AuthKind::Unknown => {
                debug!("Skipping auth parameter '{}' of unknown type", param.key);
            }
        }
    }
}

/// Pipeline plugin that decorates every outgoing request with auth parameters.
#[derive(Debug, Clone, Default)]
pub struct AuthDecorator {
    params: Vec<AuthParameter>,
}

impl AuthDecorator {
    pub fn new(params: Vec<AuthParameter>) -> Self {
        Self { params }
    }

    /// Creates a decorator whose parameters have `:name` placeholders
    /// replaced with values from `connection_data`.
    ///
    /// Resolution happens once, here; the stored parameters are final.
    pub fn with_connection_data(
        params: Vec<AuthParameter>,
        connection_data: &HashMap<String, String>,
    ) -> Self {
        let params = params
            .into_iter()
            .map(|param| AuthParameter {
                kind: param.kind,
                key: resolve_placeholders(&param.key, connection_data),
                value: resolve_placeholders(&param.value, connection_data),
            })
            .collect();
        Self { params }
    }

    /// Builds the decorator from loaded plugin configuration.
    pub fn from_config(config: &PluginConfig) -> Self {
        Self::with_connection_data(config.auth.clone(), &config.connection)
    }

    /// The resolved parameters, in application order.
    pub fn params(&self) -> &[AuthParameter] {
        &self.params
    }

    /// Applies the configured parameters to a request.
    pub fn apply(&self, request: &mut HttpRequest) {
        debug!(
            "Applying {} auth parameter(s) to {} {}",
            self.params.len(),
            request.method,
            request.url()
        );
        decorate(request, &self.params);
    }
}

impl Plugin for AuthDecorator {
    fn subscriptions(&self) -> Vec<Subscription> {
        vec![Subscription::new(PipelineEvent::BeforeSend, AUTH_PRIORITY)]
    }

    fn before_send(&mut self, request: &mut HttpRequest) -> Result<(), PipelineError> {
        self.apply(request);
        Ok(())
    }
}
