//! Request pipeline plugins for authentication and history.
//!
//! Two plugins hook into a synchronous request pipeline:
//!
//! - **auth**: [`auth::AuthDecorator`] applies configured credentials (query
//!   parameters, headers, or HTTP Basic auth) to every request right before
//!   it is sent.
//! - **history**: [`history::HistoryRecorder`] keeps a bounded list of recent
//!   request/response pairs and mirrors each pair into an expiring sorted
//!   set in an external store.
//!
//! # Architecture
//!
//! - **models**: request and response handles
//! - **pipeline**: hook registry and the [`pipeline::Client`] that runs it
//! - **transport**: sends requests (reqwest behind the `http` feature)
//! - **store**: sorted-set stores (in-memory, Redis behind `redis-store`)
//! - **config**: JSON configuration for both plugins
//!
//! # Example
//!
//! ```
//! use rest_plugins::auth::{AuthDecorator, AuthParameter};
//! use rest_plugins::history::HistoryRecorder;
//! use rest_plugins::models::{HttpMethod, HttpRequest, HttpResponse};
//! use rest_plugins::pipeline::Client;
//! use rest_plugins::store::MemoryStore;
//! use rest_plugins::transport::TransportError;
//!
//! let transport = |_: &HttpRequest| -> Result<HttpResponse, TransportError> {
//!     Ok(HttpResponse::new(200, "OK"))
//! };
//!
//! let mut client = Client::new(transport);
//! client.attach(AuthDecorator::new(vec![AuthParameter::header("X-Api-Key", "abc")]));
//! let history = client.attach(HistoryRecorder::new(Box::new(MemoryStore::new())));
//!
//! let request = HttpRequest::new(HttpMethod::GET, "https://api.example.com/items").unwrap();
//! client.send(request).unwrap();
//!
//! let history = history.borrow();
//! assert_eq!(history.count(), 1);
//! assert_eq!(history.last_request().unwrap().header("X-Api-Key"), Some("abc"));
//! ```

pub mod auth;
pub mod config;
pub mod history;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod transport;

pub use auth::{AuthDecorator, AuthKind, AuthParameter};
pub use config::{load_config, load_config_file, PluginConfig};
pub use history::{HistoryError, HistoryRecorder};
pub use models::{HttpMethod, HttpRequest, HttpResponse};
pub use pipeline::{Client, PipelineError, Plugin};
