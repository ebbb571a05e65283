//! Bounded request history.
//!
//! [`HistoryRecorder`] keeps the most recent request/response pairs in memory
//! and mirrors each one into an expiring sorted collection in an external
//! store, so the history outlives the process for a while.
//!
//! # Example
//!
//! ```
//! use rest_plugins::history::HistoryRecorder;
//! use rest_plugins::models::{HttpMethod, HttpRequest, HttpResponse};
//! use rest_plugins::store::MemoryStore;
//!
//! let mut history = HistoryRecorder::new(Box::new(MemoryStore::new()));
//! history.set_limit(2).set_id("history:docs");
//!
//! for path in ["/a", "/b", "/c"] {
//!     let request = HttpRequest::new(HttpMethod::GET, &format!("https://example.com{}", path)).unwrap();
//!     history.record(request, Some(HttpResponse::new(200, "OK"))).unwrap();
//! }
//!
//! assert_eq!(history.count(), 2);
//! assert_eq!(history.last_request().unwrap().url().path(), "/c");
//! ```

pub mod models;
pub mod recorder;
pub mod ui;

pub use models::{HistoryError, MirrorEntry, MirrorResponse, Transaction};
pub use recorder::{HistoryRecorder, DEFAULT_EXPIRE_SECONDS, DEFAULT_LIMIT, HISTORY_PRIORITY};
pub use ui::{format_transaction, format_transcript};
