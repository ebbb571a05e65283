//! Data models for HTTP requests and responses.
//!
//! These are the handles the pipeline passes to its hooks: a mutable request
//! that auth parameters are applied to, and the response it is paired with
//! once sent.

pub mod request;
pub mod response;

pub use request::{BasicCredentials, HttpMethod, HttpRequest};
pub use response::HttpResponse;
