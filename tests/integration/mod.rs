//! Shared helpers for integration tests.

pub mod history_properties_test;
pub mod pipeline_test;

use rest_plugins::models::{HttpRequest, HttpResponse};
use rest_plugins::transport::TransportError;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test logging (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Transport that answers every request with 200 and echoes the request
/// line in the body.
pub fn echo_transport(request: &HttpRequest) -> Result<HttpResponse, TransportError> {
    let mut response = HttpResponse::new(200, "OK");
    response.add_header("Content-Type", "text/plain");
    response.set_body(format!("{} {}", request.method, request.resource()));
    Ok(response)
}
