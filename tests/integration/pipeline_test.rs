//! End-to-end tests: configuration, auth decoration and history recording
//! through a single client.

use super::{echo_transport, init_test_env};
use rest_plugins::auth::{AuthDecorator, AuthParameter, AUTH_PRIORITY};
use rest_plugins::config::{load_config, StoreFailurePolicy};
use rest_plugins::history::{HistoryError, HistoryRecorder, MirrorEntry, HISTORY_PRIORITY};
use rest_plugins::models::{HttpMethod, HttpRequest, HttpResponse};
use rest_plugins::pipeline::{Client, PipelineError, PipelineEvent, Plugin, Subscription};
use rest_plugins::store::{HistoryStore, MemoryStore, StoreError};
use rest_plugins::transport::TransportError;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

/// Sets `token=early` before auth runs.
struct EarlyToken;

impl Plugin for EarlyToken {
    fn subscriptions(&self) -> Vec<Subscription> {
        vec![Subscription::new(PipelineEvent::BeforeSend, 0)]
    }

    fn before_send(&mut self, request: &mut HttpRequest) -> Result<(), PipelineError> {
        request.set_query_param("token", "early");
        Ok(())
    }
}

/// Store that is always down.
struct DownStore;

impl HistoryStore for DownStore {
    fn add_to_sorted_set(&mut self, _: &str, _: &str, _: i64) -> Result<(), StoreError> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    fn expire(&mut self, _: &str, _: u64) -> Result<(), StoreError> {
        Err(StoreError::Connection("connection refused".to_string()))
    }
}

fn get(url: &str) -> HttpRequest {
    HttpRequest::new(HttpMethod::GET, url).expect("valid test URL")
}

#[test]
fn test_configured_plugins_end_to_end() {
    init_test_env();

    let config = load_config(Some(json!({
        "auth": [
            {"type": "query", "key": "token", "value": ":token"},
            {"type": "header", "key": "X-Api-Key", "value": ":key"},
            {"type": "basicAuth", "key": "user", "value": "pass"}
        ],
        "connection": {"token": "xyz", "key": "abc"},
        "history": {"limit": 2, "expireSeconds": 300, "recordId": "history:e2e"}
    })))
    .unwrap();

    let store = Rc::new(RefCell::new(MemoryStore::new()));
    let mut client = Client::new(echo_transport);
    client.attach(AuthDecorator::from_config(&config));
    let history = client.attach(HistoryRecorder::from_config(
        &config.history,
        Box::new(Rc::clone(&store)),
    ));

    let sent = client.send(get("https://api.example.com/items?page=1")).unwrap();

    assert_eq!(sent.query_param("token").as_deref(), Some("xyz"));
    assert_eq!(sent.header("X-Api-Key"), Some("abc"));
    assert_eq!(sent.auth().unwrap().username, "user");
    assert_eq!(
        sent.response().unwrap().body_text(),
        "GET /items?page=1&token=xyz"
    );

    let history = history.borrow();
    assert_eq!(history.count(), 1);
    assert_eq!(history.last_request().unwrap().header("X-Api-Key"), Some("abc"));

    let members = store.borrow().members("history:e2e");
    assert_eq!(members.len(), 1);
    let entry = MirrorEntry::from_json(&members[0]).unwrap();
    assert!(entry.request.starts_with("GET /items?page=1&token=xyz HTTP/1.1\r\n"));
    assert!(entry.request.contains("X-Api-Key: abc"));
    assert!(entry.request.contains("Authorization: Basic dXNlcjpwYXNz"));
    assert_eq!(entry.response.unwrap().body, "GET /items?page=1&token=xyz");

    let ttl = store.borrow().ttl("history:e2e").unwrap();
    assert!(ttl > 290 && ttl <= 300);
}

#[test]
fn test_auth_runs_after_other_before_send_hooks() {
    init_test_env();

    let mut client = Client::new(echo_transport);
    // Registered first, but must still run last.
    client.attach(AuthDecorator::new(vec![AuthParameter::query("token", "auth")]));
    client.attach(EarlyToken);

    assert_eq!(
        client.dispatcher().priorities(PipelineEvent::BeforeSend),
        vec![0, AUTH_PRIORITY]
    );

    let sent = client.send(get("https://api.example.com/")).unwrap();
    assert_eq!(sent.query_param("token").as_deref(), Some("auth"));
}

#[test]
fn test_history_registered_on_request_sent() {
    let mut client = Client::new(echo_transport);
    client.attach(HistoryRecorder::new(Box::new(MemoryStore::new())));

    assert_eq!(client.dispatcher().listener_count(PipelineEvent::BeforeSend), 0);
    assert_eq!(
        client.dispatcher().priorities(PipelineEvent::RequestSent),
        vec![HISTORY_PRIORITY]
    );
}

#[test]
fn test_bounded_history_through_client() {
    init_test_env();

    let mut client = Client::new(echo_transport);
    let mut recorder = HistoryRecorder::new(Box::new(MemoryStore::new()));
    recorder.set_limit(2);
    let history = client.attach(recorder);

    for path in ["/a", "/b", "/c"] {
        client
            .send(get(&format!("https://api.example.com{}", path)))
            .unwrap();
    }

    let history = history.borrow();
    let paths: Vec<String> = history
        .get_all()
        .iter()
        .map(|t| t.request.url().path().to_string())
        .collect();
    assert_eq!(paths, vec!["/b", "/c"]);
    assert_eq!(
        history.last_response().unwrap().unwrap().body_text(),
        "GET /c"
    );
}

#[test]
fn test_transport_failure_not_recorded() {
    let mut client = Client::new(|_: &HttpRequest| -> Result<HttpResponse, TransportError> {
        Err(TransportError::NetworkError("unreachable".to_string()))
    });
    let history = client.attach(HistoryRecorder::new(Box::new(MemoryStore::new())));

    let result = client.send(get("https://api.example.com/"));

    assert!(matches!(result, Err(PipelineError::Transport(_))));
    assert_eq!(history.borrow().count(), 0);
}

#[test]
fn test_store_outage_local_only_does_not_fail_request() {
    init_test_env();

    let mut client = Client::new(echo_transport);
    let history = client.attach(HistoryRecorder::new(Box::new(DownStore)));

    let sent = client.send(get("https://api.example.com/"));

    assert!(sent.is_ok());
    assert_eq!(history.borrow().count(), 1);
}

#[test]
fn test_store_outage_propagated_after_local_append() {
    let mut client = Client::new(echo_transport);
    let mut recorder = HistoryRecorder::new(Box::new(DownStore));
    recorder.set_failure_policy(StoreFailurePolicy::Propagate);
    let history = client.attach(recorder);

    let result = client.send(get("https://api.example.com/"));

    assert!(matches!(
        result,
        Err(PipelineError::History(HistoryError::StoreError(
            StoreError::Connection(_)
        )))
    ));
    assert_eq!(history.borrow().count(), 1);
}

#[test]
fn test_iter_yields_requests_with_responses() {
    let mut client = Client::new(echo_transport);
    let history = client.attach(HistoryRecorder::new(Box::new(MemoryStore::new())));

    client.send(get("https://api.example.com/one")).unwrap();
    client.send(get("https://api.example.com/two")).unwrap();

    let bodies: Vec<String> = history
        .borrow()
        .iter()
        .map(|request| request.response().unwrap().body_text())
        .collect();
    assert_eq!(bodies, vec!["GET /one", "GET /two"]);
}
