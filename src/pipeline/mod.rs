//! Request pipeline with two hook points.
//!
//! Plugins subscribe to [`PipelineEvent::BeforeSend`] (the request may still be
//! mutated) and/or [`PipelineEvent::RequestSent`] (the response is known).
//! Hooks for an event run synchronously, highest priority first; hooks with
//! equal priority run in registration order.

mod dispatcher;
mod error;

pub use dispatcher::{EventDispatcher, SharedPlugin};
pub use error::PipelineError;

use crate::models::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;

/// Pipeline extension points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineEvent {
    /// Fired after the request is built and before it is transmitted.
    BeforeSend,
    /// Fired once the request has completed.
    RequestSent,
}

/// A plugin's interest in one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub event: PipelineEvent,
    pub priority: i32,
}

impl Subscription {
    pub fn new(event: PipelineEvent, priority: i32) -> Self {
        Self { event, priority }
    }
}

/// A hook set attached to the pipeline.
///
/// Only the methods for events listed in [`Plugin::subscriptions`] are called.
pub trait Plugin {
    /// Events this plugin listens to, with their priorities.
    fn subscriptions(&self) -> Vec<Subscription>;

    fn before_send(&mut self, _request: &mut HttpRequest) -> Result<(), PipelineError> {
        Ok(())
    }

    fn request_sent(
        &mut self,
        _request: &HttpRequest,
        _response: Option<&HttpResponse>,
    ) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// Sends requests through a transport, running plugin hooks around it.
pub struct Client<T: Transport> {
    transport: T,
    dispatcher: EventDispatcher,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            dispatcher: EventDispatcher::new(),
        }
    }

    /// Registers a plugin for every event it subscribes to.
    pub fn add_subscriber(&mut self, plugin: SharedPlugin) -> &mut Self {
        self.dispatcher.add_subscriber(plugin);
        self
    }

    /// Wraps a plugin for sharing, registers it, and returns the shared handle
    /// so the caller can keep inspecting it.
    pub fn attach<P: Plugin + 'static>(&mut self, plugin: P) -> Rc<RefCell<P>> {
        let shared = Rc::new(RefCell::new(plugin));
        self.dispatcher.add_subscriber(shared.clone());
        shared
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Sends a request.
    ///
    /// Runs the before-send hooks, transmits the request, attaches the
    /// response to it, and runs the request-sent hooks. Returns the request
    /// with its response attached.
    ///
    /// # Errors
    ///
    /// Returns the first hook or transport failure. A failing before-send hook
    /// stops the request from being transmitted.
    pub fn send(&self, mut request: HttpRequest) -> Result<HttpRequest, PipelineError> {
        self.dispatcher.dispatch_before_send(&mut request)?;

        debug!("Sending {} {}", request.method, request.url());
        let response = self.transport.send(&request)?;
        debug!(
            "Received {} {} for {} {}",
            response.status_code,
            response.status_text,
            request.method,
            request.url()
        );

        request.set_response(Some(response));
        self.dispatcher
            .dispatch_request_sent(&request, request.response())?;

        Ok(request)
    }
}
