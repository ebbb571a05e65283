//! Priority-ordered hook registry.

use super::{PipelineError, PipelineEvent, Plugin};
use crate::models::{HttpRequest, HttpResponse};
use std::cell::RefCell;
use std::cmp::Reverse;
use std::rc::Rc;

/// A plugin shared between the pipeline and its owner.
pub type SharedPlugin = Rc<RefCell<dyn Plugin>>;

struct Registration {
    priority: i32,
    seq: usize,
    plugin: SharedPlugin,
}

/// Ordered hook lists for each [`PipelineEvent`].
#[derive(Default)]
pub struct EventDispatcher {
    before_send: Vec<Registration>,
    request_sent: Vec<Registration>,
    next_seq: usize,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `plugin` under each of its subscriptions.
    pub fn add_subscriber(&mut self, plugin: SharedPlugin) {
        let subscriptions = plugin.borrow().subscriptions();
        for sub in subscriptions {
            let registration = Registration {
                priority: sub.priority,
                seq: self.next_seq,
                plugin: Rc::clone(&plugin),
            };
            self.next_seq += 1;

            let list = self.list_mut(sub.event);
            list.push(registration);
            list.sort_by_key(|r| (Reverse(r.priority), r.seq));
        }
    }

    /// Number of hooks registered for `event`.
    pub fn listener_count(&self, event: PipelineEvent) -> usize {
        self.list(event).len()
    }

    /// Priorities registered for `event`, in dispatch order.
    pub fn priorities(&self, event: PipelineEvent) -> Vec<i32> {
        self.list(event).iter().map(|r| r.priority).collect()
    }

    /// Runs every before-send hook. Stops at the first error.
    pub fn dispatch_before_send(&self, request: &mut HttpRequest) -> Result<(), PipelineError> {
        for registration in &self.before_send {
            registration.plugin.borrow_mut().before_send(request)?;
        }
        Ok(())
    }

    /// Runs every request-sent hook. Stops at the first error.
    pub fn dispatch_request_sent(
        &self,
        request: &HttpRequest,
        response: Option<&HttpResponse>,
    ) -> Result<(), PipelineError> {
        for registration in &self.request_sent {
            registration
                .plugin
                .borrow_mut()
                .request_sent(request, response)?;
        }
        Ok(())
    }

    fn list(&self, event: PipelineEvent) -> &Vec<Registration> {
        match event {
            PipelineEvent::BeforeSend => &self.before_send,
            PipelineEvent::RequestSent => &self.request_sent,
        }
    }

    fn list_mut(&mut self, event: PipelineEvent) -> &mut Vec<Registration> {
        match event {
            PipelineEvent::BeforeSend => &mut self.before_send,
            PipelineEvent::RequestSent => &mut self.request_sent,
        }
    }
}
