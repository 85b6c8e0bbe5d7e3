use std::collections::HashMap;

pub mod events;
pub mod listeners;

pub use events::{EventBackend, EventModule};
pub use listeners::{
    BoundHandler, HandlerContext, HandlerReturn, Invoker, ListenerEntry, ListenerFn, ListenerMap,
    ListenerSlot, NormalizedEvent, normalize_event, update_listeners,
};

/// A native event as delivered by the host platform. `target` and
/// `current_target` are the host's node identities; `timestamp` is the
/// host clock at delivery time.
#[derive(Debug, Clone, PartialEq)]
pub struct DomEvent {
    pub event_type: String,
    pub timestamp: f64,
    pub target: usize,
    pub current_target: usize,
}

impl DomEvent {
    pub fn new(event_type: impl Into<String>, timestamp: f64) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp,
            target: 0,
            current_target: 0,
        }
    }

    pub fn at(mut self, target: usize, current_target: usize) -> Self {
        self.target = target;
        self.current_target = current_target;
        self
    }
}

#[derive(Clone)]
pub enum VNode {
    Element {
        tag: String,
        data: VNodeData,
        children: Vec<VNode>,
    },
    Text(String),
}

#[derive(Clone, Default)]
pub struct VNodeData {
    pub attrs: HashMap<String, String>,
    pub on: ListenerMap,
}

impl VNodeData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.attrs.insert(k.into(), v.into());
        self
    }

    /// Bind a single handler. The name may carry the `&`/`~`/`!` prefix
    /// markers (passive/once/capture).
    pub fn on(mut self, name: impl Into<String>, handler: ListenerFn) -> Self {
        self.on
            .insert(name.into(), Some(ListenerEntry::handler(handler)));
        self
    }

    /// Bind an ordered handler sequence under one event name.
    pub fn on_many(mut self, name: impl Into<String>, handlers: Vec<ListenerFn>) -> Self {
        self.on
            .insert(name.into(), Some(ListenerEntry::handlers(handlers)));
        self
    }
}

pub fn h(tag: impl Into<String>, data: VNodeData, children: Vec<VNode>) -> VNode {
    VNode::Element {
        tag: tag.into(),
        data,
        children,
    }
}

pub fn text(t: impl Into<String>) -> VNode {
    VNode::Text(t.into())
}
