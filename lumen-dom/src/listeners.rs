use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::DomEvent;

/// What a listener hands back to the dispatcher. `Null` is the strict-null
/// "keep me installed" signal a once-wrapped handler can return; anything
/// else counts as handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerReturn {
    Null,
    Value,
}

/// A user event handler. Faults are routed to the owning context's error
/// reporter, never propagated into the patch cycle.
pub type ListenerFn = Rc<dyn Fn(&DomEvent) -> anyhow::Result<HandlerReturn>>;

/// A handler in the form the platform registers: infallible, faults already
/// routed. Identity (`Rc::ptr_eq`) is what add/remove pair up on.
pub type BoundHandler = Rc<dyn Fn(&DomEvent) -> HandlerReturn>;

/// Payload of an invoker: one handler or an ordered sequence.
#[derive(Clone)]
pub enum ListenerSlot {
    Single(ListenerFn),
    Many(Vec<ListenerFn>),
}

/// Context a dispatch runs under: names the owning component for
/// diagnostics and receives routed handler faults.
#[derive(Clone)]
pub struct HandlerContext {
    pub component: String,
    on_error: Rc<dyn Fn(&anyhow::Error, &str)>,
}

impl HandlerContext {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            on_error: Rc::new(|err, info| log::error!("error in {info}: {err:#}")),
        }
    }

    pub fn with_error_hook(mut self, hook: impl Fn(&anyhow::Error, &str) + 'static) -> Self {
        self.on_error = Rc::new(hook);
        self
    }

    pub fn handle_error(&self, err: &anyhow::Error, info: &str) {
        (self.on_error)(err, info);
    }
}

impl Default for HandlerContext {
    fn default() -> Self {
        Self::new("<anonymous>")
    }
}

/// Call one handler, routing any fault to the context reporter. A faulting
/// handler counts as having returned a (non-null) value.
pub fn invoke_with_error_handling(
    f: &ListenerFn,
    event: &DomEvent,
    ctx: &HandlerContext,
    info: &str,
) -> HandlerReturn {
    match f(event) {
        Ok(ret) => ret,
        Err(err) => {
            ctx.handle_error(&err, info);
            HandlerReturn::Value
        }
    }
}

/// Identity-stable wrapper around the current handler payload.
///
/// The `Rc<Invoker>` handed to the platform never changes across
/// re-renders; only the `fns` cell is swapped, so a handler-content change
/// costs one cell write instead of an unsubscribe/resubscribe pair. Safe
/// without synchronization because dispatch and swap both happen on the
/// single event-loop thread.
pub struct Invoker {
    fns: RefCell<ListenerSlot>,
    ctx: HandlerContext,
}

impl Invoker {
    pub fn new(fns: ListenerSlot, ctx: HandlerContext) -> Rc<Self> {
        Rc::new(Self {
            fns: RefCell::new(fns),
            ctx,
        })
    }

    /// Swap the payload without touching the platform subscription.
    pub fn replace(&self, fns: ListenerSlot) {
        *self.fns.borrow_mut() = fns;
    }

    pub fn invoke(&self, event: &DomEvent) -> HandlerReturn {
        // Snapshot first: a handler may swap the payload mid-dispatch.
        let fns = self.fns.borrow().clone();
        match fns {
            ListenerSlot::Many(list) => {
                for f in &list {
                    invoke_with_error_handling(f, event, &self.ctx, "event handler");
                }
                // A sequence has no single return value.
                HandlerReturn::Value
            }
            ListenerSlot::Single(f) => {
                invoke_with_error_handling(&f, event, &self.ctx, "event handler")
            }
        }
    }
}

/// One value in a vnode's listener map. `None` in the map (a handler the
/// render produced no value for) is a usage error the reconciler warns on.
#[derive(Clone)]
pub enum ListenerEntry {
    /// Fresh handler(s) straight out of a render.
    Handler(ListenerSlot),
    /// Installed by a previous patch: the stable invoker plus the callable
    /// actually registered with the platform (once-shell included).
    Bound {
        invoker: Rc<Invoker>,
        registered: BoundHandler,
    },
}

impl ListenerEntry {
    pub fn handler(f: ListenerFn) -> Self {
        ListenerEntry::Handler(ListenerSlot::Single(f))
    }

    pub fn handlers(fs: Vec<ListenerFn>) -> Self {
        ListenerEntry::Handler(ListenerSlot::Many(fs))
    }

    fn slot(&self) -> ListenerSlot {
        match self {
            ListenerEntry::Handler(slot) => slot.clone(),
            ListenerEntry::Bound { invoker, .. } => invoker.fns.borrow().clone(),
        }
    }
}

/// Insertion order drives subscription order: `add` side effects happen in
/// the order the render bound the events.
pub type ListenerMap = IndexMap<String, Option<ListenerEntry>>;

/// Event name with its prefix markers decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub name: String,
    pub once: bool,
    pub capture: bool,
    pub passive: bool,
}

/// Decode the `&` (passive), `~` (once) and `!` (capture) markers the
/// compiler encodes into the event name. The strip order is fixed, each
/// marker checked only at the very front, so stacked markers stay
/// unambiguous.
pub fn normalize_event(name: &str) -> NormalizedEvent {
    let (passive, name) = strip_marker(name, '&');
    let (once, name) = strip_marker(name, '~');
    let (capture, name) = strip_marker(name, '!');
    NormalizedEvent {
        name: name.to_string(),
        once,
        capture,
        passive,
    }
}

fn strip_marker(name: &str, marker: char) -> (bool, &str) {
    match name.strip_prefix(marker) {
        Some(rest) => (true, rest),
        None => (false, name),
    }
}

/// Diff `on` against `old_on` for one tree node, attaching, reusing or
/// detaching platform subscriptions.
///
/// Entries in `on` are upgraded in place to their bound form so the next
/// patch can compare by invoker identity. A name present in both maps with
/// a changed payload mutates the existing invoker instead of resubscribing;
/// names gone from `on` are unsubscribed with their recovered true name and
/// capture flag.
pub fn update_listeners(
    on: &mut ListenerMap,
    old_on: &ListenerMap,
    add: &mut dyn FnMut(&str, &BoundHandler, bool, bool),
    remove: &mut dyn FnMut(&str, &BoundHandler, bool),
    create_once: &mut dyn FnMut(&str, BoundHandler, bool) -> BoundHandler,
    ctx: &HandlerContext,
) {
    let names: Vec<String> = on.keys().cloned().collect();
    for name in names {
        let event = normalize_event(&name);
        let cur = on.get(&name).and_then(|e| e.clone());

        let Some(cur) = cur else {
            log::warn!(
                "invalid handler for event \"{}\" in {}: got none",
                event.name,
                ctx.component
            );
            continue;
        };

        let old_bound = match old_on.get(&name).and_then(|e| e.clone()) {
            Some(ListenerEntry::Bound { invoker, registered }) => Some((invoker, registered)),
            // Absent, or an unbound entry the previous patch never saw:
            // subscribe fresh either way.
            _ => None,
        };

        match old_bound {
            None => {
                let (invoker, registered) = match cur {
                    // Payload already carries invoker semantics: reuse it.
                    ListenerEntry::Bound { invoker, registered } => (invoker, registered),
                    ListenerEntry::Handler(slot) => {
                        let invoker = Invoker::new(slot, ctx.clone());
                        let base: BoundHandler = {
                            let invoker = invoker.clone();
                            Rc::new(move |e: &DomEvent| invoker.invoke(e))
                        };
                        let registered = if event.once {
                            create_once(&event.name, base, event.capture)
                        } else {
                            base
                        };
                        (invoker, registered)
                    }
                };
                add(&event.name, &registered, event.capture, event.passive);
                on.insert(name, Some(ListenerEntry::Bound { invoker, registered }));
            }
            Some((old_invoker, registered)) => {
                let changed = match &cur {
                    ListenerEntry::Bound { invoker, .. } => !Rc::ptr_eq(invoker, &old_invoker),
                    ListenerEntry::Handler(_) => true,
                };
                if changed {
                    old_invoker.replace(cur.slot());
                    on.insert(
                        name,
                        Some(ListenerEntry::Bound {
                            invoker: old_invoker,
                            registered,
                        }),
                    );
                }
            }
        }
    }

    for (name, old) in old_on {
        if on.get(name).is_none_or(|e| e.is_none()) {
            let event = normalize_event(name);
            if let Some(ListenerEntry::Bound { registered, .. }) = old {
                remove(&event.name, registered, event.capture);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_plain_name() {
        let e = normalize_event("click");
        assert_eq!(e.name, "click");
        assert!(!e.once && !e.capture && !e.passive);
    }

    #[test]
    fn normalize_stacked_markers() {
        let e = normalize_event("&~!keyup");
        assert_eq!(e.name, "keyup");
        assert!(e.passive && e.once && e.capture);
    }

    #[test]
    fn markers_only_strip_in_fixed_order() {
        // `~` before `&` means the passive marker is not at the front and
        // survives as part of the name.
        let e = normalize_event("~&scroll");
        assert!(e.once && !e.passive);
        assert_eq!(e.name, "&scroll");
    }
}
