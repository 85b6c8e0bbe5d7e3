use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::listeners::{BoundHandler, HandlerContext, HandlerReturn, ListenerMap, update_listeners};
use crate::{DomEvent, VNode};

/// The injected native-subscription pair. Implementations pair add/remove
/// calls up by handler identity (`Rc::ptr_eq`), event name and capture flag.
///
/// Implementations must not hold a borrow of themselves while dispatching:
/// a once-shell removes itself from inside its own invocation.
pub trait EventBackend {
    fn add_listener(&mut self, name: &str, handler: BoundHandler, capture: bool, passive: bool);
    fn remove_listener(&mut self, name: &str, handler: &BoundHandler, capture: bool);
}

/// Patch-time event module for one render target.
///
/// Exposes the hook triple the patch layer drives per node: `create` (no
/// old listeners), `update` (both sides present) and `destroy` (no new
/// listeners), all funnelling into one reconciliation pass.
pub struct EventModule<B: EventBackend> {
    target: Rc<RefCell<B>>,
    ctx: HandlerContext,
    /// Start time of the current patch flush. Handlers attached during the
    /// flush ignore events delivered before it (see `gate`).
    flush_timestamp: Cell<f64>,
    /// Registered handler -> gate wrapper, so removal unregisters the
    /// callable that was actually added.
    wrappers: Rc<RefCell<HashMap<usize, BoundHandler>>>,
}

impl<B: EventBackend + 'static> EventModule<B> {
    pub fn new(target: Rc<RefCell<B>>, ctx: HandlerContext) -> Self {
        Self {
            target,
            ctx,
            flush_timestamp: Cell::new(0.0),
            wrappers: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Called by the scheduler when a patch flush begins.
    pub fn set_flush_timestamp(&self, ts: f64) {
        self.flush_timestamp.set(ts);
    }

    pub fn create(&self, vnode: &mut VNode) {
        let empty = ListenerMap::new();
        if let VNode::Element { data, .. } = vnode {
            self.update_dom_listeners(&empty, &mut data.on);
        }
    }

    pub fn update(&self, old_vnode: &VNode, vnode: &mut VNode) {
        let empty = ListenerMap::new();
        let old_on = match old_vnode {
            VNode::Element { data, .. } => &data.on,
            VNode::Text(_) => &empty,
        };
        if let VNode::Element { data, .. } = vnode {
            self.update_dom_listeners(old_on, &mut data.on);
        }
    }

    pub fn destroy(&self, vnode: &VNode) {
        let mut empty = ListenerMap::new();
        if let VNode::Element { data, .. } = vnode {
            self.update_dom_listeners(&data.on, &mut empty);
        }
    }

    fn update_dom_listeners(&self, old_on: &ListenerMap, on: &mut ListenerMap) {
        if old_on.is_empty() && on.is_empty() {
            return;
        }
        let flush = self.flush_timestamp.get();

        let target = self.target.clone();
        let wrappers = self.wrappers.clone();
        let mut add = move |name: &str, handler: &BoundHandler, capture: bool, passive: bool| {
            let gated = gate(handler.clone(), flush);
            wrappers.borrow_mut().insert(rc_key(handler), gated.clone());
            target.borrow_mut().add_listener(name, gated, capture, passive);
        };

        let target = self.target.clone();
        let wrappers = self.wrappers.clone();
        let mut remove = move |name: &str, handler: &BoundHandler, capture: bool| {
            let registered = wrappers
                .borrow_mut()
                .remove(&rc_key(handler))
                .unwrap_or_else(|| handler.clone());
            target.borrow_mut().remove_listener(name, &registered, capture);
        };

        let mut create_once = |name: &str, handler: BoundHandler, capture: bool| {
            self.create_once_handler(name, handler, capture)
        };

        update_listeners(on, old_on, &mut add, &mut remove, &mut create_once, &self.ctx);
    }

    /// Wrap a bound handler in a shell that unsubscribes itself after the
    /// first invocation whose result is not the strict null "keep me" value.
    fn create_once_handler(&self, name: &str, handler: BoundHandler, capture: bool) -> BoundHandler {
        let target = self.target.clone();
        let wrappers = self.wrappers.clone();
        let name = name.to_string();
        // The shell needs its own identity to remove itself; fill the cell
        // after construction.
        let own: Rc<RefCell<Option<BoundHandler>>> = Rc::new(RefCell::new(None));
        let own_ref = own.clone();
        let shell: BoundHandler = Rc::new(move |e: &DomEvent| {
            let res = handler(e);
            if res != HandlerReturn::Null {
                let own = own_ref.borrow().clone();
                if let Some(own) = own {
                    let registered = wrappers
                        .borrow_mut()
                        .remove(&rc_key(&own))
                        .unwrap_or(own);
                    target.borrow_mut().remove_listener(&name, &registered, capture);
                }
            }
            res
        });
        *own.borrow_mut() = Some(shell.clone());
        shell
    }
}

fn rc_key(h: &BoundHandler) -> usize {
    Rc::as_ptr(h) as *const () as usize
}

/// Transitional wrapper for the in-flight-event edge case: an event already
/// propagating when the patch attached this handler must not trigger it.
/// Bypassed when the event cannot have bubbled (`target` is
/// `current_target`) or the delivery clock is unreliable (non-positive
/// timestamp).
fn gate(handler: BoundHandler, attached: f64) -> BoundHandler {
    Rc::new(move |e: &DomEvent| {
        if e.target == e.current_target || e.timestamp >= attached || e.timestamp <= 0.0 {
            handler(e)
        } else {
            HandlerReturn::Null
        }
    })
}
