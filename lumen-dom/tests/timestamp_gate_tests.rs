use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lumen_dom::{
    BoundHandler, DomEvent, EventBackend, EventModule, HandlerContext, HandlerReturn, ListenerFn,
    VNodeData, h,
};

#[derive(Default)]
struct RecordingTarget {
    listeners: Vec<(String, BoundHandler, bool, bool)>,
    removes: usize,
}

impl EventBackend for RecordingTarget {
    fn add_listener(&mut self, name: &str, handler: BoundHandler, capture: bool, passive: bool) {
        self.listeners
            .push((name.to_string(), handler, capture, passive));
    }

    fn remove_listener(&mut self, name: &str, handler: &BoundHandler, capture: bool) {
        self.removes += 1;
        self.listeners
            .retain(|(n, h, c, _)| !(n == name && Rc::ptr_eq(h, handler) && *c == capture));
    }
}

fn fire(target: &Rc<RefCell<RecordingTarget>>, event: &DomEvent) -> Vec<HandlerReturn> {
    let snapshot: Vec<BoundHandler> = target
        .borrow()
        .listeners
        .iter()
        .filter(|(n, _, _, _)| n == &event.event_type)
        .map(|(_, h, _, _)| h.clone())
        .collect();
    snapshot.iter().map(|h| h(event)).collect()
}

fn counting(count: &Rc<Cell<usize>>) -> ListenerFn {
    let count = count.clone();
    Rc::new(move |_e: &DomEvent| {
        count.set(count.get() + 1);
        Ok(HandlerReturn::Value)
    })
}

fn attach_at(flush: f64) -> (Rc<RefCell<RecordingTarget>>, Rc<Cell<usize>>) {
    let target = Rc::new(RefCell::new(RecordingTarget::default()));
    let module = EventModule::new(target.clone(), HandlerContext::new("App"));
    module.set_flush_timestamp(flush);
    let count = Rc::new(Cell::new(0));
    let mut vnode = h("button", VNodeData::new().on("click", counting(&count)), vec![]);
    module.create(&mut vnode);
    (target, count)
}

#[test]
fn event_in_flight_before_attachment_is_ignored() {
    let (target, count) = attach_at(100.0);
    let results = fire(&target, &DomEvent::new("click", 50.0).at(1, 2));
    assert_eq!(count.get(), 0);
    assert_eq!(results, vec![HandlerReturn::Null]);
}

#[test]
fn event_delivered_after_attachment_fires() {
    let (target, count) = attach_at(100.0);
    fire(&target, &DomEvent::new("click", 150.0).at(1, 2));
    assert_eq!(count.get(), 1);
}

#[test]
fn non_bubbling_event_bypasses_the_gate() {
    let (target, count) = attach_at(100.0);
    // target == currentTarget: cannot be a leftover from propagation.
    fire(&target, &DomEvent::new("click", 50.0).at(7, 7));
    assert_eq!(count.get(), 1);
}

#[test]
fn unreliable_timestamps_bypass_the_gate() {
    let (target, count) = attach_at(100.0);
    fire(&target, &DomEvent::new("click", 0.0).at(1, 2));
    fire(&target, &DomEvent::new("click", -3.0).at(1, 2));
    assert_eq!(count.get(), 2);
}

#[test]
fn gated_out_event_does_not_consume_a_once_handler() {
    let target = Rc::new(RefCell::new(RecordingTarget::default()));
    let module = EventModule::new(target.clone(), HandlerContext::new("App"));
    module.set_flush_timestamp(100.0);
    let count = Rc::new(Cell::new(0));
    let mut vnode = h("button", VNodeData::new().on("~click", counting(&count)), vec![]);
    module.create(&mut vnode);

    fire(&target, &DomEvent::new("click", 50.0).at(1, 2));
    assert_eq!(count.get(), 0);
    assert_eq!(target.borrow().removes, 0, "once shell must survive a gated-out event");

    fire(&target, &DomEvent::new("click", 150.0).at(1, 2));
    assert_eq!(count.get(), 1);
    assert!(target.borrow().listeners.is_empty());
}
