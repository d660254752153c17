//! Unit tests for the static combinators

use async_runtime::{MicrotaskQueue, Promise, PromiseState, Rejector, Resolution, Resolver, Scheduler};
use core_types::Value;
use std::cell::RefCell;
use std::rc::Rc;

fn setup() -> (MicrotaskQueue, Rc<dyn Scheduler>) {
    let queue = MicrotaskQueue::new();
    let scheduler = queue.scheduler();
    (queue, scheduler)
}

fn drain(queue: &MicrotaskQueue) {
    while queue.run_next() {}
}

fn deferred(scheduler: &Rc<dyn Scheduler>) -> (Promise, Resolver, Rejector) {
    let slot = RefCell::new(None);
    let promise = Promise::new(scheduler, |resolve, reject| {
        *slot.borrow_mut() = Some((resolve, reject));
        Ok(())
    });
    let (resolve, reject) = slot.into_inner().expect("executor runs synchronously");
    (promise, resolve, reject)
}

#[test]
fn resolve_is_identity_on_promises() {
    let (_queue, scheduler) = setup();
    let original = Promise::reject(&scheduler, "r");
    let same = Promise::resolve(&scheduler, original.clone());
    assert!(same.ptr_eq(&original));
    assert_eq!(same.id(), original.id());
}

#[test]
fn resolve_accepts_resolution() {
    let (_queue, scheduler) = setup();
    let p = Promise::resolve(&scheduler, Resolution::Value(Value::Null));
    assert_eq!(p.value(), Some(Value::Null));
}

#[test]
fn reject_always_creates_new_promise() {
    let (_queue, scheduler) = setup();
    let a = Promise::reject(&scheduler, "x");
    let b = Promise::reject(&scheduler, "x");
    assert!(!a.ptr_eq(&b));
    assert_eq!(a.state(), PromiseState::Rejected);
}

#[test]
fn all_empty_fulfills_with_empty_array() {
    let (_queue, scheduler) = setup();
    let p = Promise::all(&scheduler, Vec::<Resolution>::new());
    assert_eq!(p.state(), PromiseState::Fulfilled);
    assert_eq!(p.value(), Some(Value::Array(vec![])));
}

#[test]
fn all_preserves_input_order() {
    let (queue, scheduler) = setup();
    let (p0, r0, _) = deferred(&scheduler);
    let (p1, r1, _) = deferred(&scheduler);
    let (p2, r2, _) = deferred(&scheduler);

    let aggregate = Promise::all(&scheduler, vec![p0, p1, p2]);

    r1.resolve(Value::from("v1"));
    drain(&queue);
    r2.resolve(Value::from("v2"));
    drain(&queue);
    assert!(aggregate.is_pending());
    r0.resolve(Value::from("v0"));
    drain(&queue);

    assert_eq!(
        aggregate.value(),
        Some(Value::Array(vec!["v0".into(), "v1".into(), "v2".into()]))
    );
}

#[test]
fn all_first_failure_wins() {
    let (queue, scheduler) = setup();
    let items = vec![
        Promise::resolve(&scheduler, Value::Smi(1)),
        Promise::reject(&scheduler, "x"),
        Promise::resolve(&scheduler, Value::Smi(3)),
    ];
    let aggregate = Promise::all(&scheduler, items);
    drain(&queue);
    assert_eq!(aggregate.reason(), Some(Value::from("x")));
}

#[test]
fn all_ignores_later_rejections() {
    let (queue, scheduler) = setup();
    let (p0, _, reject0) = deferred(&scheduler);
    let (p1, _, reject1) = deferred(&scheduler);
    let aggregate = Promise::all(&scheduler, vec![p0, p1]);

    reject1.reject("first");
    drain(&queue);
    reject0.reject("second");
    drain(&queue);

    assert_eq!(aggregate.reason(), Some(Value::from("first")));
}

#[test]
fn all_accepts_any_iterator() {
    let (queue, scheduler) = setup();
    let aggregate = Promise::all(&scheduler, (1..=3).map(Value::Smi));
    drain(&queue);
    assert_eq!(
        aggregate.value(),
        Some(Value::Array(vec![Value::Smi(1), Value::Smi(2), Value::Smi(3)]))
    );
}

#[test]
fn all_is_asynchronous_for_non_empty_input() {
    let (queue, scheduler) = setup();
    let aggregate = Promise::all(&scheduler, vec![Value::Smi(1)]);
    assert!(aggregate.is_pending());
    drain(&queue);
    assert_eq!(aggregate.value(), Some(Value::Array(vec![Value::Smi(1)])));
}
