//! End-to-end pipelines mixing tasks, microtasks and promise chains.

use async_runtime::{EventLoop, EventLoopConfig, Handler, MicroTask, Promise, RuntimeError};
use core_types::{ErrorKind, JsError, Value};
use integration_tests::{deferred, resolve_later, Trace};

fn add(n: i32) -> Handler {
    Handler::new(move |v| match v {
        Value::Smi(m) => Ok(Value::Smi(m + n)),
        other => Err(Value::from(JsError::type_error(format!("not a number: {}", other)))),
    })
}

#[test]
fn chain_resumes_after_task_settles_source() {
    let mut event_loop = EventLoop::new();
    let (source, resolve, _) = deferred(&event_loop);
    let result = source.then(Some(add(1)), None).then(Some(add(10)), None);

    resolve_later(&mut event_loop, resolve, Value::Smi(1));
    event_loop.run_until_done().unwrap();
    assert_eq!(result.value(), Some(Value::Smi(12)));
}

#[test]
fn type_error_in_middle_of_chain_is_caught_at_end() {
    let mut event_loop = EventLoop::new();
    let result = Promise::resolve(&event_loop.scheduler(), Value::from("text"))
        .then(Some(add(1)), None)
        .then(Some(add(2)), None)
        .catch(Handler::new(|reason| match reason {
            Value::Error(e) if e.kind == ErrorKind::TypeError => Ok(Value::from("handled")),
            other => Err(other),
        }));
    event_loop.run_until_done().unwrap();
    assert_eq!(result.value(), Some(Value::from("handled")));
}

#[test]
fn unhandled_rejection_stays_rejected_at_end_of_chain() {
    let mut event_loop = EventLoop::new();
    let tail = Promise::reject(&event_loop.scheduler(), "lost")
        .then(Some(add(1)), None)
        .finally(|| Ok(()));
    assert!(event_loop.run_until_done().is_ok());
    assert_eq!(tail.reason(), Some(Value::from("lost")));
}

#[test]
fn all_waits_for_values_resolved_by_later_tasks() {
    let mut event_loop = EventLoop::new();
    let scheduler = event_loop.scheduler();
    let (slow, resolve_slow, _) = deferred(&event_loop);
    let aggregate = Promise::all(
        &scheduler,
        vec![
            Promise::resolve(&scheduler, Value::Smi(1)),
            slow.then(Some(add(100)), None),
        ],
    );

    event_loop.run_all_microtasks().unwrap();
    assert!(aggregate.is_pending());

    resolve_later(&mut event_loop, resolve_slow, Value::Smi(1));
    event_loop.run_until_done().unwrap();
    assert_eq!(
        aggregate.value(),
        Some(Value::Array(vec![Value::Smi(1), Value::Smi(101)]))
    );
}

#[test]
fn reactions_interleave_with_plain_microtasks_in_fifo_order() {
    let mut event_loop = EventLoop::new();
    let trace = Trace::default();
    let scheduler = event_loop.scheduler();

    let t = trace.clone();
    Promise::resolve(&scheduler, Value::Undefined).then(
        Some(Handler::new(move |v| {
            t.push("promise reaction");
            Ok(v)
        })),
        None,
    );
    let t = trace.clone();
    event_loop.enqueue_microtask(MicroTask::new(move || t.push("plain microtask")));

    event_loop.run_until_done().unwrap();
    assert_eq!(trace.entries(), vec!["promise reaction", "plain microtask"]);
}

#[test]
fn tight_microtask_limit_aborts_long_chain() {
    let mut event_loop = EventLoop::with_config(EventLoopConfig::default().with_microtask_limit(3));
    let mut tail = Promise::resolve(&event_loop.scheduler(), Value::Smi(0));
    for _ in 0..10 {
        tail = tail.then(Some(add(1)), None);
    }
    let err = event_loop.run_until_done().unwrap_err();
    assert!(matches!(err, RuntimeError::MicrotaskLimitExceeded { limit: 3 }));
    assert!(tail.is_pending());
}
