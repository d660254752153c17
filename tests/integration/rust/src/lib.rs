//! Integration test suite for the promise runtime
//!
//! This crate verifies that promises and the event loop work together across
//! component boundaries.

use async_runtime::{EventLoop, Promise, Rejector, Resolver, Task};
use core_types::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Re-export components for test convenience
pub mod components {
    pub use async_runtime;
    pub use core_types;
}

/// Creates a pending promise on `event_loop` and returns it with its
/// settlement capabilities.
pub fn deferred(event_loop: &EventLoop) -> (Promise, Resolver, Rejector) {
    let slot = RefCell::new(None);
    let promise = Promise::new(&event_loop.scheduler(), |resolve, reject| {
        *slot.borrow_mut() = Some((resolve, reject));
        Ok(())
    });
    let (resolve, reject) = slot
        .into_inner()
        .expect("executor runs during construction");
    (promise, resolve, reject)
}

/// Queues a task that fulfills `resolve` with `value`, modelling a timer or
/// I/O completion.
pub fn resolve_later(event_loop: &mut EventLoop, resolve: Resolver, value: Value) {
    event_loop.enqueue_task(Task::new(move || {
        resolve.resolve(value);
        Ok(())
    }));
}

/// Records the order in which callbacks run.
#[derive(Debug, Clone, Default)]
pub struct Trace(Rc<RefCell<Vec<String>>>);

impl Trace {
    /// Appends an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    /// Returns the entries recorded so far.
    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}
