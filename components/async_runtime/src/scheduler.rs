//! The deferral primitive promises are built on.

use crate::task_queue::MicroTask;

/// Host-supplied microtask facility.
///
/// Implementations must run each queued microtask after the current
/// synchronous execution completes, in FIFO order relative to other
/// microtasks, and before the host's next macrotask. Promises never run a
/// reaction inline; everything goes through this trait.
///
/// [`MicrotaskQueue`](crate::MicrotaskQueue) is the implementation the
/// [`EventLoop`](crate::EventLoop) drains.
pub trait Scheduler {
    /// Defers `microtask` to a later turn of the microtask queue.
    fn queue_microtask(&self, microtask: MicroTask);
}
