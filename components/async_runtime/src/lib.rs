//! Promise runtime.
//!
//! This crate provides a deferred-value container following the Promise/A+
//! chaining contract, together with the host pieces it runs on:
//! - [`Promise`] - single-settlement container with `then`/`catch`/`finally`
//!   chaining and the `resolve`/`reject`/`all` combinators
//! - [`Scheduler`] - the microtask deferral primitive promises depend on
//! - [`EventLoop`] - a host loop with task and microtask queues
//!
//! Everything is single-threaded: promises share state through `Rc` and are
//! deliberately not `Send`.
//!
//! # Examples
//!
//! ## Chaining
//!
//! ```
//! use async_runtime::{EventLoop, Handler, Promise};
//! use core_types::Value;
//!
//! let mut event_loop = EventLoop::new();
//! let scheduler = event_loop.scheduler();
//!
//! let inner = scheduler.clone();
//! let chained = Promise::resolve(&scheduler, Value::Smi(1))
//!     .then(Some(Handler::new(move |_| Ok(Promise::resolve(&inner, Value::Smi(2))))), None)
//!     .then(Some(Handler::new(|v| Ok(v))), None);
//!
//! event_loop.run_until_done().unwrap();
//! assert_eq!(chained.value(), Some(Value::Smi(2)));
//! ```
//!
//! ## Settling from a task
//!
//! ```
//! use async_runtime::{EventLoop, Promise, Task};
//! use core_types::Value;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut event_loop = EventLoop::new();
//! let resolver = Rc::new(RefCell::new(None));
//! let slot = resolver.clone();
//! let promise = Promise::new(&event_loop.scheduler(), |resolve, _| {
//!     *slot.borrow_mut() = Some(resolve);
//!     Ok(())
//! });
//!
//! event_loop.enqueue_task(Task::new(move || {
//!     if let Some(resolve) = resolver.borrow_mut().take() {
//!         resolve.resolve(Value::from("later"));
//!     }
//!     Ok(())
//! }));
//! event_loop.run_until_done().unwrap();
//! assert_eq!(promise.value(), Some(Value::from("later")));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod combinators;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod promise;
pub mod scheduler;
pub mod task_queue;

// Re-export main types at crate root
pub use config::EventLoopConfig;
pub use error::{RuntimeError, RuntimeResult};
pub use event_loop::EventLoop;
pub use promise::{
    Completion, Handler, Promise, PromiseId, PromiseState, Rejector, Resolution, Resolver,
};
pub use scheduler::Scheduler;
pub use task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue};
