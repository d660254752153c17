//! Promise implementation following the Promise/A+ chaining contract.
//!
//! A [`Promise`] is a shared handle to a single settlement cell. It starts
//! pending, settles exactly once through the [`Resolver`] / [`Rejector`]
//! capabilities handed to its executor, and hands its outcome to every
//! reaction registered with [`Promise::then`]. Reactions never run inline:
//! each one is queued on the promise's [`Scheduler`] and executes in a later
//! microtask turn.

use crate::scheduler::Scheduler;
use crate::task_queue::MicroTask;
use core_types::{JsError, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// The state of a Promise.
///
/// Once settled (Fulfilled or Rejected), a Promise cannot change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseState {
    /// The initial state; the promise is neither fulfilled nor rejected.
    Pending,
    /// The promise has been resolved with a value.
    Fulfilled,
    /// The promise has been rejected with a reason.
    Rejected,
}

/// Process-unique identifier used to correlate trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PromiseId(u64);

impl PromiseId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PromiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a reaction hands back on success: a plain value, or another promise
/// whose eventual outcome the derived promise adopts.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Settle with this value directly.
    Value(Value),
    /// Follow this promise.
    Promise(Promise),
}

impl From<Value> for Resolution {
    fn from(value: Value) -> Self {
        Resolution::Value(value)
    }
}

impl From<Promise> for Resolution {
    fn from(promise: Promise) -> Self {
        Resolution::Promise(promise)
    }
}

/// The result of running a reaction. `Err` carries a thrown reason.
pub type Completion = Result<Resolution, Value>;

/// A fulfillment or rejection reaction passed to [`Promise::then`].
pub struct Handler {
    callback: Box<dyn FnOnce(Value) -> Completion>,
}

impl Handler {
    /// Creates a new Handler from a closure.
    ///
    /// The closure may return a [`Value`], a [`Promise`] or a [`Resolution`];
    /// returning `Err(reason)` rejects the derived promise.
    pub fn new<F, R>(f: F) -> Self
    where
        F: FnOnce(Value) -> Result<R, Value> + 'static,
        R: Into<Resolution>,
    {
        Self {
            callback: Box::new(move |value| f(value).map(Into::into)),
        }
    }

    /// Passes the value through unchanged. Used when no fulfillment reaction
    /// is supplied.
    pub fn identity() -> Self {
        Self::new(Ok::<Value, Value>)
    }

    /// Re-raises its input. Used when no rejection reaction is supplied.
    pub fn thrower() -> Self {
        Self::new(Err::<Value, Value>)
    }

    /// Calls the handler with the settled payload.
    pub fn call(self, value: Value) -> Completion {
        (self.callback)(value)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler {{ ... }}")
    }
}

/// A reaction registered on a pending promise: the handler plus the
/// capabilities of the promise it settles.
struct Reaction {
    handler: Handler,
    resolve: Resolver,
    reject: Rejector,
}

#[derive(Clone, Copy)]
enum Outcome {
    Fulfilled,
    Rejected,
}

struct PromiseInner {
    state: PromiseState,
    value: Option<Value>,
    reason: Option<Value>,
    fulfill_waiters: Vec<Reaction>,
    reject_waiters: Vec<Reaction>,
}

// Each pending reaction owns the next promise in its chain, so the default
// recursive drop would nest one frame per link. Unlink the chain iteratively.
impl Drop for PromiseInner {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.fulfill_waiters);
        pending.append(&mut self.reject_waiters);

        while let Some(Reaction {
            handler,
            resolve,
            reject,
        }) = pending.pop()
        {
            drop(handler);
            drop(reject);
            detach(resolve.promise, &mut pending);
        }
    }
}

/// Moves the waiters of `promise` onto `pending` if this is its last handle.
fn detach(promise: Promise, pending: &mut Vec<Reaction>) {
    if Rc::strong_count(&promise.inner) != 1 {
        return;
    }
    if let Ok(mut inner) = promise.inner.try_borrow_mut() {
        pending.append(&mut inner.fulfill_waiters);
        pending.append(&mut inner.reject_waiters);
    }
}

/// A deferred value.
///
/// Cloning a `Promise` yields another handle to the same settlement cell;
/// every call to [`then`](Promise::then) creates a new, independent promise.
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, Handler, Promise, PromiseState};
/// use core_types::Value;
///
/// let mut event_loop = EventLoop::new();
/// let scheduler = event_loop.scheduler();
///
/// let promise = Promise::new(&scheduler, |resolve, _reject| {
///     resolve.resolve(Value::Smi(20));
///     Ok(())
/// });
/// let doubled = promise.then(
///     Some(Handler::new(|v| match v {
///         Value::Smi(n) => Ok(Value::Smi(n * 2)),
///         other => Err(other),
///     })),
///     None,
/// );
///
/// // Reactions run on the microtask queue, never inline.
/// assert_eq!(doubled.state(), PromiseState::Pending);
/// event_loop.run_until_done().unwrap();
/// assert_eq!(doubled.value(), Some(Value::Smi(40)));
/// ```
#[derive(Clone)]
pub struct Promise {
    id: PromiseId,
    inner: Rc<RefCell<PromiseInner>>,
    scheduler: Rc<dyn Scheduler>,
}

/// Fulfills the promise it was created for. Handed to executors.
#[derive(Debug, Clone)]
pub struct Resolver {
    promise: Promise,
}

impl Resolver {
    /// Fulfills the promise with `value`. No-op if it has already settled.
    ///
    /// The value is stored as given; use [`Promise::resolve`] to adopt the
    /// state of another promise.
    pub fn resolve(&self, value: impl Into<Value>) {
        self.promise.transition(Outcome::Fulfilled, value.into());
    }
}

/// Rejects the promise it was created for. Handed to executors.
#[derive(Debug, Clone)]
pub struct Rejector {
    promise: Promise,
}

impl Rejector {
    /// Rejects the promise with `reason`. No-op if it has already settled.
    pub fn reject(&self, reason: impl Into<Value>) {
        self.promise.transition(Outcome::Rejected, reason.into());
    }
}

impl Promise {
    /// Creates a promise and runs `executor` synchronously.
    ///
    /// The executor receives the two settlement capabilities. If it returns
    /// `Err(reason)` the promise is rejected with that reason, unless it
    /// already settled.
    pub fn new<F>(scheduler: &Rc<dyn Scheduler>, executor: F) -> Self
    where
        F: FnOnce(Resolver, Rejector) -> Result<(), Value>,
    {
        let promise = Self {
            id: PromiseId::next(),
            inner: Rc::new(RefCell::new(PromiseInner {
                state: PromiseState::Pending,
                value: None,
                reason: None,
                fulfill_waiters: Vec::new(),
                reject_waiters: Vec::new(),
            })),
            scheduler: Rc::clone(scheduler),
        };
        trace!(promise = %promise.id, "promise: created");

        let rejector = Rejector {
            promise: promise.clone(),
        };
        let resolver = Resolver {
            promise: promise.clone(),
        };
        if let Err(reason) = executor(resolver, rejector.clone()) {
            debug!(promise = %promise.id, reason = %reason, "promise: executor failed");
            rejector.reject(reason);
        }
        promise
    }

    /// Returns this promise's identifier.
    pub fn id(&self) -> PromiseId {
        self.id
    }

    /// Returns the current state.
    pub fn state(&self) -> PromiseState {
        self.inner.borrow().state
    }

    /// Returns true while the promise has not settled.
    pub fn is_pending(&self) -> bool {
        self.state() == PromiseState::Pending
    }

    /// The fulfillment value, if fulfilled.
    pub fn value(&self) -> Option<Value> {
        self.inner.borrow().value.clone()
    }

    /// The rejection reason, if rejected.
    pub fn reason(&self) -> Option<Value> {
        self.inner.borrow().reason.clone()
    }

    /// Returns true if both handles refer to the same promise.
    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The scheduler this promise queues its reactions on.
    pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
        &self.scheduler
    }

    /// Registers reactions and returns a new promise settled by them.
    ///
    /// A missing `on_fulfilled` passes the value through; a missing
    /// `on_rejected` re-raises the reason. If the reaction returns a promise,
    /// the derived promise follows it.
    pub fn then(&self, on_fulfilled: Option<Handler>, on_rejected: Option<Handler>) -> Promise {
        let on_fulfilled = on_fulfilled.unwrap_or_else(Handler::identity);
        let on_rejected = on_rejected.unwrap_or_else(Handler::thrower);

        Promise::new(&self.scheduler, |resolve, reject| {
            self.react(on_fulfilled, on_rejected, resolve, reject);
            Ok(())
        })
    }

    /// Registers a rejection reaction. Same as `then(None, Some(on_rejected))`.
    pub fn catch(&self, on_rejected: Handler) -> Promise {
        self.then(None, Some(on_rejected))
    }

    /// Runs `callback` once the promise settles either way.
    ///
    /// The outcome passes through untouched unless `callback` itself fails,
    /// in which case its reason rejects the derived promise.
    pub fn finally<F>(&self, callback: F) -> Promise
    where
        F: FnOnce() -> Result<(), Value> + 'static,
    {
        let on_fulfilled_callback = Rc::new(Cell::new(Some(callback)));
        let on_rejected_callback = Rc::clone(&on_fulfilled_callback);

        self.then(
            Some(Handler::new(move |value| {
                if let Some(callback) = on_fulfilled_callback.take() {
                    callback()?;
                }
                Ok(value)
            })),
            Some(Handler::new(move |reason| {
                if let Some(callback) = on_rejected_callback.take() {
                    callback()?;
                }
                Err::<Value, Value>(reason)
            })),
        )
    }

    fn react(&self, on_fulfilled: Handler, on_rejected: Handler, resolve: Resolver, reject: Rejector) {
        let mut inner = self.inner.borrow_mut();
        let state = inner.state;
        match state {
            PromiseState::Fulfilled => {
                let value = inner.value.clone().unwrap_or_default();
                drop(inner);
                schedule_reaction(&self.scheduler, on_fulfilled, value, resolve, reject);
            }
            PromiseState::Rejected => {
                let reason = inner.reason.clone().unwrap_or_default();
                drop(inner);
                schedule_reaction(&self.scheduler, on_rejected, reason, resolve, reject);
            }
            PromiseState::Pending => {
                inner.fulfill_waiters.push(Reaction {
                    handler: on_fulfilled,
                    resolve: resolve.clone(),
                    reject: reject.clone(),
                });
                inner.reject_waiters.push(Reaction {
                    handler: on_rejected,
                    resolve,
                    reject,
                });
                trace!(promise = %self.id, waiters = inner.fulfill_waiters.len(), "promise: reaction registered");
            }
        }
    }

    fn transition(&self, outcome: Outcome, payload: Value) {
        let waiters = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != PromiseState::Pending {
                trace!(promise = %self.id, "promise: already settled, transition ignored");
                return;
            }
            let fulfill_waiters = std::mem::take(&mut inner.fulfill_waiters);
            let reject_waiters = std::mem::take(&mut inner.reject_waiters);
            match outcome {
                Outcome::Fulfilled => {
                    inner.state = PromiseState::Fulfilled;
                    inner.value = Some(payload.clone());
                    fulfill_waiters
                }
                Outcome::Rejected => {
                    inner.state = PromiseState::Rejected;
                    inner.reason = Some(payload.clone());
                    reject_waiters
                }
            }
        };
        trace!(
            promise = %self.id,
            state = ?self.state(),
            waiters = waiters.len(),
            "promise: settled"
        );

        for reaction in waiters {
            schedule_reaction(
                &self.scheduler,
                reaction.handler,
                payload.clone(),
                reaction.resolve,
                reaction.reject,
            );
        }
    }
}

/// Queues one reaction job: run `handler`, then settle the derived promise
/// from its completion.
fn schedule_reaction(
    scheduler: &Rc<dyn Scheduler>,
    handler: Handler,
    payload: Value,
    resolve: Resolver,
    reject: Rejector,
) {
    scheduler.queue_microtask(MicroTask::new(move || match handler.call(payload) {
        Ok(Resolution::Value(value)) => resolve.resolve(value),
        Ok(Resolution::Promise(inner)) => adopt(inner, resolve, reject),
        Err(reason) => reject.reject(reason),
    }));
}

/// Settles the derived promise with whatever `inner` eventually settles with.
fn adopt(inner: Promise, resolve: Resolver, reject: Rejector) {
    if inner.ptr_eq(&resolve.promise) {
        reject.reject(JsError::type_error(format!(
            "Chaining cycle detected for promise {}",
            inner.id
        )));
        return;
    }
    trace!(promise = %resolve.promise.id, follows = %inner.id, "promise: adopting state");
    inner.then(
        Some(Handler::new(move |value| {
            resolve.resolve(value);
            Ok(Value::Undefined)
        })),
        Some(Handler::new(move |reason| {
            reject.reject(reason);
            Ok(Value::Undefined)
        })),
    );
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Promise")
            .field("id", &self.id)
            .field("state", &inner.state)
            .field("value", &inner.value)
            .field("reason", &inner.reason)
            .field("fulfill_waiters", &inner.fulfill_waiters.len())
            .field("reject_waiters", &inner.reject_waiters.len())
            .finish()
    }
}
