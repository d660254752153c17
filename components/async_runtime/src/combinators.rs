//! Static constructors and aggregators built on the promise primitives.

use crate::promise::{Handler, Promise, Resolution};
use crate::scheduler::Scheduler;
use core_types::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::trace;

impl Promise {
    /// Returns a promise fulfilled with `value`.
    ///
    /// If `value` is already a promise it is returned as is; no wrapper is
    /// created.
    ///
    /// # Examples
    ///
    /// ```
    /// use async_runtime::{MicrotaskQueue, Promise};
    /// use core_types::Value;
    ///
    /// let scheduler = MicrotaskQueue::new().scheduler();
    /// let p = Promise::resolve(&scheduler, Value::Smi(1));
    /// let same = Promise::resolve(&scheduler, p.clone());
    /// assert!(same.ptr_eq(&p));
    /// ```
    pub fn resolve(scheduler: &Rc<dyn Scheduler>, value: impl Into<Resolution>) -> Promise {
        match value.into() {
            Resolution::Promise(promise) => promise,
            Resolution::Value(value) => Promise::new(scheduler, |resolve, _| {
                resolve.resolve(value);
                Ok(())
            }),
        }
    }

    /// Returns a new promise rejected with `reason`.
    pub fn reject(scheduler: &Rc<dyn Scheduler>, reason: impl Into<Value>) -> Promise {
        let reason = reason.into();
        Promise::new(scheduler, |_, reject| {
            reject.reject(reason);
            Ok(())
        })
    }

    /// Waits for every item and fulfills with their values in input order.
    ///
    /// Items may be plain values or promises. The first rejection rejects the
    /// aggregate; later outcomes no longer affect it. An empty input fulfills
    /// with an empty array straight away.
    pub fn all<I>(scheduler: &Rc<dyn Scheduler>, items: I) -> Promise
    where
        I: IntoIterator,
        I::Item: Into<Resolution>,
    {
        let items: Vec<Resolution> = items.into_iter().map(Into::into).collect();

        Promise::new(scheduler, |resolve, reject| {
            if items.is_empty() {
                resolve.resolve(Value::Array(Vec::new()));
                return Ok(());
            }

            let total = items.len();
            let results = Rc::new(RefCell::new(vec![Value::Undefined; total]));
            let completed = Rc::new(Cell::new(0usize));

            for (index, item) in items.into_iter().enumerate() {
                let results = Rc::clone(&results);
                let completed = Rc::clone(&completed);
                let resolve = resolve.clone();
                let reject = reject.clone();

                Promise::resolve(scheduler, item)
                    .then(
                        Some(Handler::new(move |value| {
                            results.borrow_mut()[index] = value;
                            completed.set(completed.get() + 1);
                            trace!(index, completed = completed.get(), total, "all: item fulfilled");
                            if completed.get() == total {
                                let values = std::mem::take(&mut *results.borrow_mut());
                                resolve.resolve(Value::Array(values));
                            }
                            Ok(Value::Undefined)
                        })),
                        None,
                    )
                    .catch(Handler::new(move |reason| {
                        trace!(index, "all: item rejected");
                        reject.reject(reason);
                        Ok(Value::Undefined)
                    }));
            }
            Ok(())
        })
    }
}
