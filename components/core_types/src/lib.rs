//! Payload values and error types shared by the promise runtime.
//!
//! Promises in this workspace settle with an opaque [`Value`]: the same type is
//! used for fulfillment values and rejection reasons, so a rejection handler can
//! hand its reason straight back as a fulfillment value.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of settled payloads
//! - [`JsError`] - Structured error that can travel as a rejection reason
//! - [`ErrorKind`] - Types of errors
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, JsError, Value};
//!
//! let num = Value::Smi(42);
//! assert_eq!(num.to_string(), "42");
//!
//! let reason: Value = JsError::type_error("undefined is not a function").into();
//! assert!(matches!(reason, Value::Error(ref e) if e.kind == ErrorKind::TypeError));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod value;

pub use error::{ErrorKind, JsError};
pub use value::Value;
