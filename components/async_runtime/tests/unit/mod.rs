//! Unit test harness for async_runtime

mod combinator_test;
