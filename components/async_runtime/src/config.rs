//! Event loop configuration.

/// Default cap on microtasks run by a single checkpoint.
pub const DEFAULT_MICROTASK_LIMIT: usize = 1_000_000;

/// Limits applied by [`EventLoop`](crate::EventLoop).
///
/// # Examples
///
/// ```
/// use async_runtime::EventLoopConfig;
///
/// let config = EventLoopConfig::default()
///     .with_microtask_limit(64)
///     .with_task_limit(Some(10));
/// assert_eq!(config.microtask_limit, 64);
/// assert_eq!(config.task_limit, Some(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLoopConfig {
    /// Maximum microtasks run by one checkpoint before it gives up. A chain
    /// that keeps queueing reactions forever would otherwise never yield.
    pub microtask_limit: usize,
    /// Maximum tasks processed by `run_until_done`; `None` means unbounded.
    pub task_limit: Option<usize>,
}

impl Default for EventLoopConfig {
    fn default() -> Self {
        Self {
            microtask_limit: DEFAULT_MICROTASK_LIMIT,
            task_limit: None,
        }
    }
}

impl EventLoopConfig {
    /// Set the per-checkpoint microtask limit
    pub fn with_microtask_limit(mut self, limit: usize) -> Self {
        self.microtask_limit = limit;
        self
    }

    /// Set the task limit for `run_until_done`
    pub fn with_task_limit(mut self, limit: Option<usize>) -> Self {
        self.task_limit = limit;
        self
    }
}
