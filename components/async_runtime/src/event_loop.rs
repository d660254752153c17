//! Event loop implementation.
//!
//! This module provides the host loop that owns the task queue and drains the
//! microtask queue promises schedule their reactions on.

use crate::config::EventLoopConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::scheduler::Scheduler;
use crate::task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue};
use std::rc::Rc;
use tracing::{debug, warn};

/// The event loop.
///
/// Each iteration (turn) of the loop:
/// 1. Takes the oldest task from the task queue and executes it
/// 2. Drains all microtasks, including ones queued while draining
/// 3. Repeats
///
/// Microtasks queued before the first task (for example by promises created
/// while setting up the loop) run before that task.
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, Task};
///
/// let mut event_loop = EventLoop::new();
///
/// event_loop.enqueue_task(Task::new(|| Ok(())));
/// event_loop.run_until_done().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct EventLoop {
    task_queue: TaskQueue,
    microtask_queue: MicrotaskQueue,
    config: EventLoopConfig,
}

impl EventLoop {
    /// Creates a new EventLoop with empty queues and default limits.
    pub fn new() -> Self {
        Self::with_config(EventLoopConfig::default())
    }

    /// Creates a new EventLoop with the given limits.
    pub fn with_config(config: EventLoopConfig) -> Self {
        Self {
            task_queue: TaskQueue::new(),
            microtask_queue: MicrotaskQueue::new(),
            config,
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &EventLoopConfig {
        &self.config
    }

    /// Returns a scheduler that queues onto this loop's microtask queue.
    pub fn scheduler(&self) -> Rc<dyn Scheduler> {
        self.microtask_queue.scheduler()
    }

    /// Runs the event loop until all tasks and microtasks are processed.
    ///
    /// # Errors
    ///
    /// Stops at the first failing task, or when a configured limit is hit.
    pub fn run_until_done(&mut self) -> RuntimeResult<()> {
        self.run_all_microtasks()?;

        let mut tasks_run = 0usize;
        while let Some(task) = self.task_queue.dequeue() {
            if let Some(limit) = self.config.task_limit {
                if tasks_run >= limit {
                    warn!(limit, "event loop: task limit exceeded");
                    return Err(RuntimeError::TaskLimitExceeded { limit });
                }
            }
            task.run()?;
            tasks_run += 1;

            self.run_all_microtasks()?;
        }

        debug!(tasks_run, "event loop: done");
        Ok(())
    }

    /// Adds a task to the task queue.
    ///
    /// The task will be executed in the next available iteration of the event loop.
    pub fn enqueue_task(&mut self, task: Task) {
        self.task_queue.enqueue(task);
    }

    /// Adds a microtask to the microtask queue.
    ///
    /// The microtask will be executed after the current task completes.
    pub fn enqueue_microtask(&self, microtask: MicroTask) {
        self.microtask_queue.enqueue(microtask);
    }

    /// Returns true if the task queue is empty.
    pub fn is_task_queue_empty(&self) -> bool {
        self.task_queue.is_empty()
    }

    /// Returns true if the microtask queue is empty.
    pub fn is_microtask_queue_empty(&self) -> bool {
        self.microtask_queue.is_empty()
    }

    /// Runs all microtasks in the queue until empty.
    ///
    /// New microtasks added during execution are processed before this
    /// method returns. Returns the number of microtasks run.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::MicrotaskLimitExceeded`] if the queue is still not
    /// empty after `microtask_limit` jobs.
    pub fn run_all_microtasks(&mut self) -> RuntimeResult<usize> {
        let limit = self.config.microtask_limit;
        let mut ran = 0usize;

        while !self.microtask_queue.is_empty() {
            if ran >= limit {
                warn!(limit, pending = self.microtask_queue.len(), "event loop: microtask limit exceeded");
                return Err(RuntimeError::MicrotaskLimitExceeded { limit });
            }
            self.microtask_queue.run_next();
            ran += 1;
        }

        if ran > 0 {
            debug!(ran, "event loop: microtask checkpoint");
        }
        Ok(ran)
    }

    /// Runs every queued task back to back, with no microtask checkpoint.
    ///
    /// Microtasks queued by the tasks stay queued; follow with
    /// [`run_all_microtasks`](Self::run_all_microtasks) to drain them.
    pub fn run_all_tasks(&mut self) -> RuntimeResult<()> {
        while let Some(task) = self.task_queue.dequeue() {
            task.run()?;
        }
        Ok(())
    }

    /// Processes one complete cycle: one task followed by all microtasks.
    ///
    /// This represents one iteration of the event loop.
    pub fn process_one_cycle(&mut self) -> RuntimeResult<()> {
        if let Some(task) = self.task_queue.dequeue() {
            task.run()?;
        }

        self.run_all_microtasks()?;
        Ok(())
    }
}
