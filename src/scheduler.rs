//! # Deferred invocation
//!
//! `emit` never runs a listener itself. It hands one [`Task`] per listener
//! invocation to a [`Scheduler`], which runs it after the emitting call has
//! returned. Each task is independent: a panicking listener does not keep
//! the others from running.
//!
//! - [`TokioScheduler`] spawns every task on a current-thread Tokio runtime,
//!   so nothing runs until the emitting task yields. Multi-thread runtimes
//!   are refused: a worker could pick the task up while the emitter is still
//!   running synchronous code.
//! - [`QueueScheduler`] keeps tasks in a queue until [`QueueScheduler::run_pending`]
//!   is called, for hosts that drive their own loop.

use std::{
    collections::VecDeque,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use parking_lot::Mutex;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{error, trace};

use crate::error::{EmitterError, EmitterResult};

/// One deferred listener invocation.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

#[cfg_attr(test, mockall::automock)]
pub trait Scheduler: Send + Sync {
    /// Checked once per `emit`, before any task is deferred. A scheduler
    /// that reports ready must accept every `defer` of that emission.
    fn ready(&self) -> EmitterResult<()> {
        Ok(())
    }

    /// Queue `task` to run in a later turn. Must not run it inline.
    fn defer(&self, task: Task) -> EmitterResult<()>;
}

/// Runs each task as its own Tokio task on a current-thread runtime.
///
/// Any other runtime flavor makes [`Scheduler::ready`] and
/// [`Scheduler::defer`] fail with `SchedulerUnavailable`.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    handle: Option<Handle>,
}

impl TokioScheduler {
    /// Spawns onto whatever runtime is current when `emit` is called.
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Spawns onto `handle` regardless of the calling thread.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    fn handle(&self) -> EmitterResult<Handle> {
        let handle = match &self.handle {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|e| EmitterError::SchedulerUnavailable {
                message: e.to_string(),
            })?,
        };
        if handle.runtime_flavor() != RuntimeFlavor::CurrentThread {
            return Err(EmitterError::SchedulerUnavailable {
                message: format!(
                    "listeners need a current-thread runtime, got {:?}",
                    handle.runtime_flavor()
                ),
            });
        }
        Ok(handle)
    }
}

impl Scheduler for TokioScheduler {
    fn ready(&self) -> EmitterResult<()> {
        self.handle().map(|_| ())
    }

    fn defer(&self, task: Task) -> EmitterResult<()> {
        let handle = self.handle()?;
        // The JoinHandle is dropped: a panic stays inside its own task.
        handle.spawn(async move { task() });
        Ok(())
    }
}

/// An explicit deferred-task queue.
#[derive(Clone, Default)]
pub struct QueueScheduler {
    queue: Arc<Mutex<VecDeque<Task>>>,
}

impl QueueScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Run queued tasks until the queue is empty, including tasks queued by
    /// the tasks themselves. Returns how many ran. A panicking task is
    /// logged and skipped.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // Lock is released before the task runs so it can defer more work.
            let next = self.queue.lock().pop_front();
            let Some(task) = next else {
                break;
            };
            ran += 1;
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
                error!("Listener panicked: {}", panic_message(payload.as_ref()));
            }
        }
        trace!("Ran {} deferred tasks", ran);
        ran
    }
}

impl Scheduler for QueueScheduler {
    fn defer(&self, task: Task) -> EmitterResult<()> {
        self.queue.lock().push_back(task);
        Ok(())
    }
}

impl std::fmt::Debug for QueueScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueScheduler")
            .field("pending", &self.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
