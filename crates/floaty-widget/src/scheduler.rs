//! One-shot delayed tasks.
//!
//! The widget schedules work (hiding the startup tooltip) through the
//! [`Scheduler`] trait so it can run on a tokio runtime in production and on
//! a virtual clock in tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use floaty_core::error::{FloatyError, Result};

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Default)]
struct TaskFlags {
    cancelled: AtomicBool,
    completed: AtomicBool,
}

/// Observes and optionally cancels a scheduled task. Clones share the task.
#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    flags: Arc<TaskFlags>,
}

impl TaskHandle {
    /// Prevent the task from running if it has not run yet.
    pub fn cancel(&self) {
        self.flags.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flags.cancelled.load(Ordering::SeqCst)
    }

    /// Whether the task has run.
    pub fn is_completed(&self) -> bool {
        self.flags.completed.load(Ordering::SeqCst)
    }

    /// Run `task` unless cancelled, and record completion.
    fn run(&self, task: Task) {
        if self.is_cancelled() {
            tracing::debug!("Scheduled task cancelled before firing");
            return;
        }
        task();
        self.flags.completed.store(true, Ordering::SeqCst);
    }
}

/// Runs a task once after a delay. Scheduling never blocks the caller.
pub trait Scheduler: Send + Sync {
    fn schedule_once(&self, delay: Duration, task: Task) -> TaskHandle;
}

// =============================================================================
// Tokio
// =============================================================================

/// Scheduler backed by `tokio::time::sleep` on a runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: tokio::runtime::Handle,
}

impl TokioScheduler {
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }

    /// Use the runtime the caller is running on.
    pub fn current() -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| FloatyError::Config(format!("No tokio runtime available: {}", e)))?;
        Ok(Self::new(runtime))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::default();
        let task_handle = handle.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task_handle.run(task);
        });
        handle
    }
}

// =============================================================================
// Virtual clock
// =============================================================================

struct Scheduled {
    due: Duration,
    seq: u64,
    task: Task,
    handle: TaskHandle,
}

#[derive(Default)]
struct Timeline {
    now: Duration,
    next_seq: u64,
    queue: Vec<Scheduled>,
}

/// Scheduler on a virtual clock that only moves when [`advance`] is called.
///
/// [`advance`]: ManualScheduler::advance
#[derive(Clone, Default)]
pub struct ManualScheduler {
    timeline: Arc<Mutex<Timeline>>,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let timeline = self.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &timeline.now)
            .field("pending", &timeline.queue.len())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Timeline> {
        self.timeline.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of tasks waiting to fire (cancelled ones included).
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Move the clock forward by `by`, running every task that falls due in
    /// due-time order. Tasks scheduled by running tasks are honoured if they
    /// fall due within the same window. Returns how many tasks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now + by;
        let mut ran = 0;

        loop {
            let next = {
                let mut timeline = self.lock();
                let position = timeline
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.due <= target)
                    .min_by_key(|(_, s)| (s.due, s.seq))
                    .map(|(i, _)| i);
                match position {
                    Some(i) => {
                        let scheduled = timeline.queue.remove(i);
                        timeline.now = scheduled.due;
                        Some(scheduled)
                    }
                    None => {
                        timeline.now = target;
                        None
                    }
                }
            };

            match next {
                Some(scheduled) => {
                    if !scheduled.handle.is_cancelled() {
                        ran += 1;
                    }
                    scheduled.handle.run(scheduled.task);
                }
                None => return ran,
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::default();
        let mut timeline = self.lock();
        let scheduled = Scheduled {
            due: timeline.now + delay,
            seq: timeline.next_seq,
            task,
            handle: handle.clone(),
        };
        timeline.next_seq += 1;
        timeline.queue.push(scheduled);
        handle
    }
}
