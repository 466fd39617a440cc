//! dispatch::lane
//!
//! Per-repository serial queues.
//!
//! A lane holds the jobs issued against one repository. At most one job of
//! a lane runs at any time and jobs run in the order they were submitted.
//! Distinct lanes are independent and run in parallel on the worker pool.
//!
//! Each lane has two queues. The run queue holds the operations themselves.
//! The delivery queue holds callbacks waiting for their results, in the
//! order the operations finished. Callbacks never run on the run queue, so
//! a slow or blocking callback cannot hold up the repository.
//!
//! A queue only occupies a worker while it has queued work: the first
//! submission into an idle queue schedules a drainer, which runs jobs until
//! the queue is empty and then marks the queue idle again.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::runtime::Handle;

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Run,
    Deliver,
}

#[derive(Default)]
struct QueueState {
    jobs: VecDeque<Job>,
    draining: bool,
}

#[derive(Default)]
struct Queue {
    state: Mutex<QueueState>,
}

impl Queue {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // Jobs never run under this lock, so poisoning only means a panic in
        // the bookkeeping itself; the queue is still consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A FIFO execution lane.
pub struct Lane {
    label: String,
    run: Queue,
    deliver: Queue,
}

impl Lane {
    pub fn new(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            run: Queue::default(),
            deliver: Queue::default(),
        })
    }

    /// Number of operations waiting to start.
    pub fn queued(&self) -> usize {
        self.run.lock().jobs.len()
    }

    /// Queue an operation, scheduling a drainer on `pool` if the lane is
    /// idle.
    pub(crate) fn submit(self: &Arc<Self>, pool: &Handle, job: Job) {
        self.schedule(pool, Stage::Run, job);
    }

    /// Queue a callback delivery behind earlier deliveries of this lane.
    pub(crate) fn deliver(self: &Arc<Self>, pool: &Handle, job: Job) {
        self.schedule(pool, Stage::Deliver, job);
    }

    fn queue(&self, stage: Stage) -> &Queue {
        match stage {
            Stage::Run => &self.run,
            Stage::Deliver => &self.deliver,
        }
    }

    fn schedule(self: &Arc<Self>, pool: &Handle, stage: Stage, job: Job) {
        let start = {
            let mut state = self.queue(stage).lock();
            state.jobs.push_back(job);
            let start = !state.draining;
            state.draining = true;
            start
        };

        tracing::trace!(lane = %self.label, ?stage, start, "job queued");

        if start {
            let drainer = Drainer {
                lane: Arc::clone(self),
                stage,
                finished: false,
            };
            drop(pool.spawn_blocking(move || drainer.run()));
        }
    }
}

impl std::fmt::Debug for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lane")
            .field("label", &self.label)
            .field("queued", &self.queued())
            .finish()
    }
}

/// Runs one of a lane's queues until it is empty.
///
/// Jobs handed to a lane must not unwind; the dispatcher catches panics
/// before they reach here.
struct Drainer {
    lane: Arc<Lane>,
    stage: Stage,
    finished: bool,
}

impl Drainer {
    fn run(mut self) {
        loop {
            let next = {
                let mut state = self.lane.queue(self.stage).lock();
                match state.jobs.pop_front() {
                    Some(job) => job,
                    None => {
                        state.draining = false;
                        break;
                    }
                }
            };
            next();
        }
        self.finished = true;
    }
}

impl Drop for Drainer {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        // The pool discarded us before draining. Release the queued jobs so
        // their completions report the abort instead of hanging.
        let abandoned = {
            let mut state = self.lane.queue(self.stage).lock();
            state.draining = false;
            std::mem::take(&mut state.jobs)
        };
        if !abandoned.is_empty() {
            tracing::warn!(
                lane = %self.lane.label,
                stage = ?self.stage,
                jobs = abandoned.len(),
                "lane drainer discarded, abandoning queued jobs"
            );
        }
        drop(abandoned);
    }
}
