//! # Deferred Task Queue
//!
//! The runtime never notifies the render callback from inside the call stack
//! that mutated state. Every notification (and every explicitly deferred
//! continuation) is enqueued here and runs on a later turn of the queue.
//!
//! Rust has no ambient event loop, so the runtime owns a single-consumer
//! FIFO queue: a [`futures::executor::LocalPool`] driven on the caller's
//! thread by [`Scheduler::run_until_idle`]. Everything scheduled is `!Send`
//! by design; the whole runtime lives on one thread.

use std::cell::RefCell;
use std::future::Future;

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;
use log::debug;

/// Owns the task queue. Created once per mounted runtime.
pub struct Scheduler {
    pool: RefCell<LocalPool>,
    handle: Handle,
}

impl Scheduler {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let handle = Handle {
            spawner: pool.spawner(),
        };
        Scheduler {
            pool: RefCell::new(pool),
            handle,
        }
    }

    /// A cheap, cloneable handle for enqueueing work from anywhere in the
    /// runtime (dispatch closures, scoped views, embedder middleware).
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    /// Drain the queue until no task can make further progress.
    ///
    /// Tasks enqueued while draining (a commit scheduling a render, a
    /// deferred continuation re-entering the chain) run in the same call.
    pub fn run_until_idle(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Enqueues work on the scheduler that created it. Jobs run in FIFO order,
/// one at a time, on the thread that drains the queue.
#[derive(Clone)]
pub struct Handle {
    spawner: LocalSpawner,
}

impl Handle {
    /// Run `job` on the next turn of the queue.
    pub fn defer(&self, job: impl FnOnce() + 'static) {
        self.spawn(async move { job() });
    }

    /// Drive `task` to completion on the queue. Used by middleware that
    /// unwraps deferred action results before forwarding them.
    pub fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        if let Err(err) = self.spawner.spawn_local(task) {
            // The owning Scheduler is gone; the runtime was discarded.
            debug!("Dropping scheduled task: {err}");
        }
    }
}
