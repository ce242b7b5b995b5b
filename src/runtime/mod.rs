//! # The Mounted Runtime
//!
//! [`mount`] binds an initial state tree to an ops tree and hands back a
//! [`Runtime`]: the bound actions, the default dispatcher for custom
//! middleware lists, and the state/render surface.
//!
//! ```text
//! embedder ──► actions.counter.inc(args)
//!                  │ descriptor + scoped view
//!                  ▼
//!           middleware chain ──► call_action ──► commit
//!                                                  │ writes root
//!                                                  ▼
//!                                          schedule render
//!                                                  │ next queue turn
//!                                                  ▼
//!                                        render(full root state)
//! ```
//!
//! All mutable runtime context (root state, render callback, active
//! middleware list, event sinks) lives in one [`Shared`] value owned by the
//! mount instance and cloned by reference into every bound dispatch.

mod registry;

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, trace, warn};
use serde_json::Value;

use crate::core::action::{ActionTree, Middleware, OpsTree};
use crate::core::events::{EventSink, RuntimeEvent};
use crate::schedule::{Handle, Scheduler};

/// The external render callback. Receives the entire root state, read at
/// the moment the deferred notification fires.
pub type RenderFn = Rc<dyn Fn(&Value)>;

/// Mutable context shared by reference between the runtime handle and every
/// bound dispatch. Created at mount, mutated only through `run`, `set_state`
/// and commits, released when the instance is discarded.
#[derive(Clone)]
pub(crate) struct Shared {
    pub(crate) state: Rc<RefCell<Value>>,
    pub(crate) render: Rc<RefCell<Option<RenderFn>>>,
    pub(crate) middlewares: Rc<RefCell<Vec<Middleware>>>,
    pub(crate) sinks: Rc<RefCell<Vec<EventSink>>>,
    pub(crate) handle: Handle,
}

impl Shared {
    fn new(initial: Value, handle: Handle) -> Self {
        Shared {
            state: Rc::new(RefCell::new(initial)),
            render: Rc::new(RefCell::new(None)),
            middlewares: Rc::new(RefCell::new(Vec::new())),
            sinks: Rc::new(RefCell::new(Vec::new())),
            handle,
        }
    }

    /// Enqueue one render notification. The callback and the state are both
    /// read when the task fires, not now, so a notification scheduled
    /// mid-batch still observes the fully settled tree.
    pub(crate) fn schedule_render(&self) {
        trace!("Render scheduled");
        let state = Rc::clone(&self.state);
        let render = Rc::clone(&self.render);
        self.handle.defer(move || {
            let Some(callback) = render.borrow().clone() else {
                return;
            };
            let snapshot = state.borrow().clone();
            callback(&snapshot);
        });
    }

    /// The write-notification hook handed to scoped views.
    pub(crate) fn render_notifier(&self) -> Rc<dyn Fn()> {
        let shared = self.clone();
        Rc::new(move || shared.schedule_render())
    }

    /// Deliver a diagnostic to the log facade and every subscribed sink.
    pub(crate) fn emit(&self, event: RuntimeEvent) {
        warn!("{event}");
        let sinks: Vec<EventSink> = self.sinks.borrow().clone();
        for sink in &sinks {
            sink(&event);
        }
    }
}

/// Bind `initial` state to the `ops` tree and return the runtime handle.
///
/// The default middleware list `[call_action]` is active immediately, so
/// dispatches commit even before `run` registers a render callback.
pub fn mount(initial: Value, ops: OpsTree) -> Runtime {
    let scheduler = Scheduler::new();
    let shared = Shared::new(initial, scheduler.handle());
    let actions = registry::build(ops, &Vec::new(), &shared);
    let call_action = registry::call_action(actions.clone(), shared.clone());
    *shared.middlewares.borrow_mut() = vec![Rc::clone(&call_action)];
    debug!("Mounted");
    Runtime {
        shared,
        scheduler,
        actions,
        call_action,
    }
}

/// One mounted instance: exclusive owner of its state tree and task queue.
pub struct Runtime {
    shared: Shared,
    scheduler: Scheduler,
    actions: ActionTree,
    call_action: Middleware,
}

impl Runtime {
    /// The bound action tree.
    pub fn actions(&self) -> &ActionTree {
        &self.actions
    }

    /// The default dispatcher, for inclusion in custom middleware lists.
    pub fn call_action(&self) -> Middleware {
        Rc::clone(&self.call_action)
    }

    /// Register the render callback with the default middleware list.
    /// Schedules one initial render so a first paint fires after mount.
    pub fn run(&self, render: impl Fn(&Value) + 'static) {
        let default = vec![Rc::clone(&self.call_action)];
        self.run_with(render, default);
    }

    /// Register the render callback and replace the active middleware list.
    /// An empty or forwarding-free list is allowed; dispatches then stop at
    /// whatever the list does (or does not) forward to.
    pub fn run_with(&self, render: impl Fn(&Value) + 'static, middlewares: Vec<Middleware>) {
        *self.shared.render.borrow_mut() = Some(Rc::new(render));
        *self.shared.middlewares.borrow_mut() = middlewares;
        self.shared.schedule_render();
    }

    /// The current root state, synchronously. No projection, no scheduling.
    pub fn get_state(&self) -> Value {
        self.shared.state.borrow().clone()
    }

    /// Replace the entire root state wholesale and schedule one deferred
    /// render. Returns the new tree.
    pub fn set_state(&self, new_state: Value) -> Value {
        *self.shared.state.borrow_mut() = new_state.clone();
        self.shared.schedule_render();
        new_state
    }

    /// Queue handle for embedder middleware that defers its continuation.
    pub fn handle(&self) -> Handle {
        self.shared.handle.clone()
    }

    /// Subscribe to diagnostic events.
    pub fn subscribe(&self, sink: impl Fn(&RuntimeEvent) + 'static) {
        self.shared.sinks.borrow_mut().push(Rc::new(sink));
    }

    /// Drain the task queue (renders, deferred continuations) until
    /// quiescent.
    pub fn run_until_idle(&self) {
        self.scheduler.run_until_idle();
    }
}
