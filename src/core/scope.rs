//! # Scoped State Projection
//!
//! An action never sees the whole state tree. At dispatch time the runtime
//! projects the subtree at the action's path into a [`ScopedState`]: reads
//! come from a snapshot taken at projection time, writes go through to the
//! live root and schedule a render.
//!
//! Snapshot-then-view, not a live alias: sibling mutations that land after
//! projection are invisible to this view's reads. That keeps an action's
//! inputs stable for the duration of its dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::core::path::{Path, PathError, get_in, set_in};
use crate::schedule::Handle;

/// A path-scoped read/write view over one subtree of the state tree.
///
/// If the subtree is a scalar, [`value`](ScopedState::value) hands it over
/// verbatim and the field accessors simply find nothing; there is no view
/// wrapping to unlearn on the embedder side.
#[derive(Clone)]
pub struct ScopedState {
    root: Rc<RefCell<Value>>,
    snapshot: Value,
    path: Path,
    handle: Handle,
    notify: Rc<dyn Fn()>,
}

impl std::fmt::Debug for ScopedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedState")
            .field("snapshot", &self.snapshot)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ScopedState {
    /// Resolve `path` in the live root and snapshot the subtree found there.
    /// Fails if the path does not resolve, which surfaces at dispatch time.
    pub(crate) fn project(
        root: Rc<RefCell<Value>>,
        path: Path,
        handle: Handle,
        notify: Rc<dyn Fn()>,
    ) -> Result<Self, PathError> {
        let snapshot = get_in(&root.borrow(), &path)?.clone();
        Ok(ScopedState {
            root,
            snapshot,
            path,
            handle,
            notify,
        })
    }

    /// The full subtree as of projection time. Scalars come back verbatim;
    /// mappings come back as a plain value the embedder can take apart.
    pub fn value(&self) -> Value {
        self.snapshot.clone()
    }

    /// Whether the projected subtree is a scalar rather than a mapping.
    pub fn is_scalar(&self) -> bool {
        !self.snapshot.is_object()
    }

    /// Read one field of the snapshot. `None` when absent or when the
    /// subtree is a scalar.
    pub fn get(&self, field: &str) -> Option<Value> {
        self.snapshot.get(field).cloned()
    }

    /// Write one field through to the *live* root and schedule a render.
    ///
    /// The write re-resolves the path against the current tree, so it fails
    /// if the subtree has since been replaced by something untraversable.
    pub fn set(&self, field: &str, value: Value) -> Result<(), PathError> {
        let mut full = self.path.clone();
        full.push(field.to_string());
        set_in(&mut self.root.borrow_mut(), &full, value)?;
        (self.notify)();
        Ok(())
    }

    /// Enqueue `job` on the runtime's task queue for the next turn.
    /// This is how an action arranges for a sibling to run after its own
    /// result has been committed.
    pub fn defer(&self, job: impl FnOnce() + 'static) {
        self.handle.defer(job);
    }
}
