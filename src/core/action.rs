//! # Actions, Descriptors, and the Middleware Chain
//!
//! Everything the embedder mounts becomes an action: a plain function bound
//! to a path in the state tree. Calling the bound form (a [`Dispatch`])
//! builds an [`ActionDescriptor`] and threads it through the active
//! middleware list, which ends in a commit interceptor installed by the
//! runtime.
//!
//! ```text
//! actions.counter.inc(args)
//!        │
//!        ▼
//! [m1] ─next→ [m2] ─next→ ... ─next→ [call_action] ─next→ [commit]
//! ```
//!
//! Each middleware decides whether and when to invoke [`Next`]. Forwarding
//! synchronously keeps the whole dispatch on one call stack; capturing the
//! `Next` handle and calling it from a scheduled task defers the rest of the
//! chain. Never forwarding silently halts the dispatch: no commit, no
//! render, no error.

use std::collections::BTreeMap;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use serde_json::Value;

use crate::core::path::{Path, PathError};
use crate::core::scope::ScopedState;

/// A plain behavior function supplied by the embedder. Receives the call
/// arguments, the scoped view of its own subtree, and the root of the bound
/// action tree for sibling calls.
pub type ActionFn = Rc<dyn Fn(&[Value], &ScopedState, &ActionTree) -> ActionResult>;

/// A deferred action result; some middleware must resolve it and forward the
/// plain value before the chain reaches commit.
pub type DeferredValue = LocalBoxFuture<'static, Value>;

/// What an action hands back to the chain.
pub enum ActionResult {
    /// Replace the action's subtree with this value, wholesale. Untouched
    /// keys of the old subtree do not survive; there is no merging.
    Replace(Value),
    /// The replacement is not ready yet. Committed as-is it degrades to
    /// null; a middleware is expected to await it and forward the value.
    Deferred(DeferredValue),
    /// The action produced no replacement. Diagnosed as a likely authoring
    /// bug, then committed as null anyway.
    None,
}

/// One dispatch in flight: the record threaded through the middleware chain.
pub struct ActionDescriptor {
    /// Full dotted action name, e.g. `"counter.inc"`.
    pub kind: String,
    /// The behavior function itself, for interceptors that invoke it.
    pub op: ActionFn,
    /// Positional arguments, forwarded unchanged and in order.
    pub args: Vec<Value>,
    /// Key sequence of the subtree this action reads and replaces.
    pub path: Path,
    /// Scoped view projected when the dispatch began.
    pub state: ScopedState,
    /// Absent until some interceptor sets it.
    pub result: Option<ActionResult>,
}

/// An interceptor in the dispatch pipeline.
pub type Middleware = Rc<dyn Fn(ActionDescriptor, Next) -> Result<(), PathError>>;

/// Continuation over the remainder of the chain.
///
/// Cloneable and `'static`, so a middleware can stash it and forward from a
/// deferred task. Past the end of the list it is the identity: it accepts
/// the descriptor and does nothing further.
#[derive(Clone)]
pub struct Next {
    chain: Rc<[Middleware]>,
    index: usize,
}

impl Next {
    pub(crate) fn begin(chain: Rc<[Middleware]>) -> Self {
        Next { chain, index: 0 }
    }

    /// Hand `action` to the next interceptor in the chain.
    pub fn call(&self, action: ActionDescriptor) -> Result<(), PathError> {
        match self.chain.get(self.index) {
            None => Ok(()),
            Some(middleware) => {
                let middleware = Rc::clone(middleware);
                middleware(
                    action,
                    Next {
                        chain: Rc::clone(&self.chain),
                        index: self.index + 1,
                    },
                )
            }
        }
    }
}

/// The embedder's input: a tree whose leaves are action functions and whose
/// branches are nested maps of the same shape, arbitrarily deep.
pub enum OpsTree {
    Branch(BTreeMap<String, OpsTree>),
    Action(ActionFn),
}

impl OpsTree {
    /// An empty branch, for mounting state with no actions at all.
    pub fn empty() -> Self {
        OpsTree::Branch(BTreeMap::new())
    }

    /// A branch from `(name, subtree)` pairs.
    pub fn branch<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, OpsTree)>,
    {
        OpsTree::Branch(
            entries
                .into_iter()
                .map(|(key, child)| (key.into(), child))
                .collect(),
        )
    }

    /// A leaf action.
    pub fn action(op: impl Fn(&[Value], &ScopedState, &ActionTree) -> ActionResult + 'static) -> Self {
        OpsTree::Action(Rc::new(op))
    }
}

/// The bound, callable form of a leaf action.
pub type Dispatch = Rc<dyn Fn(Vec<Value>) -> Result<(), PathError>>;

/// Structural mirror of the [`OpsTree`] with every leaf replaced by its
/// bound [`Dispatch`]. Handed back to the embedder from `mount` and passed
/// to every action invocation, so actions can invoke siblings.
#[derive(Clone)]
pub enum ActionTree {
    Branch(BTreeMap<String, ActionTree>),
    Action(Dispatch),
}

impl ActionTree {
    /// One step down the tree.
    pub fn get(&self, key: &str) -> Option<&ActionTree> {
        match self {
            ActionTree::Branch(children) => children.get(key),
            ActionTree::Action(_) => None,
        }
    }

    /// Walk `path` down the tree.
    pub fn at(&self, path: &[&str]) -> Option<&ActionTree> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Dispatch the action at `path` with `args`.
    pub fn invoke(&self, path: &[&str], args: Vec<Value>) -> Result<(), PathError> {
        let missing = || PathError::NotAnAction {
            at: path.join("."),
        };
        match self.at(path).ok_or_else(missing)? {
            ActionTree::Action(dispatch) => dispatch(args),
            ActionTree::Branch(_) => Err(missing()),
        }
    }
}
