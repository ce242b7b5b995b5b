//! # graft
//!
//! A minimal reactive runtime that binds a tree of plain behavior functions
//! to a nested state tree. Each bound action dispatches through a
//! composable middleware chain, commits its result at its own path, and
//! notifies an external render callback on a deferred queue turn.
//!
//! Start at [`mount`], which wires an initial state tree to an [`OpsTree`]
//! and returns the [`runtime::Runtime`] handle.

pub mod core;
pub mod runtime;
pub mod schedule;

#[cfg(test)]
pub mod test_support;

pub use crate::core::action::{
    ActionDescriptor, ActionFn, ActionResult, ActionTree, DeferredValue, Dispatch, Middleware,
    Next, OpsTree,
};
pub use crate::core::events::RuntimeEvent;
pub use crate::core::path::{Path, PathError};
pub use crate::core::scope::ScopedState;
pub use crate::runtime::{Runtime, mount};
pub use crate::schedule::Handle;
