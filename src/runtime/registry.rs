//! # Action Registry
//!
//! Walks the embedder's [`OpsTree`] and mirrors it into an [`ActionTree`] of
//! bound dispatch closures. A leaf named `inc` under the branch `counter`
//! becomes the dispatch `counter.inc`, scoped to the `counter` subtree: that
//! is what it reads, and what its result replaces. A leaf at the top level
//! is scoped to the root itself.
//!
//! Binding also supplies the two built-in interceptors: the per-leaf commit
//! (always appended to the active middleware list) and `call_action`, the
//! default dispatcher that actually invokes the behavior function.

use std::collections::BTreeMap;
use std::rc::Rc;

use log::{debug, trace};
use serde_json::Value;

use crate::core::action::{
    ActionDescriptor, ActionFn, ActionResult, ActionTree, Dispatch, Middleware, Next, OpsTree,
};
use crate::core::events::RuntimeEvent;
use crate::core::path::{Path, PathError, dotted, set_in};
use crate::core::scope::ScopedState;
use crate::runtime::Shared;

/// Mirror `ops` into bound dispatches. `path` is the key sequence of the
/// node being walked; the root call passes the empty path.
pub(crate) fn build(ops: OpsTree, path: &Path, shared: &Shared) -> ActionTree {
    match ops {
        OpsTree::Branch(children) => {
            let mut bound = BTreeMap::new();
            for (field, child) in children {
                let mut child_path = path.clone();
                child_path.push(field.clone());
                bound.insert(field, build(child, &child_path, shared));
            }
            ActionTree::Branch(bound)
        }
        OpsTree::Action(op) => ActionTree::Action(bind(op, path, shared)),
    }
}

/// Bind one leaf function into its dispatch closure.
///
/// The active middleware list is read at dispatch time, not at bind time,
/// so swapping lists through `run` affects dispatches already handed out.
fn bind(op: ActionFn, path: &Path, shared: &Shared) -> Dispatch {
    let kind = dotted(path);
    // The subtree an action reads and replaces is its parent mapping entry:
    // `counter.inc` operates on `counter`, a top-level leaf on the root.
    let state_path: Path = path[..path.len().saturating_sub(1)].to_vec();
    let commit = commit_interceptor(state_path.clone(), shared.clone());
    let shared = shared.clone();

    Rc::new(move |args: Vec<Value>| -> Result<(), PathError> {
        debug!("Dispatching `{kind}`");
        let mut chain: Vec<Middleware> = shared.middlewares.borrow().clone();
        chain.push(Rc::clone(&commit));

        let state = ScopedState::project(
            Rc::clone(&shared.state),
            state_path.clone(),
            shared.handle.clone(),
            shared.render_notifier(),
        )?;
        let descriptor = ActionDescriptor {
            kind: kind.clone(),
            op: Rc::clone(&op),
            args,
            path: state_path.clone(),
            state,
            result: None,
        };
        Next::begin(Rc::from(chain)).call(descriptor)
    })
}

/// The terminal interceptor appended to every chain: write the result into
/// the root at the action's path, then schedule a render. Ignores `next`;
/// there is nothing after commit.
fn commit_interceptor(path: Path, shared: Shared) -> Middleware {
    Rc::new(move |action: ActionDescriptor, _next: Next| -> Result<(), PathError> {
        let ActionDescriptor { kind, result, .. } = action;
        let value = match result {
            Some(ActionResult::Replace(value)) => value,
            Some(ActionResult::Deferred(_)) => {
                shared.emit(RuntimeEvent::UnresolvedDeferred {
                    action: kind.clone(),
                });
                Value::Null
            }
            Some(ActionResult::None) | None => Value::Null,
        };
        trace!("Committing `{}` at `{}`", kind, dotted(&path));
        set_in(&mut shared.state.borrow_mut(), &path, value)?;
        shared.schedule_render();
        Ok(())
    })
}

/// The default dispatcher: invoke the behavior function with its arguments,
/// scoped state, and the bound action tree, then forward the captured
/// result. Exported from the runtime so custom middleware lists can still
/// include default dispatch behavior.
pub(crate) fn call_action(actions: ActionTree, shared: Shared) -> Middleware {
    Rc::new(move |mut action: ActionDescriptor, next: Next| -> Result<(), PathError> {
        let result = (action.op)(&action.args, &action.state, &actions);
        if matches!(result, ActionResult::None) {
            shared.emit(RuntimeEvent::MissingResult {
                action: action.kind.clone(),
            });
        }
        action.result = Some(result);
        next.call(action)
    })
}
