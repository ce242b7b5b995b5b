use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use serde_json::{Value, json};

use graft::{ActionDescriptor, ActionResult, Middleware, OpsTree, mount};

// ============================================================================
// Helper Functions
// ============================================================================

/// A render callback that records every frame it receives.
fn recording_render() -> (Rc<RefCell<Vec<Value>>>, impl Fn(&Value)) {
    let frames = Rc::new(RefCell::new(Vec::new()));
    let writer = Rc::clone(&frames);
    let render = move |state: &Value| writer.borrow_mut().push(state.clone());
    (frames, render)
}

/// A counter tree whose `inc` adds its first argument (default 1).
fn counter_ops() -> OpsTree {
    OpsTree::branch([(
        "counter",
        OpsTree::branch([("inc", OpsTree::action(|args, counter, _| {
            let step = args.first().and_then(Value::as_i64).unwrap_or(1);
            let current = counter.value().as_i64().unwrap();
            ActionResult::Replace(json!(current + step))
        }))]),
    )])
}

// ============================================================================
// State and Action Wiring
// ============================================================================

#[test]
fn test_connects_state_and_actions() {
    let runtime = mount(json!({ "counter": 41 }), counter_ops());
    let (frames, render) = recording_render();
    runtime.run(render);

    runtime.actions().invoke(&["counter", "inc"], Vec::new()).unwrap();
    runtime.run_until_idle();

    let frames = frames.borrow();
    assert!(!frames.is_empty());
    assert_eq!(frames.last().unwrap()["counter"], json!(42));
}

#[test]
fn test_actions_receive_scoped_state_and_forwarded_args() {
    let runtime = mount(json!({ "counter": 41 }), counter_ops());
    let (frames, render) = recording_render();
    runtime.run(render);

    runtime.actions().invoke(&["counter", "inc"], vec![json!(1)]).unwrap();
    runtime.run_until_idle();

    assert_eq!(frames.borrow().last().unwrap()["counter"], json!(42));
}

#[test]
fn test_extra_args_are_forwarded_in_order() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let runtime = mount(
        json!({ "log": null }),
        OpsTree::branch([(
            "log",
            OpsTree::branch([("push", OpsTree::action({
                let seen = Rc::clone(&seen);
                move |args, state, _| {
                    seen.borrow_mut().push(args.to_vec());
                    ActionResult::Replace(state.value())
                }
            }))]),
        )]),
    );

    runtime
        .actions()
        .invoke(&["log", "push"], vec![json!("a"), json!(2), json!({ "b": 3 })])
        .unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![vec![json!("a"), json!(2), json!({ "b": 3 })]]
    );
}

#[test]
fn test_actions_can_invoke_siblings_after_commit() {
    let observed = Rc::new(RefCell::new(None));
    let ops = OpsTree::branch([
        (
            "counter",
            OpsTree::branch([("inc", OpsTree::action(|args, counter, actions| {
                let step = args[0].as_i64().unwrap();
                let actions = actions.clone();
                // Runs on the next queue turn, after this dispatch commits.
                counter.defer(move || {
                    actions.invoke(&["done"], Vec::new()).unwrap();
                });
                ActionResult::Replace(json!(counter.value().as_i64().unwrap() + step))
            }))]),
        ),
        (
            "done",
            OpsTree::action({
                let observed = Rc::clone(&observed);
                move |_, state, _| {
                    *observed.borrow_mut() = state.get("counter");
                    ActionResult::Replace(state.value())
                }
            }),
        ),
    ]);

    let runtime = mount(json!({ "counter": 41 }), ops);
    runtime.run(|_| {});
    runtime.actions().invoke(&["counter", "inc"], vec![json!(1)]).unwrap();
    runtime.run_until_idle();

    assert_eq!(*observed.borrow(), Some(json!(42)));
}

// ============================================================================
// State Surface
// ============================================================================

#[test]
fn test_set_state_resets_state_wholesale() {
    let runtime = mount(json!({ "counter": 0 }), OpsTree::empty());
    let (frames, render) = recording_render();
    runtime.run(render);
    runtime.run_until_idle();
    frames.borrow_mut().clear();

    runtime.set_state(json!({ "counter": 42 }));
    runtime.run_until_idle();

    assert_eq!(*frames.borrow(), vec![json!({ "counter": 42 })]);
    assert_eq!(runtime.get_state(), json!({ "counter": 42 }));
}

#[test]
fn test_get_state_exposes_state_outside_render() {
    let runtime = mount(json!({ "counter": 42 }), OpsTree::empty());
    assert_eq!(runtime.get_state(), json!({ "counter": 42 }));
}

#[test]
fn test_get_state_reflects_commits_without_draining() {
    let runtime = mount(json!({ "counter": 41 }), counter_ops());
    runtime.actions().invoke(&["counter", "inc"], Vec::new()).unwrap();
    // No run_until_idle: the commit itself is synchronous.
    assert_eq!(runtime.get_state(), json!({ "counter": 42 }));
}

// ============================================================================
// Middleware
// ============================================================================

#[test]
fn test_middleware_tracks_action_invocation() {
    let count = Rc::new(RefCell::new(0));
    let runtime = mount(
        json!({ "value": 1 }),
        OpsTree::branch([("noop", OpsTree::action(|_, state, _| {
            ActionResult::Replace(state.value())
        }))]),
    );
    let (frames, render) = recording_render();

    let counting: Middleware = {
        let count = Rc::clone(&count);
        Rc::new(move |_action, _next| {
            *count.borrow_mut() += 1;
            Ok(())
        })
    };
    runtime.run_with(render, vec![counting]);

    runtime.actions().invoke(&["noop"], Vec::new()).unwrap();
    assert_eq!(*count.borrow(), 1);

    runtime.run_until_idle();
    // The chain never forwarded: no commit, and only the registration
    // render fired.
    assert_eq!(runtime.get_state(), json!({ "value": 1 }));
    assert_eq!(frames.borrow().len(), 1);
}

#[test]
fn test_middleware_can_change_action_semantics() {
    let runtime = mount(
        json!({ "counter": 1 }),
        OpsTree::branch([(
            "counter",
            OpsTree::branch([("inc", OpsTree::action(|args, counter, _| {
                let step = args[0].as_i64().unwrap();
                let current = counter.value().as_i64().unwrap();
                ActionResult::Deferred(async move { json!(current + step) }.boxed_local())
            }))]),
        )]),
    );
    let (frames, render) = recording_render();

    let handle = runtime.handle();
    let await_result: Middleware = Rc::new(move |mut action: ActionDescriptor, next| {
        match action.result.take() {
            Some(ActionResult::Deferred(pending)) => {
                handle.spawn(async move {
                    let value = pending.await;
                    action.result = Some(ActionResult::Replace(value));
                    next.call(action).unwrap();
                });
                Ok(())
            }
            other => {
                action.result = other;
                next.call(action)
            }
        }
    });
    runtime.run_with(render, vec![runtime.call_action(), await_result]);
    runtime.run_until_idle();

    runtime.actions().invoke(&["counter", "inc"], vec![json!(41)]).unwrap();
    runtime.run_until_idle();

    let frames = frames.borrow();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["counter"], json!(1)); // initial render from run
    assert_eq!(frames[1]["counter"], json!(42)); // after resolution
}

// ============================================================================
// Replacement Semantics
// ============================================================================

#[test]
fn test_actions_replace_their_scoped_state_in_its_entirety() {
    let runtime = mount(
        json!({ "i_am_removed": true, "items": [1, 2] }),
        OpsTree::branch([("add_item", OpsTree::action(|args, state, _| {
            let mut items = state.get("items").unwrap().as_array().unwrap().clone();
            items.push(args[0].clone());
            ActionResult::Replace(json!({ "items": items }))
        }))]),
    );
    let (frames, render) = recording_render();
    runtime.run(render);

    runtime.actions().invoke(&["add_item"], vec![json!(3)]).unwrap();
    runtime.run_until_idle();

    let expected = json!({ "items": [1, 2, 3] });
    assert_eq!(runtime.get_state(), expected);
    assert_eq!(frames.borrow().last().unwrap(), &expected);
}
