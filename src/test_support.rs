//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

/// A render callback that records every frame it receives, plus the shared
/// frame log to assert against.
pub fn recording_render() -> (Rc<RefCell<Vec<Value>>>, impl Fn(&Value)) {
    let frames = Rc::new(RefCell::new(Vec::new()));
    let writer = Rc::clone(&frames);
    let render = move |state: &Value| writer.borrow_mut().push(state.clone());
    (frames, render)
}
