//! # Path-Addressed Tree Access
//!
//! State is one nested `serde_json::Value` mapping. A [`Path`] is the ordered
//! key sequence from the root to a field; the empty path addresses the root
//! itself. [`get_in`] and [`set_in`] are the only two ways the runtime reads
//! or writes state, so every access failure surfaces as a [`PathError`] here.
//!
//! There is no auto-vivification: writing through a missing intermediate is
//! an error, not a silent tree extension. Only the final key of a write may
//! be newly created.

use std::fmt;

use serde_json::Value;

/// Ordered key sequence from the root of the state tree to a field.
pub type Path = Vec<String>;

/// Render a path the way action names are rendered: keys joined with `.`.
pub fn dotted(path: &[String]) -> String {
    path.join(".")
}

/// A read or write failed to resolve through the state tree.
/// Fatal on the synchronous dispatch path; there is no recovery layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path segment does not exist in the tree.
    Missing { at: String },
    /// An intermediate segment resolved to a scalar, which cannot be
    /// traversed further.
    NotTraversable { at: String },
    /// The path resolved, but not to a callable action.
    NotAnAction { at: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Missing { at } => write!(f, "no value at path `{at}`"),
            PathError::NotTraversable { at } => {
                write!(f, "cannot traverse scalar value at `{at}`")
            }
            PathError::NotAnAction { at } => write!(f, "`{at}` does not address an action"),
        }
    }
}

impl std::error::Error for PathError {}

/// Descend `root` key by key and return the value at `path`.
/// The empty path returns the root itself.
pub fn get_in<'a>(root: &'a Value, path: &[String]) -> Result<&'a Value, PathError> {
    let mut current = root;
    for (depth, key) in path.iter().enumerate() {
        let children = current.as_object().ok_or_else(|| PathError::NotTraversable {
            at: dotted(&path[..depth]),
        })?;
        current = children.get(key).ok_or_else(|| PathError::Missing {
            at: dotted(&path[..=depth]),
        })?;
    }
    Ok(current)
}

/// Write `value` at `path`, mutating the tree in place.
///
/// Intermediate segments must already exist; the final key is inserted or
/// replaced. The empty path replaces the root wholesale.
pub fn set_in(root: &mut Value, path: &[String], value: Value) -> Result<(), PathError> {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return Ok(());
    };

    let mut current = root;
    for (depth, key) in parents.iter().enumerate() {
        let children = current
            .as_object_mut()
            .ok_or_else(|| PathError::NotTraversable {
                at: dotted(&path[..depth]),
            })?;
        current = children.get_mut(key).ok_or_else(|| PathError::Missing {
            at: dotted(&path[..=depth]),
        })?;
    }

    let children = current
        .as_object_mut()
        .ok_or_else(|| PathError::NotTraversable {
            at: dotted(parents),
        })?;
    children.insert(last.clone(), value);
    Ok(())
}
