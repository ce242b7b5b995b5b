//! # Diagnostic Events
//!
//! Non-fatal dispatch diagnostics. These never interrupt a dispatch; they
//! flag likely authoring bugs to whoever is listening. Every event goes to
//! the `log` facade at warn level, and to any sinks the embedder subscribed
//! on the runtime.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

/// Something worth telling the embedder about, attributed to the dotted
/// action name that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RuntimeEvent {
    /// The action returned no replacement value; null was committed in its
    /// place.
    MissingResult { action: String },
    /// A deferred result reached commit without any middleware resolving
    /// it; null was committed in its place.
    UnresolvedDeferred { action: String },
}

impl fmt::Display for RuntimeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeEvent::MissingResult { action } => {
                write!(f, "action `{action}` returned no replacement state")
            }
            RuntimeEvent::UnresolvedDeferred { action } => {
                write!(f, "action `{action}` committed before its deferred result resolved")
            }
        }
    }
}

/// Subscriber callback registered through the runtime.
pub type EventSink = Rc<dyn Fn(&RuntimeEvent)>;
