//! # Core Building Blocks
//!
//! The pure pieces of the runtime. This module knows nothing about
//! scheduling policy or the public `mount` surface; it defines how state is
//! addressed, how a dispatch is described, and how the interception chain
//! composes.
//!
//! ```text
//!               ┌──────────────────────────────┐
//!               │            CORE              │
//!               │                              │
//!               │  • path   (tree addressing)  │
//!               │  • scope  (projected views)  │
//!               │  • action (descriptors,      │
//!               │            middleware chain) │
//!               │  • events (diagnostics)      │
//!               └──────────────┬───────────────┘
//!                              │
//!                              ▼
//!                  runtime (mount, registry,
//!                   commit, render schedule)
//! ```
//!
//! ## Modules
//!
//! - [`path`]: get/set over the nested state tree by key sequence
//! - [`scope`]: the snapshot-then-view subtree projection handed to actions
//! - [`action`]: descriptors, ops/action trees, and the middleware chain
//! - [`events`]: non-fatal diagnostics delivered through subscriber sinks

pub mod action;
pub mod events;
pub mod path;
pub mod scope;
