//! # spark-layout
//!
//! Host bindings for a native flexbox layout engine.
//!
//! Built on [taffy](https://github.com/DioxusLabs/taffy) for the layout math.
//!
//! ## Architecture
//!
//! Host code works with wrapper objects ([`Node`], [`Config`]) living in a
//! [`HostContext`]. Each wrapper drives one native node. The two sides are
//! bound by a durable handle: the native node's context slot names an entry
//! in the context's handle table, and that entry keeps the wrapper alive
//! until the node is freed.
//!
//! ```text
//! Node (host) ──► NodeShared ◄── handle table[key] ◄── context slot ── native node
//! ```
//!
//! During a layout pass the engine calls back into host code (measure
//! functions, dirtied notifications) through trampolines that resolve the
//! wrapper from the node's context slot.
//!
//! ## Modules
//!
//! - [`types`] - Style enums, values, errata and computed layout records
//! - [`engine`] - Taffy adapter: nodes, hooks, configs, layout pass
//! - `bridge` - Durable handles, wrapper lifecycle, callbacks, navigation
//! - [`host`] - `HostContext`, `Node` and `Config`
//! - [`error`] - `BridgeError` and `Result`

mod arena;
mod bridge;
pub mod engine;
pub mod error;
pub mod host;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{BridgeError, Result};

pub use host::{Config, HostContext, Node};
