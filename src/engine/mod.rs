//! Native layout engine.
//!
//! An adapter over Taffy exposing exactly the node-level capabilities the
//! bridge needs:
//! - Config: independently owned engine configuration objects
//! - Style: logical node style, resolved to Taffy styles per pass
//! - Hooks: the opaque context slot plus measure/dirtied hook traits
//! - Native: node lifecycle, tree structure, dirtiness and the layout pass
//!
//! # Architecture
//!
//! Nodes are Taffy `NodeId`s. Everything Taffy does not model lives in the
//! node's context record:
//!
//! ```text
//! NodeId ─► NodeRecord { context slot, measure hook, dirtied hook, style, config, ... }
//! ```
//!
//! The engine never sees host objects. Hooks get the node and its context
//! slot; turning the slot back into a wrapper is the bridge's job.

mod config;
mod hooks;
mod native;
mod style;

pub use config::*;
pub use hooks::*;
pub use native::*;
pub use style::*;
