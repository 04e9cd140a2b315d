//! Host-facing API.
//!
//! - [`HostContext`]: owns one native engine and its handle table
//! - [`Node`]: wrapper around one native node
//! - [`Config`]: wrapper around one engine configuration object

mod config;
mod context;
mod node;

pub use config::Config;
pub use context::HostContext;
pub use node::Node;

pub(crate) use context::ContextInner;
pub(crate) use node::{DirtiedFunc, MeasureFunc, NodeShared};
