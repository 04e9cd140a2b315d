//! Cross-runtime bridge between host wrappers and native nodes.
//!
//! - Context slot: durable handles, stored by key in each node's context slot
//! - Lifecycle: wrapper creation and (recursive) destruction
//! - Callback: measure/dirtied trampolines back into host functions
//! - Navigation: parent/child queries answered with wrappers
//!
//! Nothing outside this module touches the handle table or frees nodes.

pub(crate) mod callback;
pub(crate) mod context_slot;
pub(crate) mod lifecycle;
pub(crate) mod navigation;
