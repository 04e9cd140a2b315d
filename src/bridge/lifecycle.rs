//! Wrapper Lifecycle Manager - the only code that creates or destroys durable
//! handles and frees native nodes.
//!
//! Pairing rules kept here:
//! - a handle is installed right after its node is allocated
//! - a handle is removed exactly once, immediately before its node is freed
//! - a node is never freed while its handle is intact

use std::rc::Rc;

use taffy::NodeId;
use tracing::debug;

use crate::engine::ConfigId;
use crate::error::Result;
use crate::host::{ContextInner, NodeShared};

use super::context_slot;

/// Allocate a native node (with `config`'s defaults, if any), its wrapper
/// state, and the durable handle linking them.
pub(crate) fn create_wrapper(context: &Rc<ContextInner>, config: Option<ConfigId>) -> Result<Rc<NodeShared>> {
    let mut engine = context.engine_mut()?;
    let native = engine.new_node(config)?;
    let wrapper = Rc::new(NodeShared::new(native, Rc::downgrade(context)));

    if let Err(err) = context_slot::install(context, &mut engine, native, wrapper.clone()) {
        engine.free_node(native)?;
        return Err(err);
    }

    debug!(node = ?native, context = context.id(), "created wrapper");
    Ok(wrapper)
}

/// Tear down `node`'s durable handle, then free the node. Returns the
/// wrapper state the handle kept alive, so the caller can run its destroy
/// callbacks once no engine borrow is held.
pub(crate) fn destroy_wrapper(context: &ContextInner, node: NodeId) -> Result<Rc<NodeShared>> {
    let mut engine = context.engine_mut()?;
    let wrapper = context_slot::remove(context, &mut engine, node)?;

    // The node is about to go; its host functions must not outlive it
    wrapper.clear_host_functions();
    engine.free_node(node)?;

    debug!(node = ?node, context = context.id(), "destroyed wrapper");
    Ok(wrapper)
}

/// Destroy `node` and its whole subtree, strictly post-order.
///
/// The child list is re-read after every destruction (always taking child 0)
/// rather than snapshotted, since destroying a child detaches it.
pub(crate) fn destroy_wrapper_recursive(
    context: &ContextInner,
    node: NodeId,
    destroyed: &mut Vec<Rc<NodeShared>>,
) -> Result<()> {
    loop {
        let first_child = context.engine()?.child(node, 0)?;
        let Some(child) = first_child else {
            break;
        };
        destroy_wrapper_recursive(context, child, destroyed)?;
    }

    destroyed.push(destroy_wrapper(context, node)?);
    Ok(())
}
