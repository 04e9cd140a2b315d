//! Tree Navigation Adapter - native tree queries answered with wrappers.

use std::rc::Rc;

use taffy::NodeId;
use tracing::warn;

use crate::engine::NativeEngine;
use crate::error::Result;
use crate::host::{ContextInner, NodeShared};

use super::context_slot;

/// Wrapper of `node`'s parent. `None` when there is no parent or its handle
/// cannot be resolved.
pub(crate) fn get_parent(context: &ContextInner, node: NodeId) -> Result<Option<Rc<NodeShared>>> {
    let engine = context.engine()?;
    match engine.parent(node)? {
        Some(parent) => wrapper_or_miss(context, &engine, parent),
        None => Ok(None),
    }
}

/// Wrapper of `node`'s child at `index` in engine order. `None` when the
/// index is out of range or the child's handle cannot be resolved.
pub(crate) fn get_child(context: &ContextInner, node: NodeId, index: usize) -> Result<Option<Rc<NodeShared>>> {
    let engine = context.engine()?;
    match engine.child(node, index)? {
        Some(child) => wrapper_or_miss(context, &engine, child),
        None => Ok(None),
    }
}

fn wrapper_or_miss(
    context: &ContextInner,
    engine: &NativeEngine,
    node: NodeId,
) -> Result<Option<Rc<NodeShared>>> {
    let wrapper = context_slot::resolve_node(context, engine, node)?;
    if wrapper.is_none() {
        warn!(node = ?node, "node has no resolvable wrapper");
    }
    Ok(wrapper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostContext, Node};

    #[test]
    fn test_parent_and_child_resolve_to_same_wrappers() {
        let ctx = HostContext::new();
        let parent = Node::create(&ctx).unwrap();
        let child = Node::create(&ctx).unwrap();
        parent.insert_child(&child, 0).unwrap();

        let found_parent = get_parent(ctx.inner(), child.native_id()).unwrap().unwrap();
        assert!(Rc::ptr_eq(&found_parent, parent.shared()));

        let found_child = get_child(ctx.inner(), parent.native_id(), 0).unwrap().unwrap();
        assert!(Rc::ptr_eq(&found_child, child.shared()));

        assert!(get_child(ctx.inner(), parent.native_id(), 1).unwrap().is_none());
        assert!(get_parent(ctx.inner(), parent.native_id()).unwrap().is_none());
    }

    #[test]
    fn test_handle_less_node_is_a_miss() {
        let ctx = HostContext::new();
        let parent = Node::create(&ctx).unwrap();

        // A node allocated straight from the engine has no wrapper
        let bare = {
            let mut engine = ctx.inner().engine_mut().unwrap();
            let bare = engine.new_node(None).unwrap();
            engine.insert_child(parent.native_id(), bare, 0).unwrap();
            bare
        };

        assert!(get_child(ctx.inner(), parent.native_id(), 0).unwrap().is_none());
        assert!(get_parent(ctx.inner(), bare).unwrap().is_some());
    }
}
