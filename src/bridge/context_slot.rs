//! Context Slot Bridge - durable handles stored in native context slots.
//!
//! A durable handle is a strong reference to a wrapper's shared state, kept in
//! the host context's handle table. The native node's context slot holds only
//! the handle's key, packed into one word. Generations make a key that
//! outlived its handle resolve to nothing instead of to a recycled entry.

use std::rc::Rc;

use taffy::NodeId;

use crate::arena::{arena_key, Arena, ArenaKey, RawKey};
use crate::engine::{ContextSlot, NativeEngine};
use crate::error::{BridgeError, Result};
use crate::host::{ContextInner, NodeShared};

arena_key! {
    /// Key of a durable handle in a host context's handle table.
    pub struct HandleKey;
}

pub(crate) type HandleTable = Arena<HandleKey, Rc<NodeShared>>;

fn encode(key: HandleKey) -> ContextSlot {
    ContextSlot::from_raw(key.raw().to_bits())
}

fn decode(slot: ContextSlot) -> HandleKey {
    HandleKey::from_raw(RawKey::from_bits(slot.into_raw()))
}

/// Create a durable handle to `wrapper` and store it in `node`'s context
/// slot. The slot must be empty.
pub(crate) fn install(
    context: &ContextInner,
    engine: &mut NativeEngine,
    node: NodeId,
    wrapper: Rc<NodeShared>,
) -> Result<()> {
    if let Some(existing) = engine.context(node)? {
        return Err(BridgeError::invariant(format!(
            "node {node:?} already carries a durable handle ({existing:?})"
        )));
    }

    let key = context.handles_mut()?.insert(wrapper);
    engine.set_context(node, Some(encode(key)))
}

/// The wrapper a context slot refers to, if its handle is still intact.
pub(crate) fn resolve(context: &ContextInner, slot: Option<ContextSlot>) -> Result<Option<Rc<NodeShared>>> {
    let Some(slot) = slot else {
        return Ok(None);
    };
    Ok(context.handles()?.get(decode(slot)).cloned())
}

pub(crate) fn resolve_node(
    context: &ContextInner,
    engine: &NativeEngine,
    node: NodeId,
) -> Result<Option<Rc<NodeShared>>> {
    resolve(context, engine.context(node)?)
}

/// Destroy `node`'s durable handle and clear its slot. Exact inverse of
/// [`install`]; a node without a handle is a foreign node or was already
/// destroyed.
pub(crate) fn remove(context: &ContextInner, engine: &mut NativeEngine, node: NodeId) -> Result<Rc<NodeShared>> {
    let slot = engine.context(node)?.ok_or_else(|| {
        BridgeError::invariant(format!(
            "node {node:?} has no durable handle (foreign node or already destroyed)"
        ))
    })?;

    let wrapper = context.handles_mut()?.remove(decode(slot)).ok_or_else(|| {
        BridgeError::invariant(format!("durable handle {slot:?} of node {node:?} is stale"))
    })?;
    engine.set_context(node, None)?;
    Ok(wrapper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostContext, Node};

    #[test]
    fn test_install_resolve_remove() {
        let ctx = HostContext::new();
        let inner = ctx.inner();
        let node = Node::create(&ctx).unwrap();
        let native = node.native_id();

        let mut engine = inner.engine_mut().unwrap();
        let resolved = resolve_node(inner, &engine, native).unwrap().unwrap();
        assert!(Rc::ptr_eq(&resolved, node.shared()));

        // A second install on the same slot is refused
        let err = install(inner, &mut engine, native, resolved.clone()).unwrap_err();
        assert!(err.is_invariant_violation());

        let removed = remove(inner, &mut engine, native).unwrap();
        assert!(Rc::ptr_eq(&removed, node.shared()));
        assert_eq!(engine.context(native).unwrap(), None);
        assert!(resolve_node(inner, &engine, native).unwrap().is_none());

        let err = remove(inner, &mut engine, native).unwrap_err();
        assert!(err.is_invariant_violation());

        engine.free_node(native).unwrap();
    }

    #[test]
    fn test_stale_slot_does_not_resolve_to_recycled_handle() {
        let ctx = HostContext::new();
        let a = Node::create(&ctx).unwrap();
        let stale = ctx.inner().engine().unwrap().context(a.native_id()).unwrap();

        a.free().unwrap();
        let b = Node::create(&ctx).unwrap();
        let fresh = ctx.inner().engine().unwrap().context(b.native_id()).unwrap();

        assert_ne!(stale, fresh);
        assert!(resolve(ctx.inner(), stale).unwrap().is_none());
        assert!(resolve(ctx.inner(), fresh).unwrap().is_some());
    }
}
