//! Host execution context.
//!
//! One `HostContext` owns one native engine and one handle table. Wrappers
//! point back at it weakly, so dropping the last `HostContext` clone tears the
//! engine down even while wrappers are still held; those wrappers then report
//! [`BridgeError::ContextDropped`].

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bridge::context_slot::HandleTable;
use crate::engine::NativeEngine;
use crate::error::{BridgeError, Result};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) struct ContextInner {
    id: u64,
    engine: RefCell<NativeEngine>,
    handles: RefCell<HandleTable>,
}

impl ContextInner {
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Shared engine access. Fails while a layout pass or tree mutation is
    /// running, i.e. from inside a callback.
    pub(crate) fn engine(&self) -> Result<Ref<'_, NativeEngine>> {
        self.engine.try_borrow().map_err(|_| BridgeError::Reentrant)
    }

    pub(crate) fn engine_mut(&self) -> Result<RefMut<'_, NativeEngine>> {
        self.engine.try_borrow_mut().map_err(|_| BridgeError::Reentrant)
    }

    pub(crate) fn handles(&self) -> Result<Ref<'_, HandleTable>> {
        self.handles.try_borrow().map_err(|_| BridgeError::Reentrant)
    }

    pub(crate) fn handles_mut(&self) -> Result<RefMut<'_, HandleTable>> {
        self.handles.try_borrow_mut().map_err(|_| BridgeError::Reentrant)
    }
}

/// The execution context wrappers are created in and callbacks run under.
///
/// Cheap to clone; clones share the same engine. Not `Send`: a context and
/// everything created from it stay on the thread that made them.
#[derive(Clone)]
pub struct HostContext {
    inner: Rc<ContextInner>,
}

impl Default for HostContext {
    fn default() -> Self {
        Self::new()
    }
}

impl HostContext {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ContextInner {
                id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
                engine: RefCell::new(NativeEngine::new()),
                handles: RefCell::new(HandleTable::new()),
            }),
        }
    }

    /// Process-unique id, handy in logs.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Number of live durable handles, i.e. wrappers not yet destroyed.
    pub fn wrapper_count(&self) -> usize {
        self.inner.handles.borrow().len()
    }

    /// Number of native nodes allocated and not yet freed.
    pub fn node_count(&self) -> Result<usize> {
        Ok(self.inner.engine()?.node_count())
    }

    pub(crate) fn inner(&self) -> &Rc<ContextInner> {
        &self.inner
    }
}

impl std::fmt::Debug for HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostContext").field("id", &self.inner.id).finish()
    }
}
