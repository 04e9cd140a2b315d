//! Callback Bridge - re-entry from the native engine into host functions.
//!
//! Installed hooks are trampolines. Each captures the host context it was
//! registered under (weakly; the context owns the engine that owns the hook)
//! and, when the engine calls it, resolves the node's wrapper through its
//! durable handle and invokes the host function stored on that wrapper.

use std::rc::{Rc, Weak};

use taffy::{NodeId, Size};
use tracing::trace;

use crate::engine::{DirtiedHook, HookNode, MeasureHook};
use crate::error::{BridgeError, Result};
use crate::host::{ContextInner, DirtiedFunc, MeasureFunc, NodeShared};
use crate::types::{MeasureMode, MeasureOutput};

use super::context_slot;

// =============================================================================
// Trampolines
// =============================================================================

struct MeasureTrampoline {
    context: Weak<ContextInner>,
}

struct DirtiedTrampoline {
    context: Weak<ContextInner>,
}

/// The live wrapper a hook was invoked for. Failing to find one means the
/// handle was torn down while the hook stayed installed.
fn wrapper_for(context: &Weak<ContextInner>, node: HookNode, hook: &str) -> Result<Rc<NodeShared>> {
    let context = context.upgrade().ok_or(BridgeError::ContextDropped)?;
    context_slot::resolve(&context, node.context)?.ok_or_else(|| {
        BridgeError::invariant(format!(
            "{hook} callback for node {:?} has no live wrapper",
            node.id
        ))
    })
}

impl MeasureHook for MeasureTrampoline {
    fn measure(
        &self,
        node: HookNode,
        width: f32,
        width_mode: MeasureMode,
        height: f32,
        height_mode: MeasureMode,
    ) -> Result<Size<f32>> {
        trace!(node = ?node.id, width, ?width_mode, height, ?height_mode, "measure callback");

        let wrapper = wrapper_for(&self.context, node, "measure")?;
        let measure = wrapper.measure_func().ok_or_else(|| {
            BridgeError::invariant(format!("node {:?} has a measure hook but no measure function", node.id))
        })?;
        // Release the wrapper before re-entering host code
        drop(wrapper);

        let output = measure(width as f64, width_mode, height as f64, height_mode);
        validate_measurement(node.id, output)
    }
}

impl DirtiedHook for DirtiedTrampoline {
    fn dirtied(&self, node: HookNode) -> Result<()> {
        trace!(node = ?node.id, "dirtied callback");

        let wrapper = wrapper_for(&self.context, node, "dirtied")?;
        let Some(dirtied) = wrapper.dirtied_func() else {
            return Ok(());
        };
        drop(wrapper);

        dirtied();
        Ok(())
    }
}

/// Both dimensions must be present and finite once narrowed to `f32`.
fn validate_measurement(node: NodeId, output: MeasureOutput) -> Result<Size<f32>> {
    Ok(Size {
        width: narrow_dimension(node, "width", output.width)?,
        height: narrow_dimension(node, "height", output.height)?,
    })
}

fn narrow_dimension(node: NodeId, name: &str, value: Option<f64>) -> Result<f32> {
    let Some(value) = value else {
        return Err(BridgeError::MeasurementError {
            node,
            reason: format!("{name} is missing"),
        });
    };

    let narrowed = value as f32;
    if !narrowed.is_finite() {
        return Err(BridgeError::MeasurementError {
            node,
            reason: format!("{name} is {value}, expected a finite number"),
        });
    }
    Ok(narrowed)
}

// =============================================================================
// Registration
// =============================================================================

pub(crate) fn set_measure_func(context: &Rc<ContextInner>, wrapper: &NodeShared, func: MeasureFunc) -> Result<()> {
    let trampoline = Rc::new(MeasureTrampoline {
        context: Rc::downgrade(context),
    });
    context.engine_mut()?.set_measure_hook(wrapper.native(), Some(trampoline))?;
    wrapper.set_measure_func(Some(func));
    Ok(())
}

pub(crate) fn unset_measure_func(context: &ContextInner, wrapper: &NodeShared) -> Result<()> {
    context.engine_mut()?.set_measure_hook(wrapper.native(), None)?;
    wrapper.set_measure_func(None);
    Ok(())
}

pub(crate) fn set_dirtied_func(context: &Rc<ContextInner>, wrapper: &NodeShared, func: DirtiedFunc) -> Result<()> {
    let trampoline = Rc::new(DirtiedTrampoline {
        context: Rc::downgrade(context),
    });
    context.engine_mut()?.set_dirtied_hook(wrapper.native(), Some(trampoline))?;
    wrapper.set_dirtied_func(Some(func));
    Ok(())
}

pub(crate) fn unset_dirtied_func(context: &ContextInner, wrapper: &NodeShared) -> Result<()> {
    context.engine_mut()?.set_dirtied_hook(wrapper.native(), None)?;
    wrapper.set_dirtied_func(None);
    Ok(())
}
