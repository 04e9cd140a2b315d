//! Native-callable hooks and the opaque per-node context slot.
//!
//! The engine knows nothing about wrappers. It stores one opaque word per node
//! and, when a hook is installed, hands that word back to the hook while it is
//! in the middle of its own work (sizing a leaf, propagating dirtiness).

use std::fmt;

use taffy::{AvailableSpace, NodeId, Size};

use crate::error::Result;
use crate::types::MeasureMode;

/// The single opaque context word a node carries.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextSlot(u64);

impl ContextSlot {
    pub fn from_raw(bits: u64) -> Self {
        Self(bits)
    }

    pub fn into_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ContextSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextSlot({:#x})", self.0)
    }
}

/// What a hook sees of the node it is invoked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookNode {
    pub id: NodeId,
    pub context: Option<ContextSlot>,
}

/// Invoked while the engine sizes a childless node. Blocks the layout pass.
pub trait MeasureHook {
    fn measure(
        &self,
        node: HookNode,
        width: f32,
        width_mode: MeasureMode,
        height: f32,
        height_mode: MeasureMode,
    ) -> Result<Size<f32>>;
}

/// Invoked once per clean → dirty transition of a node.
pub trait DirtiedHook {
    fn dirtied(&self, node: HookNode) -> Result<()>;
}

/// Translate Taffy's sizing inputs for one axis into a size + mode pair.
///
/// A known dimension is exact. Definite space is an upper bound. Max-content
/// is unconstrained (NaN). Min-content asks for the narrowest size, i.e. at
/// most zero.
pub(crate) fn measure_constraint(known: Option<f32>, available: AvailableSpace) -> (f32, MeasureMode) {
    match (known, available) {
        (Some(size), _) => (size, MeasureMode::Exactly),
        (None, AvailableSpace::Definite(size)) => (size, MeasureMode::AtMost),
        (None, AvailableSpace::MinContent) => (0.0, MeasureMode::AtMost),
        (None, AvailableSpace::MaxContent) => (f32::NAN, MeasureMode::Undefined),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_constraint_modes() {
        assert_eq!(
            measure_constraint(Some(30.0), AvailableSpace::MaxContent),
            (30.0, MeasureMode::Exactly)
        );
        assert_eq!(
            measure_constraint(None, AvailableSpace::Definite(80.0)),
            (80.0, MeasureMode::AtMost)
        );
        assert_eq!(
            measure_constraint(None, AvailableSpace::MinContent),
            (0.0, MeasureMode::AtMost)
        );

        let (size, mode) = measure_constraint(None, AvailableSpace::MaxContent);
        assert!(size.is_nan());
        assert_eq!(mode, MeasureMode::Undefined);
    }

    #[test]
    fn test_context_slot_is_opaque_word() {
        let slot = ContextSlot::from_raw(0xdead_beef);
        assert_eq!(slot.into_raw(), 0xdead_beef);
    }
}
