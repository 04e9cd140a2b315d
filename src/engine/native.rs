//! Native Engine - thin adapter over a `TaffyTree`.
//!
//! Exposes the node-level capability set the bridge consumes: node lifecycle,
//! child list, parent link, one opaque context slot, measure/dirtied hooks and
//! the layout pass. Layout math is Taffy's; this module only keeps the
//! per-node bookkeeping Taffy has no notion of (context slot, hooks, logical
//! style, `has_new_layout`) in the tree's node context.

use std::rc::Rc;

use taffy::{
    AvailableSpace, Dimension as TaffyDimension, LengthPercentage, LengthPercentageAuto, NodeId,
    Rect, Size, Style, TaffyTree,
};
use tracing::{debug, error, trace};

use crate::arena::Arena;
use crate::error::{BridgeError, Result};
use crate::types::{ComputedLayout, Direction, Edge, Value};

use super::config::{ConfigId, NativeConfig};
use super::hooks::{measure_constraint, ContextSlot, DirtiedHook, HookNode, MeasureHook};
use super::style::NodeStyle;

/// Box-model property read back by [`NativeEngine::computed_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Margin,
    Border,
    Padding,
}

// =============================================================================
// Node Record
// =============================================================================

/// Everything the engine tracks per node besides Taffy's own style/layout.
pub struct NodeRecord {
    context: Option<ContextSlot>,
    measure: Option<Rc<dyn MeasureHook>>,
    dirtied: Option<Rc<dyn DirtiedHook>>,
    style: NodeStyle,
    config: Option<ConfigId>,
    resolved_direction: Direction,
    has_new_layout: bool,
    is_reference_baseline: bool,
    always_forms_containing_block: bool,
    /// Size handed to the last layout pass this node was the root of.
    owner_size: Size<f32>,
}

impl NodeRecord {
    fn new(style: NodeStyle, config: Option<ConfigId>) -> Self {
        Self {
            context: None,
            measure: None,
            dirtied: None,
            style,
            config,
            resolved_direction: Direction::Ltr,
            has_new_layout: true,
            is_reference_baseline: false,
            always_forms_containing_block: false,
            owner_size: Size {
                width: f32::NAN,
                height: f32::NAN,
            },
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

pub struct NativeEngine {
    tree: TaffyTree<NodeRecord>,
    configs: Arena<ConfigId, NativeConfig>,
    live_nodes: usize,
}

impl Default for NativeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeEngine {
    pub fn new() -> Self {
        Self {
            tree: TaffyTree::new(),
            configs: Arena::new(),
            live_nodes: 0,
        }
    }

    // =========================================================================
    // Configs
    // =========================================================================

    pub fn new_config(&mut self) -> ConfigId {
        self.configs.insert(NativeConfig::default())
    }

    pub fn free_config(&mut self, id: ConfigId) -> Result<()> {
        self.configs
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| BridgeError::invariant(format!("config {id:?} has already been freed")))
    }

    pub fn config(&self, id: ConfigId) -> Result<&NativeConfig> {
        self.configs
            .get(id)
            .ok_or_else(|| BridgeError::invariant(format!("config {id:?} has already been freed")))
    }

    pub fn config_mut(&mut self, id: ConfigId) -> Result<&mut NativeConfig> {
        self.configs
            .get_mut(id)
            .ok_or_else(|| BridgeError::invariant(format!("config {id:?} has already been freed")))
    }

    /// The config a node was created with, or the default one if there was
    /// none or it has since been freed.
    fn effective_config(&self, node: NodeId) -> Result<NativeConfig> {
        let record = self.record(node)?;
        Ok(record
            .config
            .and_then(|id| self.configs.get(id))
            .cloned()
            .unwrap_or_default())
    }

    // =========================================================================
    // Node Lifecycle
    // =========================================================================

    /// Allocate a parentless node, styled with the defaults of `config`.
    pub fn new_node(&mut self, config: Option<ConfigId>) -> Result<NodeId> {
        let native_config = match config {
            Some(id) => self.config(id)?.clone(),
            None => NativeConfig::default(),
        };

        let record = NodeRecord::new(NodeStyle::for_config(&native_config), config);
        let initial = record.style.to_taffy(Direction::Ltr);

        let node = self
            .tree
            .new_leaf_with_context(initial, record)
            .map_err(|err| BridgeError::AllocationFailure(err.to_string()))?;
        self.live_nodes += 1;
        Ok(node)
    }

    /// Free a node. It is detached from its parent (which is dirtied); its
    /// children become parentless roots and are not freed.
    pub fn free_node(&mut self, node: NodeId) -> Result<()> {
        self.ensure_live(node)?;

        let parent = self.tree.parent(node);
        let transitions = match parent {
            Some(parent) => self.clean_chain(parent)?,
            None => Vec::new(),
        };

        self.tree.set_node_context(node, None)?;
        self.tree.remove(node)?;
        self.live_nodes -= 1;

        if let Some(parent) = parent {
            self.tree.mark_dirty(parent)?;
        }
        self.fire_dirtied(&transitions)
    }

    pub fn is_live(&self, node: NodeId) -> bool {
        self.tree.get_node_context(node).is_some()
    }

    /// Number of nodes allocated and not yet freed.
    pub fn node_count(&self) -> usize {
        self.live_nodes
    }

    fn ensure_live(&self, node: NodeId) -> Result<()> {
        self.record(node).map(|_| ())
    }

    fn record(&self, node: NodeId) -> Result<&NodeRecord> {
        self.tree.get_node_context(node).ok_or_else(|| BridgeError::freed(node))
    }

    fn record_mut(&mut self, node: NodeId) -> Result<&mut NodeRecord> {
        self.tree
            .get_node_context_mut(node)
            .ok_or_else(|| BridgeError::freed(node))
    }

    // =========================================================================
    // Tree Structure
    // =========================================================================

    pub fn child_count(&self, node: NodeId) -> Result<usize> {
        self.ensure_live(node)?;
        Ok(self.tree.children(node)?.len())
    }

    /// Child at `index` in engine order, `None` past the end.
    pub fn child(&self, node: NodeId, index: usize) -> Result<Option<NodeId>> {
        self.ensure_live(node)?;
        Ok(self.tree.children(node)?.get(index).copied())
    }

    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        self.ensure_live(node)?;
        Ok(self.tree.parent(node))
    }

    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        self.ensure_live(parent)?;
        self.ensure_live(child)?;

        if self.tree.parent(child).is_some() {
            return Err(BridgeError::invariant(format!(
                "child {child:?} already has a parent, it must be removed first"
            )));
        }
        if self.has_measure_hook(parent)? {
            return Err(BridgeError::invariant(format!(
                "cannot add child to {parent:?}: nodes with measure functions cannot have children"
            )));
        }

        // Inserting an ancestor below its own descendant would close a cycle
        let mut ancestor = Some(parent);
        while let Some(node) = ancestor {
            if node == child {
                return Err(BridgeError::invariant(format!(
                    "inserting {child:?} under {parent:?} would create a cycle"
                )));
            }
            ancestor = self.tree.parent(node);
        }

        let count = self.tree.children(parent)?.len();
        if index > count {
            return Err(BridgeError::ChildIndexOutOfBounds { index, count });
        }

        let transitions = self.clean_chain(parent)?;
        self.tree.insert_child_at_index(parent, index, child)?;
        self.tree.mark_dirty(parent)?;
        self.fire_dirtied(&transitions)
    }

    /// Detach `child` from `parent`. A node that is not a child of `parent`
    /// is left alone.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_live(parent)?;
        self.ensure_live(child)?;

        if self.tree.parent(child) != Some(parent) {
            return Ok(());
        }
        let Some(index) = self.tree.children(parent)?.iter().position(|&c| c == child) else {
            return Ok(());
        };

        let transitions = self.clean_chain(parent)?;
        self.tree.remove_child_at_index(parent, index)?;
        self.tree.mark_dirty(parent)?;
        self.fire_dirtied(&transitions)
    }

    // =========================================================================
    // Context Slot
    // =========================================================================

    pub fn set_context(&mut self, node: NodeId, context: Option<ContextSlot>) -> Result<()> {
        self.record_mut(node)?.context = context;
        Ok(())
    }

    pub fn context(&self, node: NodeId) -> Result<Option<ContextSlot>> {
        Ok(self.record(node)?.context)
    }

    // =========================================================================
    // Hooks
    // =========================================================================

    /// Install or clear the measure hook. A node with children cannot be
    /// measured.
    pub fn set_measure_hook(&mut self, node: NodeId, hook: Option<Rc<dyn MeasureHook>>) -> Result<()> {
        if hook.is_some() && self.child_count(node)? > 0 {
            return Err(BridgeError::invariant(format!(
                "cannot set measure function on {node:?}: nodes with measure functions cannot have children"
            )));
        }
        self.record_mut(node)?.measure = hook;
        Ok(())
    }

    pub fn has_measure_hook(&self, node: NodeId) -> Result<bool> {
        Ok(self.record(node)?.measure.is_some())
    }

    pub fn set_dirtied_hook(&mut self, node: NodeId, hook: Option<Rc<dyn DirtiedHook>>) -> Result<()> {
        self.record_mut(node)?.dirtied = hook;
        Ok(())
    }

    pub fn has_dirtied_hook(&self, node: NodeId) -> Result<bool> {
        Ok(self.record(node)?.dirtied.is_some())
    }

    // =========================================================================
    // Dirtiness
    // =========================================================================

    /// Manually dirty a measured node, e.g. after its content changed.
    pub fn mark_dirty(&mut self, node: NodeId) -> Result<()> {
        if !self.has_measure_hook(node)? {
            return Err(BridgeError::invariant(format!(
                "only nodes with a measure function can be marked dirty manually ({node:?})"
            )));
        }
        self.dirty_and_propagate(node)
    }

    pub fn is_dirty(&self, node: NodeId) -> Result<bool> {
        self.ensure_live(node)?;
        Ok(self.tree.dirty(node)?)
    }

    fn dirty_and_propagate(&mut self, node: NodeId) -> Result<()> {
        let transitions = self.clean_chain(node)?;
        self.tree.mark_dirty(node)?;
        self.fire_dirtied(&transitions)
    }

    /// The node and its ancestors up to (not including) the first one that
    /// is already dirty: exactly the nodes a dirty mark would flip.
    fn clean_chain(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut chain = Vec::new();
        let mut current = Some(node);

        while let Some(node) = current {
            if self.tree.dirty(node)? {
                break;
            }
            chain.push(node);
            current = self.tree.parent(node);
        }

        Ok(chain)
    }

    fn fire_dirtied(&self, transitions: &[NodeId]) -> Result<()> {
        for &node in transitions {
            let record = self.record(node)?;
            if let Some(hook) = record.dirtied.clone() {
                trace!(?node, "invoking dirtied hook");
                hook.dirtied(HookNode {
                    id: node,
                    context: record.context,
                })?;
            }
        }
        Ok(())
    }

    pub fn has_new_layout(&self, node: NodeId) -> Result<bool> {
        Ok(self.record(node)?.has_new_layout)
    }

    pub fn set_has_new_layout(&mut self, node: NodeId, has_new_layout: bool) -> Result<()> {
        self.record_mut(node)?.has_new_layout = has_new_layout;
        Ok(())
    }

    /// Direction the node was laid out in during the last pass.
    pub fn resolved_direction(&self, node: NodeId) -> Result<Direction> {
        Ok(self.record(node)?.resolved_direction)
    }

    /// Recorded for the host. Taffy picks baselines from the first child in
    /// each line, so the flag dirties the node but does not move it.
    pub fn is_reference_baseline(&self, node: NodeId) -> Result<bool> {
        Ok(self.record(node)?.is_reference_baseline)
    }

    pub fn set_is_reference_baseline(&mut self, node: NodeId, is_reference_baseline: bool) -> Result<()> {
        let record = self.record_mut(node)?;
        if record.is_reference_baseline == is_reference_baseline {
            return Ok(());
        }
        record.is_reference_baseline = is_reference_baseline;
        self.dirty_and_propagate(node)
    }

    /// Recorded for the host. Taffy already makes every node the containing
    /// block of its absolute children, so layout never reads the flag.
    pub fn set_always_forms_containing_block(&mut self, node: NodeId, always: bool) -> Result<()> {
        self.record_mut(node)?.always_forms_containing_block = always;
        Ok(())
    }

    pub fn always_forms_containing_block(&self, node: NodeId) -> Result<bool> {
        Ok(self.record(node)?.always_forms_containing_block)
    }

    // =========================================================================
    // Style
    // =========================================================================

    pub fn style(&self, node: NodeId) -> Result<&NodeStyle> {
        Ok(&self.record(node)?.style)
    }

    /// Apply `update` to the node's style. Dirties the node (firing hooks)
    /// only if the style actually changed.
    pub fn update_style(&mut self, node: NodeId, update: impl FnOnce(&mut NodeStyle)) -> Result<()> {
        let mut next = self.record(node)?.style.clone();
        update(&mut next);
        if next == self.record(node)?.style {
            return Ok(());
        }

        self.record_mut(node)?.style = next;
        self.dirty_and_propagate(node)
    }

    pub fn copy_style(&mut self, dst: NodeId, src: NodeId) -> Result<()> {
        let style = self.style(src)?.clone();
        self.update_style(dst, |dst_style| *dst_style = style)
    }

    /// Return a detached, childless node to its freshly created state. The
    /// context slot survives; hooks do not.
    pub fn reset_node(&mut self, node: NodeId) -> Result<()> {
        if self.child_count(node)? > 0 || self.tree.parent(node).is_some() {
            return Err(BridgeError::invariant(format!(
                "cannot reset {node:?} while it is attached to a tree"
            )));
        }

        let style = NodeStyle::for_config(&self.effective_config(node)?);
        let record = self.record_mut(node)?;
        record.style = style;
        record.measure = None;
        record.dirtied = None;
        record.has_new_layout = true;
        record.is_reference_baseline = false;
        record.always_forms_containing_block = false;

        self.tree.mark_dirty(node)?;
        Ok(())
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Lay out the tree rooted at `root`. NaN sizes are unconstrained.
    ///
    /// Measure hooks run synchronously inside this call. The first hook
    /// failure aborts the pass and is returned. The failing node and every
    /// measured node skipped after it are left dirty, so the next pass
    /// measures them again.
    pub fn compute_layout(&mut self, root: NodeId, width: f32, height: f32, direction: Direction) -> Result<()> {
        self.ensure_live(root)?;
        debug!(?root, width, height, ?direction, "computing layout");

        let owner_size = Size { width, height };
        self.sync_styles(root, direction, owner_size)?;
        let fresh = self.dirty_nodes(root)?;

        if self.effective_config(root)?.rounds_layout() {
            self.tree.enable_rounding();
        } else {
            self.tree.disable_rounding();
        }

        let available = Size {
            width: to_available_space(width),
            height: to_available_space(height),
        };

        let mut failure: Option<(NodeId, BridgeError)> = None;
        // Measured nodes answered with a zero size after the failure. Taffy
        // caches those answers, so they must be dirtied with the failing node.
        let mut skipped: Vec<NodeId> = Vec::new();

        let mut measure_fn = |known_dimensions: Size<Option<f32>>,
                              available_space: Size<AvailableSpace>,
                              node_id: NodeId,
                              context: Option<&mut NodeRecord>,
                              _style: &Style| {
            let Some(record) = context else {
                return Size::ZERO;
            };
            let Some(hook) = record.measure.clone() else {
                return Size::ZERO;
            };
            if failure.is_some() {
                if !skipped.contains(&node_id) {
                    skipped.push(node_id);
                }
                return Size::ZERO;
            }

            let (width, width_mode) = measure_constraint(known_dimensions.width, available_space.width);
            let (height, height_mode) = measure_constraint(known_dimensions.height, available_space.height);
            let node = HookNode {
                id: node_id,
                context: record.context,
            };

            match hook.measure(node, width, width_mode, height, height_mode) {
                Ok(size) => Size {
                    width: known_dimensions.width.unwrap_or(size.width),
                    height: known_dimensions.height.unwrap_or(size.height),
                },
                Err(err) => {
                    failure = Some((node_id, err));
                    Size::ZERO
                }
            }
        };

        self.tree.compute_layout_with_measure(root, available, &mut measure_fn)?;

        if let Some((node, err)) = failure {
            error!(?root, ?node, skipped = skipped.len(), %err, "layout pass aborted by measure hook");
            self.tree.mark_dirty(node)?;
            for skipped_node in skipped {
                self.tree.mark_dirty(skipped_node)?;
            }
            return Err(err);
        }

        for node in fresh {
            self.record_mut(node)?.has_new_layout = true;
        }
        self.record_mut(root)?.owner_size = owner_size;
        Ok(())
    }

    /// Push every node's logical style down to Taffy as a physical style,
    /// resolving directions top-down. Unchanged styles are not re-set, so
    /// Taffy's caches survive.
    fn sync_styles(&mut self, root: NodeId, direction: Direction, owner_size: Size<f32>) -> Result<()> {
        let mut stack = vec![(root, direction)];

        while let Some((node, owner_direction)) = stack.pop() {
            let record = self.record(node)?;
            let direction = record.style.direction.resolve(owner_direction);
            let mut style = record.style.to_taffy(direction);
            if node == root {
                fit_root(&mut style, &record.style, direction, owner_size);
            }

            if self.tree.style(node)? != &style {
                self.tree.set_style(node, style)?;
            }
            self.record_mut(node)?.resolved_direction = direction;

            for child in self.tree.children(node)? {
                stack.push((child, direction));
            }
        }

        Ok(())
    }

    fn dirty_nodes(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let mut dirty = Vec::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if self.tree.dirty(node)? {
                dirty.push(node);
            }
            stack.extend(self.tree.children(node)?);
        }

        Ok(dirty)
    }

    pub fn layout(&self, node: NodeId) -> Result<ComputedLayout> {
        self.ensure_live(node)?;
        let layout = self.tree.layout(node)?;
        let container = self.container_size(node)?;

        Ok(ComputedLayout {
            left: layout.location.x,
            top: layout.location.y,
            width: layout.size.width,
            height: layout.size.height,
            right: trailing_offset(container.width, layout.location.x, layout.size.width),
            bottom: trailing_offset(container.height, layout.location.y, layout.size.height),
        })
    }

    /// Computed margin/border/padding on one edge after the last pass.
    /// `Start`/`End` resolve by the node's layout direction; shorthands are
    /// rejected.
    pub fn computed_edge(&self, node: NodeId, kind: EdgeKind, edge: Edge) -> Result<f32> {
        let record = self.record(node)?;
        let rtl = record.resolved_direction == Direction::Rtl;
        let physical = match edge {
            Edge::Left | Edge::Top | Edge::Right | Edge::Bottom => edge,
            Edge::Start if rtl => Edge::Right,
            Edge::Start => Edge::Left,
            Edge::End if rtl => Edge::Left,
            Edge::End => Edge::Right,
            shorthand => {
                return Err(BridgeError::InvalidArgument(format!(
                    "cannot read computed {kind:?} of shorthand edge {shorthand:?}"
                )));
            }
        };

        let style = self.tree.style(node)?;
        // Percentages resolve against the containing block's width on every edge
        let basis = self.container_size(node)?.width;

        Ok(match kind {
            EdgeKind::Margin => resolve_length_percentage_auto(rect_side(&style.margin, physical), basis),
            EdgeKind::Border => resolve_length_percentage(rect_side(&style.border, physical), basis),
            EdgeKind::Padding => resolve_length_percentage(rect_side(&style.padding, physical), basis),
        })
    }

    fn container_size(&self, node: NodeId) -> Result<Size<f32>> {
        match self.tree.parent(node) {
            Some(parent) => Ok(self.tree.layout(parent)?.size),
            None => Ok(self.record(node)?.owner_size),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn to_available_space(size: f32) -> AvailableSpace {
    if size.is_finite() {
        AvailableSpace::Definite(size)
    } else {
        AvailableSpace::MaxContent
    }
}

/// A root without its own size fills a defined owner size exactly, minus
/// its point margins.
fn fit_root(style: &mut Style, node_style: &NodeStyle, direction: Direction, owner_size: Size<f32>) {
    let sized = |value: Value| matches!(value, Value::Point(_) | Value::Percent(_));
    let points = |value: Value| match value {
        Value::Point(v) => v,
        _ => 0.0,
    };

    if owner_size.width.is_finite() && !sized(node_style.width) && !sized(node_style.max_width) {
        let margin = points(node_style.margin.left(direction)) + points(node_style.margin.right(direction));
        style.size.width = TaffyDimension::Length((owner_size.width - margin).max(0.0));
    }
    if owner_size.height.is_finite() && !sized(node_style.height) && !sized(node_style.max_height) {
        let margin = points(node_style.margin.top()) + points(node_style.margin.bottom());
        style.size.height = TaffyDimension::Length((owner_size.height - margin).max(0.0));
    }
}

fn trailing_offset(container: f32, offset: f32, size: f32) -> f32 {
    if container.is_finite() {
        container - offset - size
    } else {
        0.0
    }
}

fn rect_side<T: Copy>(rect: &Rect<T>, edge: Edge) -> T {
    match edge {
        Edge::Left => rect.left,
        Edge::Right => rect.right,
        Edge::Top => rect.top,
        _ => rect.bottom,
    }
}

fn resolve_length_percentage(value: LengthPercentage, basis: f32) -> f32 {
    match value {
        LengthPercentage::Length(v) => v,
        LengthPercentage::Percent(p) if basis.is_finite() => p * basis,
        LengthPercentage::Percent(_) => 0.0,
    }
}

fn resolve_length_percentage_auto(value: LengthPercentageAuto, basis: f32) -> f32 {
    match value {
        LengthPercentageAuto::Length(v) => v,
        LengthPercentageAuto::Percent(p) if basis.is_finite() => p * basis,
        LengthPercentageAuto::Percent(_) | LengthPercentageAuto::Auto => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use crate::types::{Align, FlexDirection, MeasureMode};

    struct FixedMeasure {
        size: Size<f32>,
        calls: Cell<usize>,
        modes: RefCell<Vec<(MeasureMode, MeasureMode)>>,
    }

    impl MeasureHook for FixedMeasure {
        fn measure(
            &self,
            _node: HookNode,
            _width: f32,
            width_mode: MeasureMode,
            _height: f32,
            height_mode: MeasureMode,
        ) -> Result<Size<f32>> {
            self.calls.set(self.calls.get() + 1);
            self.modes.borrow_mut().push((width_mode, height_mode));
            Ok(self.size)
        }
    }

    struct CountDirtied(Rc<RefCell<Vec<NodeId>>>);

    impl DirtiedHook for CountDirtied {
        fn dirtied(&self, node: HookNode) -> Result<()> {
            self.0.borrow_mut().push(node.id);
            Ok(())
        }
    }

    fn fixed(width: f32, height: f32) -> Rc<FixedMeasure> {
        Rc::new(FixedMeasure {
            size: Size { width, height },
            calls: Cell::new(0),
            modes: RefCell::new(Vec::new()),
        })
    }

    #[test]
    fn test_new_and_free_node() {
        let mut engine = NativeEngine::new();

        let node = engine.new_node(None).unwrap();
        assert!(engine.is_live(node));
        assert_eq!(engine.node_count(), 1);

        engine.free_node(node).unwrap();
        assert!(!engine.is_live(node));
        assert_eq!(engine.node_count(), 0);

        let err = engine.free_node(node).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_insert_and_remove_child() {
        let mut engine = NativeEngine::new();
        let parent = engine.new_node(None).unwrap();
        let a = engine.new_node(None).unwrap();
        let b = engine.new_node(None).unwrap();

        engine.insert_child(parent, a, 0).unwrap();
        engine.insert_child(parent, b, 0).unwrap();

        assert_eq!(engine.child_count(parent).unwrap(), 2);
        assert_eq!(engine.child(parent, 0).unwrap(), Some(b));
        assert_eq!(engine.child(parent, 1).unwrap(), Some(a));
        assert_eq!(engine.child(parent, 2).unwrap(), None);
        assert_eq!(engine.parent(a).unwrap(), Some(parent));

        engine.remove_child(parent, b).unwrap();
        assert_eq!(engine.child_count(parent).unwrap(), 1);
        assert_eq!(engine.parent(b).unwrap(), None);

        // Not a child: no-op
        engine.remove_child(parent, b).unwrap();
        assert_eq!(engine.child_count(parent).unwrap(), 1);
    }

    #[test]
    fn test_insert_rejects_attached_child_and_bad_index() {
        let mut engine = NativeEngine::new();
        let p1 = engine.new_node(None).unwrap();
        let p2 = engine.new_node(None).unwrap();
        let child = engine.new_node(None).unwrap();

        assert!(matches!(
            engine.insert_child(p1, child, 1),
            Err(BridgeError::ChildIndexOutOfBounds { index: 1, count: 0 })
        ));

        engine.insert_child(p1, child, 0).unwrap();
        assert!(engine.insert_child(p2, child, 0).unwrap_err().is_invariant_violation());
    }

    #[test]
    fn test_insert_rejects_cycles() {
        let mut engine = NativeEngine::new();
        let root = engine.new_node(None).unwrap();
        let child = engine.new_node(None).unwrap();

        engine.insert_child(root, child, 0).unwrap();
        assert!(engine.insert_child(child, root, 0).unwrap_err().is_invariant_violation());
        assert!(engine.insert_child(root, root, 0).unwrap_err().is_invariant_violation());
    }

    #[test]
    fn test_free_detaches_and_orphans_children() {
        let mut engine = NativeEngine::new();
        let grandparent = engine.new_node(None).unwrap();
        let parent = engine.new_node(None).unwrap();
        let child = engine.new_node(None).unwrap();

        engine.insert_child(grandparent, parent, 0).unwrap();
        engine.insert_child(parent, child, 0).unwrap();

        engine.free_node(parent).unwrap();

        assert_eq!(engine.child_count(grandparent).unwrap(), 0);
        assert_eq!(engine.parent(child).unwrap(), None);
        assert!(engine.is_live(child));
    }

    #[test]
    fn test_measured_node_cannot_have_children() {
        let mut engine = NativeEngine::new();
        let parent = engine.new_node(None).unwrap();
        let child = engine.new_node(None).unwrap();

        engine.set_measure_hook(parent, Some(fixed(1.0, 1.0))).unwrap();
        assert!(engine.insert_child(parent, child, 0).unwrap_err().is_invariant_violation());

        engine.set_measure_hook(parent, None).unwrap();
        engine.insert_child(parent, child, 0).unwrap();
        assert!(engine
            .set_measure_hook(parent, Some(fixed(1.0, 1.0)))
            .unwrap_err()
            .is_invariant_violation());
    }

    #[test]
    fn test_measure_hook_sizes_leaf() {
        let mut engine = NativeEngine::new();
        let node = engine.new_node(None).unwrap();
        let hook = fixed(42.0, 17.0);
        engine.set_measure_hook(node, Some(hook.clone())).unwrap();

        engine.compute_layout(node, f32::NAN, f32::NAN, Direction::Ltr).unwrap();

        let layout = engine.layout(node).unwrap();
        assert_eq!(layout.width, 42.0);
        assert_eq!(layout.height, 17.0);
        assert!(hook.calls.get() >= 1);
        assert!(hook
            .modes
            .borrow()
            .contains(&(MeasureMode::Undefined, MeasureMode::Undefined)));
    }

    #[test]
    fn test_measure_failure_aborts_pass() {
        struct Failing;
        impl MeasureHook for Failing {
            fn measure(&self, node: HookNode, _: f32, _: MeasureMode, _: f32, _: MeasureMode) -> Result<Size<f32>> {
                Err(BridgeError::MeasurementError {
                    node: node.id,
                    reason: "no size".into(),
                })
            }
        }

        let mut engine = NativeEngine::new();
        let node = engine.new_node(None).unwrap();
        engine.set_measure_hook(node, Some(Rc::new(Failing))).unwrap();

        let err = engine.compute_layout(node, f32::NAN, f32::NAN, Direction::Ltr).unwrap_err();
        assert!(matches!(err, BridgeError::MeasurementError { .. }));
        assert!(engine.is_dirty(node).unwrap());
    }

    #[test]
    fn test_measure_failure_redirties_skipped_siblings() {
        struct FailOnce(Cell<bool>);
        impl MeasureHook for FailOnce {
            fn measure(&self, node: HookNode, _: f32, _: MeasureMode, _: f32, _: MeasureMode) -> Result<Size<f32>> {
                if self.0.replace(false) {
                    return Err(BridgeError::MeasurementError {
                        node: node.id,
                        reason: "not ready".into(),
                    });
                }
                Ok(Size {
                    width: 10.0,
                    height: 10.0,
                })
            }
        }

        let mut engine = NativeEngine::new();
        let root = engine.new_node(None).unwrap();
        engine
            .update_style(root, |s| {
                s.flex_direction = FlexDirection::Row;
                s.align_items = Align::FlexStart;
            })
            .unwrap();
        let first = engine.new_node(None).unwrap();
        let second = engine.new_node(None).unwrap();
        engine.insert_child(root, first, 0).unwrap();
        engine.insert_child(root, second, 1).unwrap();
        engine.set_measure_hook(first, Some(Rc::new(FailOnce(Cell::new(true))))).unwrap();
        let healthy = fixed(42.0, 17.0);
        engine.set_measure_hook(second, Some(healthy.clone())).unwrap();

        assert!(engine.compute_layout(root, 200.0, 100.0, Direction::Ltr).is_err());
        assert_eq!(healthy.calls.get(), 0);
        assert!(engine.is_dirty(first).unwrap());
        assert!(engine.is_dirty(second).unwrap());

        engine.compute_layout(root, 200.0, 100.0, Direction::Ltr).unwrap();
        assert!(healthy.calls.get() > 0);
        let layout = engine.layout(second).unwrap();
        assert_eq!((layout.left, layout.width, layout.height), (10.0, 42.0, 17.0));
    }

    #[test]
    fn test_dirtied_fires_once_per_transition() {
        let mut engine = NativeEngine::new();
        let root = engine.new_node(None).unwrap();
        let leaf = engine.new_node(None).unwrap();
        engine.insert_child(root, leaf, 0).unwrap();
        engine.set_measure_hook(leaf, Some(fixed(5.0, 5.0))).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        engine.set_dirtied_hook(leaf, Some(Rc::new(CountDirtied(seen.clone())))).unwrap();
        engine.set_dirtied_hook(root, Some(Rc::new(CountDirtied(seen.clone())))).unwrap();

        engine.compute_layout(root, 100.0, 100.0, Direction::Ltr).unwrap();
        assert!(!engine.is_dirty(leaf).unwrap());

        engine.mark_dirty(leaf).unwrap();
        assert_eq!(*seen.borrow(), vec![leaf, root]);

        // Already dirty: nothing flips, nothing fires
        engine.mark_dirty(leaf).unwrap();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_mark_dirty_requires_measure_hook() {
        let mut engine = NativeEngine::new();
        let node = engine.new_node(None).unwrap();
        assert!(engine.mark_dirty(node).unwrap_err().is_invariant_violation());
    }

    #[test]
    fn test_unchanged_style_does_not_dirty() {
        let mut engine = NativeEngine::new();
        let node = engine.new_node(None).unwrap();
        engine.update_style(node, |s| s.width = Value::Point(10.0)).unwrap();
        engine.compute_layout(node, f32::NAN, f32::NAN, Direction::Ltr).unwrap();
        assert!(!engine.is_dirty(node).unwrap());

        engine.update_style(node, |s| s.width = Value::Point(10.0)).unwrap();
        assert!(!engine.is_dirty(node).unwrap());

        engine.update_style(node, |s| s.width = Value::Point(20.0)).unwrap();
        assert!(engine.is_dirty(node).unwrap());
    }

    #[test]
    fn test_has_new_layout_after_pass() {
        let mut engine = NativeEngine::new();
        let node = engine.new_node(None).unwrap();
        engine.update_style(node, |s| s.width = Value::Point(10.0)).unwrap();

        engine.set_has_new_layout(node, false).unwrap();
        engine.compute_layout(node, f32::NAN, f32::NAN, Direction::Ltr).unwrap();
        assert!(engine.has_new_layout(node).unwrap());

        engine.set_has_new_layout(node, false).unwrap();
        engine.compute_layout(node, f32::NAN, f32::NAN, Direction::Ltr).unwrap();
        assert!(!engine.has_new_layout(node).unwrap());
    }

    #[test]
    fn test_root_fills_defined_owner_size() {
        let mut engine = NativeEngine::new();
        let root = engine.new_node(None).unwrap();

        engine.compute_layout(root, 80.0, 24.0, Direction::Ltr).unwrap();

        let layout = engine.layout(root).unwrap();
        assert_eq!(layout.width, 80.0);
        assert_eq!(layout.height, 24.0);
        assert_eq!(layout.right, 0.0);
    }

    #[test]
    fn test_config_free_is_checked() {
        let mut engine = NativeEngine::new();
        let config = engine.new_config();
        engine.config_mut(config).unwrap().use_web_defaults = true;

        let node = engine.new_node(Some(config)).unwrap();
        assert_eq!(engine.style(node).unwrap().flex_shrink, 1.0);

        engine.free_config(config).unwrap();
        assert!(engine.free_config(config).unwrap_err().is_invariant_violation());
        assert!(engine.new_node(Some(config)).unwrap_err().is_invariant_violation());

        // The node outlives its config
        engine.compute_layout(node, 10.0, 10.0, Direction::Ltr).unwrap();
    }

    #[test]
    fn test_reset_requires_detached_node() {
        let mut engine = NativeEngine::new();
        let parent = engine.new_node(None).unwrap();
        let child = engine.new_node(None).unwrap();
        engine.insert_child(parent, child, 0).unwrap();

        assert!(engine.reset_node(child).unwrap_err().is_invariant_violation());

        engine.remove_child(parent, child).unwrap();
        engine.update_style(child, |s| s.flex_grow = 2.0).unwrap();
        engine.set_context(child, Some(ContextSlot::from_raw(7))).unwrap();

        engine.reset_node(child).unwrap();
        assert_eq!(engine.style(child).unwrap().flex_grow, 0.0);
        assert_eq!(engine.context(child).unwrap(), Some(ContextSlot::from_raw(7)));
    }
}
