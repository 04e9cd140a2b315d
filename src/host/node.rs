//! Node - host wrapper around one native layout node.
//!
//! A `Node` is a cheap handle onto shared wrapper state. The state is kept
//! alive by the durable handle installed in the native node, so navigation
//! hands back the very same wrapper that was created, and dropping every
//! host-side `Node` does not lose it. Only [`Node::free`] and
//! [`Node::free_recursive`] end a wrapper's life.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use taffy::NodeId;

use crate::bridge::{callback, lifecycle, navigation};
use crate::engine::{EdgeKind, NodeStyle};
use crate::error::{BridgeError, Result};
use crate::types::{
    Align, ComputedLayout, Direction, Display, Edge, FlexDirection, Gutter, Justify, MeasureMode,
    MeasureOutput, Overflow, PositionType, Value, Wrap,
};

use super::config::Config;
use super::context::{ContextInner, HostContext};

/// Host measure function, already adapted to return a [`MeasureOutput`].
pub(crate) type MeasureFunc = Rc<dyn Fn(f64, MeasureMode, f64, MeasureMode) -> MeasureOutput>;

pub(crate) type DirtiedFunc = Rc<dyn Fn()>;

// =============================================================================
// Shared Wrapper State
// =============================================================================

/// What a durable handle keeps alive.
pub(crate) struct NodeShared {
    native: NodeId,
    context: Weak<ContextInner>,
    measure_func: RefCell<Option<MeasureFunc>>,
    dirtied_func: RefCell<Option<DirtiedFunc>>,
    destroy_callbacks: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl fmt::Debug for NodeShared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeShared").field("native", &self.native).finish()
    }
}

impl NodeShared {
    pub(crate) fn new(native: NodeId, context: Weak<ContextInner>) -> Self {
        Self {
            native,
            context,
            measure_func: RefCell::new(None),
            dirtied_func: RefCell::new(None),
            destroy_callbacks: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn native(&self) -> NodeId {
        self.native
    }

    pub(crate) fn measure_func(&self) -> Option<MeasureFunc> {
        self.measure_func.borrow().clone()
    }

    pub(crate) fn set_measure_func(&self, func: Option<MeasureFunc>) {
        let previous = self.measure_func.replace(func);
        drop(previous);
    }

    pub(crate) fn dirtied_func(&self) -> Option<DirtiedFunc> {
        self.dirtied_func.borrow().clone()
    }

    pub(crate) fn set_dirtied_func(&self, func: Option<DirtiedFunc>) {
        let previous = self.dirtied_func.replace(func);
        drop(previous);
    }

    pub(crate) fn clear_host_functions(&self) {
        self.set_measure_func(None);
        self.set_dirtied_func(None);
    }

    /// Run and discard the destroy callbacks, in registration order.
    pub(crate) fn run_destroy_callbacks(&self) {
        let callbacks = std::mem::take(&mut *self.destroy_callbacks.borrow_mut());
        for callback in callbacks {
            callback();
        }
    }
}

// =============================================================================
// Node
// =============================================================================

/// Host handle to a native layout node.
///
/// Two `Node`s are equal iff they wrap the same native node of the same
/// context.
///
/// # Example
///
/// ```ignore
/// use spark_layout::{Direction, HostContext, Node};
///
/// let ctx = HostContext::new();
/// let root = Node::create(&ctx)?;
/// let text = Node::create(&ctx)?;
/// text.set_measure_func(|_w, _wm, _h, _hm| (42.0, 17.0))?;
/// root.insert_child(&text, 0)?;
///
/// root.calculate_layout(f32::NAN, f32::NAN, Direction::Ltr)?;
/// assert_eq!(text.get_computed_width()?, 42.0);
///
/// root.free_recursive()?;
/// ```
#[derive(Clone)]
pub struct Node {
    shared: Rc<NodeShared>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node").field("native", &self.shared.native).finish()
    }
}

/// `set_*`/`get_*` pairs for plain style fields.
macro_rules! style_accessors {
    ($($(#[$meta:meta])* $set:ident, $get:ident => $field:ident: $ty:ty;)*) => {
        $(
            $(#[$meta])*
            pub fn $set(&self, value: impl Into<$ty>) -> Result<()> {
                let value = value.into();
                self.update_style(|style| style.$field = value)
            }

            pub fn $get(&self) -> Result<$ty> {
                self.read_style(|style| style.$field)
            }
        )*
    };
}

impl Node {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn create(context: &HostContext) -> Result<Node> {
        let shared = lifecycle::create_wrapper(context.inner(), None)?;
        Ok(Node { shared })
    }

    /// Create a node styled with `config`'s defaults. The config must belong
    /// to the same context.
    pub fn create_with_config(context: &HostContext, config: &Config) -> Result<Node> {
        if !config.belongs_to(context.inner()) {
            return Err(BridgeError::invariant(
                "config was created in a different host context",
            ));
        }
        let shared = lifecycle::create_wrapper(context.inner(), Some(config.id()))?;
        Ok(Node { shared })
    }

    /// Destroy this wrapper and free its native node. Children are detached,
    /// not freed. Freeing twice is an invariant violation.
    pub fn free(&self) -> Result<()> {
        let context = self.context()?;
        let wrapper = lifecycle::destroy_wrapper(&context, self.shared.native)?;
        drop(context);

        wrapper.run_destroy_callbacks();
        Ok(())
    }

    /// Destroy this node and every descendant, children before parents.
    pub fn free_recursive(&self) -> Result<()> {
        let context = self.context()?;
        let mut destroyed = Vec::new();
        let result = lifecycle::destroy_wrapper_recursive(&context, self.shared.native, &mut destroyed);
        drop(context);

        for wrapper in destroyed {
            wrapper.run_destroy_callbacks();
        }
        result
    }

    /// Register a callback to run once this wrapper has been destroyed.
    pub fn on_destroy(&self, callback: impl FnOnce() + 'static) {
        self.shared.destroy_callbacks.borrow_mut().push(Box::new(callback));
    }

    /// The native node this wrapper drives.
    pub fn native_id(&self) -> NodeId {
        self.shared.native
    }

    pub(crate) fn shared(&self) -> &Rc<NodeShared> {
        &self.shared
    }

    fn from_shared(shared: Rc<NodeShared>) -> Node {
        Node { shared }
    }

    fn context(&self) -> Result<Rc<ContextInner>> {
        self.shared.context.upgrade().ok_or(BridgeError::ContextDropped)
    }

    fn ensure_same_context(&self, other: &Node) -> Result<()> {
        if Weak::ptr_eq(&self.shared.context, &other.shared.context) {
            Ok(())
        } else {
            Err(BridgeError::invariant(format!(
                "nodes {:?} and {:?} belong to different host contexts",
                self.shared.native, other.shared.native
            )))
        }
    }

    // =========================================================================
    // Tree
    // =========================================================================

    pub fn insert_child(&self, child: &Node, index: usize) -> Result<()> {
        self.ensure_same_context(child)?;
        let context = self.context()?;
        let mut engine = context.engine_mut()?;
        engine.insert_child(self.shared.native, child.shared.native, index)
    }

    /// Detach `child`. Does nothing if it is not a child of this node.
    pub fn remove_child(&self, child: &Node) -> Result<()> {
        self.ensure_same_context(child)?;
        let context = self.context()?;
        let mut engine = context.engine_mut()?;
        engine.remove_child(self.shared.native, child.shared.native)
    }

    pub fn get_child_count(&self) -> Result<usize> {
        let context = self.context()?;
        let engine = context.engine()?;
        engine.child_count(self.shared.native)
    }

    pub fn get_parent(&self) -> Result<Option<Node>> {
        let context = self.context()?;
        let parent = navigation::get_parent(&context, self.shared.native)?;
        Ok(parent.map(Node::from_shared))
    }

    pub fn get_child(&self, index: usize) -> Result<Option<Node>> {
        let context = self.context()?;
        let child = navigation::get_child(&context, self.shared.native, index)?;
        Ok(child.map(Node::from_shared))
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    /// Install a measure function. It runs synchronously during
    /// [`calculate_layout`](Self::calculate_layout) and must return a finite
    /// width and height. A node with children cannot be measured.
    pub fn set_measure_func<F, R>(&self, measure: F) -> Result<()>
    where
        F: Fn(f64, MeasureMode, f64, MeasureMode) -> R + 'static,
        R: Into<MeasureOutput>,
    {
        let context = self.context()?;
        let func: MeasureFunc = Rc::new(move |width, width_mode, height, height_mode| {
            measure(width, width_mode, height, height_mode).into()
        });
        callback::set_measure_func(&context, &self.shared, func)
    }

    pub fn unset_measure_func(&self) -> Result<()> {
        let context = self.context()?;
        callback::unset_measure_func(&context, &self.shared)
    }

    /// Install a function called whenever this node goes from clean to dirty.
    pub fn set_dirtied_func(&self, dirtied: impl Fn() + 'static) -> Result<()> {
        let context = self.context()?;
        callback::set_dirtied_func(&context, &self.shared, Rc::new(dirtied))
    }

    pub fn unset_dirtied_func(&self) -> Result<()> {
        let context = self.context()?;
        callback::unset_dirtied_func(&context, &self.shared)
    }

    // =========================================================================
    // Dirtiness & Layout
    // =========================================================================

    /// Only valid on nodes with a measure function.
    pub fn mark_dirty(&self) -> Result<()> {
        let context = self.context()?;
        let mut engine = context.engine_mut()?;
        engine.mark_dirty(self.shared.native)
    }

    pub fn is_dirty(&self) -> Result<bool> {
        let context = self.context()?;
        let engine = context.engine()?;
        engine.is_dirty(self.shared.native)
    }

    pub fn has_new_layout(&self) -> Result<bool> {
        let context = self.context()?;
        let engine = context.engine()?;
        engine.has_new_layout(self.shared.native)
    }

    pub fn mark_layout_seen(&self) -> Result<()> {
        let context = self.context()?;
        let mut engine = context.engine_mut()?;
        engine.set_has_new_layout(self.shared.native, false)
    }

    /// Lay out the tree rooted at this node. Pass `f32::NAN` for an
    /// unconstrained dimension.
    pub fn calculate_layout(&self, width: f32, height: f32, direction: Direction) -> Result<()> {
        let context = self.context()?;
        let mut engine = context.engine_mut()?;
        engine.compute_layout(self.shared.native, width, height, direction)
    }

    // =========================================================================
    // Computed Layout
    // =========================================================================

    pub fn get_computed_layout(&self) -> Result<ComputedLayout> {
        let context = self.context()?;
        let engine = context.engine()?;
        engine.layout(self.shared.native)
    }

    pub fn get_computed_left(&self) -> Result<f32> {
        Ok(self.get_computed_layout()?.left)
    }

    pub fn get_computed_top(&self) -> Result<f32> {
        Ok(self.get_computed_layout()?.top)
    }

    pub fn get_computed_right(&self) -> Result<f32> {
        Ok(self.get_computed_layout()?.right)
    }

    pub fn get_computed_bottom(&self) -> Result<f32> {
        Ok(self.get_computed_layout()?.bottom)
    }

    pub fn get_computed_width(&self) -> Result<f32> {
        Ok(self.get_computed_layout()?.width)
    }

    pub fn get_computed_height(&self) -> Result<f32> {
        Ok(self.get_computed_layout()?.height)
    }

    pub fn get_computed_direction(&self) -> Result<Direction> {
        let context = self.context()?;
        let engine = context.engine()?;
        engine.resolved_direction(self.shared.native)
    }

    pub fn get_computed_margin(&self, edge: Edge) -> Result<f32> {
        self.computed_edge(EdgeKind::Margin, edge)
    }

    pub fn get_computed_border(&self, edge: Edge) -> Result<f32> {
        self.computed_edge(EdgeKind::Border, edge)
    }

    pub fn get_computed_padding(&self, edge: Edge) -> Result<f32> {
        self.computed_edge(EdgeKind::Padding, edge)
    }

    fn computed_edge(&self, kind: EdgeKind, edge: Edge) -> Result<f32> {
        let context = self.context()?;
        let engine = context.engine()?;
        engine.computed_edge(self.shared.native, kind, edge)
    }

    // =========================================================================
    // Style
    // =========================================================================

    fn update_style(&self, update: impl FnOnce(&mut NodeStyle)) -> Result<()> {
        let context = self.context()?;
        let mut engine = context.engine_mut()?;
        engine.update_style(self.shared.native, update)
    }

    fn read_style<T>(&self, read: impl FnOnce(&NodeStyle) -> T) -> Result<T> {
        let context = self.context()?;
        let engine = context.engine()?;
        Ok(read(engine.style(self.shared.native)?))
    }

    style_accessors! {
        set_direction, get_direction => direction: Direction;
        set_display, get_display => display: Display;
        set_position_type, get_position_type => position_type: PositionType;
        set_overflow, get_overflow => overflow: Overflow;
        set_flex_direction, get_flex_direction => flex_direction: FlexDirection;
        set_flex_wrap, get_flex_wrap => flex_wrap: Wrap;
        set_justify_content, get_justify_content => justify_content: Justify;
        set_align_items, get_align_items => align_items: Align;
        set_align_content, get_align_content => align_content: Align;
        set_align_self, get_align_self => align_self: Align;
        /// Points, `Value::Percent`, `Value::Auto` or a parsed `"50%"`.
        set_flex_basis, get_flex_basis => flex_basis: Value;
        set_width, get_width => width: Value;
        set_height, get_height => height: Value;
        set_min_width, get_min_width => min_width: Value;
        set_min_height, get_min_height => min_height: Value;
        set_max_width, get_max_width => max_width: Value;
        set_max_height, get_max_height => max_height: Value;
    }

    pub fn set_flex_grow(&self, flex_grow: f32) -> Result<()> {
        self.update_style(|style| style.flex_grow = flex_grow)
    }

    pub fn get_flex_grow(&self) -> Result<f32> {
        self.read_style(|style| style.flex_grow)
    }

    pub fn set_flex_shrink(&self, flex_shrink: f32) -> Result<()> {
        self.update_style(|style| style.flex_shrink = flex_shrink)
    }

    pub fn get_flex_shrink(&self) -> Result<f32> {
        self.read_style(|style| style.flex_shrink)
    }

    /// Shorthand: positive values grow, negative values shrink.
    pub fn set_flex(&self, flex: f32) -> Result<()> {
        self.update_style(|style| {
            if flex.is_nan() || flex == 0.0 {
                style.flex_grow = 0.0;
                style.flex_shrink = 0.0;
            } else if flex > 0.0 {
                style.flex_grow = flex;
                style.flex_shrink = 0.0;
            } else {
                style.flex_grow = 0.0;
                style.flex_shrink = -flex;
            }
        })
    }

    /// NaN clears the aspect ratio.
    pub fn set_aspect_ratio(&self, ratio: f32) -> Result<()> {
        let ratio = (!ratio.is_nan()).then_some(ratio);
        self.update_style(|style| style.aspect_ratio = ratio)
    }

    /// NaN when unset.
    pub fn get_aspect_ratio(&self) -> Result<f32> {
        self.read_style(|style| style.aspect_ratio.unwrap_or(f32::NAN))
    }

    pub fn set_margin(&self, edge: Edge, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.update_style(|style| style.margin.set(edge, value))
    }

    pub fn get_margin(&self, edge: Edge) -> Result<Value> {
        self.read_style(|style| style.margin.get(edge))
    }

    pub fn set_padding(&self, edge: Edge, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.update_style(|style| style.padding.set(edge, value))
    }

    pub fn get_padding(&self, edge: Edge) -> Result<Value> {
        self.read_style(|style| style.padding.get(edge))
    }

    /// Borders are points only; NaN unsets the edge.
    pub fn set_border(&self, edge: Edge, width: f32) -> Result<()> {
        self.update_style(|style| style.border.set(edge, Value::from(width)))
    }

    /// NaN when unset.
    pub fn get_border(&self, edge: Edge) -> Result<f32> {
        self.read_style(|style| style.border.get(edge).value())
    }

    pub fn set_position(&self, edge: Edge, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.update_style(|style| style.position.set(edge, value))
    }

    pub fn get_position(&self, edge: Edge) -> Result<Value> {
        self.read_style(|style| style.position.get(edge))
    }

    pub fn set_gap(&self, gutter: Gutter, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.update_style(|style| style.set_gap(gutter, value))
    }

    pub fn get_gap(&self, gutter: Gutter) -> Result<Value> {
        self.read_style(|style| style.gap(gutter))
    }

    /// Copy every style property of `source` onto this node.
    pub fn copy_style(&self, source: &Node) -> Result<()> {
        self.ensure_same_context(source)?;
        let context = self.context()?;
        let mut engine = context.engine_mut()?;
        engine.copy_style(self.shared.native, source.shared.native)
    }

    /// Return a detached, childless node to its initial state, dropping its
    /// measure and dirtied functions. The wrapper itself survives.
    pub fn reset(&self) -> Result<()> {
        let context = self.context()?;
        context.engine_mut()?.reset_node(self.shared.native)?;
        self.shared.clear_host_functions();
        Ok(())
    }

    pub fn set_is_reference_baseline(&self, is_reference_baseline: bool) -> Result<()> {
        let context = self.context()?;
        let mut engine = context.engine_mut()?;
        engine.set_is_reference_baseline(self.shared.native, is_reference_baseline)
    }

    pub fn is_reference_baseline(&self) -> Result<bool> {
        let context = self.context()?;
        let engine = context.engine()?;
        engine.is_reference_baseline(self.shared.native)
    }

    pub fn set_always_forms_containing_block(&self, always: bool) -> Result<()> {
        let context = self.context()?;
        let mut engine = context.engine_mut()?;
        engine.set_always_forms_containing_block(self.shared.native, always)
    }

    pub fn always_forms_containing_block(&self) -> Result<bool> {
        let context = self.context()?;
        let engine = context.engine()?;
        engine.always_forms_containing_block(self.shared.native)
    }
}
