//! Node style record and its conversion to Taffy styles.
//!
//! The engine keeps styles in the host's vocabulary (logical edges, an
//! inheritable direction, point/percent/auto values) and resolves them to a
//! physical `taffy::Style` at the start of every layout pass, once the
//! direction of each node is known.

use taffy::{
    AlignContent as TaffyAlignContent, AlignItems as TaffyAlignItems,
    AlignSelf as TaffyAlignSelf, Dimension as TaffyDimension, Display as TaffyDisplay,
    FlexDirection as TaffyFlexDirection, FlexWrap as TaffyFlexWrap,
    JustifyContent as TaffyJustifyContent, LengthPercentage, LengthPercentageAuto,
    Overflow as TaffyOverflow, Position as TaffyPosition, Rect, Size, Style,
};

use crate::types::{
    Align, Direction, Display, Edge, FlexDirection, Gutter, Justify, Overflow, PositionType,
    Value, Wrap,
};

use super::config::NativeConfig;

// =============================================================================
// EDGES
// =============================================================================

/// Per-edge values, indexed by [`Edge`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges([Value; Edge::COUNT]);

impl Edges {
    pub fn get(&self, edge: Edge) -> Value {
        self.0[edge.index()]
    }

    pub fn set(&mut self, edge: Edge, value: Value) {
        self.0[edge.index()] = value;
    }

    fn first_defined(&self, order: &[Edge]) -> Value {
        order
            .iter()
            .map(|&edge| self.get(edge))
            .find(|value| value.is_defined())
            .unwrap_or(Value::Undefined)
    }

    /// Physical left edge: the logical edge that maps to the left wins, then
    /// `Left`, `Horizontal`, `All`.
    pub fn left(&self, direction: Direction) -> Value {
        let leading = if direction == Direction::Rtl { Edge::End } else { Edge::Start };
        self.first_defined(&[leading, Edge::Left, Edge::Horizontal, Edge::All])
    }

    pub fn right(&self, direction: Direction) -> Value {
        let trailing = if direction == Direction::Rtl { Edge::Start } else { Edge::End };
        self.first_defined(&[trailing, Edge::Right, Edge::Horizontal, Edge::All])
    }

    pub fn top(&self) -> Value {
        self.first_defined(&[Edge::Top, Edge::Vertical, Edge::All])
    }

    pub fn bottom(&self) -> Value {
        self.first_defined(&[Edge::Bottom, Edge::Vertical, Edge::All])
    }

    fn physical(&self, direction: Direction) -> Rect<Value> {
        Rect {
            left: self.left(direction),
            right: self.right(direction),
            top: self.top(),
            bottom: self.bottom(),
        }
    }
}

// =============================================================================
// NODE STYLE
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub direction: Direction,
    pub display: Display,
    pub position_type: PositionType,
    pub overflow: Overflow,

    // Container
    pub flex_direction: FlexDirection,
    pub flex_wrap: Wrap,
    pub justify_content: Justify,
    pub align_items: Align,
    pub align_content: Align,

    // Item
    pub align_self: Align,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Value,

    // Dimensions
    pub width: Value,
    pub height: Value,
    pub min_width: Value,
    pub min_height: Value,
    pub max_width: Value,
    pub max_height: Value,
    pub aspect_ratio: Option<f32>,

    // Box model
    pub margin: Edges,
    pub padding: Edges,
    pub border: Edges,
    pub position: Edges,
    /// Indexed by [`Gutter`]: column, row, all.
    pub gap: [Value; 3],
}

impl NodeStyle {
    /// Initial style for a node created under `config`.
    pub fn for_config(config: &NativeConfig) -> Self {
        let mut style = Self {
            direction: Direction::Inherit,
            display: Display::Flex,
            position_type: PositionType::Relative,
            overflow: Overflow::Visible,
            flex_direction: FlexDirection::Column,
            flex_wrap: Wrap::NoWrap,
            justify_content: Justify::FlexStart,
            align_items: Align::Stretch,
            align_content: Align::FlexStart,
            align_self: Align::Auto,
            flex_grow: 0.0,
            flex_shrink: 0.0,
            flex_basis: Value::Auto,
            width: Value::Auto,
            height: Value::Auto,
            min_width: Value::Undefined,
            min_height: Value::Undefined,
            max_width: Value::Undefined,
            max_height: Value::Undefined,
            aspect_ratio: None,
            margin: Edges::default(),
            padding: Edges::default(),
            border: Edges::default(),
            position: Edges::default(),
            gap: [Value::Undefined; 3],
        };

        if config.use_web_defaults {
            style.flex_direction = FlexDirection::Row;
            style.align_content = Align::Stretch;
            style.flex_shrink = 1.0;
        }

        style
    }

    pub fn gap(&self, gutter: Gutter) -> Value {
        self.gap[gutter as usize]
    }

    pub fn set_gap(&mut self, gutter: Gutter, value: Value) {
        self.gap[gutter as usize] = value;
    }

    /// Resolve to a physical Taffy style for a node laid out in `direction`
    /// (already resolved, never `Inherit`).
    pub fn to_taffy(&self, direction: Direction) -> Style {
        let margin = self.margin.physical(direction);
        let padding = self.padding.physical(direction);
        let border = self.border.physical(direction);
        let inset = self.position.physical(direction);

        let column_gap = self.resolved_gap(Gutter::Column);
        let row_gap = self.resolved_gap(Gutter::Row);

        Style {
            display: to_taffy_display(self.display),
            position: to_taffy_position(self.position_type),
            overflow: taffy::Point {
                x: to_taffy_overflow(self.overflow),
                y: to_taffy_overflow(self.overflow),
            },

            // Flex container properties
            flex_direction: to_taffy_flex_direction(self.flex_direction.for_direction(direction)),
            flex_wrap: to_taffy_flex_wrap(self.flex_wrap),
            justify_content: to_taffy_justify_content(self.justify_content),
            align_items: to_taffy_align_items(self.align_items),
            align_content: to_taffy_align_content(self.align_content),

            // Flex item properties
            flex_grow: self.flex_grow,
            flex_shrink: self.flex_shrink,
            flex_basis: to_taffy_dimension(self.flex_basis),
            align_self: to_taffy_align_self(self.align_self),

            // Dimensions
            size: Size {
                width: to_taffy_dimension(self.width),
                height: to_taffy_dimension(self.height),
            },
            min_size: Size {
                width: to_taffy_dimension(self.min_width),
                height: to_taffy_dimension(self.min_height),
            },
            max_size: Size {
                width: to_taffy_dimension(self.max_width),
                height: to_taffy_dimension(self.max_height),
            },
            aspect_ratio: self.aspect_ratio,

            // Static positioning ignores insets
            inset: match self.position_type {
                PositionType::Static => Rect {
                    left: LengthPercentageAuto::Auto,
                    right: LengthPercentageAuto::Auto,
                    top: LengthPercentageAuto::Auto,
                    bottom: LengthPercentageAuto::Auto,
                },
                _ => rect_map(inset, to_taffy_inset),
            },
            margin: rect_map(margin, to_taffy_margin),
            padding: rect_map(padding, to_taffy_length_percentage),
            border: rect_map(border, to_taffy_length_percentage),
            gap: Size {
                width: to_taffy_length_percentage(column_gap),
                height: to_taffy_length_percentage(row_gap),
            },

            ..Default::default()
        }
    }

    fn resolved_gap(&self, gutter: Gutter) -> Value {
        let specific = self.gap(gutter);
        if specific.is_defined() {
            specific
        } else {
            self.gap(Gutter::All)
        }
    }
}

fn rect_map<T>(rect: Rect<Value>, f: impl Fn(Value) -> T) -> Rect<T> {
    Rect {
        left: f(rect.left),
        right: f(rect.right),
        top: f(rect.top),
        bottom: f(rect.bottom),
    }
}

// =============================================================================
// VALUE CONVERSION
// =============================================================================

/// Convert a style value to Taffy's Dimension.
fn to_taffy_dimension(value: Value) -> TaffyDimension {
    match value {
        Value::Point(v) => TaffyDimension::Length(v),
        Value::Percent(p) => TaffyDimension::Percent(p / 100.0),
        Value::Auto | Value::Undefined => TaffyDimension::Auto,
    }
}

/// Undefined margins are zero; `auto` margins absorb free space.
fn to_taffy_margin(value: Value) -> LengthPercentageAuto {
    match value {
        Value::Point(v) => LengthPercentageAuto::Length(v),
        Value::Percent(p) => LengthPercentageAuto::Percent(p / 100.0),
        Value::Auto => LengthPercentageAuto::Auto,
        Value::Undefined => LengthPercentageAuto::Length(0.0),
    }
}

/// Undefined insets are `auto` (no offset).
fn to_taffy_inset(value: Value) -> LengthPercentageAuto {
    match value {
        Value::Point(v) => LengthPercentageAuto::Length(v),
        Value::Percent(p) => LengthPercentageAuto::Percent(p / 100.0),
        Value::Auto | Value::Undefined => LengthPercentageAuto::Auto,
    }
}

fn to_taffy_length_percentage(value: Value) -> LengthPercentage {
    match value {
        Value::Point(v) => LengthPercentage::Length(v),
        Value::Percent(p) => LengthPercentage::Percent(p / 100.0),
        Value::Auto | Value::Undefined => LengthPercentage::Length(0.0),
    }
}

// =============================================================================
// ENUM CONVERSIONS
// =============================================================================

fn to_taffy_display(display: Display) -> TaffyDisplay {
    match display {
        Display::Flex => TaffyDisplay::Flex,
        Display::None => TaffyDisplay::None,
    }
}

fn to_taffy_position(position_type: PositionType) -> TaffyPosition {
    match position_type {
        PositionType::Absolute => TaffyPosition::Absolute,
        PositionType::Static | PositionType::Relative => TaffyPosition::Relative,
    }
}

fn to_taffy_overflow(overflow: Overflow) -> TaffyOverflow {
    match overflow {
        Overflow::Visible => TaffyOverflow::Visible,
        Overflow::Hidden => TaffyOverflow::Hidden,
        Overflow::Scroll => TaffyOverflow::Scroll,
    }
}

fn to_taffy_flex_direction(dir: FlexDirection) -> TaffyFlexDirection {
    match dir {
        FlexDirection::Column => TaffyFlexDirection::Column,
        FlexDirection::Row => TaffyFlexDirection::Row,
        FlexDirection::ColumnReverse => TaffyFlexDirection::ColumnReverse,
        FlexDirection::RowReverse => TaffyFlexDirection::RowReverse,
    }
}

fn to_taffy_flex_wrap(wrap: Wrap) -> TaffyFlexWrap {
    match wrap {
        Wrap::NoWrap => TaffyFlexWrap::NoWrap,
        Wrap::Wrap => TaffyFlexWrap::Wrap,
        Wrap::WrapReverse => TaffyFlexWrap::WrapReverse,
    }
}

fn to_taffy_justify_content(justify: Justify) -> Option<TaffyJustifyContent> {
    Some(match justify {
        Justify::FlexStart => TaffyJustifyContent::FlexStart,
        Justify::Center => TaffyJustifyContent::Center,
        Justify::FlexEnd => TaffyJustifyContent::FlexEnd,
        Justify::SpaceBetween => TaffyJustifyContent::SpaceBetween,
        Justify::SpaceAround => TaffyJustifyContent::SpaceAround,
        Justify::SpaceEvenly => TaffyJustifyContent::SpaceEvenly,
    })
}

fn to_taffy_align_items(align: Align) -> Option<TaffyAlignItems> {
    match align {
        Align::FlexStart => Some(TaffyAlignItems::FlexStart),
        Align::Center => Some(TaffyAlignItems::Center),
        Align::FlexEnd => Some(TaffyAlignItems::FlexEnd),
        Align::Stretch => Some(TaffyAlignItems::Stretch),
        Align::Baseline => Some(TaffyAlignItems::Baseline),
        // Not meaningful for items; fall back to the engine default
        Align::Auto | Align::SpaceBetween | Align::SpaceAround | Align::SpaceEvenly => None,
    }
}

fn to_taffy_align_self(align: Align) -> Option<TaffyAlignSelf> {
    match align {
        Align::Auto => None, // inherit from parent
        other => to_taffy_align_items(other),
    }
}

fn to_taffy_align_content(align: Align) -> Option<TaffyAlignContent> {
    match align {
        Align::FlexStart => Some(TaffyAlignContent::FlexStart),
        Align::Center => Some(TaffyAlignContent::Center),
        Align::FlexEnd => Some(TaffyAlignContent::FlexEnd),
        Align::Stretch => Some(TaffyAlignContent::Stretch),
        Align::SpaceBetween => Some(TaffyAlignContent::SpaceBetween),
        Align::SpaceAround => Some(TaffyAlignContent::SpaceAround),
        Align::SpaceEvenly => Some(TaffyAlignContent::SpaceEvenly),
        Align::Auto | Align::Baseline => None,
    }
}
