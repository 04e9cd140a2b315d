//! Core types for spark-layout.
//!
//! Enum discriminants match the integer constants host code already uses for
//! the engine (`ALIGN_*`, `EDGE_*`, `MEASURE_MODE_*`, ...), so values can cross
//! the host boundary as plain integers and come back through `TryFrom<i32>`.
//! Unknown integers are rejected with `InvalidArgument`.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::BridgeError;

// =============================================================================
// Alignment
// =============================================================================

/// Cross-axis alignment (align-items, align-self, align-content).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum Align {
    #[default]
    Auto = 0,
    FlexStart = 1,
    Center = 2,
    FlexEnd = 3,
    Stretch = 4,
    Baseline = 5,
    SpaceBetween = 6,
    SpaceAround = 7,
    SpaceEvenly = 8,
}

impl TryFrom<i32> for Align {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Auto,
            1 => Self::FlexStart,
            2 => Self::Center,
            3 => Self::FlexEnd,
            4 => Self::Stretch,
            5 => Self::Baseline,
            6 => Self::SpaceBetween,
            7 => Self::SpaceAround,
            8 => Self::SpaceEvenly,
            other => return Err(BridgeError::InvalidArgument(format!("unknown align {other}"))),
        })
    }
}

/// Main-axis distribution (justify-content).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum Justify {
    #[default]
    FlexStart = 0,
    Center = 1,
    FlexEnd = 2,
    SpaceBetween = 3,
    SpaceAround = 4,
    SpaceEvenly = 5,
}

impl TryFrom<i32> for Justify {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::FlexStart,
            1 => Self::Center,
            2 => Self::FlexEnd,
            3 => Self::SpaceBetween,
            4 => Self::SpaceAround,
            5 => Self::SpaceEvenly,
            other => return Err(BridgeError::InvalidArgument(format!("unknown justify {other}"))),
        })
    }
}

// =============================================================================
// Direction
// =============================================================================

/// Layout direction. `Inherit` takes the owner's resolved direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum Direction {
    #[default]
    Inherit = 0,
    Ltr = 1,
    Rtl = 2,
}

impl Direction {
    /// Resolve against the owner's direction. Never returns `Inherit`.
    pub fn resolve(self, owner: Direction) -> Direction {
        match (self, owner) {
            (Direction::Inherit, Direction::Inherit) => Direction::Ltr,
            (Direction::Inherit, owner) => owner,
            (own, _) => own,
        }
    }
}

impl TryFrom<i32> for Direction {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Inherit,
            1 => Self::Ltr,
            2 => Self::Rtl,
            other => return Err(BridgeError::InvalidArgument(format!("unknown direction {other}"))),
        })
    }
}

/// Flex direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum FlexDirection {
    #[default]
    Column = 0,
    ColumnReverse = 1,
    Row = 2,
    RowReverse = 3,
}

impl FlexDirection {
    /// Row axes flip under right-to-left layout.
    pub fn for_direction(self, direction: Direction) -> FlexDirection {
        match (self, direction) {
            (FlexDirection::Row, Direction::Rtl) => FlexDirection::RowReverse,
            (FlexDirection::RowReverse, Direction::Rtl) => FlexDirection::Row,
            (flex_direction, _) => flex_direction,
        }
    }
}

impl TryFrom<i32> for FlexDirection {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Column,
            1 => Self::ColumnReverse,
            2 => Self::Row,
            3 => Self::RowReverse,
            other => return Err(BridgeError::InvalidArgument(format!("unknown flex direction {other}"))),
        })
    }
}

// =============================================================================
// Box Model Enums
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum Display {
    #[default]
    Flex = 0,
    None = 1,
}

impl TryFrom<i32> for Display {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Flex,
            1 => Self::None,
            other => return Err(BridgeError::InvalidArgument(format!("unknown display {other}"))),
        })
    }
}

/// Edge selector for margin, padding, border and position.
///
/// `Start`/`End` follow the node's resolved direction; `Horizontal`,
/// `Vertical` and `All` are shorthands that only apply where a more specific
/// edge is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Edge {
    Left = 0,
    Top = 1,
    Right = 2,
    Bottom = 3,
    Start = 4,
    End = 5,
    Horizontal = 6,
    Vertical = 7,
    All = 8,
}

impl Edge {
    pub const COUNT: usize = 9;

    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<i32> for Edge {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Left,
            1 => Self::Top,
            2 => Self::Right,
            3 => Self::Bottom,
            4 => Self::Start,
            5 => Self::End,
            6 => Self::Horizontal,
            7 => Self::Vertical,
            8 => Self::All,
            other => return Err(BridgeError::InvalidArgument(format!("unknown edge {other}"))),
        })
    }
}

/// Gap selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Gutter {
    Column = 0,
    Row = 1,
    All = 2,
}

impl TryFrom<i32> for Gutter {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Column,
            1 => Self::Row,
            2 => Self::All,
            other => return Err(BridgeError::InvalidArgument(format!("unknown gutter {other}"))),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum Overflow {
    #[default]
    Visible = 0,
    Hidden = 1,
    Scroll = 2,
}

impl TryFrom<i32> for Overflow {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Visible,
            1 => Self::Hidden,
            2 => Self::Scroll,
            other => return Err(BridgeError::InvalidArgument(format!("unknown overflow {other}"))),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum PositionType {
    Static = 0,
    #[default]
    Relative = 1,
    Absolute = 2,
}

impl TryFrom<i32> for PositionType {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Static,
            1 => Self::Relative,
            2 => Self::Absolute,
            other => return Err(BridgeError::InvalidArgument(format!("unknown position type {other}"))),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum Wrap {
    #[default]
    NoWrap = 0,
    Wrap = 1,
    WrapReverse = 2,
}

impl TryFrom<i32> for Wrap {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::NoWrap,
            1 => Self::Wrap,
            2 => Self::WrapReverse,
            other => return Err(BridgeError::InvalidArgument(format!("unknown wrap {other}"))),
        })
    }
}

// =============================================================================
// Measurement
// =============================================================================

/// How a measure function should interpret an available dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum MeasureMode {
    /// No constraint; the size argument is NaN.
    Undefined = 0,
    /// The result must be exactly the given size.
    Exactly = 1,
    /// The result may be at most the given size.
    AtMost = 2,
}

impl TryFrom<i32> for MeasureMode {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Undefined,
            1 => Self::Exactly,
            2 => Self::AtMost,
            other => return Err(BridgeError::InvalidArgument(format!("unknown measure mode {other}"))),
        })
    }
}

/// What a host measure function hands back.
///
/// A missing or non-finite component is rejected by the bridge; it is never
/// coerced to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasureOutput {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl MeasureOutput {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }
}

impl From<(f64, f64)> for MeasureOutput {
    fn from((width, height): (f64, f64)) -> Self {
        Self::new(width, height)
    }
}

// =============================================================================
// Values
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Unit {
    Undefined = 0,
    Point = 1,
    Percent = 2,
    Auto = 3,
}

/// A style length: undefined, points, percent of the containing size, or auto.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Point(f32),
    Percent(f32),
    Auto,
}

impl Value {
    pub fn unit(self) -> Unit {
        match self {
            Value::Undefined => Unit::Undefined,
            Value::Point(_) => Unit::Point,
            Value::Percent(_) => Unit::Percent,
            Value::Auto => Unit::Auto,
        }
    }

    /// Numeric part; NaN for `Undefined` and `Auto`.
    pub fn value(self) -> f32 {
        match self {
            Value::Point(v) | Value::Percent(v) => v,
            Value::Undefined | Value::Auto => f32::NAN,
        }
    }

    pub fn is_defined(self) -> bool {
        !matches!(self, Value::Undefined)
    }
}

impl From<f32> for Value {
    fn from(points: f32) -> Self {
        if points.is_nan() {
            Value::Undefined
        } else {
            Value::Point(points)
        }
    }
}

/// Host numbers arrive as doubles.
impl From<f64> for Value {
    fn from(points: f64) -> Self {
        Value::from(points as f32)
    }
}

/// Parses `"auto"`, `"50%"`, `"12.5"` and `"undefined"`.
impl FromStr for Value {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || BridgeError::InvalidArgument(format!("invalid value {s:?}"));

        match s {
            "auto" => Ok(Value::Auto),
            "undefined" => Ok(Value::Undefined),
            _ => match s.strip_suffix('%') {
                Some(percent) => percent
                    .trim()
                    .parse::<f32>()
                    .map(Value::Percent)
                    .map_err(|_| invalid()),
                None => s.parse::<f32>().map(Value::from).map_err(|_| invalid()),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Point(v) => write!(f, "{v}"),
            Value::Percent(v) => write!(f, "{v}%"),
            Value::Auto => write!(f, "auto"),
        }
    }
}

// =============================================================================
// Config Flags
// =============================================================================

bitflags! {
    /// Deliberate deviations from the W3C behavior, kept for compatibility.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Errata: u32 {
        const NONE = 0;
        const STRETCH_FLEX_BASIS = 1;
        const ABSOLUTE_POSITIONING_INCORRECT = 2;
        const ABSOLUTE_PERCENT_AGAINST_INNER_SIZE = 4;
        const ALL = 0x7FFF_FFFF;
        const CLASSIC = 0x7FFF_FFFE;
    }
}

impl From<i32> for Errata {
    fn from(value: i32) -> Self {
        Errata::from_bits_retain(value as u32)
    }
}

/// Opt-in engine behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExperimentalFeature {
    WebFlexBasis = 0,
}

impl TryFrom<i32> for ExperimentalFeature {
    type Error = BridgeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::WebFlexBasis),
            other => Err(BridgeError::InvalidArgument(format!(
                "unknown experimental feature {other}"
            ))),
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExperimentalFeatures: u32 {
        const WEB_FLEX_BASIS = 1 << (ExperimentalFeature::WebFlexBasis as u32);
    }
}

impl From<ExperimentalFeature> for ExperimentalFeatures {
    fn from(feature: ExperimentalFeature) -> Self {
        match feature {
            ExperimentalFeature::WebFlexBasis => ExperimentalFeatures::WEB_FLEX_BASIS,
        }
    }
}

// =============================================================================
// Computed Geometry
// =============================================================================

/// Result of a layout pass for one node, relative to its parent.
///
/// `right` and `bottom` are distances from the parent's right and bottom
/// edges.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComputedLayout {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}
