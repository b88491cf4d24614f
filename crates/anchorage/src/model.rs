//! Geometry and anchor-point vocabulary shared by every stage of the engine.

use serde::{Deserialize, Serialize};

use crate::arena::ItemId;

/// Largest extent an anchor or item may take; also the nominal maximum of the layout's own
/// structural anchors.
pub const MAX_SIZE: f64 = 16_777_215.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub const ALL: [Orientation; 2] = [Orientation::Horizontal, Orientation::Vertical];

    pub(crate) fn index(self) -> usize {
        match self {
            Orientation::Horizontal => 0,
            Orientation::Vertical => 1,
        }
    }
}

/// One of the six anchorage points of an item.
///
/// The declaration order matters: direction normalization compares edges by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Edge {
    Left,
    HCenter,
    Right,
    Top,
    VCenter,
    Bottom,
}

impl Edge {
    pub fn orientation(self) -> Orientation {
        match self {
            Edge::Left | Edge::HCenter | Edge::Right => Orientation::Horizontal,
            Edge::Top | Edge::VCenter | Edge::Bottom => Orientation::Vertical,
        }
    }

    /// Left and right (top and bottom) are opposite; a center is its own opposite.
    pub fn opposite(self) -> Edge {
        match self {
            Edge::Left => Edge::Right,
            Edge::Right => Edge::Left,
            Edge::Top => Edge::Bottom,
            Edge::Bottom => Edge::Top,
            center => center,
        }
    }

    pub fn is_center(self) -> bool {
        matches!(self, Edge::HCenter | Edge::VCenter)
    }

    pub(crate) fn first(orientation: Orientation) -> Edge {
        match orientation {
            Orientation::Horizontal => Edge::Left,
            Orientation::Vertical => Edge::Top,
        }
    }

    pub(crate) fn center(orientation: Orientation) -> Edge {
        match orientation {
            Orientation::Horizontal => Edge::HCenter,
            Orientation::Vertical => Edge::VCenter,
        }
    }

    pub(crate) fn last(orientation: Orientation) -> Edge {
        match orientation {
            Orientation::Horizontal => Edge::Right,
            Orientation::Vertical => Edge::Bottom,
        }
    }

    /// Right and bottom edges; anchors leaving the layout from them point inwards.
    pub(crate) fn is_trailing(self) -> bool {
        matches!(self, Edge::Right | Edge::Bottom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// The horizontal and vertical edges meeting at this corner.
    pub fn edges(self) -> (Edge, Edge) {
        match self {
            Corner::TopLeft => (Edge::Left, Edge::Top),
            Corner::TopRight => (Edge::Right, Edge::Top),
            Corner::BottomLeft => (Edge::Left, Edge::Bottom),
            Corner::BottomRight => (Edge::Right, Edge::Bottom),
        }
    }
}

/// Either the layout itself or one of its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemRef {
    Layout,
    Item(ItemId),
}

impl From<ItemId> for ItemRef {
    fn from(id: ItemId) -> Self {
        ItemRef::Item(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct AnchorPoint {
    pub item: ItemRef,
    pub edge: Edge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeHint {
    Minimum,
    Preferred,
    Maximum,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn along(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }

    pub(crate) fn set_along(&mut self, orientation: Orientation, value: f64) {
        match orientation {
            Orientation::Horizontal => self.width = value,
            Orientation::Vertical => self.height = value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Start coordinate and extent along `orientation`.
    pub(crate) fn span(&self, orientation: Orientation) -> (f64, f64) {
        match orientation {
            Orientation::Horizontal => (self.x, self.width),
            Orientation::Vertical => (self.y, self.height),
        }
    }

    pub(crate) fn shrunk_by(&self, margins: &Margins) -> Rect {
        Rect {
            x: self.x + margins.left,
            y: self.y + margins.top,
            width: (self.width - margins.left - margins.right).max(0.0),
            height: (self.height - margins.top - margins.bottom).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margins {
    pub const fn uniform(value: f64) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    pub(crate) fn total(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.left + self.right,
            Orientation::Vertical => self.top + self.bottom,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

/// How an item (or a spacing anchor) may deviate from its preferred size along one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizePolicy {
    Fixed,
    Minimum,
    Maximum,
    #[default]
    Preferred,
    Expanding,
    MinimumExpanding,
    Ignored,
}

impl SizePolicy {
    pub fn can_grow(self) -> bool {
        matches!(
            self,
            SizePolicy::Minimum
                | SizePolicy::Preferred
                | SizePolicy::Expanding
                | SizePolicy::MinimumExpanding
                | SizePolicy::Ignored
        )
    }

    pub fn can_shrink(self) -> bool {
        matches!(
            self,
            SizePolicy::Maximum
                | SizePolicy::Preferred
                | SizePolicy::Expanding
                | SizePolicy::Ignored
        )
    }

    pub fn expands(self) -> bool {
        matches!(self, SizePolicy::Expanding | SizePolicy::MinimumExpanding)
    }

    pub fn ignores_hint(self) -> bool {
        matches!(self, SizePolicy::Ignored)
    }
}

/// Widget category used by the spacing style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlType {
    #[default]
    Default,
    ButtonBox,
    CheckBox,
    ComboBox,
    Frame,
    GroupBox,
    Label,
    Line,
    LineEdit,
    PushButton,
    RadioButton,
    Slider,
    SpinBox,
    TabWidget,
    ToolButton,
}
