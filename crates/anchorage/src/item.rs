//! The item collaborator: anything that reports size hints and accepts a rectangle.

use crate::model::{ControlType, Orientation, Rect, Size, SizeHint, SizePolicy};

/// An item placed by an [`AnchorLayout`](crate::AnchorLayout).
pub trait LayoutItem {
    /// Size hint along one axis. Negative or non-finite answers are treated as zero.
    fn size_hint(&self, which: SizeHint, orientation: Orientation) -> f64;

    fn size_policy(&self, orientation: Orientation) -> SizePolicy;

    fn control_type(&self) -> ControlType {
        ControlType::Default
    }

    fn set_geometry(&mut self, rect: Rect);
}

/// A plain item with fixed hints that records the geometry it was given.
#[derive(Debug, Clone, PartialEq)]
pub struct SizedItem {
    pub minimum: Size,
    pub preferred: Size,
    pub maximum: Size,
    pub horizontal_policy: SizePolicy,
    pub vertical_policy: SizePolicy,
    pub control_type: ControlType,
    pub geometry: Rect,
}

impl SizedItem {
    pub fn new(minimum: Size, preferred: Size, maximum: Size) -> Self {
        Self {
            minimum,
            preferred,
            maximum,
            horizontal_policy: SizePolicy::Preferred,
            vertical_policy: SizePolicy::Preferred,
            control_type: ControlType::Default,
            geometry: Rect::default(),
        }
    }

    pub fn fixed(size: Size) -> Self {
        Self::new(size, size, size).with_policy(SizePolicy::Fixed, SizePolicy::Fixed)
    }

    pub fn with_policy(mut self, horizontal: SizePolicy, vertical: SizePolicy) -> Self {
        self.horizontal_policy = horizontal;
        self.vertical_policy = vertical;
        self
    }

    pub fn with_control_type(mut self, control_type: ControlType) -> Self {
        self.control_type = control_type;
        self
    }
}

impl LayoutItem for SizedItem {
    fn size_hint(&self, which: SizeHint, orientation: Orientation) -> f64 {
        match which {
            SizeHint::Minimum => self.minimum.along(orientation),
            SizeHint::Preferred => self.preferred.along(orientation),
            SizeHint::Maximum => self.maximum.along(orientation),
        }
    }

    fn size_policy(&self, orientation: Orientation) -> SizePolicy {
        match orientation {
            Orientation::Horizontal => self.horizontal_policy,
            Orientation::Vertical => self.vertical_policy,
        }
    }

    fn control_type(&self) -> ControlType {
        self.control_type
    }

    fn set_geometry(&mut self, rect: Rect) {
        self.geometry = rect;
    }
}
