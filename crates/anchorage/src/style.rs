//! Default spacing between items, and the per-layout cache in front of it.

use rustc_hash::FxBuildHasher;
use std::cell::RefCell;
use std::fmt;

use crate::model::{ControlType, Orientation};

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// Supplies the spacing used by anchors created without an explicit value.
pub trait Style {
    /// Spacing between two controls laid out one after the other. Negative means "none".
    fn spacing(&self, first: ControlType, second: ControlType, orientation: Orientation) -> f64;
}

/// The same spacing between any two controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformStyle {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Default for UniformStyle {
    fn default() -> Self {
        Self {
            horizontal: 6.0,
            vertical: 6.0,
        }
    }
}

impl Style for UniformStyle {
    fn spacing(&self, _first: ControlType, _second: ControlType, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.horizontal,
            Orientation::Vertical => self.vertical,
        }
    }
}

/// Memoizes style lookups until [`StyleCache::invalidate`] is called.
pub(crate) struct StyleCache {
    style: Box<dyn Style>,
    cache: RefCell<HashMap<(ControlType, ControlType, Orientation), f64>>,
}

impl fmt::Debug for StyleCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleCache")
            .field("cached", &self.cache.borrow().len())
            .finish_non_exhaustive()
    }
}

impl StyleCache {
    pub fn new(style: Box<dyn Style>) -> Self {
        Self {
            style,
            cache: RefCell::new(HashMap::default()),
        }
    }

    pub fn set_style(&mut self, style: Box<dyn Style>) {
        self.style = style;
        self.invalidate();
    }

    pub fn invalidate(&mut self) {
        self.cache.get_mut().clear();
    }

    /// Never negative.
    pub fn spacing(
        &self,
        first: ControlType,
        second: ControlType,
        orientation: Orientation,
    ) -> f64 {
        let key = (first, second, orientation);
        if let Some(&s) = self.cache.borrow().get(&key) {
            return s;
        }
        let s = self.style.spacing(first, second, orientation);
        let s = if s.is_finite() { s.max(0.0) } else { 0.0 };
        self.cache.borrow_mut().insert(key, s);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counting {
        calls: Rc<Cell<usize>>,
        value: f64,
    }

    impl Style for Counting {
        fn spacing(&self, _: ControlType, _: ControlType, _: Orientation) -> f64 {
            self.calls.set(self.calls.get() + 1);
            self.value
        }
    }

    #[test]
    fn lookups_are_cached_until_invalidated() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = StyleCache::new(Box::new(Counting {
            calls: calls.clone(),
            value: 4.0,
        }));
        let h = Orientation::Horizontal;

        assert_eq!(cache.spacing(ControlType::Label, ControlType::LineEdit, h), 4.0);
        assert_eq!(cache.spacing(ControlType::Label, ControlType::LineEdit, h), 4.0);
        assert_eq!(calls.get(), 1);

        cache.invalidate();
        cache.spacing(ControlType::Label, ControlType::LineEdit, h);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn negative_style_spacing_becomes_zero() {
        let cache = StyleCache::new(Box::new(UniformStyle {
            horizontal: -1.0,
            vertical: 3.0,
        }));
        assert_eq!(
            cache.spacing(ControlType::Default, ControlType::Default, Orientation::Horizontal),
            0.0
        );
        assert_eq!(
            cache.spacing(ControlType::Default, ControlType::Default, Orientation::Vertical),
            3.0
        );
    }
}
