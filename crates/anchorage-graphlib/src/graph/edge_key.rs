//! Edge key types.
//!
//! Connections are unordered, so a key always stores the smaller vertex first.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey<V> {
    pub v: V,
    pub w: V,
}

impl<V: Ord> EdgeKey<V> {
    pub fn new(a: V, b: V) -> Self {
        if b < a {
            Self { v: b, w: a }
        } else {
            Self { v: a, w: b }
        }
    }

    pub fn contains(&self, x: &V) -> bool {
        &self.v == x || &self.w == x
    }
}

impl<V: Copy + Ord> EdgeKey<V> {
    /// The endpoint opposite to `x`. Returns `None` when `x` is not an endpoint.
    pub fn other(&self, x: V) -> Option<V> {
        if self.v == x {
            Some(self.w)
        } else if self.w == x {
            Some(self.v)
        } else {
            None
        }
    }
}
