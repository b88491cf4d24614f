//! Anchor-based layout engine.
//!
//! Items are placed by anchoring their edges to each other and to the layout's own edges. Each
//! orientation is solved independently: the anchor graph is simplified, its path constraints
//! are handed to a simplex solver to find the layout's minimum, preferred and maximum extents,
//! and item rectangles are then interpolated for whatever size the layout is given.

pub use anchorage_graphlib as graphlib;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod anchor;
mod arena;
mod error;
mod geometry;
mod item;
mod layout;
mod model;
mod options;
mod paths;
pub mod simplex;
mod simplify;
mod solve;
mod style;

pub use arena::ItemId;
pub use error::{Error, Result};
pub use item::{LayoutItem, SizedItem};
pub use layout::{AnchorHandle, AnchorLayout};
pub use model::{
    ControlType, Corner, Edge, ItemRef, LayoutDirection, MAX_SIZE, Margins, Orientation, Rect,
    Size, SizeHint, SizePolicy,
};
pub use options::LayoutOptions;
pub use style::{Style, UniformStyle};
