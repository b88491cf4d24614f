//! Graph container APIs used by `anchorage`.
//!
//! The graph is undirected for storage and lookup: a connection between `a` and `b` holds a single
//! payload reachable from both endpoints. Direction, when it matters, is a property of the payload.

mod error;
pub mod graph;

pub use error::{Error, Result};
pub use graph::{EdgeKey, Graph, alg};
