//! Graph container APIs used by `anchorage`.
//!
//! This module contains the core `Graph` container plus a small set of traversal helpers
//! re-exported as `anchorage_graphlib::alg`.

use rustc_hash::FxBuildHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hash;

use crate::{Error, Result};

pub mod alg;
mod edge_key;

pub use edge_key::EdgeKey;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// Undirected graph over copyable vertex handles.
///
/// Vertices exist only while they have at least one incident edge. Each unordered pair of
/// vertices carries at most one payload.
#[derive(Debug, Clone)]
pub struct Graph<V, E> {
    adjacency: BTreeMap<V, BTreeSet<V>>,
    edges: HashMap<EdgeKey<V>, E>,
}

impl<V, E> Default for Graph<V, E>
where
    V: Copy + Ord + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Graph<V, E>
where
    V: Copy + Ord + Hash,
{
    pub fn new() -> Self {
        Self {
            adjacency: BTreeMap::new(),
            edges: HashMap::default(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains_vertex(&self, v: V) -> bool {
        self.adjacency.contains_key(&v)
    }

    pub fn has_edge(&self, v1: V, v2: V) -> bool {
        self.edges.contains_key(&EdgeKey::new(v1, v2))
    }

    /// Connects `v1` and `v2`. The pair must not be connected already and must be distinct;
    /// violating either leaves the graph untouched.
    pub fn create_edge(&mut self, v1: V, v2: V, data: E) -> Result<()> {
        if v1 == v2 {
            return Err(Error::SelfLoop);
        }
        let key = EdgeKey::new(v1, v2);
        if self.edges.contains_key(&key) {
            return Err(Error::DuplicateEdge);
        }
        self.edges.insert(key, data);
        self.adjacency.entry(v1).or_default().insert(v2);
        self.adjacency.entry(v2).or_default().insert(v1);
        Ok(())
    }

    pub fn edge_data(&self, v1: V, v2: V) -> Option<&E> {
        self.edges.get(&EdgeKey::new(v1, v2))
    }

    pub fn edge_data_mut(&mut self, v1: V, v2: V) -> Option<&mut E> {
        self.edges.get_mut(&EdgeKey::new(v1, v2))
    }

    /// Removes the connection and hands its payload back to the caller.
    pub fn take_edge(&mut self, v1: V, v2: V) -> Option<E> {
        let data = self.edges.remove(&EdgeKey::new(v1, v2))?;
        self.unlink(v1, v2);
        self.unlink(v2, v1);
        Some(data)
    }

    /// Removes the connection, returning whether one existed.
    pub fn remove_edge(&mut self, v1: V, v2: V) -> bool {
        self.take_edge(v1, v2).is_some()
    }

    fn unlink(&mut self, from: V, to: V) {
        let Some(set) = self.adjacency.get_mut(&from) else {
            return;
        };
        set.remove(&to);
        if set.is_empty() {
            self.adjacency.remove(&from);
        }
    }

    /// Neighbors of `v` in ascending order. Empty for unknown vertices.
    pub fn adjacent_vertices(&self, v: V) -> Vec<V> {
        self.neighbors(v).collect()
    }

    pub fn neighbors(&self, v: V) -> impl Iterator<Item = V> + '_ {
        self.adjacency
            .get(&v)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn degree(&self, v: V) -> usize {
        self.adjacency.get(&v).map_or(0, BTreeSet::len)
    }

    /// Every vertex with at least one incident edge, ascending.
    pub fn vertices(&self) -> impl Iterator<Item = V> + '_ {
        self.adjacency.keys().copied()
    }

    /// Every connected pair exactly once as `(smaller, larger)`, ascending.
    pub fn connections(&self) -> Vec<(V, V)> {
        let mut out = Vec::with_capacity(self.edges.len());
        for (&v, set) in &self.adjacency {
            for &w in set.range(v..) {
                if w != v {
                    out.push((v, w));
                }
            }
        }
        out
    }

    /// Edge payloads in the same order as [`Graph::connections`].
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey<V>, &E)> + '_ {
        self.connections().into_iter().filter_map(move |(v, w)| {
            let key = EdgeKey::new(v, w);
            self.edges.get(&key).map(|e| (key, e))
        })
    }

    pub fn clear(&mut self) {
        self.adjacency.clear();
        self.edges.clear();
    }
}
