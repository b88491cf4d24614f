//! Signed paths from the layout's first vertex, and the linear constraints they imply.
//!
//! Two paths reaching the same vertex must have the same signed length. Each anchor is walked
//! exactly once, so every anchor that closes a cycle contributes exactly one equality.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::anchor::{AnchorKind, AxisGraph};
use crate::arena::{AnchorId, VertexId};
use crate::simplex::{Constraint, Ratio};

pub(crate) type PathMap = IndexMap<VertexId, Vec<GraphPath>, FxBuildHasher>;

/// Anchors walked along their direction and against it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct GraphPath {
    pub positives: BTreeSet<AnchorId>,
    pub negatives: BTreeSet<AnchorId>,
}

impl GraphPath {
    fn extended(&self, anchor: AnchorId, forward: bool) -> Self {
        let mut path = self.clone();
        if forward {
            path.positives.insert(anchor);
        } else {
            path.negatives.insert(anchor);
        }
        path
    }

    /// `self - other = 0`.
    pub fn constraint(&self, other: &GraphPath) -> Constraint<AnchorId> {
        let mut c = Constraint::new(Ratio::Equal, 0.0);
        for &id in &self.positives {
            c.add(id, 1.0);
        }
        for &id in &self.negatives {
            c.add(id, -1.0);
        }
        for &id in &other.positives {
            c.add(id, -1.0);
        }
        for &id in &other.negatives {
            c.add(id, 1.0);
        }
        c
    }

    /// Signed terms of the path's length.
    pub fn terms(&self) -> impl Iterator<Item = (AnchorId, f64)> + '_ {
        self.positives
            .iter()
            .map(|&id| (id, 1.0))
            .chain(self.negatives.iter().map(|&id| (id, -1.0)))
    }

    pub fn anchors(&self) -> impl Iterator<Item = AnchorId> + '_ {
        self.positives.iter().chain(&self.negatives).copied()
    }
}

/// Walks the graph depth first from the layout's first vertex, then from the lowest vertex of
/// every component the layout does not reach. Neighbours are visited in ascending order.
pub(crate) fn find_paths(axis: &AxisGraph) -> PathMap {
    let mut paths = PathMap::default();
    let mut visited: BTreeSet<AnchorId> = BTreeSet::new();
    let roots = std::iter::once(axis.layout.first).chain(axis.graph.vertices());

    for root in roots {
        if paths.contains_key(&root) {
            continue;
        }
        paths.insert(root, vec![GraphPath::default()]);
        let mut stack: Vec<(VertexId, VertexId)> = axis
            .graph
            .adjacent_vertices(root)
            .into_iter()
            .rev()
            .map(|w| (root, w))
            .collect();

        while let Some((v, w)) = stack.pop() {
            let Some(id) = axis.anchor_between(v, w) else {
                continue;
            };
            if !visited.insert(id) {
                continue;
            }
            let forward = axis.anchors.get(id).is_some_and(|a| a.from == v);
            let base = paths
                .get(&v)
                .and_then(|list| list.last())
                .cloned()
                .unwrap_or_default();
            paths.entry(w).or_default().push(base.extended(id, forward));
            stack.extend(
                axis.graph
                    .adjacent_vertices(w)
                    .into_iter()
                    .rev()
                    .map(|x| (w, x)),
            );
        }
    }
    paths
}

/// One equality per extra path to a vertex, against that vertex's first path.
pub(crate) fn path_constraints(paths: &PathMap) -> Vec<Constraint<AnchorId>> {
    let mut out = Vec::new();
    for list in paths.values() {
        let Some((reference, rest)) = list.split_first() else {
            continue;
        };
        for path in rest {
            let c = path.constraint(reference);
            if !c.variables.is_empty() {
                out.push(c);
            }
        }
    }
    out
}

/// The top-level anchor currently standing for `id`, and the sign relating the two lengths.
fn top_level(axis: &AxisGraph, mut id: AnchorId) -> (AnchorId, f64) {
    let mut sign = 1.0;
    while let Some(parent) = axis.anchors.get(id).and_then(|a| a.parent) {
        let Some(data) = axis.anchors.get(parent) else {
            break;
        };
        match data.kind {
            AnchorKind::Parallel {
                second,
                second_forward,
                ..
            } => {
                if second == id && !second_forward {
                    sign = -sign;
                }
            }
            _ => break,
        }
        id = parent;
    }
    (id, sign)
}

/// `master - slave = 0` for every split center, expressed over the simplified graph.
pub(crate) fn center_constraints(axis: &AxisGraph) -> Vec<Constraint<AnchorId>> {
    axis.centers
        .iter()
        .filter_map(|center| {
            let (master, master_sign) = top_level(axis, center.master);
            let (slave, slave_sign) = top_level(axis, center.slave);
            let mut c = Constraint::new(Ratio::Equal, 0.0);
            c.add(master, master_sign);
            c.add(slave, -slave_sign);
            (!c.variables.is_empty()).then_some(c)
        })
        .collect()
}

/// Splits constraints into those connected to `seeds` through shared variables (the trunk)
/// and the rest.
pub(crate) fn partition(
    constraints: Vec<Constraint<AnchorId>>,
    seeds: impl IntoIterator<Item = AnchorId>,
) -> (Vec<Constraint<AnchorId>>, Vec<Constraint<AnchorId>>) {
    let mut trunk_vars: BTreeSet<AnchorId> = seeds.into_iter().collect();
    let mut trunk = Vec::new();
    let mut rest = constraints;
    loop {
        let (joined, remaining): (Vec<_>, Vec<_>) = rest
            .into_iter()
            .partition(|c| c.variables.keys().any(|v| trunk_vars.contains(v)));
        rest = remaining;
        if joined.is_empty() {
            break;
        }
        for c in &joined {
            trunk_vars.extend(c.variables.keys().copied());
        }
        trunk.extend(joined);
    }
    (trunk, rest)
}
