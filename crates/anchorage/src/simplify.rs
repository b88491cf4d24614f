//! Graph simplification.
//!
//! Three rewrites run to a fixed point: zero-sized anchors fuse their endpoints into one vertex
//! pair, chains through degree-2 vertices become one sequential anchor, and two anchors landing
//! on the same vertex pair become one parallel anchor. Every rewrite is logged so [`restore`]
//! can replay the log backwards once the composites carry solved sizes.

use tracing::{debug, trace, warn};

use crate::anchor::{
    AnchorData, AnchorKind, AxisGraph, Dependency, Solved, Vertex, VertexPair, parallel_nominal,
    push_solved_to_children, sequential_nominal,
};
use crate::arena::{AnchorId, VertexId};
use crate::model::{Edge, ItemRef};
use crate::solve::SolveState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fusion {
    Sequential(AnchorId),
    Parallel(AnchorId),
    Vertices(VertexId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Simplification {
    pub log: Vec<Fusion>,
    /// False once any parallel fusion found two disjoint size ranges.
    pub feasible: bool,
}

impl Default for Simplification {
    fn default() -> Self {
        Self {
            log: Vec::new(),
            feasible: true,
        }
    }
}

pub(crate) fn simplify(axis: &mut AxisGraph) -> Simplification {
    let mut record = Simplification::default();
    loop {
        let mut changed = fuse_zero_sized_anchors(axis, &mut record);
        changed |= fuse_sequences(axis, &mut record);
        if !changed {
            break;
        }
    }
    axis.state = SolveState::Simplified;
    debug!(
        target: "anchorage::simplify",
        orientation = ?axis.orientation,
        fusions = record.log.len(),
        anchors = axis.graph.edge_count(),
        feasible = record.feasible,
        "graph simplified"
    );
    record
}

/// Undoes `record` in reverse, handing every composite's solved sizes to its children.
pub(crate) fn restore(axis: &mut AxisGraph, record: Simplification) {
    for fusion in record.log.into_iter().rev() {
        match fusion {
            Fusion::Parallel(id) => restore_parallel(axis, id),
            Fusion::Sequential(id) => restore_sequence(axis, id),
            Fusion::Vertices(pair) => restore_pair(axis, pair),
        }
    }
    let orientation = axis.orientation;
    if let Some(first) = axis.point(ItemRef::Layout, Edge::first(orientation)) {
        axis.layout.first = first;
    }
    if let Some(last) = axis.point(ItemRef::Layout, Edge::last(orientation)) {
        axis.layout.last = last;
    }
    axis.layout.center = axis.point(ItemRef::Layout, Edge::center(orientation));
}

/// Inserts `id` into the graph, fusing it with an anchor already joining the same vertices.
fn add_maybe_parallel(axis: &mut AxisGraph, id: AnchorId, record: &mut Simplification) {
    let Some(anchor) = axis.anchors.get(id) else {
        return;
    };
    let (from, to) = (anchor.from, anchor.to);
    let Some(existing) = axis.graph.take_edge(from, to) else {
        if axis.graph.create_edge(from, to, id).is_err() {
            debug_assert!(false, "anchor endpoints collapsed");
        }
        return;
    };

    let (Some(first), Some(second)) = (axis.anchors.get(existing), axis.anchors.get(id)) else {
        return;
    };
    let second_forward = second.from == first.from;
    let (nominal, feasible) = parallel_nominal(first, second, second_forward);
    let dependency = [first.dependency, second.dependency]
        .into_iter()
        .find(|d| *d != Dependency::Independent)
        .unwrap_or_default();
    let data = AnchorData {
        from: first.from,
        to: first.to,
        kind: AnchorKind::Parallel {
            first: existing,
            second: id,
            second_forward,
            feasible,
        },
        nominal,
        solved: Solved::all(nominal.pref),
        dependency,
        is_layout_anchor: first.is_layout_anchor || second.is_layout_anchor,
        parent: None,
    };
    let (from, to) = (data.from, data.to);
    let parallel = axis.anchors.insert(data);
    for child in [existing, id] {
        if let Some(child) = axis.anchors.get_mut(child) {
            child.parent = Some(parallel);
        }
    }
    if axis.graph.create_edge(from, to, parallel).is_err() {
        debug_assert!(false, "parallel anchor could not be inserted");
    }
    record.log.push(Fusion::Parallel(parallel));

    if feasible {
        trace!(target: "anchorage::simplify", ?parallel, ?existing, ?id, "parallel fusion");
    } else {
        record.feasible = false;
        warn!(
            target: "anchorage::simplify",
            orientation = ?axis.orientation,
            ?existing,
            ?id,
            "parallel anchors have disjoint size ranges"
        );
    }
}

fn fuse_zero_sized_anchors(axis: &mut AxisGraph, record: &mut Simplification) -> bool {
    let mut changed = false;
    loop {
        let candidate = axis.graph.connections().into_iter().find_map(|(a, b)| {
            let id = axis.anchor_between(a, b)?;
            let anchor = axis.anchors.get(id)?;
            let eligible = anchor.nominal.is_zero_sized()
                && !anchor.is_dependent()
                && !(axis.is_layout_vertex(a) && axis.is_layout_vertex(b));
            eligible.then_some(id)
        });
        let Some(id) = candidate else {
            return changed;
        };
        fuse_vertices(axis, id, record);
        changed = true;
    }
}

fn fuse_vertices(axis: &mut AxisGraph, removed: AnchorId, record: &mut Simplification) {
    let Some(anchor) = axis.anchors.get(removed) else {
        return;
    };
    let (first, second) = (anchor.from, anchor.to);
    axis.graph.remove_edge(first, second);

    let pair = axis.vertices.insert(Vertex::Pair(VertexPair {
        first,
        second,
        removed,
        first_anchors: Vec::new(),
        second_anchors: Vec::new(),
    }));
    record.log.push(Fusion::Vertices(pair));
    trace!(target: "anchorage::simplify", ?first, ?second, ?pair, "vertex fusion");

    for (original, is_first) in [(first, true), (second, false)] {
        for neighbor in axis.graph.adjacent_vertices(original) {
            let Some(id) = axis.graph.take_edge(original, neighbor) else {
                continue;
            };
            if let Some(anchor) = axis.anchors.get_mut(id) {
                anchor.replace_endpoint(original, pair);
            }
            if let Some(Vertex::Pair(p)) = axis.vertices.get_mut(pair) {
                if is_first {
                    p.first_anchors.push(id);
                } else {
                    p.second_anchors.push(id);
                }
            }
            add_maybe_parallel(axis, id, record);
        }
    }

    let layout = &mut axis.layout;
    for rep in [&mut layout.first, &mut layout.last] {
        if *rep == first || *rep == second {
            *rep = pair;
        }
    }
    if layout.center.is_some_and(|c| c == first || c == second) {
        layout.center = Some(pair);
    }
}

/// A vertex a chain may pass through.
fn is_inner(axis: &AxisGraph, v: VertexId) -> bool {
    if axis.graph.degree(v) != 2 || axis.is_layout_vertex(v) {
        return false;
    }
    axis.graph.neighbors(v).all(|w| {
        axis.anchor_between(v, w)
            .and_then(|id| axis.anchors.get(id))
            .is_some_and(|a| !a.is_dependent())
    })
}

fn other_neighbor(axis: &AxisGraph, v: VertexId, prev: VertexId) -> Option<VertexId> {
    axis.graph.neighbors(v).find(|&w| w != prev)
}

/// The maximal chain around the lowest inner vertex that is not part of a pure ring:
/// `(start, inner vertices, end)`.
fn find_chain(axis: &AxisGraph) -> Option<(VertexId, Vec<VertexId>, VertexId)> {
    'seed: for v in axis.graph.vertices() {
        if !is_inner(axis, v) {
            continue;
        }
        let neighbors = axis.graph.adjacent_vertices(v);
        let [a, b] = neighbors.as_slice() else {
            continue;
        };

        let mut ends = [v; 2];
        let mut walks: [Vec<VertexId>; 2] = [Vec::new(), Vec::new()];
        for (side, &start) in [*a, *b].iter().enumerate() {
            let (mut prev, mut cur) = (v, start);
            while is_inner(axis, cur) {
                if cur == v {
                    continue 'seed;
                }
                walks[side].push(cur);
                let Some(next) = other_neighbor(axis, cur, prev) else {
                    continue 'seed;
                };
                (prev, cur) = (cur, next);
            }
            ends[side] = cur;
        }

        let [before, after] = walks;
        let mut inner: Vec<VertexId> = before.into_iter().rev().collect();
        inner.push(v);
        inner.extend(after);
        let (start, mut end) = (ends[0], ends[1]);
        if start == end {
            let Some(last) = inner.pop() else {
                continue;
            };
            end = last;
        }
        if inner.is_empty() {
            continue;
        }
        return Some((start, inner, end));
    }
    None
}

fn fuse_sequences(axis: &mut AxisGraph, record: &mut Simplification) -> bool {
    let mut changed = false;
    while let Some((start, inner, end)) = find_chain(axis) {
        let mut path = Vec::with_capacity(inner.len() + 2);
        path.push(start);
        path.extend(inner.iter().copied());
        path.push(end);

        let mut edges = Vec::with_capacity(path.len() - 1);
        let mut forward = Vec::with_capacity(path.len() - 1);
        for step in path.windows(2) {
            let (a, b) = (step[0], step[1]);
            let Some(id) = axis.graph.take_edge(a, b) else {
                continue;
            };
            forward.push(axis.anchors.get(id).is_some_and(|anchor| anchor.from == a));
            edges.push(id);
        }

        let nominal = sequential_nominal(&axis.anchors, &edges, &forward);
        let is_layout_anchor = edges
            .iter()
            .any(|&id| axis.anchors.get(id).is_some_and(|a| a.is_layout_anchor));
        trace!(
            target: "anchorage::simplify",
            ?start,
            ?end,
            len = edges.len(),
            "sequential fusion"
        );
        let sequence = axis.anchors.insert(AnchorData {
            from: start,
            to: end,
            kind: AnchorKind::Sequential {
                vertices: inner,
                edges: edges.clone(),
                forward,
            },
            nominal,
            solved: Solved::all(nominal.pref),
            dependency: Dependency::Independent,
            is_layout_anchor,
            parent: None,
        });
        for id in edges {
            if let Some(child) = axis.anchors.get_mut(id) {
                child.parent = Some(sequence);
            }
        }
        record.log.push(Fusion::Sequential(sequence));
        add_maybe_parallel(axis, sequence, record);
        changed = true;
    }
    changed
}

fn detach(axis: &mut AxisGraph, id: AnchorId) {
    let Some(anchor) = axis.anchors.get(id) else {
        return;
    };
    let (from, to) = (anchor.from, anchor.to);
    if axis.anchor_between(from, to) == Some(id) {
        axis.graph.remove_edge(from, to);
    }
}

fn attach(axis: &mut AxisGraph, id: AnchorId) {
    let Some(anchor) = axis.anchors.get_mut(id) else {
        return;
    };
    anchor.parent = None;
    let (from, to) = (anchor.from, anchor.to);
    if axis.graph.create_edge(from, to, id).is_err() {
        debug_assert!(false, "restored anchor collides with another anchor");
    }
}

fn restore_parallel(axis: &mut AxisGraph, id: AnchorId) {
    push_solved_to_children(&mut axis.anchors, id);
    detach(axis, id);
    let Some(AnchorData {
        kind: AnchorKind::Parallel { first, second, .. },
        ..
    }) = axis.anchors.remove(id)
    else {
        return;
    };
    attach(axis, first);
    // `second` goes back by replaying the fusion that produced it.
    if let Some(child) = axis.anchors.get_mut(second) {
        child.parent = None;
    }
}

fn restore_sequence(axis: &mut AxisGraph, id: AnchorId) {
    push_solved_to_children(&mut axis.anchors, id);
    detach(axis, id);
    let Some(AnchorData {
        from,
        to,
        kind: AnchorKind::Sequential {
            vertices, edges, ..
        },
        ..
    }) = axis.anchors.remove(id)
    else {
        return;
    };
    let mut path = Vec::with_capacity(vertices.len() + 2);
    path.push(from);
    path.extend(vertices);
    path.push(to);
    for (step, edge) in path.windows(2).zip(edges) {
        debug_assert!(
            axis.anchors
                .get(edge)
                .and_then(|a| a.other_end(step[0]))
                .is_some_and(|w| w == step[1])
        );
        attach(axis, edge);
    }
}

fn restore_pair(axis: &mut AxisGraph, pair: VertexId) {
    let Some(Vertex::Pair(fused)) = axis.vertices.remove(pair) else {
        return;
    };
    for (original, redirected) in [
        (fused.first, fused.first_anchors),
        (fused.second, fused.second_anchors),
    ] {
        for id in redirected {
            detach(axis, id);
            let Some(anchor) = axis.anchors.get_mut(id) else {
                continue;
            };
            anchor.replace_endpoint(pair, original);
            attach(axis, id);
        }
    }
    if let Some(removed) = axis.anchors.get_mut(fused.removed) {
        removed.solved = Solved::all(0.0);
    }
    attach(axis, fused.removed);
}
