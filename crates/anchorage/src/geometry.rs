//! Interpolation between solved key sizes, and vertex positions for a concrete layout extent.

use std::collections::{BTreeMap, VecDeque};

use tracing::trace;

use crate::anchor::{AxisGraph, Vertex};
use crate::arena::VertexId;
use crate::model::{Edge, ItemRef};

/// Which pair of neighbouring key sizes a value falls between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interval {
    MinimumToMinPreferred,
    MinPreferredToPreferred,
    PreferredToMaxPreferred,
    MaxPreferredToMaximum,
}

/// Position of a value relative to five key sizes: the interval plus how far into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Factor {
    pub interval: Interval,
    pub progress: f64,
}

impl Factor {
    pub fn of(value: f64, min: f64, min_pref: f64, pref: f64, max_pref: f64, max: f64) -> Self {
        let (interval, lower, upper) = if value < min_pref {
            (Interval::MinimumToMinPreferred, min, min_pref)
        } else if value < pref {
            (Interval::MinPreferredToPreferred, min_pref, pref)
        } else if value < max_pref {
            (Interval::PreferredToMaxPreferred, pref, max_pref)
        } else {
            (Interval::MaxPreferredToMaximum, max_pref, max)
        };
        let progress = if upper == lower {
            0.0
        } else {
            (value - lower) / (upper - lower)
        };
        Self { interval, progress }
    }
}

pub(crate) fn interpolate(
    factor: Factor,
    min: f64,
    min_pref: f64,
    pref: f64,
    max_pref: f64,
    max: f64,
) -> f64 {
    let (lower, upper) = match factor.interval {
        Interval::MinimumToMinPreferred => (min, min_pref),
        Interval::MinPreferredToPreferred => (min_pref, pref),
        Interval::PreferredToMaxPreferred => (pref, max_pref),
        Interval::MaxPreferredToMaximum => (max_pref, max),
    };
    lower + factor.progress * (upper - lower)
}

/// Distance of every reachable vertex from the layout's first edge, for a layout extent of
/// `current` along the axis.
///
/// Components not connected to the layout are laid out on their own, shifted so their
/// closest vertex sits at distance zero.
pub(crate) fn vertex_distances(axis: &AxisGraph, current: f64) -> BTreeMap<VertexId, f64> {
    let keys = axis.key_sizes;
    let mut factor = Factor::of(
        current,
        keys.minimum,
        keys.preferred,
        keys.preferred,
        keys.preferred,
        keys.maximum,
    );
    factor.progress = factor.progress.clamp(0.0, 1.0);
    trace!(
        target: "anchorage::geometry",
        orientation = ?axis.orientation,
        current,
        ?factor,
        "interpolating anchors"
    );

    let mut distances = BTreeMap::new();
    spread_from(axis, axis.layout.first, factor, &mut distances);

    for (v, vertex) in axis.vertices.iter() {
        if distances.contains_key(&v) || axis.graph.degree(v) == 0 {
            continue;
        }
        if !matches!(vertex, Vertex::Point(_)) {
            continue;
        }
        let mut component = BTreeMap::new();
        spread_from(axis, v, factor, &mut component);
        let offset = component.values().copied().fold(f64::INFINITY, f64::min);
        for (w, d) in component {
            distances.insert(w, d - offset);
        }
    }
    distances
}

fn spread_from(
    axis: &AxisGraph,
    root: VertexId,
    factor: Factor,
    distances: &mut BTreeMap<VertexId, f64>,
) {
    distances.insert(root, 0.0);
    let mut queue = VecDeque::from([root]);
    while let Some(v) = queue.pop_front() {
        let base = distances.get(&v).copied().unwrap_or_default();
        for w in axis.graph.neighbors(v) {
            if distances.contains_key(&w) {
                continue;
            }
            let Some(anchor) = axis
                .anchor_between(v, w)
                .and_then(|id| axis.anchors.get(id))
            else {
                continue;
            };
            let s = anchor.solved;
            let length = interpolate(
                factor,
                s.at_minimum,
                s.at_preferred,
                s.at_preferred,
                s.at_preferred,
                s.at_maximum,
            );
            let distance = if anchor.from == v {
                base + length
            } else {
                base - length
            };
            distances.insert(w, distance);
            queue.push_back(w);
        }
    }
}

/// Start and end distance of an item along the axis.
pub(crate) fn item_span(
    axis: &AxisGraph,
    distances: &BTreeMap<VertexId, f64>,
    item: ItemRef,
) -> Option<(f64, f64)> {
    let first = axis.point(item, Edge::first(axis.orientation))?;
    let last = axis.point(item, Edge::last(axis.orientation))?;
    Some((*distances.get(&first)?, *distances.get(&last)?))
}
