//! Anchor model: vertices (anchorage points), anchors and the per-orientation graph joining them.
//!
//! Every anchor lives in an arena and the graph stores only its id, so composite anchors built
//! during simplification can own their children by id and hand them back on restore.

use std::collections::{BTreeMap, BTreeSet};

use anchorage_graphlib::Graph;

use crate::arena::{AnchorId, Arena, ItemId, VertexId};
use crate::geometry::{Factor, interpolate};
use crate::model::{AnchorPoint, ControlType, Edge, ItemRef, MAX_SIZE, Orientation, SizePolicy};
use crate::solve::{KeySizes, SolveState};

/// Role of an anchor in a center split. Master and slave halves must stay equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Dependency {
    #[default]
    Independent,
    Master,
    Slave,
}

/// The five nominal sizes of an anchor.
///
/// `min <= min_pref <= pref <= max_pref <= max` for anchors built from items and spacings.
/// Composites may carry negative values when a child runs backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Nominal {
    pub min: f64,
    pub min_pref: f64,
    pub pref: f64,
    pub max_pref: f64,
    pub max: f64,
}

impl Nominal {
    pub fn fixed(value: f64) -> Self {
        Self {
            min: value,
            min_pref: value,
            pref: value,
            max_pref: value,
            max: value,
        }
    }

    /// Applies a size policy to raw hints: shrinking exposes the minimum hint, growing the
    /// maximum hint, ignoring makes the minimum preferred, expanding widens the preferred range
    /// up to the maximum.
    pub fn from_policy(policy: SizePolicy, min_hint: f64, pref_hint: f64, max_hint: f64) -> Self {
        let min = if policy.can_shrink() {
            min_hint
        } else {
            pref_hint
        };
        let max = if policy.can_grow() {
            max_hint
        } else {
            pref_hint
        };
        let pref = if policy.ignores_hint() {
            min
        } else {
            pref_hint
        };
        Self {
            min,
            min_pref: pref,
            pref,
            max_pref: if policy.expands() { max } else { pref },
            max,
        }
    }

    pub fn halved(self) -> Self {
        Self {
            min: self.min / 2.0,
            min_pref: self.min_pref / 2.0,
            pref: self.pref / 2.0,
            max_pref: self.max_pref / 2.0,
            max: self.max / 2.0,
        }
    }

    /// Sizes of the same anchor traversed backwards.
    pub fn reversed(self) -> Self {
        Self {
            min: -self.max,
            min_pref: -self.max_pref,
            pref: -self.pref,
            max_pref: -self.min_pref,
            max: -self.min,
        }
    }

    fn accumulate(&mut self, other: Nominal) {
        self.min += other.min;
        self.min_pref += other.min_pref;
        self.pref += other.pref;
        self.max_pref += other.max_pref;
        self.max += other.max;
    }

    pub fn is_zero_sized(&self) -> bool {
        self.min == 0.0 && self.max == 0.0
    }
}

/// Anchor length at each key size of the layout.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Solved {
    pub at_minimum: f64,
    pub at_preferred: f64,
    pub at_maximum: f64,
}

impl Solved {
    pub fn all(value: f64) -> Self {
        Self {
            at_minimum: value,
            at_preferred: value,
            at_maximum: value,
        }
    }

    pub fn negated(self) -> Self {
        Self {
            at_minimum: -self.at_minimum,
            at_preferred: -self.at_preferred,
            at_maximum: -self.at_maximum,
        }
    }
}

/// Caller-controlled sizing of a spacing anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Spacing {
    /// Explicit spacing (always non-negative); `None` asks the style.
    pub value: Option<f64>,
    pub policy: SizePolicy,
    /// Set when a negative spacing flipped the anchor's direction.
    pub reversed: bool,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            value: None,
            policy: SizePolicy::Fixed,
            reversed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AnchorSource {
    /// An item's own extent; `half` for either side of a center split.
    Item { item: ItemRef, half: bool },
    Spacing(Spacing),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AnchorKind {
    Normal(AnchorSource),
    /// A chain `from -> vertices... -> to`; `forward[i]` tells whether `edges[i]` points along it.
    Sequential {
        vertices: Vec<VertexId>,
        edges: Vec<AnchorId>,
        forward: Vec<bool>,
    },
    Parallel {
        first: AnchorId,
        second: AnchorId,
        second_forward: bool,
        feasible: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AnchorData {
    pub from: VertexId,
    pub to: VertexId,
    pub kind: AnchorKind,
    pub nominal: Nominal,
    pub solved: Solved,
    pub dependency: Dependency,
    /// One of the layout's own structural anchors (or a composite containing one).
    pub is_layout_anchor: bool,
    /// The composite currently holding this anchor, while simplified.
    pub parent: Option<AnchorId>,
}

impl AnchorData {
    pub fn normal(from: VertexId, to: VertexId, source: AnchorSource) -> Self {
        let is_layout_anchor = matches!(
            source,
            AnchorSource::Item {
                item: ItemRef::Layout,
                ..
            }
        );
        Self {
            from,
            to,
            kind: AnchorKind::Normal(source),
            nominal: Nominal::default(),
            solved: Solved::default(),
            dependency: Dependency::Independent,
            is_layout_anchor,
            parent: None,
        }
    }

    pub fn source(&self) -> Option<&AnchorSource> {
        match &self.kind {
            AnchorKind::Normal(source) => Some(source),
            _ => None,
        }
    }

    pub fn spacing(&self) -> Option<&Spacing> {
        match &self.kind {
            AnchorKind::Normal(AnchorSource::Spacing(s)) => Some(s),
            _ => None,
        }
    }

    pub fn spacing_mut(&mut self) -> Option<&mut Spacing> {
        match &mut self.kind {
            AnchorKind::Normal(AnchorSource::Spacing(s)) => Some(s),
            _ => None,
        }
    }

    /// True for an item's (or the layout's) own extent anchors.
    pub fn is_internal_of(&self, item: ItemRef) -> bool {
        matches!(self.source(), Some(AnchorSource::Item { item: owner, .. }) if *owner == item)
    }

    pub fn is_dependent(&self) -> bool {
        self.dependency != Dependency::Independent
    }

    /// The layout's own extent (or half of it), as opposed to a composite containing it.
    pub fn is_structural(&self) -> bool {
        self.is_layout_anchor && matches!(self.kind, AnchorKind::Normal(_))
    }

    pub fn other_end(&self, v: VertexId) -> Option<VertexId> {
        if self.from == v {
            Some(self.to)
        } else if self.to == v {
            Some(self.from)
        } else {
            None
        }
    }

    pub fn replace_endpoint(&mut self, old: VertexId, new: VertexId) {
        if self.from == old {
            self.from = new;
        } else if self.to == old {
            self.to = new;
        }
    }
}

/// Nominal sizes of a chain: forward children add, backward children subtract.
pub(crate) fn sequential_nominal(
    anchors: &Arena<AnchorId, AnchorData>,
    edges: &[AnchorId],
    forward: &[bool],
) -> Nominal {
    let mut total = Nominal::default();
    for (&edge, &fwd) in edges.iter().zip(forward) {
        let Some(child) = anchors.get(edge) else {
            continue;
        };
        if fwd {
            total.accumulate(child.nominal);
        } else {
            total.accumulate(child.nominal.reversed());
        }
    }
    total
}

/// Nominal sizes of two anchors sharing both endpoints, plus whether their ranges intersect.
///
/// Disjoint ranges collapse to `min = max` at the larger minimum.
pub(crate) fn parallel_nominal(
    first: &AnchorData,
    second: &AnchorData,
    second_forward: bool,
) -> (Nominal, bool) {
    let a = first.nominal;
    let b = if second_forward {
        second.nominal
    } else {
        second.nominal.reversed()
    };

    let min = a.min.max(b.min);
    let max = a.max.min(b.max);
    if min > max {
        return (Nominal::fixed(min), false);
    }

    let nominal = if first.is_layout_anchor {
        Nominal {
            min,
            min_pref: b.min_pref.clamp(min, max),
            pref: b.pref.clamp(min, max),
            max_pref: b.max_pref.clamp(min, max),
            max,
        }
    } else if second.is_layout_anchor {
        Nominal {
            min,
            min_pref: a.min_pref.clamp(min, max),
            pref: a.pref.clamp(min, max),
            max_pref: a.max_pref.clamp(min, max),
            max,
        }
    } else {
        // Prefer the intersection of the two preferred regions; when they are disjoint, the
        // gap between them is where the total deviation is smallest.
        let lower = a.min_pref.max(b.min_pref).clamp(min, max);
        let upper = a.max_pref.min(b.max_pref).clamp(min, max);
        let mean = ((a.pref + b.pref) / 2.0).clamp(min, max);
        let (lower, upper) = if lower <= upper {
            (lower, upper)
        } else {
            (upper, lower)
        };
        Nominal {
            min,
            min_pref: lower,
            pref: mean.clamp(lower, upper),
            max_pref: upper,
            max,
        }
    };
    (nominal, true)
}

/// Hands a composite's solved sizes to its direct children.
pub(crate) fn push_solved_to_children(anchors: &mut Arena<AnchorId, AnchorData>, id: AnchorId) {
    let Some(anchor) = anchors.get(id) else {
        return;
    };
    let (n, s) = (anchor.nominal, anchor.solved);
    match anchor.kind.clone() {
        AnchorKind::Normal(_) => {}
        AnchorKind::Sequential { edges, forward, .. } => {
            let factor =
                |value: f64| Factor::of(value, n.min, n.min_pref, n.pref, n.max_pref, n.max);
            let (fmin, fpref, fmax) = (
                factor(s.at_minimum),
                factor(s.at_preferred),
                factor(s.at_maximum),
            );
            for (edge, fwd) in edges.into_iter().zip(forward) {
                let Some(child) = anchors.get_mut(edge) else {
                    continue;
                };
                let c = child.nominal;
                let at = |f: Factor| {
                    if fwd {
                        interpolate(f, c.min, c.min_pref, c.pref, c.max_pref, c.max)
                    } else {
                        interpolate(f, c.max, c.max_pref, c.pref, c.min_pref, c.min)
                    }
                };
                child.solved = Solved {
                    at_minimum: at(fmin),
                    at_preferred: at(fpref),
                    at_maximum: at(fmax),
                };
            }
        }
        AnchorKind::Parallel {
            first,
            second,
            second_forward,
            ..
        } => {
            if let Some(child) = anchors.get_mut(first) {
                child.solved = s;
            }
            if let Some(child) = anchors.get_mut(second) {
                child.solved = if second_forward { s } else { s.negated() };
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VertexPair {
    pub first: VertexId,
    pub second: VertexId,
    /// The zero-sized anchor whose endpoints were fused.
    pub removed: AnchorId,
    pub first_anchors: Vec<AnchorId>,
    pub second_anchors: Vec<AnchorId>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Vertex {
    Point(AnchorPoint),
    Pair(VertexPair),
}

/// `master == slave`, recorded when a center splits an item's extent anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CenterConstraint {
    pub item: ItemRef,
    pub master: AnchorId,
    pub slave: AnchorId,
}

/// Layout vertices as currently represented in the (possibly simplified) graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LayoutVertices {
    pub first: VertexId,
    pub center: Option<VertexId>,
    pub last: VertexId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ItemHints {
    pub policy: SizePolicy,
    pub minimum: f64,
    pub preferred: f64,
    pub maximum: f64,
}

/// Size information the anchor model pulls from its collaborators.
pub(crate) trait SizeSource {
    fn item_hints(&self, item: ItemId, orientation: Orientation) -> ItemHints;
    fn control_type(&self, item: ItemRef) -> ControlType;
    fn default_spacing(&self, first: ControlType, second: ControlType, orientation: Orientation)
    -> f64;
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value.min(MAX_SIZE)
    } else {
        0.0
    }
}

/// Anchors, vertices and their graph for one orientation.
#[derive(Debug, Clone)]
pub(crate) struct AxisGraph {
    pub orientation: Orientation,
    pub vertices: Arena<VertexId, Vertex>,
    pub anchors: Arena<AnchorId, AnchorData>,
    pub graph: Graph<VertexId, AnchorId>,
    points: BTreeMap<AnchorPoint, VertexId>,
    pub centers: Vec<CenterConstraint>,
    pub layout: LayoutVertices,
    pub state: SolveState,
    pub key_sizes: KeySizes,
    pub has_conflicts: bool,
    /// Items reachable from the layout's first edge after the last solve.
    pub connected: BTreeSet<ItemId>,
}

impl AxisGraph {
    pub fn new(orientation: Orientation) -> Self {
        let mut vertices = Arena::new();
        let mut points = BTreeMap::new();
        let mut layout_point = |edge: Edge| {
            let key = AnchorPoint {
                item: ItemRef::Layout,
                edge,
            };
            let v = vertices.insert(Vertex::Point(key));
            points.insert(key, v);
            v
        };
        let first = layout_point(Edge::first(orientation));
        let last = layout_point(Edge::last(orientation));

        let mut axis = Self {
            orientation,
            vertices,
            anchors: Arena::new(),
            graph: Graph::new(),
            points,
            centers: Vec::new(),
            layout: LayoutVertices {
                first,
                center: None,
                last,
            },
            state: SolveState::Dirty,
            key_sizes: KeySizes::default(),
            has_conflicts: false,
            connected: BTreeSet::new(),
        };
        axis.create_item_edges(ItemRef::Layout);
        axis
    }

    pub fn invalidate(&mut self) {
        self.state = SolveState::Dirty;
    }

    pub fn point(&self, item: ItemRef, edge: Edge) -> Option<VertexId> {
        self.points.get(&AnchorPoint { item, edge }).copied()
    }

    pub fn ensure_point(&mut self, item: ItemRef, edge: Edge) -> VertexId {
        let key = AnchorPoint { item, edge };
        if let Some(&v) = self.points.get(&key) {
            return v;
        }
        let v = self.vertices.insert(Vertex::Point(key));
        self.points.insert(key, v);
        v
    }

    /// Forgets a point nothing refers to anymore. Layout first/last points always stay.
    pub fn drop_point_if_unused(&mut self, v: VertexId) {
        if self.graph.degree(v) > 0 || v == self.layout.first || v == self.layout.last {
            return;
        }
        if let Some(Vertex::Point(key)) = self.vertices.remove(v) {
            self.points.remove(&key);
        }
    }

    pub fn point_of(&self, v: VertexId) -> Option<AnchorPoint> {
        match self.vertices.get(v)? {
            Vertex::Point(p) => Some(*p),
            Vertex::Pair(_) => None,
        }
    }

    /// Layout points, and pairs containing one.
    pub fn is_layout_vertex(&self, v: VertexId) -> bool {
        match self.vertices.get(v) {
            Some(Vertex::Point(p)) => p.item == ItemRef::Layout,
            Some(Vertex::Pair(pair)) => {
                self.is_layout_vertex(pair.first) || self.is_layout_vertex(pair.second)
            }
            None => false,
        }
    }

    pub fn anchor_between(&self, v1: VertexId, v2: VertexId) -> Option<AnchorId> {
        self.graph.edge_data(v1, v2).copied()
    }

    pub fn insert_anchor(&mut self, data: AnchorData) -> anchorage_graphlib::Result<AnchorId> {
        let (from, to) = (data.from, data.to);
        let id = self.anchors.insert(data);
        if let Err(e) = self.graph.create_edge(from, to, id) {
            self.anchors.remove(id);
            return Err(e);
        }
        Ok(id)
    }

    /// Removes an anchor from the graph and the arena; endpoints are left in place.
    pub fn remove_anchor(&mut self, id: AnchorId) -> Option<AnchorData> {
        let anchor = self.anchors.get(id)?;
        if self.anchor_between(anchor.from, anchor.to) == Some(id) {
            self.graph.remove_edge(anchor.from, anchor.to);
        }
        self.anchors.remove(id)
    }

    /// The anchor spanning an item's first and last edge, when it is not split by a center.
    fn extent_anchor(&self, item: ItemRef) -> Option<AnchorId> {
        let first = self.point(item, Edge::first(self.orientation))?;
        let last = self.point(item, Edge::last(self.orientation))?;
        let id = self.anchor_between(first, last)?;
        self.anchors.get(id)?.is_internal_of(item).then_some(id)
    }

    pub fn has_item_edges(&self, item: ItemRef) -> bool {
        self.point(item, Edge::first(self.orientation)).is_some()
    }

    pub fn create_item_edges(&mut self, item: ItemRef) {
        let first = self.ensure_point(item, Edge::first(self.orientation));
        let last = self.ensure_point(item, Edge::last(self.orientation));
        if self.anchor_between(first, last).is_some() {
            return;
        }
        let data = AnchorData::normal(first, last, AnchorSource::Item { item, half: false });
        if self.insert_anchor(data).is_err() {
            debug_assert!(false, "item extent anchor could not be created");
        }
        self.invalidate();
    }

    /// Drops an item's internal anchors and its then-unused points.
    pub fn remove_item_edges(&mut self, item: ItemRef) {
        let internal: Vec<AnchorId> = self
            .anchors
            .iter()
            .filter(|(_, a)| a.is_internal_of(item))
            .map(|(id, _)| id)
            .collect();
        for id in internal {
            self.remove_anchor(id);
        }
        self.centers.retain(|c| c.item != item);
        for edge in [
            Edge::first(self.orientation),
            Edge::center(self.orientation),
            Edge::last(self.orientation),
        ] {
            if let Some(v) = self.point(item, edge) {
                self.drop_point_if_unused(v);
            }
        }
        self.invalidate();
    }

    /// Splits the extent anchor of `item` at its center into a master and a slave half.
    pub fn create_center_anchors(&mut self, item: ItemRef) {
        let orientation = self.orientation;
        if self.point(item, Edge::center(orientation)).is_some() {
            return;
        }
        let (Some(first), Some(last)) = (
            self.point(item, Edge::first(orientation)),
            self.point(item, Edge::last(orientation)),
        ) else {
            return;
        };
        if let Some(id) = self.extent_anchor(item) {
            self.remove_anchor(id);
        }
        let center = self.ensure_point(item, Edge::center(orientation));

        let mut master = AnchorData::normal(first, center, AnchorSource::Item { item, half: true });
        master.dependency = Dependency::Master;
        let mut slave = AnchorData::normal(center, last, AnchorSource::Item { item, half: true });
        slave.dependency = Dependency::Slave;

        match (self.insert_anchor(master), self.insert_anchor(slave)) {
            (Ok(master), Ok(slave)) => self.centers.push(CenterConstraint {
                item,
                master,
                slave,
            }),
            _ => debug_assert!(false, "center halves could not be created"),
        }
        if item == ItemRef::Layout {
            self.layout.center = Some(center);
        }
        self.invalidate();
    }

    /// Merges the two halves back once nothing else is anchored to the center.
    pub fn remove_center_anchors(&mut self, item: ItemRef) {
        let orientation = self.orientation;
        let Some(center) = self.point(item, Edge::center(orientation)) else {
            return;
        };
        if self.graph.degree(center) > 2 {
            return;
        }
        let Some(index) = self.centers.iter().position(|c| c.item == item) else {
            return;
        };
        let constraint = self.centers.remove(index);
        self.remove_anchor(constraint.master);
        self.remove_anchor(constraint.slave);
        self.drop_point_if_unused(center);
        if item == ItemRef::Layout {
            self.layout.center = None;
        }

        if let (Some(first), Some(last)) = (
            self.point(item, Edge::first(orientation)),
            self.point(item, Edge::last(orientation)),
        ) {
            let data = AnchorData::normal(first, last, AnchorSource::Item { item, half: false });
            if self.insert_anchor(data).is_err() {
                debug_assert!(false, "item extent anchor could not be restored");
            }
        }
        self.invalidate();
    }

    /// Anchors touching `item`'s points that are not the item's own extent anchors.
    pub fn external_anchors(&self, item: ItemRef) -> Vec<AnchorId> {
        let mut out: BTreeSet<AnchorId> = BTreeSet::new();
        for edge in [
            Edge::first(self.orientation),
            Edge::center(self.orientation),
            Edge::last(self.orientation),
        ] {
            let Some(v) = self.point(item, edge) else {
                continue;
            };
            for w in self.graph.neighbors(v) {
                let Some(id) = self.anchor_between(v, w) else {
                    continue;
                };
                if self.anchors.get(id).is_some_and(|a| !a.is_internal_of(item)) {
                    out.insert(id);
                }
            }
        }
        out.into_iter().collect()
    }

    /// Recomputes every normal anchor's nominal sizes and resets its solved sizes to preferred.
    pub fn refresh_size_hints(&mut self, source: &impl SizeSource) {
        let orientation = self.orientation;
        let vertices = &self.vertices;
        let item_of = |v: VertexId| match vertices.get(v) {
            Some(Vertex::Point(p)) => p.item,
            _ => ItemRef::Layout,
        };
        for (_, anchor) in self.anchors.iter_mut() {
            let AnchorKind::Normal(source_kind) = &anchor.kind else {
                continue;
            };
            let nominal = match source_kind {
                AnchorSource::Item {
                    item: ItemRef::Layout,
                    half,
                } => {
                    let max = if *half { MAX_SIZE / 2.0 } else { MAX_SIZE };
                    Nominal {
                        min: 0.0,
                        min_pref: 0.0,
                        pref: 0.0,
                        max_pref: max,
                        max,
                    }
                }
                AnchorSource::Item {
                    item: ItemRef::Item(id),
                    half,
                } => {
                    let hints = source.item_hints(*id, orientation);
                    let min = sanitize(hints.minimum);
                    let max = sanitize(hints.maximum).max(min);
                    let pref = sanitize(hints.preferred).clamp(min, max);
                    let nominal = Nominal::from_policy(hints.policy, min, pref, max);
                    if *half { nominal.halved() } else { nominal }
                }
                AnchorSource::Spacing(spacing) => {
                    let pref = match spacing.value {
                        Some(value) => sanitize(value),
                        None => sanitize(source.default_spacing(
                            source.control_type(item_of(anchor.from)),
                            source.control_type(item_of(anchor.to)),
                            orientation,
                        )),
                    };
                    Nominal::from_policy(spacing.policy, 0.0, pref, MAX_SIZE)
                }
            };
            anchor.nominal = nominal;
            anchor.solved = Solved::all(nominal.pref);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(min: f64, pref: f64, max: f64) -> Nominal {
        Nominal::from_policy(SizePolicy::Preferred, min, pref, max)
    }

    fn anchor(from: VertexId, to: VertexId, nominal: Nominal) -> AnchorData {
        let mut data = AnchorData::normal(from, to, AnchorSource::Spacing(Spacing::default()));
        data.nominal = nominal;
        data
    }

    fn three_vertices() -> (Arena<VertexId, Vertex>, [VertexId; 3]) {
        let mut vertices: Arena<VertexId, Vertex> = Arena::new();
        let ids = [Edge::Left, Edge::HCenter, Edge::Right].map(|edge| {
            vertices.insert(Vertex::Point(AnchorPoint {
                item: ItemRef::Layout,
                edge,
            }))
        });
        (vertices, ids)
    }

    #[test]
    fn policies_pick_hints() {
        let fixed = Nominal::from_policy(SizePolicy::Fixed, 10.0, 20.0, 30.0);
        assert_eq!(fixed, Nominal::fixed(20.0));

        let expanding = Nominal::from_policy(SizePolicy::Expanding, 10.0, 20.0, 30.0);
        assert_eq!((expanding.min, expanding.pref, expanding.max), (10.0, 20.0, 30.0));
        assert_eq!((expanding.min_pref, expanding.max_pref), (20.0, 30.0));

        let ignored = Nominal::from_policy(SizePolicy::Ignored, 10.0, 20.0, 30.0);
        assert_eq!(ignored.pref, 10.0);

        let minimum = Nominal::from_policy(SizePolicy::Minimum, 10.0, 20.0, 30.0);
        assert_eq!((minimum.min, minimum.max), (20.0, 30.0));
    }

    #[test]
    fn sequential_sizes_add_up() {
        let (_, [a, b, c]) = three_vertices();
        let mut anchors: Arena<AnchorId, AnchorData> = Arena::new();
        let first = anchors.insert(anchor(a, b, sized(2.0, 5.0, 10.0)));
        let second = anchors.insert(anchor(b, c, sized(3.0, 4.0, 6.0)));

        let n = sequential_nominal(&anchors, &[first, second], &[true, true]);
        assert_eq!((n.min, n.pref, n.max), (5.0, 9.0, 16.0));
    }

    #[test]
    fn backward_children_subtract() {
        let (_, [a, b, c]) = three_vertices();
        let mut anchors: Arena<AnchorId, AnchorData> = Arena::new();
        let first = anchors.insert(anchor(a, b, sized(10.0, 20.0, 30.0)));
        let second = anchors.insert(anchor(c, b, Nominal::fixed(4.0)));

        let n = sequential_nominal(&anchors, &[first, second], &[true, false]);
        assert_eq!((n.min, n.pref, n.max), (6.0, 16.0, 26.0));
    }

    #[test]
    fn parallel_sizes_intersect() {
        let (_, [a, b, _]) = three_vertices();
        let first = anchor(a, b, sized(2.0, 5.0, 8.0));
        let second = anchor(a, b, sized(4.0, 6.0, 10.0));

        let (n, feasible) = parallel_nominal(&first, &second, true);
        assert!(feasible);
        assert_eq!((n.min, n.max), (4.0, 8.0));
        assert!(n.min <= n.pref && n.pref <= n.max);
    }

    #[test]
    fn disjoint_parallel_ranges_are_flagged() {
        let (_, [a, b, _]) = three_vertices();
        let first = anchor(a, b, sized(2.0, 3.0, 4.0));
        let second = anchor(a, b, sized(6.0, 7.0, 8.0));

        let (n, feasible) = parallel_nominal(&first, &second, true);
        assert!(!feasible);
        assert_eq!((n.min, n.pref, n.max), (6.0, 6.0, 6.0));
    }

    #[test]
    fn layout_child_defers_preferred_to_the_other_child() {
        let (_, [a, b, _]) = three_vertices();
        let mut structural = AnchorData::normal(
            a,
            b,
            AnchorSource::Item {
                item: ItemRef::Layout,
                half: false,
            },
        );
        structural.nominal = Nominal {
            min: 0.0,
            min_pref: 0.0,
            pref: 0.0,
            max_pref: MAX_SIZE,
            max: MAX_SIZE,
        };
        let content = anchor(a, b, sized(60.0, 120.0, 220.0));

        let (n, feasible) = parallel_nominal(&structural, &content, true);
        assert!(feasible);
        assert_eq!((n.min, n.pref, n.max), (60.0, 120.0, 220.0));
    }

    #[test]
    fn sequential_push_splits_by_interval() {
        let (_, [a, b, c]) = three_vertices();
        let mut anchors: Arena<AnchorId, AnchorData> = Arena::new();
        let first = anchors.insert(anchor(a, b, sized(20.0, 50.0, 100.0)));
        let second = anchors.insert(anchor(b, c, sized(10.0, 10.0, 10.0)));
        let nominal = sequential_nominal(&anchors, &[first, second], &[true, true]);
        let mut seq = anchor(a, c, nominal);
        seq.kind = AnchorKind::Sequential {
            vertices: vec![b],
            edges: vec![first, second],
            forward: vec![true, true],
        };
        seq.solved = Solved {
            at_minimum: 30.0,
            at_preferred: 60.0,
            at_maximum: 85.0,
        };
        let id = anchors.insert(seq);

        push_solved_to_children(&mut anchors, id);
        let child = anchors.get(first).unwrap().solved;
        assert_eq!(child.at_minimum, 20.0);
        assert_eq!(child.at_preferred, 50.0);
        assert_eq!(child.at_maximum, 75.0);
        assert_eq!(anchors.get(second).unwrap().solved, Solved::all(10.0));
    }
}
