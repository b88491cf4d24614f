//! The public layout object: items, anchors between their edges, and geometry.

use tracing::{debug, warn};

use crate::anchor::{AnchorData, AnchorSource, AxisGraph, ItemHints, SizeSource, Spacing};
use crate::arena::{AnchorId, Arena, ItemId};
use crate::error::{Error, Result};
use crate::geometry::{item_span, vertex_distances};
use crate::item::LayoutItem;
use crate::model::{
    ControlType, Corner, Edge, ItemRef, LayoutDirection, Orientation, Rect, Size, SizeHint,
    SizePolicy,
};
use crate::options::LayoutOptions;
use crate::solve::{SolveSettings, calculate};
use crate::style::{Style, StyleCache, UniformStyle};

/// Refers to one user anchor of an [`AnchorLayout`].
///
/// Handles stay valid until the anchor (or one of its items) is removed; stale handles are
/// rejected with [`Error::StaleAnchor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorHandle {
    orientation: Orientation,
    anchor: AnchorId,
}

impl AnchorHandle {
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

#[derive(Debug)]
struct ItemEntry<I> {
    item: I,
    geometry: Option<Rect>,
}

/// Lays out items by anchoring their edges to each other and to the layout's own edges.
///
/// Each orientation keeps its own anchor graph, solved lazily the first time geometry or a
/// size hint is requested after a change.
#[derive(Debug)]
pub struct AnchorLayout<I> {
    items: Arena<ItemId, ItemEntry<I>>,
    axes: [AxisGraph; 2],
    style: StyleCache,
    options: LayoutOptions,
    geometry: Rect,
}

impl<I: LayoutItem> Default for AnchorLayout<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads hints and spacings for the solver without borrowing the graphs.
struct Hints<'a, I> {
    items: &'a Arena<ItemId, ItemEntry<I>>,
    style: &'a StyleCache,
    options: &'a LayoutOptions,
}

impl<I: LayoutItem> SizeSource for Hints<'_, I> {
    fn item_hints(&self, item: ItemId, orientation: Orientation) -> ItemHints {
        let Some(entry) = self.items.get(item) else {
            return ItemHints {
                policy: SizePolicy::Fixed,
                minimum: 0.0,
                preferred: 0.0,
                maximum: 0.0,
            };
        };
        let item = &entry.item;
        ItemHints {
            policy: item.size_policy(orientation),
            minimum: item.size_hint(SizeHint::Minimum, orientation),
            preferred: item.size_hint(SizeHint::Preferred, orientation),
            maximum: item.size_hint(SizeHint::Maximum, orientation),
        }
    }

    fn control_type(&self, item: ItemRef) -> ControlType {
        match item {
            ItemRef::Layout => ControlType::Default,
            ItemRef::Item(id) => self
                .items
                .get(id)
                .map(|entry| entry.item.control_type())
                .unwrap_or_default(),
        }
    }

    fn default_spacing(
        &self,
        first: ControlType,
        second: ControlType,
        orientation: Orientation,
    ) -> f64 {
        self.options
            .spacing(orientation)
            .unwrap_or_else(|| self.style.spacing(first, second, orientation))
    }
}

/// Points anchors the way they are read: item-to-item anchors from the later edge to the
/// earlier one, layout anchors from the layout's leading edges and into its trailing edges.
fn normalize(
    first: ItemRef,
    first_edge: Edge,
    second: ItemRef,
    second_edge: Edge,
) -> (ItemRef, Edge, ItemRef, Edge) {
    let swap = match (first, second) {
        (ItemRef::Layout, _) => first_edge.is_trailing(),
        (_, ItemRef::Layout) => !second_edge.is_trailing(),
        _ => first_edge < second_edge,
    };
    if swap {
        (second, second_edge, first, first_edge)
    } else {
        (first, first_edge, second, second_edge)
    }
}

impl<I: LayoutItem> AnchorLayout<I> {
    pub fn new() -> Self {
        Self::with_options(LayoutOptions::default())
    }

    pub fn with_options(options: LayoutOptions) -> Self {
        Self {
            items: Arena::new(),
            axes: Orientation::ALL.map(AxisGraph::new),
            style: StyleCache::new(Box::new(UniformStyle::default())),
            options,
            geometry: Rect::default(),
        }
    }

    pub fn with_style(mut self, style: impl Style + 'static) -> Self {
        self.set_style(style);
        self
    }

    pub fn set_style(&mut self, style: impl Style + 'static) {
        self.style.set_style(Box::new(style));
        self.invalidate();
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: LayoutOptions) {
        self.options = options;
        self.invalidate();
    }

    // ---------------------------------------------------------------------------------------
    // Items
    // ---------------------------------------------------------------------------------------

    pub fn add_item(&mut self, item: I) -> ItemId {
        self.items.insert(ItemEntry {
            item,
            geometry: None,
        })
    }

    /// Removes an item together with every anchor touching it.
    pub fn remove_item(&mut self, id: ItemId) -> Option<I> {
        if !self.items.contains(id) {
            return None;
        }
        for handle in self.user_anchors(ItemRef::Item(id)) {
            if let Err(err) = self.remove_anchor(handle) {
                warn!(
                    target: "anchorage::layout",
                    ?id,
                    %err,
                    "anchor vanished while removing item"
                );
            }
        }
        for axis in &mut self.axes {
            if axis.has_item_edges(ItemRef::Item(id)) {
                axis.remove_item_edges(ItemRef::Item(id));
            }
        }
        debug!(target: "anchorage::layout", ?id, "item removed");
        self.items.remove(id).map(|entry| entry.item)
    }

    pub fn item(&self, id: ItemId) -> Option<&I> {
        self.items.get(id).map(|entry| &entry.item)
    }

    /// Mutable access to an item. Its hints may change, so both orientations are re-solved.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut I> {
        self.invalidate();
        self.items.get_mut(id).map(|entry| &mut entry.item)
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemId, &I)> + '_ {
        self.items.iter().map(|(id, entry)| (id, &entry.item))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // ---------------------------------------------------------------------------------------
    // Anchors
    // ---------------------------------------------------------------------------------------

    /// Anchors `first_edge` of `first` to `second_edge` of `second`.
    ///
    /// Without an explicit spacing, anchors touching the layout or a center, and anchors
    /// between edges that are not opposite, get spacing 0; everything else asks the style.
    /// A negative spacing flips the anchor. Anchoring a pair twice returns the existing
    /// anchor.
    pub fn add_anchor(
        &mut self,
        first: impl Into<ItemRef>,
        first_edge: Edge,
        second: impl Into<ItemRef>,
        second_edge: Edge,
        spacing: Option<f64>,
    ) -> Result<AnchorHandle> {
        let (first, second) = (first.into(), second.into());
        let orientation = first_edge.orientation();
        if second_edge.orientation() != orientation {
            warn!(
                target: "anchorage::layout",
                ?first_edge,
                ?second_edge,
                "edges of different orientations cannot be anchored"
            );
            return Err(Error::UnknownAnchorPoint {
                first: first_edge,
                second: second_edge,
            });
        }
        if first == second {
            warn!(target: "anchorage::layout", item = ?first, "cannot anchor an item to itself");
            return Err(Error::SelfAnchor);
        }
        for item in [first, second] {
            if let ItemRef::Item(id) = item
                && !self.items.contains(id)
            {
                warn!(target: "anchorage::layout", ?id, "anchor refers to a removed item");
                return Err(Error::StaleItem);
            }
        }

        let (first, first_edge, second, second_edge) =
            normalize(first, first_edge, second, second_edge);
        if let Some(existing) = self.anchor(first, first_edge, second, second_edge) {
            warn!(
                target: "anchorage::layout",
                ?first,
                ?first_edge,
                ?second,
                ?second_edge,
                "anchor already exists"
            );
            return Ok(existing);
        }

        let value = match spacing {
            Some(value) if value.is_finite() => Some(value),
            _ if first == ItemRef::Layout
                || second == ItemRef::Layout
                || first_edge.is_center()
                || second_edge.is_center()
                || first_edge.opposite() != second_edge =>
            {
                Some(0.0)
            }
            _ => None,
        };

        for item in [first, second] {
            for axis in &mut self.axes {
                if !axis.has_item_edges(item) {
                    axis.create_item_edges(item);
                }
            }
        }
        let axis = &mut self.axes[orientation.index()];
        for (item, edge) in [(first, first_edge), (second, second_edge)] {
            if edge.is_center() {
                axis.create_center_anchors(item);
            }
        }

        let mut from = axis.ensure_point(first, first_edge);
        let mut to = axis.ensure_point(second, second_edge);
        let reversed = value.is_some_and(|v| v < 0.0);
        if reversed {
            std::mem::swap(&mut from, &mut to);
        }
        let spacing = Spacing {
            value: value.map(f64::abs),
            reversed,
            ..Spacing::default()
        };
        let anchor = axis.insert_anchor(AnchorData::normal(
            from,
            to,
            AnchorSource::Spacing(spacing),
        ))?;
        axis.invalidate();
        debug!(
            target: "anchorage::layout",
            ?first,
            ?first_edge,
            ?second,
            ?second_edge,
            spacing = ?spacing.value,
            "anchor added"
        );
        Ok(AnchorHandle {
            orientation,
            anchor,
        })
    }

    /// Anchors the horizontal and the vertical edges meeting at two corners.
    pub fn add_corner_anchors(
        &mut self,
        first: impl Into<ItemRef>,
        first_corner: Corner,
        second: impl Into<ItemRef>,
        second_corner: Corner,
    ) -> Result<(AnchorHandle, AnchorHandle)> {
        let (first, second) = (first.into(), second.into());
        let (first_h, first_v) = first_corner.edges();
        let (second_h, second_v) = second_corner.edges();
        let horizontal = self.add_anchor(first, first_h, second, second_h, None)?;
        let vertical = self.add_anchor(first, first_v, second, second_v, None)?;
        Ok((horizontal, vertical))
    }

    /// Makes `first` and `second` share their leading and trailing edges along each of
    /// `orientations`.
    pub fn add_anchors(
        &mut self,
        first: impl Into<ItemRef>,
        second: impl Into<ItemRef>,
        orientations: &[Orientation],
    ) -> Result<Vec<AnchorHandle>> {
        let (first, second) = (first.into(), second.into());
        let mut handles = Vec::with_capacity(orientations.len() * 2);
        for &orientation in orientations {
            for edge in [Edge::first(orientation), Edge::last(orientation)] {
                handles.push(self.add_anchor(first, edge, second, edge, Some(0.0))?);
            }
        }
        Ok(handles)
    }

    /// The user anchor between two edges, whichever order they are given in.
    pub fn anchor(
        &self,
        first: impl Into<ItemRef>,
        first_edge: Edge,
        second: impl Into<ItemRef>,
        second_edge: Edge,
    ) -> Option<AnchorHandle> {
        let orientation = first_edge.orientation();
        if second_edge.orientation() != orientation {
            return None;
        }
        let axis = &self.axes[orientation.index()];
        let v1 = axis.point(first.into(), first_edge)?;
        let v2 = axis.point(second.into(), second_edge)?;
        let anchor = axis.anchor_between(v1, v2)?;
        axis.anchors.get(anchor)?.spacing()?;
        Some(AnchorHandle {
            orientation,
            anchor,
        })
    }

    /// Removes one anchor. Items left without anchors stop taking part in the layout.
    pub fn remove_anchor(&mut self, handle: AnchorHandle) -> Result<()> {
        let axis = &mut self.axes[handle.orientation.index()];
        let (from, to) = match axis.anchors.get(handle.anchor) {
            Some(data) if data.spacing().is_some() => (data.from, data.to),
            _ => return Err(Error::StaleAnchor),
        };
        axis.remove_anchor(handle.anchor);

        for v in [from, to] {
            let Some(point) = axis.point_of(v) else {
                continue;
            };
            if point.edge.is_center() {
                axis.remove_center_anchors(point.item);
            } else {
                axis.drop_point_if_unused(v);
            }
        }
        axis.invalidate();
        self.prune_detached_items();
        Ok(())
    }

    /// Removes every user anchor touching `item`; returns how many were removed.
    pub fn remove_anchors(&mut self, item: impl Into<ItemRef>) -> Result<usize> {
        let item = item.into();
        if let ItemRef::Item(id) = item
            && !self.items.contains(id)
        {
            return Err(Error::StaleItem);
        }
        let handles = self.user_anchors(item);
        for &handle in &handles {
            self.remove_anchor(handle)?;
        }
        Ok(handles.len())
    }

    fn user_anchors(&self, item: ItemRef) -> Vec<AnchorHandle> {
        let mut handles = Vec::new();
        for axis in &self.axes {
            for anchor in axis.external_anchors(item) {
                if axis.anchors.get(anchor).and_then(AnchorData::spacing).is_some() {
                    handles.push(AnchorHandle {
                        orientation: axis.orientation,
                        anchor,
                    });
                }
            }
        }
        handles
    }

    fn spacing_of(&mut self, handle: AnchorHandle) -> Result<&mut Spacing> {
        self.axes[handle.orientation.index()]
            .anchors
            .get_mut(handle.anchor)
            .and_then(AnchorData::spacing_mut)
            .ok_or(Error::StaleAnchor)
    }

    /// Sets an explicit spacing. A negative value makes the anchor point the other way.
    pub fn set_spacing(&mut self, handle: AnchorHandle, value: f64) -> Result<()> {
        let axis = &mut self.axes[handle.orientation.index()];
        let anchor = axis
            .anchors
            .get_mut(handle.anchor)
            .ok_or(Error::StaleAnchor)?;
        let flip = {
            let spacing = anchor.spacing_mut().ok_or(Error::StaleAnchor)?;
            let reversed = value < 0.0;
            let flip = reversed != spacing.reversed;
            spacing.value = Some(value.abs());
            spacing.reversed = reversed;
            flip
        };
        if flip {
            std::mem::swap(&mut anchor.from, &mut anchor.to);
        }
        axis.invalidate();
        Ok(())
    }

    /// Goes back to the spacing the style (or the layout-wide spacing) provides.
    pub fn unset_spacing(&mut self, handle: AnchorHandle) -> Result<()> {
        let axis = &mut self.axes[handle.orientation.index()];
        let anchor = axis
            .anchors
            .get_mut(handle.anchor)
            .ok_or(Error::StaleAnchor)?;
        let flip = {
            let spacing = anchor.spacing_mut().ok_or(Error::StaleAnchor)?;
            let flip = spacing.reversed;
            spacing.value = None;
            spacing.reversed = false;
            flip
        };
        if flip {
            std::mem::swap(&mut anchor.from, &mut anchor.to);
        }
        axis.invalidate();
        Ok(())
    }

    /// The anchor's spacing; negative when the anchor was flipped.
    pub fn spacing(&self, handle: AnchorHandle) -> Result<f64> {
        let axis = &self.axes[handle.orientation.index()];
        let data = axis
            .anchors
            .get(handle.anchor)
            .ok_or(Error::StaleAnchor)?;
        let spacing = data.spacing().ok_or(Error::StaleAnchor)?;
        let value = match spacing.value {
            Some(value) => value,
            None => {
                let hints = Hints {
                    items: &self.items,
                    style: &self.style,
                    options: &self.options,
                };
                let control = |v| {
                    axis.point_of(v)
                        .map(|p| hints.control_type(p.item))
                        .unwrap_or_default()
                };
                hints.default_spacing(control(data.from), control(data.to), handle.orientation)
            }
        };
        Ok(if spacing.reversed { -value } else { value })
    }

    pub fn set_anchor_size_policy(
        &mut self,
        handle: AnchorHandle,
        policy: SizePolicy,
    ) -> Result<()> {
        self.spacing_of(handle)?.policy = policy;
        self.axes[handle.orientation.index()].invalidate();
        Ok(())
    }

    pub fn anchor_size_policy(&self, handle: AnchorHandle) -> Result<SizePolicy> {
        self.axes[handle.orientation.index()]
            .anchors
            .get(handle.anchor)
            .and_then(AnchorData::spacing)
            .map(|s| s.policy)
            .ok_or(Error::StaleAnchor)
    }

    /// Drops the internal anchors of items that no longer have any external anchor.
    fn prune_detached_items(&mut self) {
        let ids = self.items.ids();
        for id in ids {
            let item = ItemRef::Item(id);
            let attached = self
                .axes
                .iter()
                .any(|axis| !axis.external_anchors(item).is_empty());
            if attached {
                continue;
            }
            for axis in &mut self.axes {
                if axis.has_item_edges(item) {
                    axis.remove_item_edges(item);
                }
            }
            if let Some(entry) = self.items.get_mut(id) {
                entry.geometry = None;
            }
        }
    }

    // ---------------------------------------------------------------------------------------
    // Spacing and invalidation
    // ---------------------------------------------------------------------------------------

    pub fn set_horizontal_spacing(&mut self, spacing: f64) {
        self.options.set_spacing(Orientation::Horizontal, Some(spacing));
        self.axes[Orientation::Horizontal.index()].invalidate();
    }

    pub fn set_vertical_spacing(&mut self, spacing: f64) {
        self.options.set_spacing(Orientation::Vertical, Some(spacing));
        self.axes[Orientation::Vertical.index()].invalidate();
    }

    pub fn set_default_spacing(&mut self, spacing: f64) {
        self.set_horizontal_spacing(spacing);
        self.set_vertical_spacing(spacing);
    }

    /// The spacing used along `orientation` by anchors without an explicit value.
    pub fn default_spacing(&self, orientation: Orientation) -> f64 {
        self.options.spacing(orientation).unwrap_or_else(|| {
            self.style
                .spacing(ControlType::Default, ControlType::Default, orientation)
        })
    }

    /// Forgets cached style spacings, e.g. after the style changed its metrics.
    pub fn invalidate_style(&mut self) {
        self.style.invalidate();
        self.invalidate();
    }

    pub fn invalidate(&mut self) {
        for axis in &mut self.axes {
            axis.invalidate();
        }
    }

    // ---------------------------------------------------------------------------------------
    // Solving and geometry
    // ---------------------------------------------------------------------------------------

    fn solve(&mut self) {
        let settings = SolveSettings {
            simplify: self.options.simplify,
            max_iterations: self.options.max_simplex_iterations,
        };
        let hints = Hints {
            items: &self.items,
            style: &self.style,
            options: &self.options,
        };
        for axis in &mut self.axes {
            calculate(axis, &hints, settings);
        }
    }

    /// Lays every anchored item out inside `rect` and hands it its rectangle.
    pub fn set_geometry(&mut self, rect: Rect) {
        self.geometry = rect;
        self.solve();

        let contents = rect.shrunk_by(&self.options.contents_margins);
        let [horizontal, vertical] = Orientation::ALL.map(|o| {
            let axis = &self.axes[o.index()];
            (axis, vertex_distances(axis, contents.span(o).1))
        });
        for (id, entry) in self.items.iter_mut() {
            let item = ItemRef::Item(id);
            let (Some((left, right)), Some((top, bottom))) = (
                item_span(horizontal.0, &horizontal.1, item),
                item_span(vertical.0, &vertical.1, item),
            ) else {
                continue;
            };
            let width = (right - left).max(0.0);
            let x = match self.options.direction {
                LayoutDirection::LeftToRight => contents.x + left,
                LayoutDirection::RightToLeft => contents.right() - right,
            };
            let r = Rect::new(x, contents.y + top, width, (bottom - top).max(0.0));
            entry.geometry = Some(r);
            entry.item.set_geometry(r);
        }
    }

    /// The rectangle last passed to [`AnchorLayout::set_geometry`].
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// The rectangle an item received in the last [`AnchorLayout::set_geometry`] call.
    pub fn item_geometry(&self, id: ItemId) -> Option<Rect> {
        self.items.get(id)?.geometry
    }

    /// Minimum, preferred or maximum size of the whole layout, margins included.
    ///
    /// For [`SizeHint::Preferred`], non-negative components of `constraint` are honoured
    /// within the layout's minimum and maximum.
    pub fn size_hint(&mut self, which: SizeHint, constraint: Option<Size>) -> Size {
        self.solve();
        let mut size = Size::default();
        for orientation in Orientation::ALL {
            let keys = self.axes[orientation.index()].key_sizes;
            let mut value = match which {
                SizeHint::Minimum => keys.minimum,
                SizeHint::Preferred => keys.preferred,
                SizeHint::Maximum => keys.maximum,
            };
            let wanted = constraint
                .filter(|_| which == SizeHint::Preferred)
                .map(|c| c.along(orientation))
                .filter(|wanted| *wanted >= 0.0);
            if let Some(wanted) = wanted {
                value = wanted.clamp(keys.minimum, keys.maximum.max(keys.minimum));
            }
            size.set_along(
                orientation,
                value + self.options.contents_margins.total(orientation),
            );
        }
        size
    }

    /// Whether either orientation had conflicting anchors in the last solve.
    pub fn has_conflicts(&mut self) -> bool {
        self.solve();
        self.axes.iter().any(|axis| axis.has_conflicts)
    }

    /// Items not connected to the layout's edges along `orientation`.
    pub fn floating_items(&mut self, orientation: Orientation) -> Vec<ItemId> {
        self.solve();
        let connected = &self.axes[orientation.index()].connected;
        self.items
            .ids()
            .into_iter()
            .filter(|id| !connected.contains(id))
            .collect()
    }
}
