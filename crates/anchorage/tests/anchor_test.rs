use anchorage::{
    AnchorLayout, Corner, Edge, Error, ItemRef, Orientation, Rect, Size, SizeHint, SizePolicy,
    SizedItem, UniformStyle,
};
use float_cmp::assert_approx_eq;

fn flexible() -> SizedItem {
    SizedItem::new(
        Size::new(10.0, 10.0),
        Size::new(50.0, 20.0),
        Size::new(100.0, 40.0),
    )
}

fn fill_horizontally(layout: &mut AnchorLayout<SizedItem>, item: anchorage::ItemId) {
    layout
        .add_anchor(ItemRef::Layout, Edge::Left, item, Edge::Left, None)
        .unwrap();
    layout
        .add_anchor(item, Edge::Right, ItemRef::Layout, Edge::Right, None)
        .unwrap();
}

#[test]
fn centered_item_follows_the_layout_center() {
    let mut layout = AnchorLayout::new();
    let b = layout.add_item(flexible());
    let a = layout.add_item(SizedItem::fixed(Size::new(20.0, 20.0)));
    fill_horizontally(&mut layout, b);
    layout
        .add_anchor(ItemRef::Layout, Edge::HCenter, a, Edge::HCenter, None)
        .unwrap();

    let min = layout.size_hint(SizeHint::Minimum, None);
    let max = layout.size_hint(SizeHint::Maximum, None);
    assert_approx_eq!(f64, min.width, 10.0, epsilon = 1e-6);
    assert_approx_eq!(f64, max.width, 100.0, epsilon = 1e-6);

    layout.set_geometry(Rect::new(0.0, 0.0, 80.0, 20.0));
    let rect = layout.item_geometry(a).unwrap();
    assert_approx_eq!(f64, rect.x, 30.0, epsilon = 1e-6);
    assert_approx_eq!(f64, rect.width, 20.0, epsilon = 1e-6);
    assert_approx_eq!(f64, layout.item_geometry(b).unwrap().width, 80.0, epsilon = 1e-6);
}

#[test]
fn removing_the_center_anchor_detaches_the_item() {
    let mut layout = AnchorLayout::new();
    let b = layout.add_item(flexible());
    let a = layout.add_item(SizedItem::fixed(Size::new(20.0, 20.0)));
    fill_horizontally(&mut layout, b);
    let center = layout
        .add_anchor(ItemRef::Layout, Edge::HCenter, a, Edge::HCenter, None)
        .unwrap();
    layout.set_geometry(Rect::new(0.0, 0.0, 80.0, 20.0));
    assert!(layout.item_geometry(a).is_some());

    layout.remove_anchor(center).unwrap();
    assert_eq!(
        layout.anchor(ItemRef::Layout, Edge::HCenter, a, Edge::HCenter),
        None
    );
    assert_eq!(layout.item_geometry(a), None);
    assert_eq!(layout.floating_items(Orientation::Horizontal), vec![a]);

    layout.set_geometry(Rect::new(0.0, 0.0, 60.0, 20.0));
    assert_eq!(layout.item_geometry(a), None);
    assert_approx_eq!(f64, layout.item_geometry(b).unwrap().width, 60.0, epsilon = 1e-6);
}

#[test]
fn duplicate_anchors_return_the_existing_handle() {
    let mut layout = AnchorLayout::new();
    let a = layout.add_item(flexible());
    let b = layout.add_item(flexible());
    let first = layout
        .add_anchor(a, Edge::Right, b, Edge::Left, Some(5.0))
        .unwrap();
    let again = layout
        .add_anchor(b, Edge::Left, a, Edge::Right, Some(9.0))
        .unwrap();
    assert_eq!(first, again);
    assert_eq!(layout.spacing(first).unwrap(), 5.0);
}

#[test]
fn invalid_anchors_are_rejected() {
    let mut layout = AnchorLayout::new();
    let a = layout.add_item(flexible());
    let b = layout.add_item(flexible());

    assert!(matches!(
        layout.add_anchor(a, Edge::Left, a, Edge::Right, None),
        Err(Error::SelfAnchor)
    ));
    assert!(matches!(
        layout.add_anchor(a, Edge::Left, b, Edge::Top, None),
        Err(Error::UnknownAnchorPoint {
            first: Edge::Left,
            second: Edge::Top
        })
    ));

    layout.remove_item(b).unwrap();
    assert!(matches!(
        layout.add_anchor(a, Edge::Right, b, Edge::Left, None),
        Err(Error::StaleItem)
    ));
    assert!(matches!(layout.remove_anchors(b), Err(Error::StaleItem)));
}

#[test]
fn removing_an_item_drops_its_anchors() {
    let mut layout = AnchorLayout::new();
    let a = layout.add_item(flexible());
    let b = layout.add_item(flexible());
    fill_horizontally(&mut layout, a);
    let between = layout
        .add_anchor(a, Edge::Bottom, b, Edge::Top, Some(4.0))
        .unwrap();

    let removed = layout.remove_item(b).unwrap();
    assert_eq!(removed.preferred, Size::new(50.0, 20.0));
    assert_eq!(layout.len(), 1);
    assert!(matches!(layout.spacing(between), Err(Error::StaleAnchor)));
    assert!(layout.remove_item(b).is_none());

    layout.set_geometry(Rect::new(0.0, 0.0, 70.0, 20.0));
    assert_approx_eq!(f64, layout.item_geometry(a).unwrap().width, 70.0, epsilon = 1e-6);
}

#[test]
fn remove_anchors_counts_every_orientation() {
    let mut layout = AnchorLayout::new();
    let a = layout.add_item(flexible());
    let handles = layout
        .add_anchors(ItemRef::Layout, a, &Orientation::ALL)
        .unwrap();
    assert_eq!(handles.len(), 4);
    assert_eq!(layout.remove_anchors(a).unwrap(), 4);
    assert_eq!(layout.floating_items(Orientation::Vertical), vec![a]);
}

#[test]
fn shared_edges_fill_the_layout() {
    let mut layout = AnchorLayout::new();
    let a = layout.add_item(flexible());
    layout
        .add_anchors(ItemRef::Layout, a, &[Orientation::Horizontal, Orientation::Vertical])
        .unwrap();
    layout.set_geometry(Rect::new(0.0, 0.0, 70.0, 30.0));
    let rect = layout.item_geometry(a).unwrap();
    assert_approx_eq!(f64, rect.x, 0.0, epsilon = 1e-6);
    assert_approx_eq!(f64, rect.y, 0.0, epsilon = 1e-6);
    assert_approx_eq!(f64, rect.width, 70.0, epsilon = 1e-6);
    assert_approx_eq!(f64, rect.height, 30.0, epsilon = 1e-6);
    assert!(layout.floating_items(Orientation::Horizontal).is_empty());
}

#[test]
fn corner_anchors_pin_both_axes() {
    let mut layout = AnchorLayout::new();
    let a = layout.add_item(SizedItem::fixed(Size::new(20.0, 20.0)));
    let (h, v) = layout
        .add_corner_anchors(ItemRef::Layout, Corner::TopLeft, a, Corner::TopLeft)
        .unwrap();
    assert_eq!(h.orientation(), Orientation::Horizontal);
    assert_eq!(v.orientation(), Orientation::Vertical);

    layout.set_geometry(Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(layout.item_geometry(a), Some(Rect::new(0.0, 0.0, 20.0, 20.0)));
}

#[test]
fn floating_items_are_reported_per_orientation() {
    let mut layout = AnchorLayout::new();
    let anchored = layout.add_item(flexible());
    let c = layout.add_item(flexible());
    let d = layout.add_item(flexible());
    fill_horizontally(&mut layout, anchored);
    layout
        .add_anchor(c, Edge::Right, d, Edge::Left, Some(5.0))
        .unwrap();

    assert_eq!(layout.floating_items(Orientation::Horizontal), vec![c, d]);
    assert_eq!(
        layout.floating_items(Orientation::Vertical),
        vec![anchored, c, d]
    );

    layout.set_geometry(Rect::new(0.0, 0.0, 60.0, 20.0));
    let (rc, rd) = (
        layout.item_geometry(c).unwrap(),
        layout.item_geometry(d).unwrap(),
    );
    assert_approx_eq!(f64, rc.x, 0.0, epsilon = 1e-6);
    assert_approx_eq!(f64, rd.x - rc.right(), 5.0, epsilon = 1e-6);
}

#[test]
fn style_spacing_applies_until_overridden() {
    let mut layout = AnchorLayout::new().with_style(UniformStyle {
        horizontal: 8.0,
        vertical: 8.0,
    });
    let a = layout.add_item(SizedItem::fixed(Size::new(10.0, 10.0)));
    let b = layout.add_item(SizedItem::fixed(Size::new(10.0, 10.0)));
    layout
        .add_anchor(ItemRef::Layout, Edge::Left, a, Edge::Left, None)
        .unwrap();
    let gap = layout.add_anchor(a, Edge::Right, b, Edge::Left, None).unwrap();
    layout
        .add_anchor(b, Edge::Right, ItemRef::Layout, Edge::Right, None)
        .unwrap();
    assert_approx_eq!(
        f64,
        layout.size_hint(SizeHint::Minimum, None).width,
        28.0,
        epsilon = 1e-6
    );

    layout.set_horizontal_spacing(2.0);
    assert_eq!(layout.default_spacing(Orientation::Horizontal), 2.0);
    assert_approx_eq!(
        f64,
        layout.size_hint(SizeHint::Preferred, None).width,
        22.0,
        epsilon = 1e-6
    );

    layout.set_spacing(gap, 12.0).unwrap();
    assert_approx_eq!(
        f64,
        layout.size_hint(SizeHint::Maximum, None).width,
        32.0,
        epsilon = 1e-6
    );

    layout.unset_spacing(gap).unwrap();
    assert_eq!(layout.spacing(gap).unwrap(), 2.0);
}

#[test]
fn expanding_spacers_absorb_extra_space() {
    let mut layout = AnchorLayout::new();
    let a = layout.add_item(SizedItem::fixed(Size::new(10.0, 10.0)));
    let gap = layout
        .add_anchor(ItemRef::Layout, Edge::Left, a, Edge::Left, Some(5.0))
        .unwrap();
    layout
        .add_anchor(a, Edge::Right, ItemRef::Layout, Edge::Right, None)
        .unwrap();
    layout
        .set_anchor_size_policy(gap, SizePolicy::Expanding)
        .unwrap();

    assert_approx_eq!(
        f64,
        layout.size_hint(SizeHint::Minimum, None).width,
        10.0,
        epsilon = 1e-6
    );
    assert_approx_eq!(
        f64,
        layout.size_hint(SizeHint::Preferred, None).width,
        15.0,
        epsilon = 1e-6
    );

    layout.set_geometry(Rect::new(0.0, 0.0, 100.0, 10.0));
    let rect = layout.item_geometry(a).unwrap();
    assert_approx_eq!(f64, rect.x, 90.0, epsilon = 1e-6);
    assert_approx_eq!(f64, rect.width, 10.0, epsilon = 1e-6);
}
