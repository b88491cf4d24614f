use anchorage::{
    AnchorLayout, Edge, ItemId, ItemRef, LayoutOptions, Orientation, Rect, Size, SizeHint,
    SizedItem,
};
use float_cmp::assert_approx_eq;

/// Two fixed items of different widths both spanning the whole layout.
fn overconstrained(simplify: bool) -> AnchorLayout<SizedItem> {
    let mut layout = AnchorLayout::with_options(LayoutOptions {
        simplify,
        ..Default::default()
    });
    for width in [10.0, 30.0] {
        let item = layout.add_item(SizedItem::fixed(Size::new(width, 10.0)));
        layout
            .add_anchor(ItemRef::Layout, Edge::Left, item, Edge::Left, None)
            .unwrap();
        layout
            .add_anchor(item, Edge::Right, ItemRef::Layout, Edge::Right, None)
            .unwrap();
    }
    layout
}

#[test]
fn conflicting_anchors_are_reported() {
    for simplify in [false, true] {
        let mut layout = overconstrained(simplify);
        assert!(layout.has_conflicts(), "simplify = {simplify}");
    }
}

#[test]
fn fallback_measures_the_first_route() {
    let mut layout = overconstrained(false);
    for which in [SizeHint::Minimum, SizeHint::Preferred, SizeHint::Maximum] {
        let size = layout.size_hint(which, None);
        assert_approx_eq!(f64, size.width, 10.0, epsilon = 1e-6);
    }
}

#[test]
fn conflicting_layouts_still_produce_geometry() {
    for simplify in [false, true] {
        let mut layout = overconstrained(simplify);
        layout.set_geometry(Rect::new(0.0, 0.0, 50.0, 10.0));
        let rects: Vec<Rect> = layout
            .items()
            .map(|(id, _)| layout.item_geometry(id).unwrap())
            .collect();
        assert_eq!(rects.len(), 2);
        for r in rects {
            assert!(r.x.is_finite() && r.width.is_finite());
            assert!(r.width >= 0.0);
        }
    }
}

#[test]
fn fallback_keeps_the_first_route_apart() {
    let mut layout = overconstrained(false);
    layout.set_geometry(Rect::new(0.0, 0.0, 50.0, 10.0));
    let ids: Vec<ItemId> = layout.items().map(|(id, _)| id).collect();
    for id in ids {
        let rect = layout.item_geometry(id).unwrap();
        assert_approx_eq!(f64, rect.x, 0.0, epsilon = 1e-6);
        assert_approx_eq!(f64, rect.width, 10.0, epsilon = 1e-6);
    }
}

#[test]
fn collapsed_parallels_take_the_larger_minimum() {
    let mut layout = overconstrained(true);
    let min = layout.size_hint(SizeHint::Minimum, None);
    assert_approx_eq!(f64, min.width, 30.0, epsilon = 1e-6);

    layout.set_geometry(Rect::new(0.0, 0.0, 50.0, 10.0));
    let ids: Vec<ItemId> = layout.items().map(|(id, _)| id).collect();
    for id in ids {
        let rect = layout.item_geometry(id).unwrap();
        assert_approx_eq!(f64, rect.x, 0.0, epsilon = 1e-6);
        assert_approx_eq!(f64, rect.width, 30.0, epsilon = 1e-6);
    }
}

#[test]
fn floating_conflicts_leave_the_layout_alone() {
    for simplify in [false, true] {
        let mut layout = AnchorLayout::with_options(LayoutOptions {
            simplify,
            ..Default::default()
        });
        let a = layout.add_item(SizedItem::new(
            Size::new(10.0, 10.0),
            Size::new(50.0, 10.0),
            Size::new(100.0, 10.0),
        ));
        let b = layout.add_item(SizedItem::new(
            Size::new(20.0, 10.0),
            Size::new(30.0, 10.0),
            Size::new(60.0, 10.0),
        ));
        for item in [a, b] {
            layout
                .add_anchor(ItemRef::Layout, Edge::Left, item, Edge::Left, None)
                .unwrap();
            layout
                .add_anchor(item, Edge::Right, ItemRef::Layout, Edge::Right, None)
                .unwrap();
        }

        // c's right edge and c's left edge can't both sit 5 before d's left edge.
        let c = layout.add_item(SizedItem::fixed(Size::new(10.0, 10.0)));
        let d = layout.add_item(SizedItem::fixed(Size::new(10.0, 10.0)));
        layout
            .add_anchor(c, Edge::Right, d, Edge::Left, Some(5.0))
            .unwrap();
        layout
            .add_anchor(c, Edge::Left, d, Edge::Left, Some(5.0))
            .unwrap();

        assert!(layout.has_conflicts(), "simplify = {simplify}");
        let min = layout.size_hint(SizeHint::Minimum, None);
        let max = layout.size_hint(SizeHint::Maximum, None);
        assert_approx_eq!(f64, min.width, 20.0, epsilon = 1e-6);
        assert_approx_eq!(f64, max.width, 60.0, epsilon = 1e-6);

        layout.set_geometry(Rect::new(0.0, 0.0, 40.0, 10.0));
        for item in [a, b] {
            let rect = layout.item_geometry(item).unwrap();
            assert_approx_eq!(f64, rect.x, 0.0, epsilon = 1e-6);
            assert_approx_eq!(f64, rect.width, 40.0, epsilon = 1e-6);
        }
        for item in [c, d] {
            let rect = layout.item_geometry(item).unwrap();
            assert!(rect.x.is_finite() && rect.width.is_finite());
        }
        assert_eq!(layout.floating_items(Orientation::Horizontal), vec![c, d]);
    }
}

#[test]
fn broken_size_hints_are_clamped() {
    let mut layout = AnchorLayout::new();
    let broken = layout.add_item(SizedItem::new(
        Size::new(f64::NAN, -10.0),
        Size::new(f64::INFINITY, f64::NAN),
        Size::new(-4.0, f64::INFINITY),
    ));
    let b = layout.add_item(SizedItem::new(
        Size::new(10.0, 10.0),
        Size::new(50.0, 10.0),
        Size::new(100.0, 10.0),
    ));
    layout
        .add_anchor(ItemRef::Layout, Edge::Left, broken, Edge::Left, None)
        .unwrap();
    layout
        .add_anchor(broken, Edge::Right, b, Edge::Left, Some(0.0))
        .unwrap();
    layout
        .add_anchor(b, Edge::Right, ItemRef::Layout, Edge::Right, None)
        .unwrap();
    layout
        .add_anchor(ItemRef::Layout, Edge::Top, broken, Edge::Top, None)
        .unwrap();
    layout
        .add_anchor(broken, Edge::Bottom, ItemRef::Layout, Edge::Bottom, None)
        .unwrap();

    for which in [SizeHint::Minimum, SizeHint::Preferred, SizeHint::Maximum] {
        let size = layout.size_hint(which, None);
        assert!(size.width.is_finite() && size.height.is_finite());
        assert_approx_eq!(f64, size.height, 0.0, epsilon = 1e-6);
    }
    assert_approx_eq!(
        f64,
        layout.size_hint(SizeHint::Minimum, None).width,
        10.0,
        epsilon = 1e-6
    );
    assert_approx_eq!(
        f64,
        layout.size_hint(SizeHint::Maximum, None).width,
        100.0,
        epsilon = 1e-6
    );
    assert!(!layout.has_conflicts());

    layout.set_geometry(Rect::new(0.0, 0.0, 60.0, 30.0));
    let rect = layout.item_geometry(broken).unwrap();
    for value in [rect.x, rect.y, rect.width, rect.height] {
        assert_approx_eq!(f64, value, 0.0, epsilon = 1e-6);
    }
    let rect = layout.item_geometry(b).unwrap();
    assert_approx_eq!(f64, rect.x, 0.0, epsilon = 1e-6);
    assert_approx_eq!(f64, rect.width, 60.0, epsilon = 1e-6);
}

#[test]
fn resolving_the_conflict_clears_the_flag() {
    let mut layout = overconstrained(true);
    assert!(layout.has_conflicts());
    let wide = layout.items().nth(1).map(|(id, _)| id).unwrap();
    layout.item_mut(wide).unwrap().maximum.width = 10.0;
    layout.item_mut(wide).unwrap().minimum.width = 10.0;
    layout.item_mut(wide).unwrap().preferred.width = 10.0;
    assert!(!layout.has_conflicts());
}
