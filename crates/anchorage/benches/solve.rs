use anchorage::{AnchorLayout, Edge, ItemRef, LayoutOptions, Rect, Size, SizedItem};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
struct GridCase {
    rows: usize,
    columns: usize,
    simplify: bool,
}

impl GridCase {
    /// Rows of flexible items chained left to right, each row hung below the previous one and
    /// every row end tied to the layout so the program has one cycle per row.
    fn build(&self) -> AnchorLayout<SizedItem> {
        let mut layout = AnchorLayout::with_options(LayoutOptions {
            simplify: self.simplify,
            ..Default::default()
        });
        let mut above: Vec<ItemRef> = vec![ItemRef::Layout; self.columns];

        for row in 0..self.rows {
            let mut previous = ItemRef::Layout;
            for column in 0..self.columns {
                let grow = ((row * 7 + column * 3) % 5) as f64;
                let item = layout.add_item(SizedItem::new(
                    Size::new(10.0 + grow, 8.0),
                    Size::new(30.0 + grow * 4.0, 16.0),
                    Size::new(90.0 + grow * 10.0, 24.0),
                ));
                let item = ItemRef::Item(item);
                let (edge, spacing) = match previous {
                    ItemRef::Layout => (Edge::Left, None),
                    ItemRef::Item(_) => (Edge::Right, Some(4.0)),
                };
                let _ = layout.add_anchor(previous, edge, item, Edge::Left, spacing);

                let (edge, spacing) = match above[column] {
                    ItemRef::Layout => (Edge::Top, None),
                    ItemRef::Item(_) => (Edge::Bottom, Some(2.0)),
                };
                let _ = layout.add_anchor(above[column], edge, item, Edge::Top, spacing);

                previous = item;
                above[column] = item;
            }
            let _ = layout.add_anchor(previous, Edge::Right, ItemRef::Layout, Edge::Right, None);
        }
        for item in above {
            let _ = layout.add_anchor(item, Edge::Bottom, ItemRef::Layout, Edge::Bottom, None);
        }
        layout
    }
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    group.measurement_time(Duration::from_secs(10));

    let cases = [
        ("grid_3x3", 3usize, 3usize),
        ("grid_8x6", 8usize, 6usize),
        ("grid_16x10", 16usize, 10usize),
    ];

    for (name, rows, columns) in cases {
        for simplify in [true, false] {
            let case = GridCase {
                rows,
                columns,
                simplify,
            };
            let id = if simplify { "simplified" } else { "raw" };
            group.bench_with_input(BenchmarkId::new(id, name), &case, |b, case| {
                b.iter_batched(
                    || case.build(),
                    |mut layout| {
                        layout.set_geometry(black_box(Rect::new(0.0, 0.0, 800.0, 600.0)));
                        black_box(layout.has_conflicts());
                    },
                    BatchSize::LargeInput,
                )
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);
