use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dom::{scroll_parent, DomArena, NodeId, Viewport};

fn deep_document(depth: usize) -> (DomArena, NodeId) {
    let mut arena = DomArena::with_document(Viewport::default());
    let mut current = arena.body().expect("document has a body");
    for _ in 0..depth {
        let child = arena.create_element("div");
        arena
            .append_child(current, child)
            .expect("fresh node appends");
        current = child;
    }
    (arena, current)
}

fn bench_tree_walk(c: &mut Criterion) {
    let (arena, leaf) = deep_document(10_000);

    c.bench_function("is_attached/depth_10k", |b| {
        b.iter(|| arena.is_attached(black_box(leaf)))
    });

    c.bench_function("scroll_parent/depth_10k", |b| {
        b.iter(|| scroll_parent(&arena, black_box(leaf)))
    });

    c.bench_function("find_by_id/miss", |b| {
        b.iter(|| arena.find_by_id(black_box("missing"), None))
    });
}

criterion_group!(benches, bench_tree_walk);
criterion_main!(benches);
