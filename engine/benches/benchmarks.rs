//! Performance benchmarks for kanban-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kanban_engine::{
    reorder, Board, BoardSnapshot, BoardStore, Card, MoveIntent, Reconciler, Section, SyncOutcome,
};

/// A board with `sections` sections of `cards` cards each.
fn create_test_board(sections: i64, cards: i64) -> Board {
    let mut board = Board::new(1, "Bench");
    for s in 0..sections {
        let section_cards = (0..cards)
            .map(|c| Card::new(s * cards + c, format!("card {}", c), c as usize))
            .collect();
        board = board.with_section(
            Section::new(1_000_000 + s, format!("section {}", s), s as usize)
                .with_cards(section_cards),
        );
    }
    board
}

fn bench_reorder(c: &mut Criterion) {
    let mut group = c.benchmark_group("reorder");

    for size in [10usize, 100, 1000].iter() {
        let items: Vec<usize> = (0..*size).collect();
        group.bench_with_input(BenchmarkId::new("move_item", size), size, |b, &size| {
            b.iter(|| reorder::move_item(black_box(&items), 0, size - 1))
        });
    }

    group.finish();
}

fn bench_store_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_moves");

    for size in [10i64, 100, 500].iter() {
        group.bench_with_input(BenchmarkId::new("card_across", size), size, |b, &size| {
            let mut store = BoardStore::new(create_test_board(5, size));
            let (a, z) = (1_000_000, 1_000_004);
            let mut flip = false;
            b.iter(|| {
                flip = !flip;
                let (from, to) = if flip { (a, z) } else { (z, a) };
                store.apply_card_move(black_box(0), from, to, 0)
            })
        });

        group.bench_with_input(BenchmarkId::new("section", size), size, |b, &size| {
            let mut store = BoardStore::new(create_test_board(size, 3));
            b.iter(|| store.apply_section_move(black_box(1_000_000), (size - 1) as usize))
        });
    }

    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    group.bench_function("begin_resolve_confirm", |b| {
        let mut store = BoardStore::new(create_test_board(5, 50));
        let mut reconciler = Reconciler::new();
        b.iter(|| {
            let ticket = reconciler
                .begin(&mut store, MoveIntent::card(0, 1_000_000, 1_000_000, 0, 49))
                .unwrap();
            reconciler.resolve(&mut store, ticket, SyncOutcome::confirmed());
            let ticket = reconciler
                .begin(&mut store, MoveIntent::card(0, 1_000_000, 1_000_000, 49, 0))
                .unwrap();
            reconciler.resolve(&mut store, ticket, SyncOutcome::confirmed())
        })
    });

    group.bench_function("begin_resolve_revert", |b| {
        let mut store = BoardStore::new(create_test_board(5, 50));
        let mut reconciler = Reconciler::new();
        b.iter(|| {
            let ticket = reconciler
                .begin(&mut store, MoveIntent::card(0, 1_000_000, 1_000_003, 0, 10))
                .unwrap();
            reconciler.resolve(
                &mut store,
                ticket,
                SyncOutcome::failed(kanban_engine::RemoteFailure::NotFound),
            )
        })
    });

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for size in [10i64, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("export", size), size, |b, &size| {
            let store = BoardStore::new(create_test_board(5, size));
            b.iter(|| store.export_snapshot().to_json())
        });

        group.bench_with_input(BenchmarkId::new("import", size), size, |b, &size| {
            let store = BoardStore::new(create_test_board(5, size));
            let json = store.export_snapshot().to_json().unwrap();
            b.iter(|| {
                let snapshot = BoardSnapshot::from_json(black_box(&json)).unwrap();
                let mut target = BoardStore::default();
                target.import_snapshot(snapshot)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_reorder,
    bench_store_moves,
    bench_reconcile,
    bench_snapshot
);
criterion_main!(benches);
