use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dig_chain::core::{find_cluster, settle, Engine, Grid, Rules};
use dig_chain::types::{Cell, Position};

/// 40x10 board whose lower half is striped so most digs cascade.
fn striped_rows() -> Vec<Vec<Cell>> {
    (0..40)
        .map(|row| {
            (0..10)
                .map(|col| if row < 20 { 0 } else { ((row + col / 3) % 4 + 1) as Cell })
                .collect()
        })
        .collect()
}

fn bench_settle(c: &mut Criterion) {
    c.bench_function("settle_half_empty_40x10", |b| {
        b.iter(|| {
            let mut rows = striped_rows();
            // Lift the filled half so every cell has to fall.
            rows.rotate_left(20);
            let mut grid = Grid::from_rows(&rows).unwrap();
            black_box(settle(&mut grid));
        })
    });
}

fn bench_find_cluster(c: &mut Criterion) {
    let grid = Grid::from_rows(&vec![vec![2 as Cell; 10]; 40]).unwrap();
    c.bench_function("find_cluster_full_board", |b| {
        b.iter(|| black_box(find_cluster(&grid, black_box(Position::new(39, 0)), 1)))
    });
}

fn bench_dig_resolution(c: &mut Criterion) {
    let rows = striped_rows();
    c.bench_function("dig_and_chain_40x10", |b| {
        b.iter(|| {
            let mut engine = Engine::from_rows(&rows, Rules::default(), 12345).unwrap();
            engine.refresh_colors();
            engine.initialize_colors();
            let current = engine.colors().current;
            if let Some(col) = (0..10).find(|&col| engine.cell(39, col) == Some(current)) {
                black_box(engine.dig(39, col));
            }
        })
    });
}

fn bench_raise(c: &mut Criterion) {
    let mut engine = Engine::from_rows(&striped_rows(), Rules::default(), 7).unwrap();
    engine.refresh_colors();
    c.bench_function("raise_one_row_40x10", |b| {
        b.iter(|| black_box(engine.raise_one_row()))
    });
}

criterion_group!(
    benches,
    bench_settle,
    bench_find_cluster,
    bench_dig_resolution,
    bench_raise
);
criterion_main!(benches);
