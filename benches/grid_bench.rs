use criterion::{criterion_group, criterion_main, Criterion};
use pitchspell::cost::AccidCost;
use pitchspell::grid::{ExhaustiveDp, ExhaustiveSearch, GreedyBest, GreedyRank, GridBuilder};
use pitchspell::{CostColumn, SpellingTable, TonalityCatalog};
use std::hint::black_box;

fn setup_table(catalog: &TonalityCatalog, bars: usize) -> SpellingTable<CostColumn<AccidCost>> {
    let mut rng = fastrand::Rng::with_seed(7);
    let columns = (0..bars)
        .map(|j| {
            if j % 9 == 4 {
                CostColumn::empty(catalog.len())
            } else {
                CostColumn::from_costs(
                    (0..catalog.len())
                        .map(|_| AccidCost::new(rng.u32(0..12)))
                        .collect(),
                )
            }
        })
        .collect();
    SpellingTable::new(columns, catalog).expect("Failed to build table")
}

fn criterion_benchmark(c: &mut Criterion) {
    let tonal = TonalityCatalog::preset(30).expect("Failed to build catalog");
    let modal = TonalityCatalog::preset(135).expect("Failed to build catalog");
    let t30 = setup_table(&tonal, 64);
    let t135 = setup_table(&modal, 64);

    c.bench_function("greedy_best row (30 keys, 64 bars)", |b| {
        b.iter(|| GreedyBest.build_row(black_box(&t30), &tonal, Some(0)))
    });
    c.bench_function("greedy_rank row (30 keys, 64 bars)", |b| {
        b.iter(|| GreedyRank.build_row(black_box(&t30), &tonal, Some(0)))
    });
    c.bench_function("exhaustive_dp row (30 keys, 64 bars)", |b| {
        b.iter(|| ExhaustiveDp.build_row(black_box(&t30), &tonal, Some(0)))
    });
    c.bench_function("exhaustive_search row (30 keys, 64 bars)", |b| {
        b.iter(|| ExhaustiveSearch.build_row(black_box(&t30), &tonal, Some(0)))
    });
    c.bench_function("exhaustive_dp row (135 keys, 64 bars)", |b| {
        b.iter(|| ExhaustiveDp.build_row(black_box(&t135), &modal, None))
    });
    c.bench_function("catalog close (165 keys)", |b| {
        b.iter(|| TonalityCatalog::preset(black_box(165)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
