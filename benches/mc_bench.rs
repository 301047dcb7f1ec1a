use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ferric_portfolio::core::PricingEngine;
use ferric_portfolio::engines::{MonteCarloPricer, RectangleRulePricer};
use ferric_portfolio::instruments::{KnockoutOption, MargrabeOption, VanillaOption};
use ferric_portfolio::math::seeded_rng;
use ferric_portfolio::models::StockUniverseModel;
use std::hint::black_box;

// Path generation and single-contract pricing.
// Cost should scale linearly in paths x steps x stocks.

fn bench_path_generation(c: &mut Criterion) {
    let model = StockUniverseModel::create_test_model();
    let mut group = c.benchmark_group("path_generation");

    for paths in [1_000, 10_000, 50_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(paths), paths, |b, &paths| {
            b.iter(|| {
                let mut rng = seeded_rng(42);
                let sim = model
                    .generate_risk_neutral_price_paths(1.0, black_box(paths), 12, &mut rng)
                    .expect("simulation should succeed");
                black_box(sim.n_paths())
            })
        });
    }

    group.finish();
}

fn bench_mc_contracts(c: &mut Criterion) {
    let model = StockUniverseModel::create_test_model();
    let pricer = MonteCarloPricer::new(20_000, 50).with_seed(42);
    let vanilla = VanillaOption::european_call("Acme", 100.0, 1.0);
    let knockout = KnockoutOption::builder()
        .stock("Acme")
        .call()
        .strike(100.0)
        .maturity(1.0)
        .up_and_out(130.0)
        .build()
        .expect("benchmark knock-out should be valid");
    let margrabe = MargrabeOption::new("Bigbank", "Acme", 1.0);
    let mut group = c.benchmark_group("mc_contracts");

    group.bench_function("vanilla", |b| {
        b.iter(|| black_box(pricer.price(black_box(&vanilla), &model).unwrap()))
    });
    group.bench_function("knockout", |b| {
        b.iter(|| black_box(pricer.price(black_box(&knockout), &model).unwrap()))
    });
    group.bench_function("margrabe", |b| {
        b.iter(|| black_box(pricer.price(black_box(&margrabe), &model).unwrap()))
    });

    group.finish();
}

fn bench_rectangle_rule(c: &mut Criterion) {
    let model = StockUniverseModel::create_test_model();
    let option = VanillaOption::european_call("Acme", 100.0, 1.0);
    let mut group = c.benchmark_group("rectangle_rule");

    for steps in [250, 1_000, 4_000].iter() {
        let pricer = RectangleRulePricer::new(*steps);
        group.bench_with_input(BenchmarkId::from_parameter(steps), steps, |b, _| {
            b.iter(|| black_box(pricer.price(black_box(&option), &model).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_path_generation,
    bench_mc_contracts,
    bench_rectangle_rule
);
criterion_main!(benches);
