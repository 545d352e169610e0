use criterion::{black_box, criterion_group, criterion_main, Criterion};
use roi_calculator::{
    recompute, AdType, CalculatorSession, CostParams, InputField, MonetizationParams,
    TrafficParams,
};

fn benchmark_recompute(c: &mut Criterion) {
    let traffic = TrafficParams::default();
    let costs = CostParams::default();
    let cpm = MonetizationParams::default();
    let cpc = MonetizationParams {
        ad_type: AdType::Cpc,
        ..cpm
    };

    c.bench_function("recompute_cpm", |b| {
        b.iter(|| black_box(recompute(black_box(&traffic), &costs, &cpm)));
    });

    c.bench_function("recompute_cpc", |b| {
        b.iter(|| black_box(recompute(black_box(&traffic), &costs, &cpc)));
    });
}

fn benchmark_slider_drag(c: &mut Criterion) {
    c.bench_function("session_fill_rate_drag", |b| {
        let mut session = CalculatorSession::default();

        b.iter(|| {
            // One full slider sweep, recomputing on every tick
            for fill_rate in 50..=100 {
                session.set_field(InputField::FillRate, fill_rate as f64);
            }
            black_box(session.results().net_profit)
        });
    });
}

criterion_group!(benches, benchmark_recompute, benchmark_slider_drag);
criterion_main!(benches);
