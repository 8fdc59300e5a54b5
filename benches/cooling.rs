use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use halo_cooling::{
    CoolingModel, CoolingRuntime, CoolingTable, EvalContext, GasCooling, InterpolationKind,
    MetallicityTrack, RuntimeConfig, SimulationConfig, Subhalo,
};

fn make_table() -> CoolingTable {
    // 91 temperatures from log T = 4 to 8.5 on 8 metallicity tracks.
    let temps: Vec<f64> = (0..91).map(|i| 4.0 + 0.05 * f64::from(i)).collect();
    let tracks = (0..8)
        .map(|k| {
            let z = 0.005 * f64::from(k);
            let lams = temps
                .iter()
                .map(|t| -22.0 - 0.4 * (t - 5.3).abs() + 0.2 * f64::from(k).sqrt())
                .collect();
            MetallicityTrack::new(z, temps.clone(), lams)
        })
        .collect();
    CoolingTable::from_tracks(tracks).unwrap()
}

fn make_engine(model: CoolingModel) -> GasCooling {
    let mut config = SimulationConfig::from_json_str(r#"{"agn_feedback": {"model": "galform", "alpha_cool": 0.6}}"#)
        .unwrap();
    config.gas_cooling.model = model;
    GasCooling::from_config(&config, &make_table()).unwrap()
}

fn make_halos(n: u32) -> Vec<Subhalo> {
    (0..n)
        .map(|i| {
            let v = 50.0 + f64::from(i % 400);
            Subhalo::central(v, 1e11 + 1e9 * f64::from(i)).with_hot_gas(1e10, 1e8 + 1e5 * f64::from(i))
        })
        .collect()
}

fn bench_interpolation(c: &mut Criterion) {
    let table = make_table();
    let mut group = c.benchmark_group("interpolation");
    for kind in [InterpolationKind::Bilinear, InterpolationKind::Bicubic] {
        let interp = table.interpolator(kind).unwrap();
        group.bench_function(format!("{kind}_get"), |b| {
            let mut x = 4.0;
            b.iter(|| {
                x = if x > 8.4 { 4.0 } else { x + 0.013 };
                black_box(interp.get(black_box(x), black_box(0.017)))
            });
        });
        group.bench_function(format!("{kind}_get_with_context"), |b| {
            let mut ctx = EvalContext::new();
            let mut x = 4.0;
            b.iter(|| {
                x = if x > 8.4 { 4.0 } else { x + 0.013 };
                black_box(interp.get_with(&mut ctx, black_box(x), black_box(0.017)))
            });
        });
    }
    group.finish();
}

fn bench_cooling_rate(c: &mut Criterion) {
    let mut group = c.benchmark_group("cooling_rate");
    for model in [CoolingModel::Croton06, CoolingModel::Benson10] {
        let engine = make_engine(model);
        group.bench_function(model.to_string(), |b| {
            b.iter_batched(
                || Subhalo::central(180.0, 8e11).with_hot_gas(1e10, 2e8),
                |mut halo| black_box(engine.cooling_rate(&mut halo, 0.5, 0.1)),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_runtime_batch(c: &mut Criterion) {
    let runtime = CoolingRuntime::new(make_engine(CoolingModel::Croton06), &RuntimeConfig::default()).unwrap();
    let mut group = c.benchmark_group("runtime");
    group.throughput(Throughput::Elements(1024));
    group.bench_function("cool_batch_1024", |b| {
        b.iter_batched(
            || make_halos(1024),
            |halos| black_box(runtime.cool_batch(halos, 0.5, 0.1).unwrap()),
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_interpolation, bench_cooling_rate, bench_runtime_batch);
criterion_main!(benches);
