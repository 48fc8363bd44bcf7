use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use machina_catalog::{Distribution, MaterialProperty, Support};
use machina_types::config::{SamplingMethod, SensitivityMethod};
use machina_types::error::MachinaResult;
use machina_uq::{FnModel, ResolvedInput, UqConfig, UqEngine};
use std::hint::black_box;

fn inputs(d: usize) -> Vec<ResolvedInput> {
    (0..d)
        .map(|i| ResolvedInput {
            name: format!("x{i}"),
            property: MaterialProperty {
                name: format!("x{i}"),
                unit: "-".into(),
                nominal: 1.0,
                distribution: Distribution::Normal { mean: 1.0, std_dev: 0.1 },
                support: Some(Support { lower: 0.6, upper: 1.4 }),
                citation: "bench".into(),
            },
        })
        .collect()
}

fn bench_sampling(c: &mut Criterion) {
    let model = FnModel::new(&["y"], |x: &[f64]| -> MachinaResult<Vec<f64>> {
        Ok(vec![x.iter().enumerate().map(|(i, v)| (i + 1) as f64 * v * v).sum()])
    });
    let inputs = inputs(4);

    let mut group = c.benchmark_group("uq_4_inputs_1024_samples");
    for method in [SamplingMethod::MonteCarlo, SamplingMethod::LatinHypercube] {
        let engine = UqEngine::new(UqConfig {
            samples: 1024,
            method,
            sensitivity: SensitivityMethod::None,
            checkpoint_interval: 128,
            seed: 7,
        })
        .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(format!("{method:?}")), &engine, |b, e| {
            b.iter(|| black_box(e.run(&inputs, &model).unwrap().outputs[0].mean))
        });
    }
    group.finish();
}

fn bench_sobol(c: &mut Criterion) {
    let model = FnModel::new(&["y"], |x: &[f64]| -> MachinaResult<Vec<f64>> {
        Ok(vec![x[0] * x[1] + x[2]])
    });
    let inputs = inputs(3);
    let engine = UqEngine::new(UqConfig {
        samples: 512,
        method: SamplingMethod::LatinHypercube,
        sensitivity: SensitivityMethod::Sobol,
        checkpoint_interval: 128,
        seed: 7,
    })
    .unwrap();

    let mut group = c.benchmark_group("sobol");
    group.sample_size(20);
    group.bench_function("saltelli_3_inputs_512", |b| {
        b.iter(|| black_box(engine.run(&inputs, &model).unwrap().sensitivity.len()))
    });
    group.finish();
}

criterion_group!(benches, bench_sampling, bench_sobol);
criterion_main!(benches);
