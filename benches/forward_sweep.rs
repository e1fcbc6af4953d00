use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use layered_em::prelude::*;

fn loop_survey() -> Survey {
    let source = SourceGeometry::circular_loop(R3::new(0.0, 0.0, 30.0), 13.0).unwrap();
    let receivers = [
        Receiver::new(R3::new(0.0, 0.0, 30.0), Orientation::Z, Component::Both),
        Receiver::new(R3::new(25.0, 0.0, 30.0), Orientation::Z, Component::Both),
    ];
    let freqs = logspace_hz(1.0e1, 1.0e5, 61).unwrap();
    Survey::frequency_sweep(&source, &freqs, &receivers).unwrap()
}

fn bench_forward_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_sweep");
    let thicknesses = vec![5.0, 10.0, 20.0];
    let model = [0.01, 0.1, 0.02, 0.005];

    for parallel in [false, true] {
        let config = SimulationConfig::new("bench").with_parallel(parallel);
        let simulation = Simulation1DLayered::new(loop_survey(), thicknesses.clone(), IdentityMap, config).unwrap();
        let label = if parallel { "parallel" } else { "serial" };
        group.bench_function(BenchmarkId::new(label, simulation.n_data()), |b| {
            b.iter_batched(
                || model,
                |m| black_box(simulation.predict(&m).unwrap()),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_forward_sweep);
criterion_main!(benches);
