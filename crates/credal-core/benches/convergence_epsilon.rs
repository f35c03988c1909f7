//! Criterion benchmarks for epsilon computation.
//!
//! Measures one bounds update pass plus the parallel epsilon sweep over
//! networks of increasing size, for several worker counts.

use credal_core::convergence::ConvergenceEvaluator;
use credal_core::trackers::BoundsTracker;
use credal_core::NetworkSpec;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn wide_network(nodes: usize, domain: usize) -> NetworkSpec {
    let mut net = NetworkSpec::new();
    for i in 0..nodes {
        net.add_variable(&format!("N{i}"), domain, &[])
            .expect("unique names");
    }
    net
}

fn vertex(node: usize, round: usize, domain: usize) -> Vec<f64> {
    let raw: Vec<f64> = (0..domain)
        .map(|m| 1.0 + ((node * 31 + round * 7 + m * 13) % 23) as f64)
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|v| v / total).collect()
}

fn bench_epsilon(c: &mut Criterion) {
    let mut group = c.benchmark_group("convergence_epsilon");
    let domain = 4;

    for nodes in [64, 1_024, 16_384] {
        let net = wide_network(nodes, domain);
        let samples: Vec<Vec<f64>> = (0..nodes).map(|n| vertex(n, 1, domain)).collect();

        for workers in [1, 4] {
            let evaluator = ConvergenceEvaluator::new(workers).expect("pool");
            let mut bounds = BoundsTracker::new();
            bounds.initialize(&net, workers);

            group.bench_with_input(
                BenchmarkId::new(format!("workers{workers}"), nodes),
                &samples,
                |b, samples| {
                    b.iter(|| {
                        for (node, v) in samples.iter().enumerate() {
                            bounds.update(node, v);
                        }
                        black_box(evaluator.compute(&mut bounds))
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_epsilon);
criterion_main!(benches);
