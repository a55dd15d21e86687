//! Criterion benchmarks for the TSP genetic algorithm.
//!
//! Uses random uniform instances to measure operator and loop overhead.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_tsp_ga::distance::{DistanceModel, EdgeWeight};
use u_tsp_ga::ga::operators::{greedy_crossover, segment_swap_mutation, stochastic_tour};
use u_tsp_ga::ga::{initialize_run, Fallback, RunConfig};
use u_tsp_ga::random::create_rng;

fn uniform_cities(n: usize, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = create_rng(seed);
    (0..n)
        .map(|_| (rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0)))
        .collect()
}

// ===========================================================================
// Operators
// ===========================================================================

fn bench_operators(c: &mut Criterion) {
    let mut group = c.benchmark_group("operators");

    for &n in &[48usize, 101, 280] {
        let model = DistanceModel::new(uniform_cities(n, 1), EdgeWeight::Euc2d)
            .expect("finite coordinates");
        let mut rng = create_rng(42);
        let p1 = stochastic_tour(&model, 1, &mut rng);
        let p2 = stochastic_tour(&model, 1, &mut rng);

        group.bench_with_input(BenchmarkId::new("stochastic_init", n), &model, |b, m| {
            let mut rng = create_rng(7);
            b.iter(|| black_box(stochastic_tour(black_box(m), 1, &mut rng)))
        });

        group.bench_with_input(
            BenchmarkId::new("greedy_crossover", n),
            &(&model, &p1, &p2),
            |b, (m, p1, p2)| {
                let mut rng = create_rng(7);
                b.iter(|| {
                    black_box(greedy_crossover(
                        black_box(p1),
                        black_box(p2),
                        m,
                        1,
                        Fallback::Nearest,
                        &mut rng,
                    ))
                })
            },
        );

        group.bench_with_input(BenchmarkId::new("segment_swap", n), &p1, |b, p| {
            let mut rng = create_rng(7);
            let mut perm = p.clone();
            b.iter(|| segment_swap_mutation(black_box(&mut perm), 1, &mut rng))
        });
    }
    group.finish();
}

// ===========================================================================
// Full runs
// ===========================================================================

fn bench_evolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolve");
    group.sample_size(10);

    for (n, pop, gen) in [(29usize, 50usize, 50usize), (48, 100, 30), (101, 100, 20)] {
        let coords = uniform_cities(n, 3);
        let config = RunConfig {
            population_size: pop,
            max_generations: gen,
            seed: Some(42),
            ..RunConfig::default()
        };
        group.bench_with_input(
            BenchmarkId::new(format!("n{}_p{}_g{}", n, pop, gen), n),
            &(coords, config),
            |b, (coords, config)| {
                b.iter(|| {
                    let mut run =
                        initialize_run(n, coords.clone(), EdgeWeight::Euc2d, config.clone())
                            .expect("valid instance");
                    black_box(run.evolve().expect("operators keep tours valid"))
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_operators, bench_evolve);
criterion_main!(benches);
