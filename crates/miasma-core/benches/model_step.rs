use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use miasma_core::generation::standard_ward;
use miasma_core::prelude::*;
use miasma_logic::{Cell, PathPlanner};
use std::time::Duration;

fn bench_model_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_step");
    let samples: usize = std::env::var("MIASMA_BENCH_SAMPLES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(30);
    group.sample_size(samples);
    group.measurement_time(Duration::from_secs(5));
    // Ticks per bench iteration
    let ticks: u64 = std::env::var("MIASMA_BENCH_TICKS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(32);

    for population in [100_u32, 400, 1600] {
        group.bench_with_input(
            BenchmarkId::new(format!("ward_{ticks}_ticks"), population),
            &population,
            |b, &population| {
                b.iter_batched(
                    || {
                        let map = standard_ward(true).expect("ward layout");
                        let config = SimConfig::new(population, population / 50 + 1, 0.8, 0.02)
                            .with_seed(0xBEEF);
                        SimulationEngine::new(map, config).expect("engine")
                    },
                    |mut engine| {
                        for _ in 0..ticks {
                            std::hint::black_box(engine.model_step());
                        }
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }
    group.finish();
}

fn bench_find_path(c: &mut Criterion) {
    let map = standard_ward(false).expect("ward layout");
    let mut group = c.benchmark_group("find_path");
    for heuristic in [HeuristicKind::Euclidean, HeuristicKind::Zero] {
        let planner = PathPlanner::new(heuristic);
        group.bench_function(format!("{heuristic:?}_corner_to_corner"), |b| {
            b.iter(|| {
                std::hint::black_box(
                    planner.find_path(map.graph(), Cell::new(0, 0), Cell::new(49, 49)),
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_model_step, bench_find_path);
criterion_main!(benches);
