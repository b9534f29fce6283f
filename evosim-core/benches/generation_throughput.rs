use criterion::{black_box, criterion_group, criterion_main, Criterion};
use evosim_core::Simulation;
use evosim_types::{SelectionMode, WorldConfig};

fn stable_perf_config() -> WorldConfig {
    WorldConfig {
        world_width: 128,
        world_height: 128,
        population: 1_000,
        max_generations: u32::MAX,
        steps_per_generation: 300,
        genome_length: 16,
        max_internal_neurons: 4,
        mutation_rate: 0.001,
        kill_enabled: true,
        seed: None,
        selection: SelectionMode::East,
    }
}

fn bench_single_generation(c: &mut Criterion) {
    let config = stable_perf_config();
    c.bench_function(
        "generation throughput / 1 generation (1000 creatures, 300 steps, seed 42)",
        |b| {
            b.iter_batched(
                || Simulation::new(config.clone(), 42).expect("simulation init"),
                |mut sim| black_box(sim.run_generation()),
                criterion::BatchSize::SmallInput,
            );
        },
    );
}

fn bench_radiation_generation(c: &mut Criterion) {
    let mut config = stable_perf_config();
    config.selection = SelectionMode::radiation();
    c.bench_function(
        "generation throughput / 1 radiation generation (seed 42)",
        |b| {
            b.iter_batched(
                || Simulation::new(config.clone(), 42).expect("simulation init"),
                |mut sim| black_box(sim.run_generation()),
                criterion::BatchSize::SmallInput,
            );
        },
    );
}

criterion_group!(benches, bench_single_generation, bench_radiation_generation);
criterion_main!(benches);
