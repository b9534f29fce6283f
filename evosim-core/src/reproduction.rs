use crate::genome::{crossover, mutate, random_genome, similarity};
use evosim_types::Genome;
use rand::seq::index::sample;
use rand::Rng;

/// Upper bound on genomes compared when estimating diversity.
pub const DIVERSITY_SAMPLE_CAP: usize = 30;

/// Builds the next generation's genome pool. Parents are drawn uniformly with
/// replacement, so one survivor can parent many children (and pair with
/// itself). With no survivors the pool is reseeded with random genomes.
pub fn reproduce<R: Rng + ?Sized>(
    survivors: &[Genome],
    target_size: usize,
    genome_length: usize,
    mutation_rate: f64,
    rng: &mut R,
) -> Vec<Genome> {
    if survivors.is_empty() {
        return (0..target_size)
            .map(|_| random_genome(genome_length, rng))
            .collect();
    }

    let mut pool = Vec::with_capacity(target_size);
    while pool.len() < target_size {
        let parent_a = &survivors[rng.random_range(0..survivors.len())];
        let parent_b = &survivors[rng.random_range(0..survivors.len())];
        let child = crossover(parent_a, parent_b, rng);
        pool.push(mutate(&child, mutation_rate, rng));
    }
    pool
}

/// Mean pairwise dissimilarity over a sample of at most
/// [`DIVERSITY_SAMPLE_CAP`] genomes drawn without replacement.
pub fn diversity<R: Rng + ?Sized>(genomes: &[&Genome], rng: &mut R) -> f64 {
    if genomes.len() < 2 {
        return 0.0;
    }
    let amount = genomes.len().min(DIVERSITY_SAMPLE_CAP);
    let picked: Vec<&Genome> = sample(rng, genomes.len(), amount)
        .iter()
        .map(|idx| genomes[idx])
        .collect();

    let mut total = 0.0;
    let mut pairs = 0_u32;
    for (i, a) in picked.iter().enumerate() {
        for b in &picked[i + 1..] {
            total += 1.0 - similarity(a, b);
            pairs += 1;
        }
    }
    total / f64::from(pairs)
}
