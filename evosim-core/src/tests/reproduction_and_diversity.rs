use super::support::*;
use super::*;

#[test]
fn empty_survivor_set_is_reseeded_with_random_genomes() {
    let mut rng = seeded_rng(42);
    let pool = reproduce(&[], 10, 4, 0.001, &mut rng);

    assert_eq!(pool.len(), 10);
    assert!(pool.iter().all(|genome| genome.len() == 4));
    assert!(pool.iter().any(|genome| genome != &pool[0]));
}

#[test]
fn lone_survivor_without_mutation_clones_itself() {
    let mut rng = seeded_rng(1);
    let survivor = random_genome(6, &mut rng);
    let pool = reproduce(std::slice::from_ref(&survivor), 25, 6, 0.0, &mut rng);

    assert_eq!(pool.len(), 25);
    assert!(pool.iter().all(|genome| genome == &survivor));
}

#[test]
fn children_without_mutation_are_spliced_from_parent_genes() {
    let mut rng = seeded_rng(2);
    let zeros = zero_genome(5);
    let ones = complement(&zeros);
    let pool = reproduce(&[zeros, ones], 200, 5, 0.0, &mut rng);

    assert_eq!(pool.len(), 200);
    for child in &pool {
        assert_eq!(child.len(), 5);
        assert!(child
            .genes()
            .iter()
            .all(|gene| gene.0 == 0 || gene.0 == u32::MAX));
    }
    let mixed = pool.iter().filter(|child| {
        child.genes().iter().any(|gene| gene.0 == 0) && child.genes().iter().any(|gene| gene.0 != 0)
    });
    assert!(mixed.count() > 0, "some children should mix both parents");
}

#[test]
fn reproduction_preserves_genome_length_under_mutation() {
    let mut rng = seeded_rng(3);
    let survivors: Vec<Genome> = (0..7).map(|_| random_genome(16, &mut rng)).collect();
    let pool = reproduce(&survivors, 100, 16, 0.01, &mut rng);

    assert_eq!(pool.len(), 100);
    assert!(pool.iter().all(|genome| genome.len() == 16));
}

#[test]
fn diversity_is_zero_with_fewer_than_two_genomes() {
    let mut rng = seeded_rng(4);
    let genome = random_genome(4, &mut rng);
    assert_eq!(diversity(&[], &mut rng), 0.0);
    assert_eq!(diversity(&[&genome], &mut rng), 0.0);
}

#[test]
fn diversity_spans_identical_to_complementary() {
    let mut rng = seeded_rng(5);
    let genome = random_genome(8, &mut rng);
    let opposite_genome = complement(&genome);

    assert_eq!(diversity(&[&genome, &genome, &genome], &mut rng), 0.0);
    assert_eq!(diversity(&[&genome, &opposite_genome], &mut rng), 1.0);
}

#[test]
fn diversity_of_large_sets_is_sampled_deterministically() {
    let mut rng = seeded_rng(6);
    let genomes: Vec<Genome> = (0..100).map(|_| random_genome(16, &mut rng)).collect();
    let refs: Vec<&Genome> = genomes.iter().collect();

    let first = diversity(&refs, &mut seeded_rng(9));
    let second = diversity(&refs, &mut seeded_rng(9));

    assert_eq!(first, second);
    // Independent random genomes differ in about half their bits.
    assert!((0.4..0.6).contains(&first), "diversity {first}");
}
