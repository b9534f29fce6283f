use super::*;
use std::collections::HashSet;

pub(super) fn test_config(width: u32, height: u32, population: u32) -> WorldConfig {
    WorldConfig {
        world_width: width,
        world_height: height,
        population,
        max_generations: 3,
        steps_per_generation: 10,
        genome_length: 4,
        max_internal_neurons: 2,
        mutation_rate: 0.001,
        kill_enabled: false,
        seed: None,
        selection: SelectionMode::East,
    }
}

pub(super) fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

pub(super) fn connection(
    source_kind: SourceKind,
    source_id: u8,
    sink_kind: SinkKind,
    sink_id: u8,
    weight: f32,
) -> Connection {
    Connection {
        source_kind,
        source_id,
        sink_kind,
        sink_id,
        weight,
    }
}

/// A connection from a sensor straight into an action.
pub(super) fn reflex(sensor: Sensor, action: Action, weight: f32) -> Connection {
    connection(
        SourceKind::Sensor,
        sensor as u8,
        SinkKind::Action,
        action as u8,
        weight,
    )
}

pub(super) fn genome_of(connections: &[Connection]) -> Genome {
    Genome(connections.iter().map(encode_gene).collect())
}

pub(super) fn zero_genome(length: usize) -> Genome {
    Genome(vec![Gene(0); length])
}

pub(super) fn complement(genome: &Genome) -> Genome {
    Genome(genome.genes().iter().map(|gene| Gene(!gene.0)).collect())
}

pub(super) fn idle_creature() -> Creature {
    Creature::new(zero_genome(4), 2)
}

/// An otherwise empty world holding idle creatures at `positions`, in order.
pub(super) fn world_with(width: u32, height: u32, positions: &[(i32, i32)]) -> (World, Vec<CreatureId>) {
    let mut world = World::new(width, height);
    let ids = positions
        .iter()
        .map(|&(x, y)| {
            world
                .place_at(idle_creature(), x, y)
                .expect("test placement should land on an empty cell")
        })
        .collect();
    (world, ids)
}

/// A simulation whose world is replaced by hand-placed creatures.
pub(super) fn sim_with_creatures(
    cfg: WorldConfig,
    seed: u64,
    placements: Vec<(Genome, i32, i32, Heading)>,
) -> (Simulation, Vec<CreatureId>) {
    let max_internal_neurons = cfg.max_internal_neurons;
    let mut sim = Simulation::new(cfg, seed).expect("simulation should initialize");
    sim.world = World::new(sim.config.world_width, sim.config.world_height);
    let ids = placements
        .into_iter()
        .map(|(genome, x, y, heading)| {
            let id = sim
                .world
                .place_at(Creature::new(genome, max_internal_neurons), x, y)
                .expect("test placement should land on an empty cell");
            sim.world.set_heading(id, heading);
            id
        })
        .collect();
    (sim, ids)
}

/// Every occupied cell names a living creature standing on it, and no two
/// living creatures share a cell.
pub(super) fn assert_grid_consistent(world: &World) {
    let mut occupied = 0;
    for y in 0..world.height() as i32 {
        for x in 0..world.width() as i32 {
            if let Some(id) = world.occupant_at(x, y) {
                occupied += 1;
                let creature = world.creature(id).expect("occupant must exist");
                assert!(creature.is_alive(), "cell ({x}, {y}) holds a dead creature");
                assert_eq!(creature.position(), (x, y));
            }
        }
    }

    let living: Vec<(i32, i32)> = world
        .creatures()
        .iter()
        .filter(|creature| creature.is_alive())
        .map(Creature::position)
        .collect();
    let distinct: HashSet<(i32, i32)> = living.iter().copied().collect();
    assert_eq!(distinct.len(), living.len(), "two creatures share a cell");
    assert_eq!(occupied, living.len());
}
