use evosim_types::{GenerationSummary, Genome, SelectionMode, WorldConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

mod brain;
mod creature;
mod generation;
mod genome;
mod grid;
mod reproduction;
mod selection;
mod world;

#[cfg(test)]
mod tests;

pub use brain::{
    prune_dead_ends, select_action, ActionOutputs, Brain, SensorInputs,
    ACTION_ACTIVATION_THRESHOLD, ACTION_COUNT, SENSOR_COUNT,
};
pub use creature::Creature;
pub use genome::{
    crossover, decode_gene, encode_gene, genome_color, mutate, random_genome, similarity,
};
pub use reproduction::{diversity, reproduce, DIVERSITY_SAMPLE_CAP};
pub use selection::{
    policy_for, CenterDisk, Corners, EastHalf, EdgeStrips, Radiation, SelectionPolicy, WestHalf,
};
pub use world::World;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid world config: {0}")]
    InvalidConfig(String),
    #[error("genome pool must hold {expected} genomes, got {actual}")]
    PoolSize { expected: usize, actual: usize },
    #[error("genome {index} has length {actual}, expected {expected}")]
    GenomeLength {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("failed to serialize world snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A seeded evolutionary run. Owns the world, the genome pool for the next
/// generation and the only random generator the run draws from.
#[derive(Debug)]
pub struct Simulation {
    config: WorldConfig,
    seed: u64,
    rng: ChaCha8Rng,
    generation: u32,
    genome_pool: Vec<Genome>,
    world: World,
    policy: Box<dyn SelectionPolicy>,
}

impl Simulation {
    pub fn new(config: WorldConfig, seed: u64) -> Result<Self, SimError> {
        validate_config(&config)?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let genome_pool = initial_pool(&config, &mut rng);
        let world = World::new(config.world_width, config.world_height);
        let policy = policy_for(&config.selection);

        Ok(Self {
            config,
            seed,
            rng,
            generation: 0,
            genome_pool,
            world,
            policy,
        })
    }

    /// Uses the seed pinned in the config, or a fresh one when none is set.
    pub fn from_config(config: WorldConfig) -> Result<Self, SimError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::new(config, seed)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Index of the next generation to run.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn selection_mode(&self) -> &SelectionMode {
        &self.config.selection
    }

    pub fn policy(&self) -> &dyn SelectionPolicy {
        self.policy.as_ref()
    }

    /// Genomes the next generation will be built from.
    pub fn genome_pool(&self) -> &[Genome] {
        &self.genome_pool
    }

    /// The world as the last step left it.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn is_finished(&self) -> bool {
        self.generation >= self.config.max_generations
    }

    /// Restarts from generation zero, optionally with a new seed.
    pub fn reset(&mut self, seed: Option<u64>) {
        self.seed = seed.unwrap_or(self.seed);
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.generation = 0;
        self.world = World::new(self.config.world_width, self.config.world_height);
        self.genome_pool = initial_pool(&self.config, &mut self.rng);
    }

    /// Replaces the pool the next generation is built from.
    pub fn set_genome_pool(&mut self, pool: Vec<Genome>) -> Result<(), SimError> {
        let expected = self.config.population as usize;
        if pool.len() != expected {
            return Err(SimError::PoolSize {
                expected,
                actual: pool.len(),
            });
        }
        let genome_length = self.config.genome_length as usize;
        if let Some((index, genome)) = pool
            .iter()
            .enumerate()
            .find(|(_, genome)| genome.len() != genome_length)
        {
            return Err(SimError::GenomeLength {
                index,
                expected: genome_length,
                actual: genome.len(),
            });
        }
        self.genome_pool = pool;
        Ok(())
    }

    /// Runs `count` generations and returns their summaries.
    pub fn run(&mut self, count: u32) -> Vec<GenerationSummary> {
        let mut summaries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            summaries.push(self.run_generation().summary);
        }
        summaries
    }

    /// JSON Lines of the world after every step of the next `generations`
    /// generations, for playback.
    pub fn export_steps_jsonl(&mut self, generations: u32) -> Result<Vec<String>, SimError> {
        let mut lines = Vec::new();
        let mut failure = None;
        for _ in 0..generations {
            self.run_generation_with(|snapshot| {
                if failure.is_some() {
                    return;
                }
                match serde_json::to_string(snapshot) {
                    Ok(line) => lines.push(line),
                    Err(err) => failure = Some(err),
                }
            });
            if let Some(err) = failure.take() {
                return Err(err.into());
            }
        }
        Ok(lines)
    }
}

fn initial_pool(config: &WorldConfig, rng: &mut ChaCha8Rng) -> Vec<Genome> {
    (0..config.population)
        .map(|_| random_genome(config.genome_length as usize, rng))
        .collect()
}

fn validate_config(config: &WorldConfig) -> Result<(), SimError> {
    if config.world_width == 0 || config.world_height == 0 {
        return Err(SimError::InvalidConfig(
            "world_width and world_height must be greater than zero".to_owned(),
        ));
    }
    if config.population == 0 {
        return Err(SimError::InvalidConfig(
            "population must be greater than zero".to_owned(),
        ));
    }
    let capacity = u64::from(config.world_width) * u64::from(config.world_height);
    if capacity < u64::from(config.population) {
        return Err(SimError::InvalidConfig(format!(
            "population {} does not fit a {}x{} world",
            config.population, config.world_width, config.world_height
        )));
    }
    if config.steps_per_generation == 0 {
        return Err(SimError::InvalidConfig(
            "steps_per_generation must be >= 1".to_owned(),
        ));
    }
    if config.genome_length == 0 {
        return Err(SimError::InvalidConfig(
            "genome_length must be >= 1".to_owned(),
        ));
    }
    if !config.mutation_rate.is_finite() || !(0.0..=1.0).contains(&config.mutation_rate) {
        return Err(SimError::InvalidConfig(
            "mutation_rate must be within [0, 1]".to_owned(),
        ));
    }
    if let SelectionMode::Radiation {
        decay_rate,
        dose_rate,
        lethal_dose,
    } = config.selection
    {
        if [decay_rate, dose_rate, lethal_dose]
            .iter()
            .any(|value| !value.is_finite() || *value < 0.0)
        {
            return Err(SimError::InvalidConfig(
                "radiation parameters must be finite and non-negative".to_owned(),
            ));
        }
        if lethal_dose <= 0.0 {
            return Err(SimError::InvalidConfig(
                "radiation lethal_dose must be greater than zero".to_owned(),
            ));
        }
    }
    Ok(())
}
