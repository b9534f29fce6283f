use crate::brain::{select_action, ActionOutputs, BrainScratch};
use crate::creature::Creature;
use crate::grid::{neighbor, opposite, rotate_left, rotate_right};
use crate::reproduction::{diversity, reproduce};
use crate::selection::survivors;
use crate::Simulation;
use evosim_types::{
    Action, CreatureId, GenerationReport, GenerationSummary, Genome, Heading, SurvivorTopology,
    WorldSnapshot,
};
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, warn};

/// What a creature decided during the think phase, applied in the act phase.
struct Intent {
    id: CreatureId,
    outputs: ActionOutputs,
    oscillator_phase: f32,
}

impl Simulation {
    /// Runs one full generation: populate, step, select, reproduce.
    pub fn run_generation(&mut self) -> GenerationReport {
        self.run_generation_inner(None)
    }

    /// Like [`Simulation::run_generation`], calling `on_step` with the world
    /// after every step.
    pub fn run_generation_with<F>(&mut self, mut on_step: F) -> GenerationReport
    where
        F: FnMut(&WorldSnapshot),
    {
        self.run_generation_inner(Some(&mut on_step as &mut dyn FnMut(&WorldSnapshot)))
    }

    fn run_generation_inner(
        &mut self,
        mut on_step: Option<&mut dyn FnMut(&WorldSnapshot)>,
    ) -> GenerationReport {
        self.populate_world();

        let steps = self.config.steps_per_generation;
        for step in 0..steps {
            self.step(step);
            if let Some(on_step) = on_step.as_deref_mut() {
                on_step(&self.world.snapshot(self.generation, step + 1));
            }
        }

        self.finish_generation()
    }

    fn populate_world(&mut self) {
        let max_internal_neurons = self.config.max_internal_neurons;
        let creatures: Vec<Creature> = self
            .genome_pool
            .iter()
            .map(|genome| Creature::new(genome.clone(), max_internal_neurons))
            .collect();
        self.world.populate(creatures, &mut self.rng);
    }

    pub(crate) fn step(&mut self, step: u32) {
        let steps = self.config.steps_per_generation;
        let hazard_deaths = self.policy.apply_hazard(&mut self.world, step, steps);
        if hazard_deaths > 0 {
            debug!(
                generation = self.generation,
                step,
                deaths = hazard_deaths,
                "hazard deaths"
            );
        }

        let mut order: Vec<CreatureId> = (0..self.world.creatures().len() as u32)
            .map(CreatureId)
            .collect();
        order.shuffle(&mut self.rng);
        order.retain(|&id| self.world.is_alive(id));

        let noise: Vec<f32> = order.iter().map(|_| self.rng.random::<f32>()).collect();
        let intents = self.think(&order, &noise);

        for intent in intents {
            if !self.world.is_alive(intent.id) {
                continue;
            }
            self.world.advance_clock(intent.id, intent.oscillator_phase);
            if let Some((action, strength)) = select_action(&intent.outputs) {
                self.execute_action(intent.id, action, strength);
            }
        }

        self.world.debug_assert_consistent_state();
    }

    /// Senses and evaluates every brain against the world as it stands at
    /// the start of the step. Output order matches `order`.
    fn think(&self, order: &[CreatureId], noise: &[f32]) -> Vec<Intent> {
        let world = &self.world;
        let steps = self.config.steps_per_generation;
        order
            .par_iter()
            .zip(noise.par_iter())
            .map_init(BrainScratch::new, |scratch, (&id, &sample)| {
                let creature = &world.creatures()[id.0 as usize];
                let perception = creature.sense(world, steps, sample);
                Intent {
                    id,
                    outputs: creature.brain.forward_with(&perception.inputs, scratch),
                    oscillator_phase: perception.oscillator_phase,
                }
            })
            .collect()
    }

    fn execute_action(&mut self, id: CreatureId, action: Action, strength: f32) {
        let Some(creature) = self.world.creature(id) else {
            return;
        };
        let heading = creature.heading;
        let position = creature.position();

        match action {
            Action::MoveX => {
                let dx = if strength > 0.0 { 1 } else { -1 };
                self.world.move_creature(id, dx, 0);
            }
            Action::MoveY => {
                let dy = if strength > 0.0 { 1 } else { -1 };
                self.world.move_creature(id, 0, dy);
            }
            Action::MoveRandom => {
                let direction = Heading::ALL[self.rng.random_range(0..Heading::ALL.len())];
                let (dx, dy) = direction.offset();
                self.world.move_creature(id, dx, dy);
            }
            Action::MoveForward => self.step_towards(id, heading),
            Action::TurnLeft => self.step_towards(id, rotate_left(heading)),
            Action::TurnRight => self.step_towards(id, rotate_right(heading)),
            Action::Reverse => self.step_towards(id, opposite(heading)),
            Action::Strike => {
                if self.config.kill_enabled {
                    let (x, y) = neighbor(position, heading);
                    self.world.kill_at(x, y);
                }
            }
        }
    }

    /// Turns to `heading` and tries one step that way. The turn sticks even
    /// when the step is blocked.
    fn step_towards(&mut self, id: CreatureId, heading: Heading) {
        self.world.set_heading(id, heading);
        let (dx, dy) = heading.offset();
        self.world.move_creature(id, dx, dy);
    }

    fn finish_generation(&mut self) -> GenerationReport {
        let survivor_ids = survivors(self.policy.as_ref(), &self.world);
        let survivor_creatures: Vec<&Creature> = survivor_ids
            .iter()
            .filter_map(|&id| self.world.creature(id))
            .collect();
        let survivor_genomes: Vec<&Genome> = survivor_creatures
            .iter()
            .map(|creature| &creature.genome)
            .collect();

        let population = self.world.creatures().len() as u32;
        let survivor_count = survivor_genomes.len() as u32;
        let summary = GenerationSummary {
            generation: self.generation,
            population,
            survivors: survivor_count,
            alive: self.world.living_count() as u32,
            survival_pct: 100.0 * f64::from(survivor_count) / f64::from(population.max(1)),
            diversity: diversity(&survivor_genomes, &mut self.rng),
            murders: self.world.murders(),
        };
        let best_survivor = best_survivor(&survivor_creatures);
        let snapshot = self
            .world
            .snapshot(self.generation, self.config.steps_per_generation);

        if survivor_genomes.is_empty() {
            warn!(
                generation = self.generation,
                "no survivors, reseeding the next generation with random genomes"
            );
        }
        let parents: Vec<Genome> = survivor_genomes.into_iter().cloned().collect();
        self.genome_pool = reproduce(
            &parents,
            self.config.population as usize,
            self.config.genome_length as usize,
            self.config.mutation_rate,
            &mut self.rng,
        );

        debug!(
            generation = summary.generation,
            survivors = summary.survivors,
            survival_pct = summary.survival_pct,
            diversity = summary.diversity,
            murders = summary.murders,
            "generation complete"
        );
        self.generation += 1;

        GenerationReport {
            summary,
            snapshot,
            best_survivor,
        }
    }
}

/// The survivor with the most connections, first one on ties.
pub(crate) fn best_survivor(candidates: &[&Creature]) -> Option<SurvivorTopology> {
    let mut best: Option<&Creature> = None;
    for &creature in candidates {
        let is_better = best.map_or(true, |current| {
            creature.brain.connection_count() > current.brain.connection_count()
        });
        if is_better {
            best = Some(creature);
        }
    }
    best.map(|creature| SurvivorTopology {
        id: creature.id,
        genome: creature.genome.clone(),
        connections: creature.brain.connections().to_vec(),
    })
}
