use crate::brain::{Brain, SensorInputs};
use crate::genome::{genome_color, similarity};
use crate::grid::neighbor;
use crate::world::World;
use evosim_types::{CreatureId, CreatureSnapshot, Genome, Heading, Rgb, Sensor};
use std::f32::consts::TAU;

const OSCILLATOR_PERIOD_STEPS: f32 = 30.0;
const DENSITY_RADIUS: i32 = 2;
const DENSITY_NORMALIZER: f32 = 8.0;

/// One agent. Position and liveness are only changed through [`World`].
#[derive(Debug, Clone)]
pub struct Creature {
    pub(crate) id: CreatureId,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) genome: Genome,
    pub(crate) brain: Brain,
    pub(crate) alive: bool,
    pub(crate) age: u32,
    pub(crate) heading: Heading,
    pub(crate) oscillator_phase: f32,
    pub(crate) dose: f64,
    pub(crate) color: Rgb,
}

/// Sensor readings for one step plus the oscillator phase to commit if the
/// creature gets to act.
pub(crate) struct Perception {
    pub(crate) inputs: SensorInputs,
    pub(crate) oscillator_phase: f32,
}

impl Creature {
    pub fn new(genome: Genome, max_internal_neurons: u32) -> Self {
        let brain = Brain::from_genome(&genome, max_internal_neurons);
        let color = genome_color(&genome);
        Self {
            id: CreatureId(0),
            x: 0,
            y: 0,
            genome,
            brain,
            alive: true,
            age: 0,
            heading: Heading::East,
            oscillator_phase: 0.0,
            dose: 0.0,
            color,
        }
    }

    pub fn id(&self) -> CreatureId {
        self.id
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn dose(&self) -> f64 {
        self.dose
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn snapshot(&self) -> CreatureSnapshot {
        CreatureSnapshot {
            id: self.id,
            x: self.x,
            y: self.y,
            heading: self.heading,
            color: self.color,
        }
    }

    /// Reads all sensors against `world` without mutating anything. `noise`
    /// is the pre-drawn value for the random sensor.
    pub(crate) fn sense(&self, world: &World, steps_per_generation: u32, noise: f32) -> Perception {
        let width = world.width() as i32;
        let height = world.height() as i32;
        let (x, y) = (self.x, self.y);
        let (dx, dy) = self.heading.offset();
        let (ahead_x, ahead_y) = neighbor((x, y), self.heading);
        let ahead = world
            .occupant_at(ahead_x, ahead_y)
            .and_then(|id| world.creature(id));

        let oscillator_phase =
            (self.oscillator_phase + TAU / OSCILLATOR_PERIOD_STEPS).rem_euclid(TAU);
        let lifetime = steps_per_generation.saturating_sub(1).max(1) as f32;

        let inputs = Sensor::ALL.map(|sensor| match sensor {
            Sensor::LocX => normalized_coordinate(x, width),
            Sensor::LocY => normalized_coordinate(y, height),
            Sensor::Age => ((self.age + 1) as f32 / lifetime).min(1.0),
            Sensor::Random => noise,
            Sensor::Oscillator => (oscillator_phase.sin() + 1.0) * 0.5,
            Sensor::BoundaryDistX => boundary_proximity(x, width),
            Sensor::BoundaryDistY => boundary_proximity(y, height),
            Sensor::PopulationDensity => {
                (world.local_density(x, y, DENSITY_RADIUS) as f32 / DENSITY_NORMALIZER).min(1.0)
            }
            Sensor::PopulationGradientForward => {
                world.forward_density_gradient(x, y, self.heading)
            }
            Sensor::GeneticSimilarityForward => {
                ahead.map_or(0.0, |other| similarity(&self.genome, &other.genome) as f32)
            }
            Sensor::LastMoveX => (dx as f32 + 1.0) * 0.5,
            Sensor::LastMoveY => (dy as f32 + 1.0) * 0.5,
            Sensor::ForwardBlocked => {
                if ahead.is_some() {
                    1.0
                } else {
                    0.0
                }
            }
            Sensor::Constant => 1.0,
        });

        Perception {
            inputs,
            oscillator_phase,
        }
    }
}

fn normalized_coordinate(value: i32, extent: i32) -> f32 {
    value as f32 / (extent - 1).max(1) as f32
}

/// 1 at either wall, 0 at the centre.
fn boundary_proximity(value: i32, extent: i32) -> f32 {
    let nearest = value.min(extent - 1 - value) as f32;
    1.0 - nearest / (extent as f32 / 2.0)
}
