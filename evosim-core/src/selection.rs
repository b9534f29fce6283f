use crate::creature::Creature;
use crate::world::World;
use evosim_types::{CreatureId, SelectionMode};
use std::fmt;

/// A survival scenario: which creatures make it to the next generation, and
/// optionally an environmental hazard applied before every step.
pub trait SelectionPolicy: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether a creature's terminal position satisfies the scenario. Dead
    /// creatures are filtered out before this is asked.
    fn survives(&self, creature: &Creature, world: &World) -> bool;

    /// Runs at the start of each step, before anyone senses. Returns the
    /// number of creatures the hazard killed.
    fn apply_hazard(&self, _world: &mut World, _step: u32, _steps_per_generation: u32) -> u32 {
        0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EastHalf;

impl SelectionPolicy for EastHalf {
    fn name(&self) -> &'static str {
        "east"
    }

    fn survives(&self, creature: &Creature, world: &World) -> bool {
        creature.x >= (world.width() / 2) as i32
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WestHalf;

impl SelectionPolicy for WestHalf {
    fn name(&self) -> &'static str {
        "west"
    }

    fn survives(&self, creature: &Creature, world: &World) -> bool {
        creature.x < (world.width() / 2) as i32
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EdgeStrips {
    pub strip_width: u32,
}

impl SelectionPolicy for EdgeStrips {
    fn name(&self) -> &'static str {
        "edge_strips"
    }

    fn survives(&self, creature: &Creature, world: &World) -> bool {
        let strip = self.strip_width as i32;
        creature.x < strip || creature.x >= world.width() as i32 - strip
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Corners {
    pub corner_size: u32,
}

impl SelectionPolicy for Corners {
    fn name(&self) -> &'static str {
        "corners"
    }

    fn survives(&self, creature: &Creature, world: &World) -> bool {
        let size = self.corner_size as i32;
        let in_x_band = creature.x < size || creature.x >= world.width() as i32 - size;
        let in_y_band = creature.y < size || creature.y >= world.height() as i32 - size;
        in_x_band && in_y_band
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CenterDisk {
    pub radius: u32,
}

impl SelectionPolicy for CenterDisk {
    fn name(&self) -> &'static str {
        "center_disk"
    }

    fn survives(&self, creature: &Creature, world: &World) -> bool {
        let dx = i64::from(creature.x) - i64::from(world.width() / 2);
        let dy = i64::from(creature.y) - i64::from(world.height() / 2);
        let radius = i64::from(self.radius);
        dx * dx + dy * dy <= radius * radius
    }
}

/// A radioactive wall: west for the first half of the generation, east for
/// the second. Dose falls off exponentially with distance from the wall.
#[derive(Debug, Clone, Copy)]
pub struct Radiation {
    pub decay_rate: f64,
    pub dose_rate: f64,
    pub lethal_dose: f64,
}

impl Radiation {
    pub fn dose_at(&self, distance_to_wall: i32) -> f64 {
        (-self.decay_rate * f64::from(distance_to_wall)).exp() * self.dose_rate
    }
}

impl SelectionPolicy for Radiation {
    fn name(&self) -> &'static str {
        "radiation"
    }

    fn survives(&self, _creature: &Creature, _world: &World) -> bool {
        true
    }

    fn apply_hazard(&self, world: &mut World, step: u32, steps_per_generation: u32) -> u32 {
        let west_wall_active = step < steps_per_generation / 2;
        let far_edge = world.width() as i32 - 1;
        let exposures: Vec<(CreatureId, f64)> = world
            .creatures()
            .iter()
            .filter(|creature| creature.alive)
            .map(|creature| {
                let distance = if west_wall_active {
                    creature.x
                } else {
                    far_edge - creature.x
                };
                (creature.id, self.dose_at(distance))
            })
            .collect();

        let mut deaths = 0;
        for (id, amount) in exposures {
            if world.accrue_dose(id, amount, self.lethal_dose) {
                deaths += 1;
            }
        }
        deaths
    }
}

pub fn policy_for(mode: &SelectionMode) -> Box<dyn SelectionPolicy> {
    match *mode {
        SelectionMode::East => Box::new(EastHalf),
        SelectionMode::West => Box::new(WestHalf),
        SelectionMode::EdgeStrips { strip_width } => Box::new(EdgeStrips { strip_width }),
        SelectionMode::Corners { corner_size } => Box::new(Corners { corner_size }),
        SelectionMode::CenterDisk { radius } => Box::new(CenterDisk { radius }),
        SelectionMode::Radiation {
            decay_rate,
            dose_rate,
            lethal_dose,
        } => Box::new(Radiation {
            decay_rate,
            dose_rate,
            lethal_dose,
        }),
    }
}

/// Living creatures that satisfy `policy`, in id order.
pub(crate) fn survivors(policy: &dyn SelectionPolicy, world: &World) -> Vec<CreatureId> {
    world
        .creatures()
        .iter()
        .filter(|creature| creature.alive && policy.survives(creature, world))
        .map(|creature| creature.id)
        .collect()
}
