use crate::creature::Creature;
use crate::grid::heading_from_delta;
use evosim_types::{CreatureId, Heading, WorldSnapshot};
use rand::seq::SliceRandom;
use rand::Rng;

const GRADIENT_REACH: i32 = 5;

/// Bounded grid plus the creatures living on it. Every change to a
/// creature's cell or liveness goes through here so the occupancy vector and
/// creature positions never disagree.
#[derive(Debug, Clone)]
pub struct World {
    width: u32,
    height: u32,
    cells: Vec<Option<CreatureId>>,
    creatures: Vec<Creature>,
    murders: u32,
}

impl World {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
            creatures: Vec::new(),
            murders: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.get(id.0 as usize)
    }

    pub fn murders(&self) -> u32 {
        self.murders
    }

    pub fn living_count(&self) -> usize {
        self.creatures.iter().filter(|creature| creature.alive).count()
    }

    pub fn is_alive(&self, id: CreatureId) -> bool {
        self.creature(id).is_some_and(|creature| creature.alive)
    }

    /// Empties the grid and scatters `creatures` over distinct random cells.
    /// Creatures beyond the grid's capacity are dropped.
    pub(crate) fn populate<R: Rng + ?Sized>(&mut self, creatures: Vec<Creature>, rng: &mut R) {
        self.clear();
        let mut positions = Vec::with_capacity(self.cells.len());
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                positions.push((x, y));
            }
        }
        positions.shuffle(rng);

        for creature in creatures {
            let Some((x, y)) = positions.pop() else {
                break;
            };
            self.place_at(creature, x, y);
        }
        self.debug_assert_consistent_state();
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(None);
        self.creatures.clear();
        self.murders = 0;
    }

    /// Places a creature on an empty in-bounds cell and assigns its id.
    pub(crate) fn place_at(&mut self, mut creature: Creature, x: i32, y: i32) -> Option<CreatureId> {
        let idx = self.cell_index(x, y)?;
        if self.cells[idx].is_some() {
            return None;
        }
        let id = CreatureId(self.creatures.len() as u32);
        creature.id = id;
        creature.x = x;
        creature.y = y;
        creature.alive = true;
        self.cells[idx] = Some(id);
        self.creatures.push(creature);
        Some(id)
    }

    pub fn occupant_at(&self, x: i32, y: i32) -> Option<CreatureId> {
        let idx = self.cell_index(x, y)?;
        self.cells[idx]
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Moves a living creature by `(dx, dy)`, clamped to the grid. Fails
    /// without touching anything when the clamped target is the current cell
    /// or is occupied. On success the heading follows the step's direction.
    pub fn move_creature(&mut self, id: CreatureId, dx: i32, dy: i32) -> bool {
        let max_x = self.width as i32 - 1;
        let max_y = self.height as i32 - 1;
        let Some(creature) = self.creatures.get(id.0 as usize) else {
            return false;
        };
        if !creature.alive {
            return false;
        }

        let (x, y) = (creature.x, creature.y);
        let (target_x, target_y) = ((x + dx).clamp(0, max_x), (y + dy).clamp(0, max_y));
        if (target_x, target_y) == (x, y) {
            return false;
        }
        let (Some(source), Some(target)) = (self.cell_index(x, y), self.cell_index(target_x, target_y))
        else {
            return false;
        };
        if self.cells[target].is_some() {
            return false;
        }

        self.cells[source] = None;
        self.cells[target] = Some(id);
        let creature = &mut self.creatures[id.0 as usize];
        creature.x = target_x;
        creature.y = target_y;
        if let Some(heading) = heading_from_delta(dx, dy) {
            creature.heading = heading;
        }
        true
    }

    /// Kills whatever living creature occupies `(x, y)`. Out-of-bounds and
    /// empty cells are a no-op.
    pub fn kill_at(&mut self, x: i32, y: i32) -> bool {
        let Some(id) = self.occupant_at(x, y) else {
            return false;
        };
        if self.remove(id) {
            self.murders += 1;
            true
        } else {
            false
        }
    }

    /// Adds `amount` to a creature's dose and removes it once the dose exceeds
    /// `lethal_dose`. Returns whether the creature died.
    pub(crate) fn accrue_dose(&mut self, id: CreatureId, amount: f64, lethal_dose: f64) -> bool {
        let Some(creature) = self.creatures.get_mut(id.0 as usize) else {
            return false;
        };
        if !creature.alive {
            return false;
        }
        creature.dose += amount;
        if creature.dose > lethal_dose {
            self.remove(id)
        } else {
            false
        }
    }

    fn remove(&mut self, id: CreatureId) -> bool {
        let Some(creature) = self.creatures.get_mut(id.0 as usize) else {
            return false;
        };
        if !creature.alive {
            return false;
        }
        creature.alive = false;
        let (x, y) = (creature.x, creature.y);
        if let Some(idx) = self.cell_index(x, y) {
            self.cells[idx] = None;
        }
        true
    }

    pub(crate) fn set_heading(&mut self, id: CreatureId, heading: Heading) {
        if let Some(creature) = self.creatures.get_mut(id.0 as usize) {
            creature.heading = heading;
        }
    }

    /// Commits per-step bookkeeping for a creature that got its turn.
    pub(crate) fn advance_clock(&mut self, id: CreatureId, oscillator_phase: f32) {
        if let Some(creature) = self.creatures.get_mut(id.0 as usize) {
            creature.age += 1;
            creature.oscillator_phase = oscillator_phase;
        }
    }

    /// Occupied cells within the square of `radius` around `(x, y)`, centre
    /// excluded.
    pub fn local_density(&self, x: i32, y: i32, radius: i32) -> u32 {
        let mut count = 0;
        for ny in y - radius..=y + radius {
            for nx in x - radius..=x + radius {
                if (nx, ny) != (x, y) && self.occupant_at(nx, ny).is_some() {
                    count += 1;
                }
            }
        }
        count
    }

    /// Occupied cells up to five steps ahead minus those five steps behind,
    /// scaled into `[-1, 1]`.
    pub fn forward_density_gradient(&self, x: i32, y: i32, heading: Heading) -> f32 {
        let (dx, dy) = heading.offset();
        let mut ahead = 0;
        let mut behind = 0;
        for distance in 1..=GRADIENT_REACH {
            if self
                .occupant_at(x + dx * distance, y + dy * distance)
                .is_some()
            {
                ahead += 1;
            }
            if self
                .occupant_at(x - dx * distance, y - dy * distance)
                .is_some()
            {
                behind += 1;
            }
        }
        (ahead - behind) as f32 / GRADIENT_REACH as f32
    }

    pub fn snapshot(&self, generation: u32, step: u32) -> WorldSnapshot {
        WorldSnapshot {
            generation,
            step,
            width: self.width,
            height: self.height,
            creatures: self
                .creatures
                .iter()
                .filter(|creature| creature.alive)
                .map(Creature::snapshot)
                .collect(),
        }
    }

    pub(crate) fn debug_assert_consistent_state(&self) {
        if cfg!(debug_assertions) {
            debug_assert_eq!(
                self.living_count(),
                self.cells.iter().flatten().count(),
                "occupied cell count should match living creature count",
            );
            for creature in self.creatures.iter().filter(|creature| creature.alive) {
                let idx = self
                    .cell_index(creature.x, creature.y)
                    .expect("living creature position must remain in bounds");
                debug_assert_eq!(
                    self.cells[idx],
                    Some(creature.id),
                    "occupancy must point at the creature occupying that cell",
                );
            }
        }
    }
}
