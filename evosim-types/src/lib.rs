use serde::{Deserialize, Serialize};

/// Divisor applied to the signed 16-bit weight field of a gene.
pub const WEIGHT_DIVISOR: f32 = 8000.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreatureId(pub u32);

/// One packed synaptic connection.
///
/// Bit layout, most significant first: source kind (1), source index (7),
/// sink kind (1), sink index (7), signed weight (16).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Gene(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct Genome(pub Vec<Gene>);

impl Genome {
    pub fn from_raw(genes: impl IntoIterator<Item = u32>) -> Self {
        Self(genes.into_iter().map(Gene).collect())
    }

    pub fn to_raw(&self) -> Vec<u32> {
        self.0.iter().map(|gene| gene.0).collect()
    }

    pub fn genes(&self) -> &[Gene] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Sensor,
    Internal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Internal,
    Action,
}

/// A decoded gene. Ids are already reduced into the live neuron counts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    pub source_kind: SourceKind,
    pub source_id: u8,
    pub sink_kind: SinkKind,
    pub sink_id: u8,
    pub weight: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sensor {
    LocX,
    LocY,
    Age,
    Random,
    Oscillator,
    BoundaryDistX,
    BoundaryDistY,
    PopulationDensity,
    PopulationGradientForward,
    GeneticSimilarityForward,
    LastMoveX,
    LastMoveY,
    ForwardBlocked,
    Constant,
}

impl Sensor {
    pub const ALL: [Sensor; 14] = [
        Sensor::LocX,
        Sensor::LocY,
        Sensor::Age,
        Sensor::Random,
        Sensor::Oscillator,
        Sensor::BoundaryDistX,
        Sensor::BoundaryDistY,
        Sensor::PopulationDensity,
        Sensor::PopulationGradientForward,
        Sensor::GeneticSimilarityForward,
        Sensor::LastMoveX,
        Sensor::LastMoveY,
        Sensor::ForwardBlocked,
        Sensor::Constant,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Sensor::LocX => "loc_x",
            Sensor::LocY => "loc_y",
            Sensor::Age => "age",
            Sensor::Random => "random",
            Sensor::Oscillator => "oscillator",
            Sensor::BoundaryDistX => "bdist_x",
            Sensor::BoundaryDistY => "bdist_y",
            Sensor::PopulationDensity => "pop_density",
            Sensor::PopulationGradientForward => "pop_grad_fwd",
            Sensor::GeneticSimilarityForward => "genetic_sim_fwd",
            Sensor::LastMoveX => "last_move_x",
            Sensor::LastMoveY => "last_move_y",
            Sensor::ForwardBlocked => "fwd_blocked",
            Sensor::Constant => "constant",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Action {
    MoveX,
    MoveY,
    MoveRandom,
    MoveForward,
    TurnLeft,
    TurnRight,
    Reverse,
    /// No-op unless killing is enabled for the run.
    Strike,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::MoveX,
        Action::MoveY,
        Action::MoveRandom,
        Action::MoveForward,
        Action::TurnLeft,
        Action::TurnRight,
        Action::Reverse,
        Action::Strike,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::MoveX => "move_x",
            Action::MoveY => "move_y",
            Action::MoveRandom => "move_random",
            Action::MoveForward => "move_forward",
            Action::TurnLeft => "turn_left",
            Action::TurnRight => "turn_right",
            Action::Reverse => "reverse",
            Action::Strike => "strike",
        }
    }
}

/// Compass heading. `North` points toward increasing `y`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Heading {
    East,
    NorthEast,
    North,
    NorthWest,
    West,
    SouthWest,
    South,
    SouthEast,
}

impl Heading {
    /// Counter-clockwise order starting at east.
    pub const ALL: [Heading; 8] = [
        Heading::East,
        Heading::NorthEast,
        Heading::North,
        Heading::NorthWest,
        Heading::West,
        Heading::SouthWest,
        Heading::South,
        Heading::SouthEast,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Heading::East => (1, 0),
            Heading::NorthEast => (1, 1),
            Heading::North => (0, 1),
            Heading::NorthWest => (-1, 1),
            Heading::West => (-1, 0),
            Heading::SouthWest => (-1, -1),
            Heading::South => (0, -1),
            Heading::SouthEast => (1, -1),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Survival scenario for a run, with its geometry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SelectionMode {
    East,
    West,
    EdgeStrips {
        #[serde(default = "default_strip_width")]
        strip_width: u32,
    },
    Corners {
        #[serde(default = "default_corner_size")]
        corner_size: u32,
    },
    CenterDisk {
        #[serde(default = "default_center_radius")]
        radius: u32,
    },
    Radiation {
        #[serde(default = "default_radiation_decay_rate")]
        decay_rate: f64,
        #[serde(default = "default_radiation_dose_rate")]
        dose_rate: f64,
        #[serde(default = "default_radiation_lethal_dose")]
        lethal_dose: f64,
    },
}

impl SelectionMode {
    pub fn name(&self) -> &'static str {
        match self {
            SelectionMode::East => "east",
            SelectionMode::West => "west",
            SelectionMode::EdgeStrips { .. } => "edge_strips",
            SelectionMode::Corners { .. } => "corners",
            SelectionMode::CenterDisk { .. } => "center_disk",
            SelectionMode::Radiation { .. } => "radiation",
        }
    }

    pub fn edge_strips() -> Self {
        SelectionMode::EdgeStrips {
            strip_width: default_strip_width(),
        }
    }

    pub fn corners() -> Self {
        SelectionMode::Corners {
            corner_size: default_corner_size(),
        }
    }

    pub fn center_disk() -> Self {
        SelectionMode::CenterDisk {
            radius: default_center_radius(),
        }
    }

    pub fn radiation() -> Self {
        SelectionMode::Radiation {
            decay_rate: default_radiation_decay_rate(),
            dose_rate: default_radiation_dose_rate(),
            lethal_dose: default_radiation_lethal_dose(),
        }
    }
}

impl Default for SelectionMode {
    fn default() -> Self {
        SelectionMode::East
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldConfig {
    pub world_width: u32,
    pub world_height: u32,
    pub population: u32,
    pub max_generations: u32,
    pub steps_per_generation: u32,
    pub genome_length: u32,
    pub max_internal_neurons: u32,
    pub mutation_rate: f64,
    #[serde(default)]
    pub kill_enabled: bool,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub selection: SelectionMode,
}

impl Default for WorldConfig {
    fn default() -> Self {
        default_world_config()
    }
}

pub fn world_config_from_toml_str(raw: &str) -> Result<WorldConfig, toml::de::Error> {
    toml::from_str(raw)
}

fn default_world_config() -> WorldConfig {
    world_config_from_toml_str(include_str!("../../config/default.toml"))
        .expect("default world config TOML must deserialize")
}

fn default_strip_width() -> u32 {
    32
}

fn default_corner_size() -> u32 {
    32
}

fn default_center_radius() -> u32 {
    20
}

fn default_radiation_decay_rate() -> f64 {
    0.04
}

fn default_radiation_dose_rate() -> f64 {
    0.01
}

fn default_radiation_lethal_dose() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationSummary {
    pub generation: u32,
    pub population: u32,
    pub survivors: u32,
    pub alive: u32,
    pub survival_pct: f64,
    pub diversity: f64,
    pub murders: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatureSnapshot {
    pub id: CreatureId,
    pub x: i32,
    pub y: i32,
    pub heading: Heading,
    pub color: Rgb,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorldSnapshot {
    pub generation: u32,
    pub step: u32,
    pub width: u32,
    pub height: u32,
    pub creatures: Vec<CreatureSnapshot>,
}

/// Pruned wiring of one survivor, for inspection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurvivorTopology {
    pub id: CreatureId,
    pub genome: Genome,
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationReport {
    pub summary: GenerationSummary,
    pub snapshot: WorldSnapshot,
    pub best_survivor: Option<SurvivorTopology>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_roundtrip() {
        let cfg = WorldConfig::default();
        let json = serde_json::to_string(&cfg).expect("serialize config");
        let parsed: WorldConfig = serde_json::from_str(&json).expect("deserialize config");
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn default_config_matches_checked_in_toml() {
        let cfg = WorldConfig::default();
        assert_eq!((cfg.world_width, cfg.world_height), (128, 128));
        assert_eq!(cfg.population, 1000);
        assert_eq!(cfg.genome_length, 16);
        assert_eq!(cfg.selection, SelectionMode::East);
        assert!(!cfg.kill_enabled);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn radiation_mode_fills_missing_rates_with_defaults() {
        let raw = r#"
            world_width = 10
            world_height = 10
            population = 4
            max_generations = 1
            steps_per_generation = 10
            genome_length = 4
            max_internal_neurons = 2
            mutation_rate = 0.0
            seed = 42

            [selection]
            mode = "radiation"
            dose_rate = 0.03
        "#;
        let cfg = world_config_from_toml_str(raw).expect("parse radiation config");
        assert_eq!(
            cfg.selection,
            SelectionMode::Radiation {
                decay_rate: 0.04,
                dose_rate: 0.03,
                lethal_dose: 1.0,
            }
        );
        assert_eq!(cfg.seed, Some(42));
    }

    #[test]
    fn negative_internal_neuron_count_is_rejected_at_parse_time() {
        let raw = r#"
            world_width = 10
            world_height = 10
            population = 4
            max_generations = 1
            steps_per_generation = 10
            genome_length = 4
            max_internal_neurons = -1
            mutation_rate = 0.0
        "#;
        assert!(world_config_from_toml_str(raw).is_err());
    }

    #[test]
    fn genome_serializes_as_raw_integers() {
        let genome = Genome::from_raw([0, 1, u32::MAX]);
        let json = serde_json::to_string(&genome).expect("serialize genome");
        assert_eq!(json, "[0,1,4294967295]");
        assert_eq!(genome.to_raw(), vec![0, 1, u32::MAX]);
    }

    #[test]
    fn heading_offsets_are_unit_steps() {
        for heading in Heading::ALL {
            let (dx, dy) = heading.offset();
            assert!(dx.abs() <= 1 && dy.abs() <= 1);
            assert!((dx, dy) != (0, 0));
        }
    }
}
