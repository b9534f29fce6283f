use crate::genome::decode_gene;
use evosim_types::{Action, Connection, Genome, Sensor, SinkKind, SourceKind};
use std::fmt::Write as _;

pub const SENSOR_COUNT: usize = Sensor::ALL.len();
pub const ACTION_COUNT: usize = Action::ALL.len();

/// An action fires only when its magnitude is strictly above this.
pub const ACTION_ACTIVATION_THRESHOLD: f32 = 0.1;

const RELAXATION_PASSES: usize = 2;

pub type SensorInputs = [f32; SENSOR_COUNT];
pub type ActionOutputs = [f32; ACTION_COUNT];

/// Reusable scratch buffers for brain evaluation, avoiding per-step allocations.
pub(crate) struct BrainScratch {
    internal: Vec<f32>,
    next_internal: Vec<f32>,
}

impl BrainScratch {
    pub(crate) fn new() -> Self {
        Self {
            internal: Vec::new(),
            next_internal: Vec::new(),
        }
    }
}

/// Stateless feed-forward network expressed from a genome, dead ends removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Brain {
    connections: Vec<Connection>,
    internal_count: usize,
}

impl Brain {
    pub fn from_genome(genome: &Genome, max_internal_neurons: u32) -> Self {
        let internal_count = effective_internal_count(max_internal_neurons);
        let decoded: Vec<Connection> = genome
            .genes()
            .iter()
            .map(|&gene| decode_gene(gene, SENSOR_COUNT, ACTION_COUNT, internal_count))
            .collect();
        Self::from_connections(&decoded, internal_count)
    }

    pub fn from_connections(connections: &[Connection], internal_count: usize) -> Self {
        let internal_count = internal_count.max(1);
        Self {
            connections: prune_dead_ends(connections, internal_count),
            internal_count,
        }
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn internal_count(&self) -> usize {
        self.internal_count
    }

    pub fn forward(&self, sensors: &SensorInputs) -> ActionOutputs {
        self.forward_with(sensors, &mut BrainScratch::new())
    }

    pub(crate) fn forward_with(
        &self,
        sensors: &SensorInputs,
        scratch: &mut BrainScratch,
    ) -> ActionOutputs {
        scratch.internal.clear();
        scratch.internal.resize(self.internal_count, 0.0);

        for _ in 0..RELAXATION_PASSES {
            scratch.next_internal.clear();
            scratch.next_internal.resize(self.internal_count, 0.0);

            for connection in &self.connections {
                if connection.sink_kind != SinkKind::Internal {
                    continue;
                }
                let input = source_value(connection, sensors, &scratch.internal);
                if let Some(slot) = scratch.next_internal.get_mut(connection.sink_id as usize) {
                    *slot += input * connection.weight;
                }
            }

            for (current, next) in scratch.internal.iter_mut().zip(&scratch.next_internal) {
                *current = next.tanh();
            }
        }

        let mut outputs = [0.0; ACTION_COUNT];
        for connection in &self.connections {
            if connection.sink_kind != SinkKind::Action {
                continue;
            }
            let input = source_value(connection, sensors, &scratch.internal);
            if let Some(slot) = outputs.get_mut(connection.sink_id as usize) {
                *slot += input * connection.weight;
            }
        }
        outputs.map(f32::tanh)
    }

    /// One line per connection, e.g. `S03 → A01  w=+0.512`.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "brain: {} connections, {} internal neurons\n",
            self.connections.len(),
            self.internal_count
        );
        for connection in &self.connections {
            let source = match connection.source_kind {
                SourceKind::Sensor => 'S',
                SourceKind::Internal => 'I',
            };
            let sink = match connection.sink_kind {
                SinkKind::Internal => 'I',
                SinkKind::Action => 'A',
            };
            let _ = writeln!(
                out,
                "  {source}{:02} → {sink}{:02}  w={:+.3}",
                connection.source_id, connection.sink_id, connection.weight
            );
        }
        out
    }
}

pub(crate) fn effective_internal_count(max_internal_neurons: u32) -> usize {
    max_internal_neurons.max(1) as usize
}

fn source_value(connection: &Connection, sensors: &SensorInputs, internal: &[f32]) -> f32 {
    let values: &[f32] = match connection.source_kind {
        SourceKind::Sensor => sensors,
        SourceKind::Internal => internal,
    };
    values
        .get(connection.source_id as usize)
        .copied()
        .unwrap_or(0.0)
}

/// Drops internal-sourced connections that cannot reach an action.
///
/// An internal neuron is useful when it feeds an action directly or feeds a
/// useful internal neuron. Usefulness is grown to a fixed point; sensor
/// connections are always kept.
pub fn prune_dead_ends(connections: &[Connection], internal_count: usize) -> Vec<Connection> {
    let mut useful = vec![false; internal_count];
    let feeds_useful = |connection: &Connection, useful: &[bool]| match connection.sink_kind {
        SinkKind::Action => true,
        SinkKind::Internal => useful
            .get(connection.sink_id as usize)
            .copied()
            .unwrap_or(false),
    };

    let mut changed = true;
    while changed {
        changed = false;
        for connection in connections {
            if connection.source_kind != SourceKind::Internal
                || !feeds_useful(connection, &useful)
            {
                continue;
            }
            if let Some(flag) = useful.get_mut(connection.source_id as usize) {
                if !*flag {
                    *flag = true;
                    changed = true;
                }
            }
        }
    }

    connections
        .iter()
        .filter(|connection| match connection.source_kind {
            SourceKind::Sensor => true,
            SourceKind::Internal => feeds_useful(connection, &useful),
        })
        .copied()
        .collect()
}

/// Picks the action with the largest magnitude, if it clears the threshold.
/// Ties go to the lowest action index.
pub fn select_action(outputs: &ActionOutputs) -> Option<(Action, f32)> {
    let mut best: Option<usize> = None;
    let mut best_magnitude = ACTION_ACTIVATION_THRESHOLD;
    for (idx, value) in outputs.iter().enumerate() {
        if value.abs() > best_magnitude {
            best_magnitude = value.abs();
            best = Some(idx);
        }
    }
    best.map(|idx| (Action::ALL[idx], outputs[idx]))
}
