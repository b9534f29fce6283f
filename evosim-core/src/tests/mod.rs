pub(super) use super::*;
pub(super) use crate::generation::best_survivor;
pub(super) use crate::grid::{heading_from_delta, neighbor, opposite, rotate_left, rotate_right};
pub(super) use crate::selection::survivors;
pub(super) use evosim_types::{
    Action, Connection, CreatureId, Gene, Heading, Rgb, Sensor, SinkKind, SourceKind,
    WorldSnapshot,
};
pub(super) use rand::{Rng, SeedableRng};
pub(super) use rand_chacha::ChaCha8Rng;

mod reproduction_and_diversity;
mod support;
