use evosim_types::{Connection, Gene, Genome, Rgb, SinkKind, SourceKind, WEIGHT_DIVISOR};
use rand::Rng;

const SOURCE_KIND_SHIFT: u32 = 31;
const SOURCE_ID_SHIFT: u32 = 24;
const SINK_KIND_SHIFT: u32 = 23;
const SINK_ID_SHIFT: u32 = 16;
const KIND_MASK: u32 = 0x1;
const ID_MASK: u32 = 0x7F;
const WEIGHT_MASK: u32 = 0xFFFF;

pub(crate) const GENE_BITS: u32 = u32::BITS;

const COLOR_FLOOR: u8 = 50;
const EMPTY_GENOME_COLOR: Rgb = Rgb {
    r: 128,
    g: 128,
    b: 128,
};

/// Unpacks one gene into a connection. Indices are reduced modulo the live
/// neuron count of the kind they address, so every gene decodes to something
/// usable. A count of zero is treated as one.
pub fn decode_gene(
    gene: Gene,
    sensor_count: usize,
    action_count: usize,
    internal_count: usize,
) -> Connection {
    let raw = gene.0;
    let source_kind = if (raw >> SOURCE_KIND_SHIFT) & KIND_MASK == 0 {
        SourceKind::Sensor
    } else {
        SourceKind::Internal
    };
    let sink_kind = if (raw >> SINK_KIND_SHIFT) & KIND_MASK == 0 {
        SinkKind::Internal
    } else {
        SinkKind::Action
    };

    let source_count = match source_kind {
        SourceKind::Sensor => sensor_count,
        SourceKind::Internal => internal_count,
    };
    let sink_count = match sink_kind {
        SinkKind::Internal => internal_count,
        SinkKind::Action => action_count,
    };

    Connection {
        source_kind,
        source_id: reduce_index((raw >> SOURCE_ID_SHIFT) & ID_MASK, source_count),
        sink_kind,
        sink_id: reduce_index((raw >> SINK_ID_SHIFT) & ID_MASK, sink_count),
        weight: f32::from((raw & WEIGHT_MASK) as u16 as i16) / WEIGHT_DIVISOR,
    }
}

/// Packs a connection back into a gene. The weight is scaled, rounded toward
/// zero and saturated to the signed 16-bit range.
pub fn encode_gene(connection: &Connection) -> Gene {
    let source_kind = match connection.source_kind {
        SourceKind::Sensor => 0,
        SourceKind::Internal => 1,
    };
    let sink_kind = match connection.sink_kind {
        SinkKind::Internal => 0,
        SinkKind::Action => 1,
    };
    let weight = (connection.weight * WEIGHT_DIVISOR) as i16;

    Gene(
        (source_kind << SOURCE_KIND_SHIFT)
            | ((u32::from(connection.source_id) & ID_MASK) << SOURCE_ID_SHIFT)
            | (sink_kind << SINK_KIND_SHIFT)
            | ((u32::from(connection.sink_id) & ID_MASK) << SINK_ID_SHIFT)
            | u32::from(weight as u16),
    )
}

fn reduce_index(raw: u32, count: usize) -> u8 {
    (raw as usize % count.max(1)) as u8
}

pub fn random_genome<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Genome {
    Genome((0..length).map(|_| Gene(rng.random())).collect())
}

/// Single-point crossover: the child takes `a` up to a uniform split in
/// `[0, len]` and `b` from there on.
pub fn crossover<R: Rng + ?Sized>(a: &Genome, b: &Genome, rng: &mut R) -> Genome {
    debug_assert_eq!(a.len(), b.len(), "crossover parents must share a length");
    let split = rng.random_range(0..=a.len());
    let head = &a.genes()[..split];
    let tail = b.genes().get(split..).unwrap_or(&[]);
    Genome(head.iter().chain(tail).copied().collect())
}

/// Flips each of the genome's bits independently with probability `rate`.
pub fn mutate<R: Rng + ?Sized>(genome: &Genome, rate: f64, rng: &mut R) -> Genome {
    let genes = genome
        .genes()
        .iter()
        .map(|gene| {
            let mut flips = 0_u32;
            for bit in 0..GENE_BITS {
                if rng.random::<f64>() < rate {
                    flips |= 1 << bit;
                }
            }
            Gene(gene.0 ^ flips)
        })
        .collect();
    Genome(genes)
}

/// Fraction of matching bits over the shorter of the two genomes.
pub fn similarity(a: &Genome, b: &Genome) -> f64 {
    let compared = a.len().min(b.len()) as u64 * u64::from(GENE_BITS);
    if compared == 0 {
        return 0.0;
    }
    let differing: u64 = a
        .genes()
        .iter()
        .zip(b.genes())
        .map(|(x, y)| u64::from((x.0 ^ y.0).count_ones()))
        .sum();
    1.0 - differing as f64 / compared as f64
}

/// Display color derived from the genome, so related creatures look alike.
pub fn genome_color(genome: &Genome) -> Rgb {
    if genome.is_empty() {
        return EMPTY_GENOME_COLOR;
    }
    let folded = genome
        .genes()
        .iter()
        .fold(0_u32, |acc, gene| acc ^ (gene.0 & 0x00FF_FFFF));
    Rgb {
        r: ((folded >> 16) as u8).max(COLOR_FLOOR),
        g: ((folded >> 8) as u8).max(COLOR_FLOOR),
        b: (folded as u8).max(COLOR_FLOOR),
    }
}
