use anyhow::{Context, Result};
use evosim_types::{GenerationReport, GenerationSummary, SurvivorTopology, WorldSnapshot};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CSV_FILE_NAME: &str = "evolution_log.csv";
pub const JSONL_FILE_NAME: &str = "generations.jsonl";
pub const SNAPSHOT_DIR_NAME: &str = "snapshots";

/// One line of `generations.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub summary: GenerationSummary,
    pub best_survivor: Option<SurvivorTopology>,
}

/// Append-only per-generation log: a CSV of summary fields and a JSON Lines
/// file that also carries the best survivor's genome and topology.
pub struct GenerationLog {
    csv: BufWriter<File>,
    jsonl: BufWriter<File>,
}

impl GenerationLog {
    pub fn create(out_dir: &Path) -> Result<Self> {
        let csv_path = out_dir.join(CSV_FILE_NAME);
        let mut csv = BufWriter::new(
            File::create(&csv_path)
                .with_context(|| format!("failed to create {}", csv_path.display()))?,
        );
        writeln!(
            csv,
            "generation,population,survivors,alive,survival_pct,murders,diversity"
        )?;

        let jsonl_path = out_dir.join(JSONL_FILE_NAME);
        let jsonl = BufWriter::new(
            File::create(&jsonl_path)
                .with_context(|| format!("failed to create {}", jsonl_path.display()))?,
        );
        Ok(Self { csv, jsonl })
    }

    pub fn append(&mut self, report: &GenerationReport) -> Result<()> {
        let summary = &report.summary;
        writeln!(
            self.csv,
            "{generation},{population},{survivors},{alive},{survival_pct:.2},{murders},{diversity:.4}",
            generation = summary.generation,
            population = summary.population,
            survivors = summary.survivors,
            alive = summary.alive,
            survival_pct = summary.survival_pct,
            murders = summary.murders,
            diversity = summary.diversity,
        )?;

        let record = GenerationRecord {
            summary: summary.clone(),
            best_survivor: report.best_survivor.clone(),
        };
        serde_json::to_writer(&mut self.jsonl, &record)?;
        writeln!(self.jsonl)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.csv.flush()?;
        self.jsonl.flush()?;
        Ok(())
    }
}

pub fn read_records(content: &str) -> Result<Vec<GenerationRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<GenerationRecord>(line)
                .with_context(|| format!("line {} is not a generation record", idx + 1))
        })
        .collect()
}

/// Writes `snapshots/generation_NNNNN.json` under `out_dir`.
pub fn write_snapshot(out_dir: &Path, snapshot: &WorldSnapshot) -> Result<PathBuf> {
    let dir = out_dir.join(SNAPSHOT_DIR_NAME);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed creating snapshot directory {}", dir.display()))?;
    let path = dir.join(format!("generation_{:05}.json", snapshot.generation));
    let json = serde_json::to_string(snapshot)?;
    fs::write(&path, json).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(path)
}
