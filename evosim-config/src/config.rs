use anyhow::{Context, Result};
use evosim_types::{world_config_from_toml_str, WorldConfig};
use std::path::{Path, PathBuf};

const DEFAULT_WORLD_CONFIG_REL_PATH: &str = "../config/default.toml";

pub fn default_world_config_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_WORLD_CONFIG_REL_PATH)
}

pub fn load_default_world_config() -> Result<WorldConfig> {
    load_world_config_from_path(&default_world_config_path())
}

pub fn load_world_config_from_path(path: &Path) -> Result<WorldConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read world config from {}", path.display()))?;
    world_config_from_toml_str(&raw)
        .context("world config TOML failed schema deserialization")
        .with_context(|| format!("failed to parse world config from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use evosim_types::SelectionMode;

    #[test]
    fn checked_in_default_matches_embedded_default() {
        let loaded = load_default_world_config().expect("load default config");
        assert_eq!(loaded, WorldConfig::default());
    }

    #[test]
    fn missing_file_reports_path() {
        let path = Path::new("does/not/exist.toml");
        let err = load_world_config_from_path(path).expect_err("missing file should fail");
        assert!(format!("{err:#}").contains("does/not/exist.toml"));
    }

    #[test]
    fn scenario_table_round_trips_through_toml() {
        let mut cfg = WorldConfig::default();
        cfg.selection = SelectionMode::Corners { corner_size: 8 };
        cfg.kill_enabled = true;
        let raw = toml::to_string(&cfg).expect("serialize config to TOML");
        let parsed = world_config_from_toml_str(&raw).expect("parse serialized config");
        assert_eq!(parsed, cfg);
    }
}
