use crate::data::assets;
use crate::palette::ExtractorConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub palette: ExtractorConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub food: FoodConfig,
    #[serde(default)]
    pub graph: GraphConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Relative paths are resolved against the asset root.
    pub file: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("history.toml"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    pub base_url: String,
    pub language: String,
    pub timeout_secs: u64,
    pub pie_slices: usize,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            base_url: "https://world.openfoodfacts.org/".to_string(),
            language: "fi".to_string(),
            timeout_secs: 8,
            pie_slices: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub x_min: f64,
    pub x_max: f64,
    pub steps: usize,
    pub width: usize,
    pub height: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            x_min: -10.0,
            x_max: 10.0,
            steps: 500,
            width: 72,
            height: 24,
        }
    }
}

impl Config {
    pub fn load_or_default() -> Result<Self> {
        let _ = assets::ensure_assets_ready();
        Self::load_from(&assets::resolve_config_path())
    }

    /// Missing file means defaults; a file that does not parse is logged and
    /// also replaced by defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Ok(toml::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("ignoring malformed config {}: {e}", path.display());
            Self::default()
        }))
    }

    pub fn history_path(&self) -> PathBuf {
        if self.history.file.is_absolute() {
            self.history.file.clone()
        } else {
            assets::resolve_asset_path(&self.history.file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_default_matches_struct_default() {
        let parsed: Config = toml::from_str(assets::default_config_toml()).unwrap();
        let def = Config::default();
        assert_eq!(parsed.palette, def.palette);
        assert_eq!(parsed.food.base_url, def.food.base_url);
        assert_eq!(parsed.graph.steps, def.graph.steps);
        assert_eq!(parsed.history.file, def.history.file);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: Config = toml::from_str("[palette]\nthreshold_percent = 2.5\n").unwrap();
        assert_eq!(cfg.palette.threshold_percent, 2.5);
        assert_eq!(cfg.palette.bits_per_channel, 4);
        assert_eq!(cfg.food.language, "fi");
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.toml");
        fs::write(&path, "palette = [oops").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.palette.max_dimension, 300);
    }

    #[test]
    fn test_missing_file_is_default() {
        let cfg = Config::load_from(Path::new("/nonexistent/swatchlab.toml")).unwrap();
        assert_eq!(cfg.graph.width, 72);
    }

    #[test]
    fn test_absolute_history_path_is_kept() {
        let mut cfg = Config::default();
        cfg.history.file = PathBuf::from("/tmp/swatch-history.toml");
        assert_eq!(cfg.history_path(), PathBuf::from("/tmp/swatch-history.toml"));
    }
}
