use anyhow::{Context, Result};
use directories::BaseDirs;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_ASSET_DIR: &str = "SWATCHLAB_ASSET_DIR";

const DEFAULT_CONFIG_TOML: &str = include_str!("../../assets/default.toml");
const ADDITIVES_JSON: &str = include_str!("../../assets/additives_local.json");

pub const CONFIG_REL: &str = "config/default.toml";
pub const ADDITIVES_REL: &str = "data/additives_local.json";

pub fn resolve_asset_root() -> PathBuf {
    if let Some(p) = std::env::var_os(ENV_ASSET_DIR) {
        return PathBuf::from(p);
    }

    // Linux: $XDG_CONFIG_HOME/swatchlab
    // macOS: ~/Library/Application Support/swatchlab
    // Windows: %APPDATA%\swatchlab
    if let Some(dirs) = BaseDirs::new() {
        return dirs.config_dir().join("swatchlab");
    }

    // Only when the OS config directory cannot be determined.
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config")
        .join("swatchlab")
}

pub fn resolve_asset_path(rel: &Path) -> PathBuf {
    resolve_asset_root().join(rel)
}

pub fn resolve_config_path() -> PathBuf {
    resolve_asset_path(Path::new(CONFIG_REL))
}

pub fn resolve_additives_path() -> PathBuf {
    resolve_asset_path(Path::new(ADDITIVES_REL))
}

/// Materializes the default config and reference data under the asset root.
pub fn ensure_assets_ready() -> Result<PathBuf> {
    let root = resolve_asset_root();
    ensure_all_assets(&root)?;
    Ok(root)
}

pub fn ensure_all_assets(root: &Path) -> Result<()> {
    write_if_missing(&root.join(CONFIG_REL), DEFAULT_CONFIG_TOML)?;
    write_if_missing(&root.join(ADDITIVES_REL), ADDITIVES_JSON)?;
    Ok(())
}

pub fn default_config_toml() -> &'static str {
    DEFAULT_CONFIG_TOML
}

fn ensure_dir(p: &Path) -> Result<()> {
    fs::create_dir_all(p).with_context(|| format!("mkdir {}", p.display()))
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.is_file() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_all_assets_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        ensure_all_assets(dir.path()).unwrap();

        let cfg = dir.path().join(CONFIG_REL);
        assert_eq!(fs::read_to_string(&cfg).unwrap(), DEFAULT_CONFIG_TOML);
        assert!(dir.path().join(ADDITIVES_REL).is_file());

        fs::write(&cfg, "# edited").unwrap();
        ensure_all_assets(dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&cfg).unwrap(), "# edited");
    }
}
