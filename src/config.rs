use crate::errors::{BoardError, BoardResult};
use crate::generation::GenerationSettings;
use crate::rules::presets::load_rule_preset;
use crate::rules::{TerrainRule, check_rules};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub mod range_types;

/// Everything needed to rebuild a board: settings plus either explicit
/// rules or the name of a built-in preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Used when `rules` is empty
    pub preset: Option<String>,
    pub settings: GenerationSettings,
    pub rules: Vec<TerrainRule>,
}

impl BoardConfig {
    /// Explicit rules win over the preset; neither gives an empty rule list
    pub fn resolve_rules(&self) -> BoardResult<Vec<TerrainRule>> {
        let rules = match (&self.preset, self.rules.is_empty()) {
            (Some(name), true) => load_rule_preset(name)?,
            _ => self.rules.clone(),
        };
        check_rules(&rules)?;
        Ok(rules)
    }
}

pub fn get_config_path() -> BoardResult<PathBuf> {
    let mut path = dirs::config_dir().ok_or(BoardError::ConfigDirNotFound)?;
    path.push("boardgen");
    fs::create_dir_all(&path)?;
    path.push("board.toml");
    Ok(path)
}

/// Load the user config, falling back to defaults when it is missing or broken
pub fn load_config() -> BoardConfig {
    let Ok(path) = get_config_path() else {
        return BoardConfig::default();
    };
    if !path.exists() {
        return BoardConfig::default();
    }
    match load_from_path(&path) {
        Ok(config) => config,
        Err(err) => {
            warn!("Ignoring config at {}: {err}", path.display());
            BoardConfig::default()
        }
    }
}

pub fn load_from_path(path: &Path) -> BoardResult<BoardConfig> {
    if !path.exists() {
        return Err(BoardError::ConfigFileNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

/// Save to the user config location and return the path written
pub fn save_config(config: &BoardConfig) -> BoardResult<PathBuf> {
    let path = get_config_path()?;
    save_to_path(config, &path)?;
    Ok(path)
}

pub fn save_to_path(config: &BoardConfig, path: &Path) -> BoardResult<()> {
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}
