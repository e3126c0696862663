mod palette;

pub use palette::{
    CategoryColor, Palette, canonical_theme_name, canonicalize_key, category_color,
    palette_for_theme,
};

use crate::alarm::CHECK_INTERVAL;
use crate::error::AppError;
use crate::organize::SortMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "DUESOON_CONFIG_PATH";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    /// Display name shown in the list header.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sort_by: Option<SortMode>,
    #[serde(default)]
    pub check_interval_secs: Option<u64>,
}

impl Config {
    pub fn palette(&self) -> Palette {
        palette_for_theme(self.theme.as_deref())
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_by.unwrap_or_default()
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval_secs
            .map(|secs| Duration::from_secs(secs.max(1)))
            .unwrap_or(CHECK_INTERVAL)
    }

    pub fn title(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("{name}'s Todos"),
            _ => "Todos".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub name: Option<String>,
    pub sort_by: Option<SortMode>,
    pub check_interval_secs: Option<u64>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("duesoon").join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("duesoon")
            .join(CONFIG_FILE_NAME))
    }
}

/// Never fails: any problem yields defaults plus the error that caused them.
pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path).map_err(|err| AppError::io_at(path, err))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_deref()
        && let Some(normalized) = canonical_theme_name(theme)
    {
        merged.theme = Some(normalized);
    }
    if let Some(name) = overrides.name.as_ref() {
        merged.name = Some(name.clone());
    }
    if let Some(sort_by) = overrides.sort_by {
        merged.sort_by = Some(sort_by);
    }
    if let Some(secs) = overrides.check_interval_secs {
        merged.check_interval_secs = Some(secs);
    }

    merged
}
