use crate::model::ViewOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted user preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// View options applied to every opened table
    #[serde(default)]
    pub view: ViewOptions,
    /// Data file opened last, reopened when none is given
    #[serde(default)]
    pub last_data_file: Option<String>,
    /// Column file used with `last_data_file`
    #[serde(default)]
    pub last_columns_file: Option<String>,
}

/// View flags given on the command line. They apply to one session and
/// are never saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOverrides {
    pub stripe: bool,
    pub highlight_current_row: bool,
    pub expand_all: bool,
}

impl ViewOverrides {
    /// Options for this session: `base` with every given flag switched on
    pub fn apply(&self, base: &ViewOptions) -> ViewOptions {
        let mut options = base.clone();
        options.stripe |= self.stripe;
        options.highlight_current_row |= self.highlight_current_row;
        options.default_expand_all |= self.expand_all;
        options
    }
}

impl Config {
    /// Record the files just opened. Paths are stored absolute so they
    /// reopen from any working directory.
    pub fn remember_files(&mut self, data: &Path, columns: Option<&Path>) {
        self.last_data_file = Some(absolute_path(data));
        self.last_columns_file = columns.map(absolute_path);
    }

    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".tabular-view"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Load the config from the home directory, falling back to defaults
    pub fn load() -> Config {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Config::default(),
        }
    }

    /// Load a config file. A missing file gives defaults; a malformed one
    /// is logged and ignored.
    pub fn load_from(path: &Path) -> Config {
        if !path.exists() {
            return Config::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                return Config::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Config::default()
            }
        }
    }

    /// Save the config to the home directory
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // Create config directory if it doesn't exist
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }
}

fn absolute_path(path: &Path) -> String {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
