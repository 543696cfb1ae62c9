use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_capacity() -> usize {
    10
}
fn default_tick_rate_ms() -> u64 {
    250
}
fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Number of goal slots. Saved goals past this count are not loaded.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Overrides the entries file in the data directory.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            data_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    /// chrono format used to display dates.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            date_format: default_date_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "goalpost")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("goalpost.log"))
    }

    /// Entries document: the configured override or `entries.json` in the
    /// data directory.
    pub fn entries_path(&self) -> Result<PathBuf> {
        match &self.storage.data_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("entries.json")),
        }
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(content).context("Parsing config.toml")?;
        if config.storage.capacity == 0 {
            log::warn!("storage.capacity must be at least 1, using 1");
            config.storage.capacity = 1;
        }
        if config.ui.tick_rate_ms == 0 {
            config.ui.tick_rate_ms = default_tick_rate_ms();
        }
        Ok(config)
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
