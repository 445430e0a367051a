//! Runtime configuration
//!
//! Loaded from `config.ron`, with fallback to built-in defaults. Every field
//! is optional in the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::energy::{FlagResetPolicy, PatternTable};
use crate::error::ConfigError;
use crate::storage::{FileStore, PathTiers, default_data_dir};

/// Config file name looked up in the working and platform config directories
pub const CONFIG_FILE: &str = "config.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// `env_logger` filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Override for the persisted-state directory
    pub storage_dir: Option<PathBuf>,
    /// Fixed seed for reproducible patterns; random when unset
    pub rng_seed: Option<u64>,
    pub flag_reset: FlagResetPolicy,
    pub patterns: PatternTable,
    pub target_fps: u64,
    /// Particles added per ambient burst
    pub ambient_particles: usize,
    /// Tiers recorded with a door choice
    pub path_tiers: PathTiers,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            storage_dir: None,
            rng_seed: None,
            flag_reset: FlagResetPolicy::default(),
            patterns: PatternTable::default(),
            target_fps: 60,
            ambient_particles: 50,
            path_tiers: PathTiers::default(),
        }
    }
}

impl ForgeConfig {
    /// Load from the first config file found, or use defaults
    ///
    /// Runs before logging is set up, so nothing is logged here. Call
    /// [`ConfigSource::log`] once a logger is installed.
    pub fn load() -> (Self, ConfigSource) {
        Self::load_first(&config_search_paths())
    }

    /// Load from the first existing file in `paths`
    pub fn load_first(paths: &[PathBuf]) -> (Self, ConfigSource) {
        match paths.iter().find(|path| path.exists()) {
            Some(path) => match Self::load_from(path) {
                Ok(config) => (config, ConfigSource::File(path.clone())),
                Err(e) => (Self::default(), ConfigSource::Fallback(e)),
            },
            None => (Self::default(), ConfigSource::Defaults),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&content)
    }

    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(content)?)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default();
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Write this config, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, self.to_ron()?).map_err(write_err)
    }

    /// File store at the configured or platform data directory
    pub fn open_storage(&self) -> FileStore {
        let dir = self.storage_dir.clone().unwrap_or_else(default_data_dir);
        log::info!("Persisting state under {:?}", dir);
        FileStore::new(dir)
    }

    /// Target duration of one frame
    pub fn frame_time(&self) -> Duration {
        Duration::from_millis(1000 / self.target_fps.max(1))
    }
}

/// Where the active config came from
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    /// No config file exists
    Defaults,
    /// A config file exists but could not be used
    Fallback(ConfigError),
}

impl ConfigSource {
    pub fn level(&self) -> log::Level {
        match self {
            ConfigSource::Fallback(_) => log::Level::Warn,
            _ => log::Level::Info,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConfigSource::File(path) => format!("Config loaded from {:?}", path),
            ConfigSource::Defaults => format!("No {} found, using defaults", CONFIG_FILE),
            ConfigSource::Fallback(e) => format!("{}; using defaults", e),
        }
    }

    pub fn log(&self) {
        log::log!(self.level(), "{}", self.message());
    }
}

/// Candidate config locations, most specific first
pub fn config_search_paths() -> Vec<PathBuf> {
    use directories::ProjectDirs;

    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(proj_dirs) = ProjectDirs::from("com", "wirthforge", "Wirthforge") {
        paths.push(proj_dirs.config_dir().join(CONFIG_FILE));
    }
    paths
}
