//! Runtime settings.
//!
//! Sources are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed `MECHSYNTH` (nested keys use `__`, e.g.
//! `MECHSYNTH_SEARCH__MAX_ITERATIONS=500`).

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::search::DEFAULT_MAX_ITERATIONS;

pub const DEFAULT_SETTINGS_FILE: &str = "mechsynth.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    pub max_iterations: usize,
    /// Run each initial candidate on its own worker thread.
    pub parallel: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputSettings {
    pub task: Option<PathBuf>,
    pub rules: Option<PathBuf>,
    pub candidates: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSettings {
    pub report: Option<PathBuf>,
    pub steps: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub search: SearchSettings,
    pub logging: LoggingSettings,
    #[serde(default)]
    pub inputs: InputSettings,
    #[serde(default)]
    pub outputs: OutputSettings,
}

impl Settings {
    /// Loads settings from `path` (missing file is fine) and the environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let file = path.unwrap_or(DEFAULT_SETTINGS_FILE);
        let settings = Self::builder()?
            .add_source(File::with_name(file).required(path.is_some()))
            .add_source(
                Environment::with_prefix("MECHSYNTH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
    /// Loads settings from TOML text only, without touching file system or environment.
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings = Self::builder()?
            .add_source(File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("search.max_iterations", DEFAULT_MAX_ITERATIONS as i64)?
            .set_default("search.parallel", false)?
            .set_default("logging.level", "info")?)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search: SearchSettings {
                max_iterations: DEFAULT_MAX_ITERATIONS,
                parallel: false,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
            inputs: InputSettings::default(),
            outputs: OutputSettings::default(),
        }
    }
}
