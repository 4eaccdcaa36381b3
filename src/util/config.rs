use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;
use tracing::{debug, info};

use crate::domain::PipelineConfig;
use crate::infra::bts::DEFAULT_WORKBOOK_URL;

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "FreightModeAdvisor";
const APP_NAME: &str = "FreightModeAdvisor";
const CONFIG_FILENAME: &str = "config.json";

/// Rate acquisition settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateSourceConfig {
    pub workbook_url: String,
    pub timeout_secs: u64,
    pub cache_ttl_hours: u64,
}

impl Default for RateSourceConfig {
    fn default() -> Self {
        Self {
            workbook_url: DEFAULT_WORKBOOK_URL.to_string(),
            timeout_secs: 30,
            cache_ttl_hours: 7 * 24,
        }
    }
}

impl RateSourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours * 60 * 60)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub rates: RateSourceConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: SerdeError,
    },
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

pub fn default_cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Loads an explicit config file, else the platform default if present, else defaults.
/// An explicit path that cannot be read is an error; a missing default file is not.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path().filter(|path| path.exists()) {
            Some(path) => path,
            None => {
                debug!("no config file, using defaults");
                return Ok(AppConfig::default());
            }
        },
    };

    let data = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "loaded config");
    Ok(config)
}
