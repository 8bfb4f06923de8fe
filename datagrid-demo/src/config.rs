//! Demo configuration, read from `demo.json` in the config directory.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use datagrid_lib::scroll::ScrollConfig;
use datagrid_lib::source::DataSourceConfig;
use serde::Deserialize;
use serde::Serialize;
use simplelog::LevelFilter;
use thiserror::Error;

use crate::paths;

/// Configuration loading error type.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid scroll geometry: {0}")]
    Geometry(#[from] datagrid_lib::error::ConfigError),
    #[error("unknown log level '{0}'")]
    LogLevel(String),
}

/// Settings for the scripted demo session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DemoConfig {
    /// Number of generated user rows.
    pub rows: usize,
    /// Height of the simulated viewport, header and footer included.
    pub viewport_height: f64,
    /// Simulated endpoint latency.
    pub latency_ms: u64,
    /// Endpoint call timeout; `null` waits forever.
    pub request_timeout_ms: Option<u64>,
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
    pub scroll: ScrollConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            rows: 80,
            viewport_height: 584.0,
            latency_ms: 25,
            request_timeout_ms: Some(2_000),
            log_level: "debug".to_string(),
            scroll: ScrollConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Loads the config file, falling back to defaults when there is none.
    pub fn load() -> Result<Self, LoadError> {
        match paths::config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses and validates a JSON config.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let config: Self = serde_json::from_str(text)?;
        config.scroll.validate()?;
        config.level()?;
        Ok(config)
    }

    pub fn level(&self) -> Result<LevelFilter, LoadError> {
        LevelFilter::from_str(&self.log_level).map_err(|_| LoadError::LogLevel(self.log_level.clone()))
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Data source settings for the session.
    pub fn data_source(&self) -> DataSourceConfig {
        let config = DataSourceConfig::default().with_refetch_on_change(true);
        match self.request_timeout_ms {
            Some(ms) => config.with_request_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }
}
