use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};
use shortener_core::FieldOptions;
use shortener_engine::{PayloadEncoding, TransportSettings};
use shortener_logging::shortener_info;
use thiserror::Error;
use url::Url;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "shortener.ron";

pub const COMMANDS: &str = "\
Each line read from stdin is committed as the field value. Commands:
  :enable  :disable  :destroy  :attach [endpoint]
  :option [name [value]]  :help  :quit";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid base url {url:?}: {source}")]
    BaseUrl {
        url: String,
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub field: FieldOptions,
    pub transport: TransportConfig,
    pub log: LogDestination,
    /// Key of the success body that holds the short link, e.g. `short`.
    /// Unset means the whole body is the new value.
    pub response_field: Option<String>,
}

impl AppConfig {
    pub fn with_overrides(mut self, args: &CliArgs) -> Self {
        if let Some(endpoint) = &args.endpoint {
            self.field.endpoint = Some(endpoint.clone());
        }
        if let Some(base_url) = &args.base_url {
            self.transport.base_url = Some(base_url.clone());
        }
        if let Some(log) = args.log {
            self.log = log;
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub base_url: Option<String>,
    pub payload: PayloadEncoding,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub max_body_bytes: Option<u64>,
}

impl TransportConfig {
    pub fn to_settings(&self) -> Result<TransportSettings, ConfigError> {
        let base_url = self
            .base_url
            .as_deref()
            .map(|url| {
                Url::parse(url).map_err(|source| ConfigError::BaseUrl {
                    url: url.to_string(),
                    source,
                })
            })
            .transpose()?;
        let defaults = TransportSettings::default();
        Ok(TransportSettings {
            base_url,
            payload: self.payload,
            connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
            max_body_bytes: self.max_body_bytes.unwrap_or(defaults.max_body_bytes),
        })
    }
}

/// Loads the RON config at `path`. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            shortener_info!("No config at {:?}; using defaults", path);
            return Ok(AppConfig::default());
        }
        Err(err) => return Err(err.into()),
    };
    Ok(ron::from_str(&content)?)
}

/// Shortens URLs committed to a terminal field
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "shortener_app", version, after_help = COMMANDS)]
pub struct CliArgs {
    /// RON configuration file
    #[arg(long = "config", value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: PathBuf,

    /// Shortening endpoint, overriding the configured one
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Base URL for relative endpoints
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Where log output goes
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,
}
