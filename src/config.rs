//! # Configuration
//!
//! Two layers:
//!
//! - [`AppConfig`]: process settings from environment variables
//!   (`COMPONO_LOG_*` via [`LogConfig`], `COMPONO_APP_FILE`,
//!   `COMPONO_PIPELINE_CONFIG`)
//! - [`AppDescription`]: a YAML (or JSON) document listing routes and the
//!   middleware ordering, read by the `compono` binary
//!
//! ```yaml
//! routes:
//!   - path: /doc/{id}
//!     methods: [GET, PUT]
//!     name: document
//!   - path: /health
//!     response:
//!       status: 200
//!       body: { ok: true }
//! middlewares:
//!   - name: identity
//!     options: { tokens: { s3cret: alice } }
//!   - name: auth
//!     after: identity
//!     options: { allow: [/health] }
//! config:
//!   auth_whitelist: [/public]
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::logging::LogConfig;
use crate::pipeline::Config;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{origin} must be a JSON object")]
    NotAnObject { origin: String },
}

/// Process-wide settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub log: LogConfig,
    /// Shared config handed to every middleware of the pipeline.
    pub pipeline: Config,
    /// Application description to load, if any.
    pub app_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let pipeline = match lookup("COMPONO_PIPELINE_CONFIG") {
            Some(raw) if !raw.trim().is_empty() => parse_object(&raw, "COMPONO_PIPELINE_CONFIG")?,
            _ => Map::new(),
        };
        Ok(Self {
            log: LogConfig::from_lookup(&lookup),
            pipeline,
            app_file: lookup("COMPONO_APP_FILE")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse_object(raw: &str, origin: &str) -> Result<Map<String, Value>, ConfigError> {
    let value: Value = serde_json::from_str(raw).map_err(|source| ConfigError::Json {
        origin: origin.to_string(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject {
            origin: origin.to_string(),
        }),
    }
}

/// Canned response of a described route.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseDescription {
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub body: Value,
}

fn default_status() -> u16 {
    200
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteDescription {
    pub path: String,
    /// GET when empty.
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub name: String,
    /// Echo the request when absent.
    #[serde(default)]
    pub response: Option<ResponseDescription>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MiddlewareDescription {
    /// One of `tracing`, `metrics`, `identity`, `auth`.
    pub name: String,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub options: Map<String, Value>,
}

/// Routes and middlewares of an application, as read from a file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppDescription {
    #[serde(default)]
    pub routes: Vec<RouteDescription>,
    #[serde(default)]
    pub middlewares: Vec<MiddlewareDescription>,
    /// Pipeline config, merged over [`AppConfig::pipeline`].
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl AppDescription {
    /// Read a description; `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                origin: path.display().to_string(),
                source,
            })
        } else {
            Self::from_yaml_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// `base` overridden by this description's own `config` keys.
    #[must_use]
    pub fn pipeline_config(&self, base: &Config) -> Config {
        let mut merged = base.clone();
        merged.extend(self.config.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}
