//! Layered configuration.
//!
//! Built-in defaults, then an optional TOML file, then `LIBRARY__<SECTION>__<KEY>`
//! environment variables, then command-line flags (which also read the flat
//! `LIBRARY_HOST`-style variables). [`Config::validate`] runs last.

use std::path::Path;

use ::config::builder::DefaultState;
use ::config::{ConfigBuilder, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or checking configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub docs: DocsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Redirect slashless resource paths to their canonical form
    pub append_slash: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            append_slash: true,
        }
    }
}

impl ServerConfig {
    /// `host:port`, bracketing IPv6 hosts
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub backend: Backend,
    /// e.g. `sqlite://library.db` or `sqlite::memory:`
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            url: None,
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// Switch to sqlite at `url`
    pub fn use_sqlite(&mut self, url: impl Into<String>) {
        self.backend = Backend::Sqlite;
        self.url = Some(url.into());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    pub enabled: bool,
    pub path: String,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/docs/".to_string(),
            title: "Library example project".to_string(),
            version: "v1".to_string(),
            description: "API for books as an example".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected \"pretty\" or \"json\", got {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info,library=debug,tower_http=debug".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Defaults, overlaid with `path` (if given) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`Config::load`], reading variables from `env` instead of the
    /// process environment when given
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        let environment = Environment::with_prefix("LIBRARY")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(env);

        Self::finish(builder.add_source(environment))
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = ::config::Config::try_from(&Config::default())?;
        Ok(::config::Config::builder().add_source(defaults))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "must be non-zero"));
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::invalid("server.host", "must not be empty"));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::invalid(
                "database.max_connections",
                "must be at least 1",
            ));
        }
        if self.database.backend == Backend::Sqlite
            && self.database.url.as_deref().is_none_or(str::is_empty)
        {
            return Err(ConfigError::invalid(
                "database.url",
                "required when database.backend is \"sqlite\"",
            ));
        }

        let path = &self.docs.path;
        if path.len() < 3 || !path.starts_with('/') || !path.ends_with('/') {
            return Err(ConfigError::invalid(
                "docs.path",
                format!("must look like \"/docs/\", got {path:?}"),
            ));
        }
        if path.contains(['{', '}', '?', '#', ' ']) {
            return Err(ConfigError::invalid(
                "docs.path",
                format!("contains a reserved character: {path:?}"),
            ));
        }

        Ok(())
    }
}
