//! Startup configuration.
//!
//! Values are layered: command-line flags win over the optional TOML file,
//! which wins over built-in defaults. Relative paths inside the TOML file are
//! resolved against the file's own directory.
//!
//! ```toml
//! catalog = "data/vehiculos.json"
//! latency_ms = 7000
//! logo = "assets/logo.png"
//! log_level = "info"
//! log_file = "logs"
//! log_stdout = true
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use quote_core::{Catalog, CatalogError, DEFAULT_LATENCY};
use serde::Deserialize;
use tracing::debug;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Vehicle price quoting desk.
///
/// Shows the quote form for the configured catalog. Without `--catalog` the
/// catalog bundled with the application is used.
#[derive(Debug, Default, Parser)]
#[command(name = "Cotizador", version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON price catalog to quote from.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Simulated backend latency in milliseconds.
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Logo image shown in the header.
    #[arg(long)]
    pub logo: Option<PathBuf>,

    /// Log filter: a bare level ("debug") or any EnvFilter directive.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log file, or a directory to place `<app>.log` in.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Do not write log records to stdout.
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

/// Errors raised while reading the TOML configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Mirror of the TOML file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub catalog: Option<PathBuf>,
    pub latency_ms: Option<u64>,
    pub logo: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub log_stdout: Option<bool>,
}

impl FileConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// Reads `path` and rebases its relative paths onto the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.rebased(base))
    }

    fn rebased(
        self,
        base: &Path,
    ) -> Self {
        let rebase = |p: Option<PathBuf>| {
            p.map(|p| if p.is_relative() { base.join(p) } else { p })
        };
        Self {
            catalog: rebase(self.catalog),
            logo: rebase(self.logo),
            log_file: rebase(self.log_file),
            ..self
        }
    }
}

/// Fully resolved settings the application runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `None` selects the bundled catalog.
    pub catalog: Option<PathBuf>,
    pub latency: Duration,
    pub logo: Option<PathBuf>,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub log_stdout: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: None,
            latency: DEFAULT_LATENCY,
            logo: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
            log_stdout: true,
        }
    }
}

impl AppConfig {
    /// Reads the config file named by `--config` (if any) and merges the
    /// command-line flags over it.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::from_layers(file, cli))
    }

    pub fn from_layers(
        file: FileConfig,
        cli: &Cli,
    ) -> Self {
        let defaults = Self::default();
        let config = Self {
            catalog: cli.catalog.clone().or(file.catalog),
            latency: cli
                .latency_ms
                .or(file.latency_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.latency),
            logo: cli.logo.clone().or(file.logo),
            log_level: cli
                .log_level
                .clone()
                .or(file.log_level)
                .unwrap_or(defaults.log_level),
            log_file: cli.log_file.clone().or(file.log_file),
            log_stdout: !cli.quiet && file.log_stdout.unwrap_or(defaults.log_stdout),
        };
        debug!(?config, "configuration resolved");
        config
    }

    /// Loads the configured catalog, or the bundled one.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog {
            Some(path) => Catalog::load(path),
            None => Catalog::builtin(),
        }
    }
}
