//! Server configuration.
//!
//! Values come from three layers, lowest precedence first: built-in defaults,
//! an optional YAML file, then command-line flags (each flag can also be set
//! through its `STATIK_*` environment variable).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use serde::Deserialize;

/// Command-line arguments.
#[derive(Parser, Debug, Default)]
#[command(name = "statik")]
#[command(version)]
#[command(about = "Static file HTTP/1.1 server", long_about = None)]
pub struct CliArgs {
    /// Path to a YAML configuration file
    #[arg(short, long, env = "STATIK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum number of connections served concurrently
    #[arg(short, long, env = "STATIK_WORKERS")]
    pub workers: Option<usize>,

    /// Root directory for documents
    #[arg(short = 'r', long, env = "STATIK_DOCROOT")]
    pub docroot: Option<PathBuf>,

    /// Host or IP address to bind to. A host name binds the first address it
    /// resolves to.
    #[arg(short, long, env = "STATIK_ADDRESS")]
    pub address: Option<String>,

    /// Port to bind to
    #[arg(short, long, env = "STATIK_PORT")]
    pub port: Option<u16>,

    /// Listen backlog
    #[arg(short, long, env = "STATIK_BACKLOG")]
    pub backlog: Option<u32>,

    /// Per-connection read timeout in milliseconds
    #[arg(long)]
    pub read_timeout_ms: Option<u64>,

    /// Longest stall allowed while writing a response, in milliseconds
    #[arg(long)]
    pub write_timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub backlog: u32,
    pub workers: usize,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            backlog: 8,
            workers: 2,
            read_timeout_ms: 10_000,
            write_timeout_ms: 10_000,
        }
    }
}

impl ServerConfig {
    /// Host and port in the form accepted by `tokio::net::lookup_host`.
    pub fn bind_target(&self) -> (&str, u16) {
        (self.address.as_str(), self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Document root every request target is resolved under.
    pub root: PathBuf,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./DOC"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Builds the configuration from the process arguments.
    pub fn load() -> Result<Self> {
        Self::from_cli(CliArgs::parse())
    }

    pub fn from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = CliArgs::try_parse_from(args)?;
        Self::from_cli(cli)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(yaml).context("invalid YAML configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_cli(cli: CliArgs) -> Result<Self> {
        let mut cfg = match &cli.config {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };

        if let Some(workers) = cli.workers {
            cfg.server.workers = workers;
        }
        if let Some(root) = cli.docroot {
            cfg.static_files.root = root;
        }
        if let Some(address) = cli.address {
            cfg.server.address = address;
        }
        if let Some(port) = cli.port {
            cfg.server.port = port;
        }
        if let Some(backlog) = cli.backlog {
            cfg.server.backlog = backlog;
        }
        if let Some(timeout) = cli.read_timeout_ms {
            cfg.server.read_timeout_ms = timeout;
        }
        if let Some(timeout) = cli.write_timeout_ms {
            cfg.server.write_timeout_ms = timeout;
        }
        if let Some(level) = cli.log_level {
            cfg.logging.level = level;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.server.workers >= 1, "workers must be at least 1");
        ensure!(self.server.backlog >= 1, "backlog must be at least 1");
        ensure!(
            self.server.read_timeout_ms >= 1,
            "read timeout must be at least 1 ms"
        );
        ensure!(
            self.server.write_timeout_ms >= 1,
            "write timeout must be at least 1 ms"
        );
        Ok(())
    }
}
