//! Command-line argument parsing for sqlapi.
//!
//! Every flag can also come from the environment; both override the config file.

use clap::Parser;
use sqlapi::config::Config;
use std::path::PathBuf;

/// Serve named SQL queries as JSON over HTTP.
#[derive(Parser, Debug)]
#[command(name = "sqlapi")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Listen address for HTTP server (e.g. ":3000" or "127.0.0.1:8080")
    #[arg(long, env = "SQLAPI_ADDR", value_name = "ADDR")]
    pub addr: Option<String>,

    /// Directory containing <call>.sql templates
    #[arg(long, env = "SQLAPI_API_DIR", value_name = "DIR")]
    pub api_dir: Option<PathBuf>,

    /// Database URL (postgres://, mysql:// or sqlite:)
    #[arg(long, env = "DATABASE_URL", value_name = "URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Maximum number of pooled database connections
    #[arg(long, env = "SQLAPI_MAX_CONNECTIONS", value_name = "N")]
    pub max_connections: Option<u32>,

    /// Config file path
    #[arg(long, env = "SQLAPI_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Overrides config file values with any flags that were given.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(addr) = &self.addr {
            config.server.addr = addr.clone();
        }
        if let Some(api_dir) = &self.api_dir {
            config.server.api_dir = api_dir.clone();
        }
        if let Some(url) = &self.database_url {
            config.database.url = Some(url.clone());
        }
        if let Some(max) = self.max_connections {
            config.database.max_connections = max;
        }
    }
}
