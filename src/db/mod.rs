//! Database abstraction layer for sqlapi.
//!
//! Provides a trait-based interface for database operations, allowing
//! different database backends to be used interchangeably and replaced by
//! test doubles.

mod mock;
mod mysql;
mod postgres;
mod sqlite;
mod types;

pub use mock::{FailingDatabaseClient, MockCall, MockDatabaseClient};
pub use mysql::MySqlClient;
pub use postgres::PostgresClient;
pub use sqlite::SqliteClient;
pub use types::{RawRow, RowStream, Value};

use crate::config::DatabaseConfig;
use crate::error::{ApiError, Result};
use crate::query::PlaceholderStyle;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum number of connection attempts at startup.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay between connection attempts (doubles each retry).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    MySql,
    Sqlite,
}

impl DatabaseBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a URL scheme.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Positional placeholder syntax the backend's driver expects.
    pub fn placeholder_style(&self) -> PlaceholderStyle {
        match self {
            Self::Postgres => PlaceholderStyle::Dollar,
            Self::MySql => PlaceholderStyle::Question,
            Self::Sqlite => PlaceholderStyle::NumberedQuestion,
        }
    }
}

/// Creates a database client for the backend named by the configured URL.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn DatabaseClient>> {
    match config.backend()? {
        DatabaseBackend::Postgres => Ok(Arc::new(PostgresClient::connect(config).await?)),
        DatabaseBackend::MySql => Ok(Arc::new(MySqlClient::connect(config).await?)),
        DatabaseBackend::Sqlite => Ok(Arc::new(SqliteClient::connect(config).await?)),
    }
}

/// Trait defining the interface for database clients.
///
/// Implementations must be safe to share between concurrent requests; the
/// pool behind them carries that discipline.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// The backend this client talks to.
    fn backend(&self) -> DatabaseBackend;

    /// Runs `sql` once with `params` bound positionally, as text, and streams
    /// the resulting rows.
    fn fetch<'a>(&'a self, sql: &'a str, params: &'a [String]) -> RowStream<'a>;

    /// Checks that the database is reachable.
    async fn ping(&self) -> Result<()>;

    /// Closes the connection pool.
    async fn close(&self) -> Result<()>;
}

/// Runs `attempt` until it succeeds, retrying transient failures with
/// exponential backoff.
pub(crate) async fn connect_with_retry<P, F, Fut>(
    config: &DatabaseConfig,
    mut attempt: F,
) -> Result<P>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<P, sqlx::Error>>,
{
    let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);
    let mut attempt_no = 1;

    loop {
        debug!("Connection attempt {} of {}", attempt_no, MAX_RETRY_ATTEMPTS);

        match attempt().await {
            Ok(pool) => {
                debug!("Connected to {}", config.display_string());
                return Ok(pool);
            }
            Err(e) if attempt_no < MAX_RETRY_ATTEMPTS && is_transient_error(&e) => {
                warn!(
                    "Connection attempt {} failed (transient error), retrying in {:?}",
                    attempt_no, delay
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt_no += 1;
            }
            Err(e) => return Err(map_connection_error(e, config)),
        }
    }
}

/// Determines if an error is transient and worth retrying.
fn is_transient_error(error: &sqlx::Error) -> bool {
    if matches!(error, sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) {
        return true;
    }

    let error_str = error.to_string().to_lowercase();
    error_str.contains("connection refused")
        || error_str.contains("timed out")
        || error_str.contains("temporarily unavailable")
        || error_str.contains("connection reset")
        || error_str.contains("broken pipe")
}

/// Maps sqlx connection errors to readable startup messages.
fn map_connection_error(error: sqlx::Error, config: &DatabaseConfig) -> ApiError {
    let target = config.display_string();
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ApiError::connection(format!(
            "Cannot connect to {target}. Check that the server is running."
        ))
    } else if error_str.contains("authentication failed") || error_str.contains("access denied") {
        ApiError::connection(format!(
            "Authentication failed for {target}. Check your credentials."
        ))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ApiError::connection(format!(
            "Connection to {target} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ApiError::connection(format!("{target}: {error}"))
    }
}

/// Formats a query error, keeping the database's own message when there is one.
pub(crate) fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => match db_error.code() {
            Some(code) => format!("ERROR {}: {}", code, db_error.message()),
            None => format!("ERROR: {}", db_error.message()),
        },
        None => error.to_string(),
    }
}
