//! SQLite database client implementation.
//!
//! SQLite is dynamically typed, so values are classified by the storage class
//! of each individual value rather than by the declared column type.

use crate::config::DatabaseConfig;
use crate::db::{
    connect_with_retry, format_query_error, DatabaseBackend, DatabaseClient, RawRow, RowStream,
    Value,
};
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Decode, Row, Sqlite, Type, TypeInfo, ValueRef};

/// SQLite database client.
#[derive(Debug)]
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    /// Creates a new SqliteClient from an existing connection pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for the configured URL, retrying transient failures.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.url()?;
        let pool = connect_with_retry(config, || {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(config.acquire_timeout())
                .connect(url)
        })
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
    }

    fn fetch<'a>(&'a self, sql: &'a str, params: &'a [String]) -> RowStream<'a> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(param.as_str());
        }

        query
            .fetch(&self.pool)
            .map_err(|e| ApiError::execution(format_query_error(e)))
            .and_then(|row| futures::future::ready(convert_row(&row)))
            .boxed()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| ApiError::connection(format_query_error(e)))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

fn convert_row(row: &SqliteRow) -> Result<RawRow> {
    row.columns()
        .iter()
        .map(|col| Ok((col.name().to_string(), convert_value(row, col.ordinal())?)))
        .collect()
}

fn convert_value(row: &SqliteRow, index: usize) -> Result<Value> {
    let raw = row.try_get_raw(index).map_err(decode_error)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let storage_class = raw.type_info().name().to_uppercase();
    let value = match storage_class.as_str() {
        "INTEGER" => Value::Int(get(row, index)?),
        "REAL" => Value::Float(get(row, index)?),
        "TEXT" => Value::String(get(row, index)?),
        "BLOB" => Value::Bytes(get(row, index)?),
        _ => Value::Unsupported(storage_class),
    };

    Ok(value)
}

// Declared column types (BOOLEAN, DATETIME, ...) would fail the driver's
// compatibility check even though the stored value matches the storage class.
fn get<'r, T>(row: &'r SqliteRow, index: usize) -> Result<T>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get_unchecked(index).map_err(decode_error)
}

fn decode_error(error: sqlx::Error) -> ApiError {
    ApiError::execution(format!("Failed to decode column: {error}"))
}
