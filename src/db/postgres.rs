//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient` trait
//! for PostgreSQL databases using sqlx.
//!
//! Parameters are bound as `TEXT`. Templates comparing them against typed
//! columns need an explicit cast, e.g. `WHERE id = :id::int4`.

use crate::config::DatabaseConfig;
use crate::db::{
    connect_with_retry, format_query_error, DatabaseBackend, DatabaseClient, RawRow, RowStream,
    Value,
};
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Decode, Postgres, Row, Type, TypeInfo, ValueRef};

/// PostgreSQL database client.
#[derive(Debug)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Opens a pool for the configured URL, retrying transient failures.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.url()?;
        let pool = connect_with_retry(config, || {
            PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(config.acquire_timeout())
                .connect(url)
        })
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Postgres
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

/// Converts a sqlx PgRow to our RawRow type.
fn convert_row(row: &PgRow) -> Result<RawRow> {
    row.columns()
        .iter()
        .map(|col| Ok((col.name().to_string(), convert_value(row, col.ordinal())?)))
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize) -> Result<Value> {
    let raw = row.try_get_raw(index).map_err(decode_error)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let type_name = row.column(index).type_info().name().to_uppercase();
    let value = match type_name.as_str() {
        "BOOL" => Value::Bool(get(row, index)?),
        "INT2" => Value::Int(get::<i16>(row, index)? as i64),
        "INT4" => Value::Int(get::<i32>(row, index)? as i64),
        "INT8" => Value::Int(get(row, index)?),
        "FLOAT4" => Value::Float(get::<f32>(row, index)? as f64),
        "FLOAT8" => Value::Float(get(row, index)?),
        "TEXT" | "VARCHAR" | "CHAR" | "NAME" | "CITEXT" | "UNKNOWN" => {
            Value::String(get(row, index)?)
        }
        "BYTEA" => Value::Bytes(get(row, index)?),
        _ => Value::Unsupported(type_name),
    };

    Ok(value)
}

fn get<'r, T>(row: &'r PgRow, index: usize) -> Result<T>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get(index).map_err(decode_error)
}

fn decode_error(error: sqlx::Error) -> ApiError {
    ApiError::execution(format!("Failed to decode column: {error}"))
}
