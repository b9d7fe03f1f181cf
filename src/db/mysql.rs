//! MySQL / MariaDB database client implementation.
//!
//! Columns are classified by the type name the server reports. Text columns
//! with a binary collation arrive as `VARBINARY`/`BLOB` and are kept as bytes.

use crate::config::DatabaseConfig;
use crate::db::{
    connect_with_retry, format_query_error, DatabaseBackend, DatabaseClient, RawRow, RowStream,
    Value,
};
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Decode, MySql, Row, Type, TypeInfo, ValueRef};

/// MySQL database client.
#[derive(Debug)]
pub struct MySqlClient {
    pool: MySqlPool,
}

impl MySqlClient {
    /// Opens a pool for the configured URL, retrying transient failures.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.url()?;
        let pool = connect_with_retry(config, || {
            MySqlPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(config.acquire_timeout())
                .connect(url)
        })
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::MySql
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

fn convert_row(row: &MySqlRow) -> Result<RawRow> {
    row.columns()
        .iter()
        .map(|col| Ok((col.name().to_string(), convert_value(row, col.ordinal())?)))
        .collect()
}

fn convert_value(row: &MySqlRow, index: usize) -> Result<Value> {
    let raw = row.try_get_raw(index).map_err(decode_error)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let type_name = row.column(index).type_info().name().to_uppercase();
    let value = match type_name.as_str() {
        "BOOLEAN" => Value::Bool(get(row, index)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            Value::Int(get(row, index)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => match i64::try_from(get::<u64>(row, index)?) {
            Ok(v) => Value::Int(v),
            Err(_) => Value::Unsupported(type_name),
        },
        "FLOAT" => Value::Float(get::<f32>(row, index)? as f64),
        "DOUBLE" => Value::Float(get(row, index)?),
        "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => {
            Value::String(get(row, index)?)
        }
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            Value::Bytes(get(row, index)?)
        }
        _ => Value::Unsupported(type_name),
    };

    Ok(value)
}

// Dispatch above already picked the Rust type from the column's type name,
// so the driver's own compatibility check is skipped.
fn get<'r, T>(row: &'r MySqlRow, index: usize) -> Result<T>
where
    T: Decode<'r, MySql> + Type<MySql>,
{
    row.try_get_unchecked(index).map_err(decode_error)
}

fn decode_error(error: sqlx::Error) -> ApiError {
    ApiError::execution(format!("Failed to decode column: {error}"))
}
