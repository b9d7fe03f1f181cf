//! Mock database clients for testing.
//!
//! `MockDatabaseClient` serves canned rows and records every statement it is
//! asked to run; `FailingDatabaseClient` fails every statement.

use super::{DatabaseBackend, DatabaseClient, RawRow, RowStream};
use crate::error::{ApiError, Result};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::sync::Mutex;

/// A statement received by the mock, with its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub sql: String,
    pub params: Vec<String>,
}

/// A mock database client that returns predefined rows.
pub struct MockDatabaseClient {
    backend: DatabaseBackend,
    rows: Vec<RawRow>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockDatabaseClient {
    /// Creates a mock that returns no rows.
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Creates a mock that returns `rows` for every statement.
    pub fn with_rows(rows: Vec<RawRow>) -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            rows,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Pretends to be another backend, changing the placeholder style the
    /// executor compiles for.
    pub fn with_backend(mut self, backend: DatabaseBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Returns the statements received so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    fn fetch<'a>(&'a self, sql: &'a str, params: &'a [String]) -> RowStream<'a> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                sql: sql.to_string(),
                params: params.to_vec(),
            });
        }

        stream::iter(self.rows.iter().cloned().map(Ok)).boxed()
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A database client whose every statement fails with the given message.
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
    }

    fn fetch<'a>(&'a self, _sql: &'a str, _params: &'a [String]) -> RowStream<'a> {
        stream::once(async move { Err(ApiError::execution(self.message.clone())) }).boxed()
    }

    async fn ping(&self) -> Result<()> {
        Err(ApiError::connection(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
