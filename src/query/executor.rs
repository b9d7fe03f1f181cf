//! Query execution.
//!
//! Binds a call's parameters into its template, runs it once against the
//! injected database client and normalizes rows as they arrive.

use std::sync::Arc;
use std::time::Instant;

use futures::TryStreamExt;
use tracing::info;

use super::normalize::{normalize_row, ResultSet};
use super::params::ParameterSet;
use super::template::QueryTemplate;
use crate::db::DatabaseClient;
use crate::error::Result;

/// Executes query templates against a database client.
///
/// No transaction, timeout or retry is added here; each statement runs under
/// the database's default autocommit and the pool's own limits.
#[derive(Clone)]
pub struct QueryExecutor {
    db: Arc<dyn DatabaseClient>,
}

impl QueryExecutor {
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    /// Binds `params` into `template`, executes it and returns every row as strings.
    ///
    /// Fails without touching the database when a placeholder has no value.
    /// A row that cannot be normalized fails the whole call; rows already
    /// converted are discarded.
    pub async fn execute(
        &self,
        template: &QueryTemplate,
        params: &ParameterSet,
    ) -> Result<ResultSet> {
        let compiled = template.compile(self.db.backend().placeholder_style())?;
        let values = compiled.bind(params)?;

        let start = Instant::now();
        let mut rows = self.db.fetch(compiled.sql(), &values);
        let mut result = ResultSet::new();
        while let Some(raw) = rows.try_next().await? {
            result.push(normalize_row(raw)?);
        }

        info!(
            call = template.name(),
            sql = compiled.sql(),
            params = values.len(),
            rows = result.len(),
            elapsed = ?start.elapsed(),
            "Query executed"
        );

        Ok(result)
    }
}
