//! Call dispatch: resolve, bind, execute, normalize.

use std::sync::Arc;

use super::executor::QueryExecutor;
use super::normalize::ResultSet;
use super::params::ParameterSet;
use super::resolver::CallResolver;
use crate::db::DatabaseClient;
use crate::error::Result;

/// Serves calls by name. Holds no per-request state and is cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    resolver: CallResolver,
    executor: QueryExecutor,
}

impl Dispatcher {
    pub fn new(resolver: CallResolver, db: Arc<dyn DatabaseClient>) -> Self {
        Self {
            resolver,
            executor: QueryExecutor::new(db),
        }
    }

    pub fn resolver(&self) -> &CallResolver {
        &self.resolver
    }

    /// Runs the call named `call` with `params`.
    pub async fn dispatch(&self, call: &str, params: &ParameterSet) -> Result<ResultSet> {
        let template = self.resolver.resolve(call).await?;
        self.executor.execute(&template, params).await
    }
}
