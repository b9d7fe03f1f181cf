//! Resolution of call names to query templates.
//!
//! A call named `users` is served by `<root>/users.sql`. Templates are read
//! on every request.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::template::QueryTemplate;
use crate::error::{ApiError, Result};

/// File extension of template files.
const TEMPLATE_EXTENSION: &str = "sql";

/// Maps call names to template files under a fixed root directory.
#[derive(Debug, Clone)]
pub struct CallResolver {
    root: PathBuf,
}

impl CallResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads the template for `call`.
    ///
    /// Names outside `[A-Za-z0-9_-]+` never reach the filesystem, so a call
    /// cannot address anything but a direct child of the root.
    pub async fn resolve(&self, call: &str) -> Result<QueryTemplate> {
        if !is_valid_call_name(call) {
            return Err(ApiError::not_found(format!("invalid API call name '{call}'")));
        }

        let path = self.template_path(call);
        debug!("Resolving call '{}' from {}", call, path.display());

        match tokio::fs::read_to_string(&path).await {
            Ok(sql) => Ok(QueryTemplate::new(call, sql)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ApiError::not_found(format!("no such API call '{call}'")))
            }
            Err(e) => Err(ApiError::internal(format!(
                "Failed to read template {}: {e}",
                path.display()
            ))),
        }
    }

    fn template_path(&self, call: &str) -> PathBuf {
        self.root.join(format!("{call}.{TEMPLATE_EXTENSION}"))
    }
}

/// Returns true if `call` is a non-empty token of ASCII letters, digits, `_` and `-`.
pub fn is_valid_call_name(call: &str) -> bool {
    !call.is_empty()
        && call
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
