//! Integration tests for sqlapi.
//!
//! Shared fixtures: a seeded `users` table and a directory of call templates.

pub mod dispatch_test;
pub mod http_test;

use sqlapi::db::{DatabaseClient, SqliteClient};
use sqlapi::query::{CallResolver, Dispatcher};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tempfile::TempDir;

/// Templates available to every test.
pub const TEMPLATES: &[(&str, &str)] = &[
    ("users", "SELECT name FROM users WHERE id = :id"),
    ("all_users", "SELECT name FROM users ORDER BY id"),
    (
        "search",
        "SELECT name FROM users WHERE name = :q OR email = :q ORDER BY id",
    ),
    ("user_ages", "SELECT name, age FROM users ORDER BY id"),
    ("emails", "SELECT name, email FROM users ORDER BY id"),
    ("avatar", "SELECT avatar FROM users WHERE id = :id"),
    ("broken", "SELEC name FROM users"),
    ("no_table", "SELECT name FROM nonexistent_table_xyz"),
];

/// Opens an in-memory database with a seeded `users` table.
///
/// A single pooled connection keeps every query on the same in-memory database.
pub async fn users_db() -> Arc<dyn DatabaseClient> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::query(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT,
            age INTEGER,
            avatar BLOB
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO users (id, name, email, age, avatar) VALUES
            (1, 'ada', 'ada@example.com', 36, X'6164612e706e67'),
            (2, 'bob', NULL, 41, NULL),
            (3, 'carol', 'carol@example.com', 29, NULL)",
    )
    .execute(&pool)
    .await
    .unwrap();

    Arc::new(SqliteClient::from_pool(pool))
}

/// Writes [`TEMPLATES`] into a fresh directory.
pub fn template_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, sql) in TEMPLATES {
        std::fs::write(dir.path().join(format!("{name}.sql")), sql).unwrap();
    }
    dir
}

/// A dispatcher over [`users_db`] and [`template_dir`]. Keep the directory
/// alive for as long as the dispatcher is used.
pub async fn users_dispatcher() -> (TempDir, Dispatcher) {
    let dir = template_dir();
    let dispatcher = Dispatcher::new(CallResolver::new(dir.path()), users_db().await);
    (dir, dispatcher)
}
