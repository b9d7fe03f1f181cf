//! sqlapi - Named, parameterized SQL queries served as JSON over HTTP.
//!
//! A request for `GET /api/users?id=1` runs the template `api/users.sql` with
//! `:id` bound to `"1"` and answers with the rows as an array of JSON objects.
//!
//! This library exposes the core modules for use in the binary and in
//! integration tests.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod logging;
pub mod query;
