//! HTTP surface: `GET /api/{call}` plus a health check.

pub mod handlers;
pub mod response;
pub mod server;

pub use handlers::AppState;
pub use server::{router, serve};
