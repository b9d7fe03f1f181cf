//! Call dispatch for sqlapi.
//!
//! This module turns a call name and its request parameters into rows of
//! strings: template resolution, placeholder binding, execution and row
//! normalization.

pub mod dispatch;
pub mod executor;
pub mod normalize;
pub mod params;
pub mod resolver;
pub mod template;

pub use dispatch::Dispatcher;
pub use executor::QueryExecutor;
pub use normalize::{normalize_row, ResultRow, ResultSet};
pub use params::ParameterSet;
pub use resolver::CallResolver;
pub use template::{CompiledQuery, PlaceholderStyle, QueryTemplate};
