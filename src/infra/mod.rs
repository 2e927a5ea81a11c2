//! Infrastructure layer implementations.

pub mod auth;
pub mod database;
pub mod observability;

pub use auth::{JwtAuthProvider, JwtConfig};
pub use database::{PostgresConfig, PostgresStore};
pub use observability::{PrometheusHandle, init_metrics, init_metrics_handle, init_tracing};
