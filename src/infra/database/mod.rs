//! Concrete persistence implementations.

pub mod postgres;

pub use postgres::{PostgresConfig, PostgresStore};
