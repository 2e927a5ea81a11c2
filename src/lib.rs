//! Kickstash
//!
//! A sneaker collection API: email/password registration, login issuing an
//! HMAC-signed bearer token, and ownership-scoped sneaker management.
//!
//! # Architecture Overview
//!
//! This crate is organized into four main layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   API Layer                  │
//! │   HTTP handlers, routing, bearer-token auth  │
//! ├─────────────────────────────────────────────┤
//! │               Application Layer              │
//! │    Use-case services, outcome composition    │
//! ├─────────────────────────────────────────────┤
//! │                 Domain Layer                 │
//! │  Outcome type, entities, traits, validation  │
//! ├─────────────────────────────────────────────┤
//! │             Infrastructure Layer             │
//! │    Postgres stores, JWT auth, observability  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Key Features
//!
//! - **Tri-state outcomes**: every use case reports success, a coded
//!   failure, or a field-keyed validation report; expected rejections are
//!   never raised as errors
//! - **Trait-based abstraction**: stores, unit of work and auth are traits;
//!   in-memory doubles in [`test_utils`] make the whole stack testable
//! - **Single commit point**: writes stage in a change journal and persist
//!   atomically on `commit`
//! - **Validation**: structural rules via the `validator` crate plus
//!   store-backed rules (email uniqueness)
//! - **Logging**: structured logging with `tracing`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use kickstash::api::create_router;
//! use kickstash::app::AppState;
//! use kickstash::infra::{JwtAuthProvider, JwtConfig, PostgresStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(PostgresStore::with_defaults(&database_url).await?);
//!     let auth = Arc::new(JwtAuthProvider::new(JwtConfig::from_env()?));
//!
//!     let state = Arc::new(AppState::new(store.clone(), store.clone(), store, auth));
//!
//!     let router = create_router(state);
//!     axum::serve(listener, router).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod domain;
pub mod infra;

// Test utilities are available in tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
