//! Test utilities and mock implementations.
//!
//! This module provides reusable mock implementations of the collaborator
//! traits for use in unit and integration tests.

pub mod mocks;

pub use mocks::{InMemoryStore, MockAuthProvider, MockConfig};
