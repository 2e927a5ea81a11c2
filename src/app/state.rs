//! Application state management.
//!
//! This module provides the shared application state that is
//! accessible to all request handlers via Axum's State extractor.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::domain::{AuthProvider, RuleValidator, SneakerStore, UnitOfWork, UserStore};

use super::sneakers::SneakerService;
use super::users::{RegisterValidator, UserService};

/// Shared application state for the Axum web server.
///
/// Holds thread-safe references to the use-case services and the
/// collaborators the API layer needs directly (token verification, health
/// pings), without knowing any concrete implementation.
#[derive(Clone)]
pub struct AppState {
    /// Registration and login use cases.
    pub user_service: Arc<UserService>,

    /// Sneaker collection use cases.
    pub sneaker_service: Arc<SneakerService>,

    /// Token verification for the bearer-auth middleware.
    pub auth: Arc<dyn AuthProvider>,

    /// Health pings for the readiness endpoints.
    pub uow: Arc<dyn UnitOfWork>,

    /// Prometheus render handle, when metrics are installed.
    pub metrics: Option<Arc<PrometheusHandle>>,
}

impl AppState {
    /// Wires the services to the provided collaborators.
    ///
    /// The register validator is built against the user store; sneaker
    /// commands carry structural rules only.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        sneakers: Arc<dyn SneakerStore>,
        uow: Arc<dyn UnitOfWork>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let register_validator = Arc::new(RegisterValidator::new(Arc::clone(&users)));
        let user_service = Arc::new(UserService::new(
            Arc::clone(&users),
            Arc::clone(&auth),
            Arc::clone(&uow),
            register_validator,
        ));
        let sneaker_service = Arc::new(SneakerService::new(
            users,
            sneakers,
            Arc::clone(&uow),
            Arc::new(RuleValidator),
            Arc::new(RuleValidator),
        ));

        Self {
            user_service,
            sneaker_service,
            auth,
            uow,
            metrics: None,
        }
    }

    /// Attaches a Prometheus handle for the `/metrics` endpoint.
    #[must_use]
    pub fn with_metrics(mut self, handle: Arc<PrometheusHandle>) -> Self {
        self.metrics = Some(handle);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{InMemoryStore, MockAuthProvider};

    #[test]
    fn test_app_state_creation() {
        let store = Arc::new(InMemoryStore::new());
        let auth = Arc::new(MockAuthProvider::new());

        let state = AppState::new(store.clone(), store.clone(), store, auth);

        assert!(Arc::strong_count(&state.user_service) >= 1);
        assert!(state.metrics.is_none());
    }

    #[test]
    fn test_app_state_is_clone() {
        let store = Arc::new(InMemoryStore::new());
        let auth = Arc::new(MockAuthProvider::new());

        let state = AppState::new(store.clone(), store.clone(), store, auth);
        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.sneaker_service, &cloned.sneaker_service));
    }
}
