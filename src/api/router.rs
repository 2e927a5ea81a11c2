//! HTTP routing configuration with bearer auth and per-IP rate limiting.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, Response, StatusCode},
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post, put},
};
use governor::{Quota, RateLimiter};
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::app::AppState;

use super::handlers::{
    MessageBody, create_sneaker_handler, delete_sneaker_handler, health_check_handler,
    list_sneakers_handler, liveness_handler, login_handler, metrics_handler, readiness_handler,
    register_handler, update_sneaker_handler,
};
use super::middleware::require_auth;

/// Rate limiter configuration.
///
/// Credential endpoints get a deliberately tighter quota than the sneaker
/// endpoints; health probes get a generous one.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per second for /api/auth endpoints
    pub auth_rps: u32,
    /// Burst size for /api/auth endpoints
    pub auth_burst: u32,
    /// Requests per second for the sneaker endpoints
    pub api_rps: u32,
    /// Burst size for the sneaker endpoints
    pub api_burst: u32,
    /// Requests per second for health endpoints
    pub health_rps: u32,
    /// Burst size for health endpoints
    pub health_burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth_rps: 5,
            auth_burst: 10,
            api_rps: 10,
            api_burst: 20,
            health_rps: 100,
            health_burst: 100,
        }
    }
}

impl RateLimitConfig {
    /// Create config from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |name: &str, fallback: u32| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(fallback)
        };

        Self {
            auth_rps: read("RATE_LIMIT_AUTH_RPS", defaults.auth_rps),
            auth_burst: read("RATE_LIMIT_AUTH_BURST", defaults.auth_burst),
            api_rps: read("RATE_LIMIT_RPS", defaults.api_rps),
            api_burst: read("RATE_LIMIT_BURST", defaults.api_burst),
            health_rps: defaults.health_rps,
            health_burst: defaults.health_burst,
        }
    }
}

type KeyedLimiter = RateLimiter<
    IpAddr,
    governor::state::keyed::DashMapStateStore<IpAddr>,
    governor::clock::DefaultClock,
>;

/// Shared rate limiter state (keyed by client IP to prevent global DoS)
pub struct RateLimitState {
    auth_limiter: KeyedLimiter,
    api_limiter: KeyedLimiter,
    health_limiter: KeyedLimiter,
}

fn keyed_limiter(rps: u32, burst: u32) -> KeyedLimiter {
    let quota = Quota::per_second(NonZeroU32::new(rps.max(1)).expect("nonzero rps"))
        .allow_burst(NonZeroU32::new(burst.max(1)).expect("nonzero burst"));
    RateLimiter::dashmap(quota)
}

impl RateLimitState {
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            auth_limiter: keyed_limiter(config.auth_rps, config.auth_burst),
            api_limiter: keyed_limiter(config.api_rps, config.api_burst),
            health_limiter: keyed_limiter(config.health_rps, config.health_burst),
        }
    }

    /// Picks the limiter responsible for a request path.
    fn limiter_for(&self, path: &str) -> &KeyedLimiter {
        if path.starts_with("/api/auth") {
            &self.auth_limiter
        } else if path.starts_with("/health") {
            &self.health_limiter
        } else {
            &self.api_limiter
        }
    }
}

/// Extract client IP from request (X-Forwarded-For, X-Real-IP, or ConnectInfo).
/// Falls back to 0.0.0.0 when unknown to avoid blocking; unknown clients share one bucket.
fn client_ip_from_request<B>(request: &Request<B>) -> IpAddr {
    // Prefer proxy headers (client is first in X-Forwarded-For)
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(s) = forwarded.to_str() {
            if let Some(first) = s.split(',').next() {
                if let Ok(ip) = first.trim().parse::<IpAddr>() {
                    return ip;
                }
            }
        }
    }
    if let Some(real_ip) = request.headers().get("x-real-ip") {
        if let Ok(s) = real_ip.to_str() {
            if let Ok(ip) = s.trim().parse::<IpAddr>() {
                return ip;
            }
        }
    }
    // ConnectInfo may inject SocketAddr when using into_make_service_with_connect_info
    if let Some(addr) = request.extensions().get::<SocketAddr>() {
        return addr.ip();
    }
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

/// Per-IP rate limit middleware covering the whole router; the quota is
/// chosen by path scope.
async fn rate_limit_middleware(
    State(state): State<Arc<RateLimitState>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let client_ip = client_ip_from_request(&request);
    let limiter = state.limiter_for(request.uri().path());

    match limiter.check_key(&client_ip) {
        Ok(_) => next.run(request).await,
        Err(not_until) => {
            let wait_time = not_until.wait_time_from(governor::clock::Clock::now(
                &governor::clock::DefaultClock::default(),
            ));
            let retry_after = wait_time.as_secs();

            let body = MessageBody {
                message: "Rate limit exceeded. Please slow down your requests.".to_string(),
            };
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            if let Ok(value) = retry_after.to_string().parse() {
                response.headers_mut().insert("Retry-After", value);
            }
            response
        }
    }
}

fn base_router(app_state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler));

    // Sneaker routes are only reachable with a verified bearer token
    let sneaker_routes = Router::new()
        .route("/", get(list_sneakers_handler).post(create_sneaker_handler))
        .route(
            "/{id}",
            put(update_sneaker_handler).delete(delete_sneaker_handler),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&app_state),
            require_auth,
        ));

    let health_routes = Router::new()
        .route("/", get(health_check_handler))
        .route("/live", get(liveness_handler))
        .route("/ready", get(readiness_handler));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/sneakers", sneaker_routes)
        .nest("/health", health_routes)
        .route("/metrics", get(metrics_handler))
        .with_state(app_state)
}

/// Create router without rate limiting
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let layers = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ));

    base_router(app_state).layer(layers)
}

/// Create router with rate limiting enabled
pub fn create_router_with_rate_limit(app_state: Arc<AppState>, config: &RateLimitConfig) -> Router {
    let rate_limit_state = Arc::new(RateLimitState::new(config));

    let layers = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(middleware::from_fn_with_state(
            rate_limit_state,
            rate_limit_middleware,
        ));

    base_router(app_state).layer(layers)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use super::*;
    use crate::test_utils::{InMemoryStore, MockAuthProvider};

    fn test_state() -> Arc<AppState> {
        let store = Arc::new(InMemoryStore::new());
        let auth = Arc::new(MockAuthProvider::new());
        Arc::new(AppState::new(store.clone(), store.clone(), store, auth))
    }

    mod rate_limit_config_tests {
        use super::*;

        #[test]
        fn test_default_quotas() {
            let config = RateLimitConfig::default();
            assert_eq!(config.auth_rps, 5);
            assert_eq!(config.auth_burst, 10);
            assert_eq!(config.api_rps, 10);
            assert_eq!(config.api_burst, 20);
            assert_eq!(config.health_rps, 100);
        }

        #[test]
        fn test_auth_scope_is_stricter_than_api() {
            let config = RateLimitConfig::default();
            assert!(config.auth_rps < config.api_rps);
        }
    }

    mod rate_limit_state_tests {
        use super::*;

        #[test]
        fn test_limiter_selection_by_path() {
            let state = RateLimitState::new(&RateLimitConfig::default());

            assert!(std::ptr::eq(
                state.limiter_for("/api/auth/login"),
                &state.auth_limiter
            ));
            assert!(std::ptr::eq(
                state.limiter_for("/health/live"),
                &state.health_limiter
            ));
            assert!(std::ptr::eq(
                state.limiter_for("/api/sneakers"),
                &state.api_limiter
            ));
        }
    }

    mod middleware_tests {
        use super::*;

        fn limited_router(config: RateLimitConfig) -> Router {
            let state = Arc::new(RateLimitState::new(&config));
            Router::new()
                .route("/api/auth/login", axum::routing::get(|| async { "ok" }))
                .layer(middleware::from_fn_with_state(state, rate_limit_middleware))
        }

        #[tokio::test]
        async fn test_rate_limit_blocks_after_burst() {
            let router = limited_router(RateLimitConfig {
                auth_rps: 1,
                auth_burst: 1,
                ..Default::default()
            });

            let first = router
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/api/auth/login")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(first.status(), StatusCode::OK);

            let second = router
                .oneshot(
                    Request::builder()
                        .uri("/api/auth/login")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
            assert!(second.headers().contains_key("Retry-After"));
        }

        /// One IP exhausting its bucket does not block another.
        #[tokio::test]
        async fn test_rate_limit_is_per_ip() {
            let router = limited_router(RateLimitConfig {
                auth_rps: 1,
                auth_burst: 1,
                ..Default::default()
            });

            let from = |ip: &str| {
                Request::builder()
                    .uri("/api/auth/login")
                    .header("X-Forwarded-For", ip)
                    .body(Body::empty())
                    .unwrap()
            };

            router.clone().oneshot(from("192.168.1.1")).await.unwrap();
            let blocked = router.clone().oneshot(from("192.168.1.1")).await.unwrap();
            assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

            let other = router.oneshot(from("10.0.0.1")).await.unwrap();
            assert_eq!(other.status(), StatusCode::OK);
        }
    }

    mod router_tests {
        use super::*;

        #[tokio::test]
        async fn test_liveness_endpoint() {
            let router = create_router(test_state());

            let res = router
                .oneshot(
                    Request::builder()
                        .uri("/health/live")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(res.status(), StatusCode::OK);
        }

        #[tokio::test]
        async fn test_health_endpoint() {
            let router = create_router(test_state());

            let res = router
                .oneshot(
                    Request::builder()
                        .uri("/health")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(res.status(), StatusCode::OK);
        }

        #[tokio::test]
        async fn test_sneaker_routes_require_bearer_token() {
            let router = create_router(test_state());

            let res = router
                .oneshot(
                    Request::builder()
                        .uri("/api/sneakers")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn test_sneaker_routes_reject_garbage_token() {
            let router = create_router(test_state());

            let res = router
                .oneshot(
                    Request::builder()
                        .uri("/api/sneakers")
                        .header("Authorization", "Bearer garbage")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn test_metrics_without_recorder_is_not_found() {
            let router = create_router(test_state());

            let res = router
                .oneshot(
                    Request::builder()
                        .uri("/metrics")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(res.status(), StatusCode::NOT_FOUND);
        }

        #[tokio::test]
        async fn test_rate_limited_router_serves_health() {
            let router = create_router_with_rate_limit(test_state(), &RateLimitConfig::default());

            let res = router
                .oneshot(
                    Request::builder()
                        .uri("/health/live")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(res.status(), StatusCode::OK);
        }
    }
}
