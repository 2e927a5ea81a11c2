//! HTTP middleware for API layer.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, Response, StatusCode, header},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::warn;

use crate::app::AppState;
use crate::domain::UserId;

use super::handlers::MessageBody;

/// The authenticated caller, injected by [`require_auth`] and read by the
/// sneaker handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
}

fn unauthorized() -> Response<Body> {
    (
        StatusCode::UNAUTHORIZED,
        Json(MessageBody {
            message: "Unauthorized".to_string(),
        }),
    )
        .into_response()
}

/// Bearer-token authentication middleware.
///
/// Extracts `Authorization: Bearer <token>`, verifies it through the auth
/// collaborator and injects [`CurrentUser`] for downstream handlers. Any
/// missing, malformed or invalid token answers 401 without reaching a
/// handler.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = bearer else {
        warn!("Auth failed: missing bearer token");
        return unauthorized();
    };

    match state.auth.verify_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(CurrentUser {
                id: claims.user_id,
                email: claims.email,
            });
            next.run(request).await
        }
        Err(e) => {
            warn!(error = %e, "Auth failed: token rejected");
            unauthorized()
        }
    }
}
