//! HTTP request handlers translating use-case outcomes into responses.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::app::AppState;
use crate::domain::{
    AddSneakerCommand, AppError, DeleteSneakerCommand, EditSneakerCommand, Error, ErrorCode,
    FieldErrors, GetSneakersQuery, LoginCommand, Money, Outcome, RegisterCommand, ShoeSize,
    SneakerDto, SneakerId,
};

use super::middleware::CurrentUser;

/// JSON body for single-message failures.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// JSON body for validation failures.
#[derive(Debug, Serialize)]
pub struct ValidationBody {
    pub errors: FieldErrors,
}

/// JSON body carrying an issued bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenBody {
    pub token: String,
}

/// Registration payload.
#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Login payload.
#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Shared payload for creating and updating a sneaker. The owner comes from
/// the bearer token, never from the body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateUpdateSneakerRequest {
    pub name: String,
    pub brand: String,
    pub price: Money,
    pub size: ShoeSize,
    pub rate: u8,
}

/// Boundary-owned query options applied on top of the list projection.
#[derive(Debug, Default, Deserialize)]
pub struct SneakerQueryOptions {
    /// Case-insensitive exact brand match.
    pub brand: Option<String>,
    /// Keep sneakers rated at least this value.
    pub min_rate: Option<u8>,
    /// Return at most this many records.
    pub top: Option<usize>,
    /// Skip this many records first.
    pub skip: Option<usize>,
}

impl SneakerQueryOptions {
    fn apply(&self, dtos: Vec<SneakerDto>) -> Vec<SneakerDto> {
        let filtered = dtos
            .into_iter()
            .filter(|dto| {
                self.brand
                    .as_ref()
                    .is_none_or(|brand| dto.brand.eq_ignore_ascii_case(brand))
            })
            .filter(|dto| self.min_rate.is_none_or(|rate| dto.rate >= rate))
            .skip(self.skip.unwrap_or(0));

        match self.top {
            Some(top) => filtered.take(top).collect(),
            None => filtered.collect(),
        }
    }
}

fn failure_response(error: Error) -> Response {
    let status = match error.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
    };
    (
        status,
        Json(MessageBody {
            message: error.message,
        }),
    )
        .into_response()
}

fn validation_response(errors: FieldErrors) -> Response {
    (StatusCode::BAD_REQUEST, Json(ValidationBody { errors })).into_response()
}

/// POST /api/auth/register
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    let command = RegisterCommand {
        email: request.email,
        password: request.password,
    };
    let outcome = state.user_service.register(&command).await?;

    Ok(match outcome {
        Outcome::Success(()) => {
            metrics::counter!("users_registered_total").increment(1);
            StatusCode::CREATED.into_response()
        }
        Outcome::Failure(error) => failure_response(error),
        Outcome::Invalid(errors) => validation_response(errors),
    })
}

/// POST /api/auth/login
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let command = LoginCommand {
        email: request.email,
        password: request.password,
    };
    let outcome = state.user_service.login(&command).await?;

    Ok(match outcome {
        Outcome::Success(token) => (StatusCode::OK, Json(TokenBody { token })).into_response(),
        Outcome::Failure(error) => failure_response(error),
        Outcome::Invalid(errors) => validation_response(errors),
    })
}

/// GET /api/sneakers
pub async fn list_sneakers_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(options): Query<SneakerQueryOptions>,
) -> Result<Response, AppError> {
    let query = GetSneakersQuery {
        user_id: current.id,
    };
    let outcome = state.sneaker_service.list(&query).await?;

    Ok(match outcome {
        Outcome::Success(dtos) => (StatusCode::OK, Json(options.apply(dtos))).into_response(),
        Outcome::Failure(error) => failure_response(error),
        Outcome::Invalid(errors) => validation_response(errors),
    })
}

/// POST /api/sneakers
pub async fn create_sneaker_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CreateUpdateSneakerRequest>,
) -> Result<Response, AppError> {
    let command = AddSneakerCommand {
        user_id: current.id,
        name: request.name,
        brand: request.brand,
        price: request.price,
        size: request.size,
        rate: request.rate,
    };
    let outcome = state.sneaker_service.add(&command).await?;

    Ok(match outcome {
        Outcome::Success(()) => {
            metrics::counter!("sneakers_created_total").increment(1);
            StatusCode::OK.into_response()
        }
        Outcome::Failure(error) => failure_response(error),
        Outcome::Invalid(errors) => validation_response(errors),
    })
}

/// PUT /api/sneakers/{id}
pub async fn update_sneaker_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<SneakerId>,
    Json(request): Json<CreateUpdateSneakerRequest>,
) -> Result<Response, AppError> {
    let command = EditSneakerCommand {
        user_id: current.id,
        sneaker_id: id,
        name: request.name,
        brand: request.brand,
        price: request.price,
        size: request.size,
        rate: request.rate,
    };
    let outcome = state.sneaker_service.edit(&command).await?;

    Ok(match outcome {
        Outcome::Success(dto) => (StatusCode::OK, Json(dto)).into_response(),
        Outcome::Failure(error) => failure_response(error),
        Outcome::Invalid(errors) => validation_response(errors),
    })
}

/// DELETE /api/sneakers/{id}
pub async fn delete_sneaker_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<SneakerId>,
) -> Result<Response, AppError> {
    let command = DeleteSneakerCommand {
        user_id: current.id,
        sneaker_id: id,
    };
    let outcome = state.sneaker_service.remove(&command).await?;

    Ok(match outcome {
        Outcome::Success(()) => StatusCode::NO_CONTENT.into_response(),
        Outcome::Failure(error) => failure_response(error),
        Outcome::Invalid(errors) => validation_response(errors),
    })
}

/// Health check status for services.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health check response for the application.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub database: HealthStatus,
    pub timestamp: DateTime<Utc>,
}

/// GET /health
pub async fn health_check_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match state.uow.health_check().await {
        Ok(()) => HealthStatus::Healthy,
        Err(e) => {
            tracing::warn!(error = ?e, "Database health check failed");
            HealthStatus::Unhealthy
        }
    };

    Json(HealthResponse {
        status: database,
        database,
        timestamp: Utc::now(),
    })
}

/// Kubernetes liveness probe.
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe.
pub async fn readiness_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.uow.health_check().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Faults never leak detail to callers; the log line carries it.
        error!(error = %self, "Unhandled fault reached the boundary");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageBody {
                message: "Internal server error occurred".to_string(),
            }),
        )
            .into_response()
    }
}
