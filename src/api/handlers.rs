use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    response::Json,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::model::ApiResponse;

pub type AppState<S> = Arc<S>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct IncludeQuery {
    /// Relation to load alongside each row, e.g. `villa`.
    pub include: Option<String>,
}

/// Turns the outcome of an operation into its envelope and logs it.
pub(crate) fn respond<T>(
    operation: &str,
    outcome: Result<ApiResponse<T>, ApiError>,
) -> ApiResponse<T> {
    match outcome {
        Ok(envelope) => {
            info!("{} -> {}", operation, envelope.status_code());
            envelope
        }
        Err(failure) if failure.is_internal() => {
            error!("{} failed: {:#}", operation, failure);
            failure.into()
        }
        Err(failure) => {
            warn!("{} -> {}: {}", operation, failure.status_code(), failure);
            failure.into()
        }
    }
}

/// Key from the path. A key that is not an integer, or is zero, is a bad request.
pub(crate) fn path_key(
    path: Result<Path<i32>, PathRejection>,
    entity: &str,
) -> Result<i32, ApiError> {
    let Path(key) = path.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    if key == 0 {
        return Err(ApiError::Validation(format!("{} key must not be 0", entity)));
    }
    Ok(key)
}

/// The `include` query parameter. An unparsable query string is a bad request.
pub(crate) fn include_param(
    query: Result<Query<IncludeQuery>, QueryRejection>,
) -> Result<Option<String>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    Ok(query.include)
}

/// Request body. A missing, `null` or malformed body is a bad request.
pub(crate) fn required_body<T>(
    body: Result<Json<Option<T>>, JsonRejection>,
) -> Result<T, ApiError> {
    match body {
        Ok(Json(Some(value))) => Ok(value),
        Ok(Json(None)) => Err(ApiError::Validation("Request body is required".to_string())),
        Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
    }
}
