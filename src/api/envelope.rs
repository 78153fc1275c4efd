use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::model::ApiResponse;

/// The HTTP status always mirrors `statusCode`. A 204 goes out without a body.
impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_status_mirrors_envelope() {
        let envelope: ApiResponse<Value> =
            ApiResponse::failure(404, vec!["Villa 9 does not exist".to_string()]);
        let response = envelope.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let wire: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(wire["statusCode"], 404);
        assert_eq!(wire["isSuccess"], false);
        assert_eq!(wire["errorMessages"], json!(["Villa 9 does not exist"]));
    }

    #[tokio::test]
    async fn test_no_content_has_empty_body() {
        let response = ApiResponse::<()>::no_content().into_response();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}
