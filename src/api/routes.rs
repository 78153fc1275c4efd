use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::{handlers, villa_handlers, villa_number_handlers};
use crate::store::VillaStore;

pub fn create_router<S: VillaStore + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Villas
        .route(
            "/api/villas",
            get(villa_handlers::get_villas::<S>).post(villa_handlers::create_villa::<S>),
        )
        .route(
            "/api/villas/:id",
            get(villa_handlers::get_villa::<S>)
                .put(villa_handlers::update_villa::<S>)
                .patch(villa_handlers::patch_villa::<S>)
                .delete(villa_handlers::delete_villa::<S>),
        )
        // Villa numbers
        .route(
            "/api/villa-numbers",
            get(villa_number_handlers::get_villa_numbers::<S>)
                .post(villa_number_handlers::create_villa_number::<S>),
        )
        .route(
            "/api/villa-numbers/:villa_no",
            get(villa_number_handlers::get_villa_number::<S>)
                .put(villa_number_handlers::update_villa_number::<S>)
                .patch(villa_number_handlers::patch_villa_number::<S>)
                .delete(villa_number_handlers::delete_villa_number::<S>),
        )
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        create_router::<MemoryStore>().with_state(Arc::new(MemoryStore::new()))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = call(&app(), "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_create_then_get_villa() {
        let app = app();
        let (status, created) = call(
            &app,
            "POST",
            "/api/villas",
            Some(json!({"name": "Pool View", "occupancy": 3, "sqft": 100, "rate": 200.0})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["statusCode"], 201);
        assert_eq!(created["isSuccess"], true);
        assert_eq!(created["result"]["id"], 1);

        let (status, fetched) = call(&app, "GET", "/api/villas/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["result"]["name"], "Pool View");
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_bad_request_envelope() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/villas")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["isSuccess"], false);
        assert_eq!(body["statusCode"], 400);
    }

    #[tokio::test]
    async fn test_null_body_and_zero_id_are_rejected() {
        let app = app();

        let (status, body) = call(&app, "POST", "/api/villas", Some(Value::Null)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["isSuccess"], false);

        let (status, _) = call(&app, "GET", "/api/villas/0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, "GET", "/api/villas/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_put_with_mismatched_id_is_rejected() {
        let app = app();
        call(&app, "POST", "/api/villas", Some(json!({"name": "Pool View"}))).await;

        let (status, body) = call(
            &app,
            "PUT",
            "/api/villas/1",
            Some(json!({"id": 2, "name": "Pool View", "occupancy": 3, "sqft": 100, "rate": 200.0})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
    }

    #[tokio::test]
    async fn test_villa_number_include_loads_villa() {
        let app = app();
        call(&app, "POST", "/api/villas", Some(json!({"name": "Pool View"}))).await;
        let (status, _) = call(
            &app,
            "POST",
            "/api/villa-numbers",
            Some(json!({"villaNo": 101, "villaId": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, plain) = call(&app, "GET", "/api/villa-numbers/101", None).await;
        assert!(plain["result"].get("villa").is_none());

        let (status, loaded) = call(&app, "GET", "/api/villa-numbers?include=villa", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(loaded["result"][0]["villa"]["name"], "Pool View");

        let (status, _) = call(&app, "GET", "/api/villa-numbers?include=owner", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unparsable_query_is_a_bad_request_envelope() {
        let app = app();

        for uri in [
            "/api/villa-numbers?include=villa&include=villa",
            "/api/villa-numbers/101?include=villa&include=villa",
        ] {
            let (status, body) = call(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["statusCode"], 400);
            assert_eq!(body["isSuccess"], false);
            assert_eq!(body["errorMessages"].as_array().map(Vec::len), Some(1));
        }
    }

    #[tokio::test]
    async fn test_put_keeps_own_name_but_not_anothers() {
        let app = app();
        call(&app, "POST", "/api/villas", Some(json!({"name": "Pool View"}))).await;
        call(&app, "POST", "/api/villas", Some(json!({"name": "Beach View"}))).await;

        let (status, _) = call(
            &app,
            "PUT",
            "/api/villas/2",
            Some(json!({"id": 2, "name": "BEACH VIEW", "occupancy": 5, "sqft": 0, "rate": 0.0})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = call(
            &app,
            "PUT",
            "/api/villas/2",
            Some(json!({"id": 2, "name": "pool view", "occupancy": 5, "sqft": 0, "rate": 0.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorMessages"][0], "Villa already exists!");

        let (_, stored) = call(&app, "GET", "/api/villas/2", None).await;
        assert_eq!(stored["result"]["name"], "BEACH VIEW");
    }

    #[tokio::test]
    async fn test_villa_number_put_checks_villa_before_existence() {
        let app = app();

        let (status, body) = call(
            &app,
            "PUT",
            "/api/villa-numbers/5",
            Some(json!({"villaNo": 5, "villaId": 9})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorMessages"][0], "Villa Id is Invalid!");

        call(&app, "POST", "/api/villas", Some(json!({"name": "Pool View"}))).await;
        let (status, _) = call(
            &app,
            "PUT",
            "/api/villa-numbers/5",
            Some(json!({"villaNo": 5, "villaId": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
