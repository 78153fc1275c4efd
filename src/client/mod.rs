pub mod request;
pub mod services;

pub use request::*;
pub use services::*;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::model::ApiResponse;

/// Typed caller of the villa API.
///
/// `send` never fails: anything that prevents a decoded envelope (refused
/// connection, timeout, a body that is not an envelope) comes back as a
/// failed envelope with status 503.
#[derive(Debug, Clone)]
pub struct VillaClient {
    http: reqwest::Client,
    base_url: String,
}

impl VillaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/api/villas`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResponse<T> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self.http.request(request.method.into(), &request.url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return transport_failure(&request, e),
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return transport_failure(&request, e),
        };

        if bytes.is_empty() {
            return if status.is_success() {
                ApiResponse::empty(status.as_u16())
            } else {
                ApiResponse::failure(status.as_u16(), Vec::new())
            };
        }

        match serde_json::from_slice::<ApiResponse<T>>(&bytes) {
            Ok(envelope) => envelope.normalized(),
            // An error answer that is not an envelope still carries the real status.
            Err(_) if !status.is_success() => {
                let text = String::from_utf8_lossy(&bytes).trim().to_string();
                warn!("{} {} answered {} without an envelope", request.method, request.url, status);
                let messages = if text.is_empty() { Vec::new() } else { vec![text] };
                ApiResponse::failure(status.as_u16(), messages)
            }
            Err(e) => transport_failure(&request, e),
        }
    }
}

fn transport_failure<T>(request: &ApiRequest, error: impl std::fmt::Display) -> ApiResponse<T> {
    let failure = ApiError::Transport(format!(
        "{} {} failed: {}",
        request.method, request.url, error
    ));
    warn!("{}", failure);
    failure.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_unreachable_server_is_a_503_envelope() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let client = VillaClient::new(format!("http://{}", address), Duration::from_secs(2)).unwrap();
        let envelope: ApiResponse<Value> = client.send(ApiRequest::get(client.url("/api/villas"))).await;

        assert!(!envelope.is_success());
        assert_eq!(envelope.status_code(), 503);
        assert_eq!(envelope.error_messages().len(), 1);
        assert!(envelope.result().is_none());
    }

    async fn serve(app: axum::Router) -> VillaClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        VillaClient::new(format!("http://{}", address), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_plain_error_body_keeps_server_status() {
        let app = axum::Router::new().route(
            "/api/villas",
            axum::routing::get(|| async { (axum::http::StatusCode::BAD_REQUEST, "duplicate field `include`") }),
        );
        let client = serve(app).await;

        let envelope: ApiResponse<Value> = client.send(ApiRequest::get(client.url("/api/villas"))).await;

        assert!(!envelope.is_success());
        assert_eq!(envelope.status_code(), 400);
        assert_eq!(envelope.first_error(), Some("duplicate field `include`"));
    }

    #[tokio::test]
    async fn test_undecodable_success_body_is_a_transport_failure() {
        let app = axum::Router::new().route("/api/villas", axum::routing::get(|| async { "not json" }));
        let client = serve(app).await;

        let envelope: ApiResponse<Value> = client.send(ApiRequest::get(client.url("/api/villas"))).await;

        assert_eq!(envelope.status_code(), 503);
        assert_eq!(envelope.error_messages().len(), 1);
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let client = VillaClient::new("http://localhost:3001/", Duration::from_secs(1)).unwrap();

        assert_eq!(client.url("/api/villas"), "http://localhost:3001/api/villas");
    }
}
