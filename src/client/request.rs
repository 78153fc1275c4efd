use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiMethod::Get => "GET",
            ApiMethod::Post => "POST",
            ApiMethod::Put => "PUT",
            ApiMethod::Patch => "PATCH",
            ApiMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

impl From<ApiMethod> for reqwest::Method {
    fn from(method: ApiMethod) -> Self {
        match method {
            ApiMethod::Get => reqwest::Method::GET,
            ApiMethod::Post => reqwest::Method::POST,
            ApiMethod::Put => reqwest::Method::PUT,
            ApiMethod::Patch => reqwest::Method::PATCH,
            ApiMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One call against the villa API. `url` is absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: ApiMethod,
    pub url: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: ApiMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(ApiMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(ApiMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(ApiMethod::Put, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(ApiMethod::Patch, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(ApiMethod::Delete, url)
    }

    /// Attaches a JSON body.
    pub fn with_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Validation(format!("Request body could not be encoded: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }
}
