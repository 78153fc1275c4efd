use serde::{Deserialize, Serialize};

const STATUS_OK: u16 = 200;
const STATUS_CREATED: u16 = 201;
const STATUS_NO_CONTENT: u16 = 204;

/// The envelope every API operation answers with.
///
/// `is_success` is false exactly when `error_messages` is non-empty. The
/// constructors are the only way to build one, so that holds for every value
/// produced on the server side; envelopes decoded off the wire go through
/// [`ApiResponse::normalized`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    status_code: u16,
    #[serde(default = "default_success")]
    is_success: bool,
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default = "Option::default")]
    result: Option<T>,
}

fn default_success() -> bool {
    true
}

impl<T> ApiResponse<T> {
    pub fn success(status_code: u16, result: T) -> Self {
        Self {
            status_code,
            is_success: true,
            error_messages: Vec::new(),
            result: Some(result),
        }
    }

    pub fn ok(result: T) -> Self {
        Self::success(STATUS_OK, result)
    }

    pub fn created(result: T) -> Self {
        Self::success(STATUS_CREATED, result)
    }

    /// A successful envelope without a payload.
    pub fn empty(status_code: u16) -> Self {
        Self {
            status_code,
            is_success: true,
            error_messages: Vec::new(),
            result: None,
        }
    }

    pub fn no_content() -> Self {
        Self::empty(STATUS_NO_CONTENT)
    }

    pub fn failure(status_code: u16, messages: Vec<String>) -> Self {
        let error_messages = if messages.is_empty() {
            vec![format!("Request failed with status {}", status_code)]
        } else {
            messages
        };

        Self {
            status_code,
            is_success: false,
            error_messages,
            result: None,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn is_success(&self) -> bool {
        self.is_success
    }

    pub fn error_messages(&self) -> &[String] {
        &self.error_messages
    }

    /// The message a form shows when the call failed.
    pub fn first_error(&self) -> Option<&str> {
        self.error_messages.first().map(String::as_str)
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<T> {
        self.result
    }

    /// Restores the success/error invariant on an envelope that came from
    /// somewhere other than the constructors.
    pub fn normalized(self) -> Self {
        if self.is_success && self.error_messages.is_empty() {
            self
        } else {
            Self::failure(self.status_code, self.error_messages)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_wire_shape() {
        let envelope = ApiResponse::created(json!({"id": 1, "name": "Pool View"}));
        let wire = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            wire,
            json!({
                "statusCode": 201,
                "isSuccess": true,
                "errorMessages": [],
                "result": {"id": 1, "name": "Pool View"}
            })
        );
    }

    #[test]
    fn test_failure_without_messages_keeps_invariant() {
        let envelope: ApiResponse<()> = ApiResponse::failure(404, Vec::new());

        assert!(!envelope.is_success());
        assert_eq!(envelope.status_code(), 404);
        assert_eq!(
            envelope.first_error(),
            Some("Request failed with status 404")
        );
        assert!(envelope.result().is_none());
    }

    #[test]
    fn test_no_content_has_no_result() {
        let envelope: ApiResponse<String> = ApiResponse::no_content();
        assert!(envelope.is_success());
        assert_eq!(envelope.status_code(), 204);
        assert!(envelope.error_messages().is_empty());
        assert!(envelope.into_result().is_none());
    }

    #[test]
    fn test_normalized_repairs_inconsistent_wire_envelopes() {
        let flagged_without_errors: ApiResponse<i32> = serde_json::from_value(json!({
            "statusCode": 500,
            "isSuccess": false,
            "errorMessages": [],
            "result": null
        }))
        .unwrap();
        let normalized = flagged_without_errors.normalized();
        assert!(!normalized.is_success());
        assert_eq!(normalized.error_messages().len(), 1);

        let errors_marked_success: ApiResponse<i32> = serde_json::from_value(json!({
            "statusCode": 400,
            "errorMessages": ["Villa already exists!"]
        }))
        .unwrap();
        let normalized = errors_marked_success.normalized();
        assert!(!normalized.is_success());
        assert_eq!(normalized.first_error(), Some("Villa already exists!"));
    }

    #[test]
    fn test_typed_result_decoding() {
        let envelope: ApiResponse<Vec<i32>> = serde_json::from_value(json!({
            "statusCode": 200,
            "isSuccess": true,
            "errorMessages": [],
            "result": [1, 2, 3]
        }))
        .unwrap();

        assert_eq!(envelope.into_result(), Some(vec![1, 2, 3]));
    }
}
