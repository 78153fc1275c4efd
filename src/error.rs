use thiserror::Error;

use crate::logic::PatchError;
use crate::model::ApiResponse;
use crate::store::RepositoryError;

/// Failures an API operation (or the client calling it) can report.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or semantically invalid input.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// A uniqueness rule would be broken by the write.
    #[error("{0}")]
    Conflict(String),

    /// The client could not reach the API or make sense of its answer.
    #[error("{0}")]
    Transport(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Transport(_) => 503,
            ApiError::Internal(_) => 500,
        }
    }

    /// Whether this is a fault on our side rather than the caller's.
    pub fn is_internal(&self) -> bool {
        matches!(self, ApiError::Internal(_) | ApiError::Transport(_))
    }
}

impl<T> From<ApiError> for ApiResponse<T> {
    fn from(error: ApiError) -> Self {
        ApiResponse::failure(error.status_code(), vec![error.to_string()])
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound { .. } => ApiError::NotFound(error.to_string()),
            RepositoryError::Conflict(message) => ApiError::Conflict(message),
            RepositoryError::InvalidReference(message) => ApiError::Validation(message),
            RepositoryError::UnknownInclude { .. } => ApiError::Validation(error.to_string()),
            RepositoryError::Database(e) => ApiError::Internal(anyhow::Error::new(e)),
        }
    }
}

impl From<PatchError> for ApiError {
    fn from(error: PatchError) -> Self {
        ApiError::Validation(error.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid ({})", field, error.code),
                })
            })
            .collect();
        messages.sort();
        ApiError::Validation(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(ApiError::Validation("bad".into()).status_code(), 400);
        assert_eq!(ApiError::Conflict("dup".into()).status_code(), 400);
        assert_eq!(ApiError::NotFound("gone".into()).status_code(), 404);
        assert_eq!(ApiError::Transport("down".into()).status_code(), 503);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status_code(),
            500
        );
    }

    #[test]
    fn test_error_becomes_failed_envelope() {
        let envelope: ApiResponse<()> = ApiError::NotFound("Villa 7 does not exist".into()).into();

        assert!(!envelope.is_success());
        assert_eq!(envelope.status_code(), 404);
        assert_eq!(envelope.first_error(), Some("Villa 7 does not exist"));
    }

    #[test]
    fn test_repository_errors_map_to_api_errors() {
        let not_found: ApiError = RepositoryError::NotFound {
            entity: "Villa",
            key: 3,
        }
        .into();
        assert!(matches!(not_found, ApiError::NotFound(ref m) if m == "Villa 3 does not exist"));

        let reference: ApiError = RepositoryError::InvalidReference("Villa Id is Invalid!".into()).into();
        assert_eq!(reference.status_code(), 400);

        let include: ApiError = RepositoryError::UnknownInclude {
            entity: "Villa",
            include: "owner".into(),
        }
        .into();
        assert!(matches!(include, ApiError::Validation(_)));
    }
}
