use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use std::any::Any;

use crate::{response::Envelope, service::ServiceError};

/// Errors as they leave a handler. Each maps to one status code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed body or failed field validation
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Driver failure or an expired store deadline
    #[error("{0}")]
    Storage(String),

    /// Anything unexpected, such as a panicking handler
    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(_) => Self::BadRequest(e.to_string()),
            ServiceError::NotFound => Self::NotFound(e.to_string()),
            ServiceError::Storage(_) | ServiceError::Timeout(_) => Self::Storage(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!("request rejected ({}): {}", status, self);
        }

        Envelope::new(status, "error", self.to_string()).into_response()
    }
}

/// Turns a handler panic into a 500 envelope.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    tracing::error!("handler panicked: {detail}");

    AppError::Internal("Internal server error".to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    use http_body_util::BodyExt;

    use std::time::Duration;

    #[test]
    fn service_errors_map_to_statuses() {
        assert_eq!(
            AppError::from(ServiceError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(ServiceError::Timeout(Duration::from_secs(10))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_keeps_the_client_facing_text() {
        let e = AppError::from(ServiceError::NotFound);
        assert_eq!(e.to_string(), "Note with specified ID not found!");
    }

    #[test]
    fn validation_failure_is_bad_request() {
        use validator::Validate;

        let errors = crate::dto::NoteRequest::default().validate().unwrap_err();
        let e = AppError::from(ServiceError::from(errors));

        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert!(e.to_string().contains("title"));
    }

    #[tokio::test]
    async fn panics_become_internal_errors() {
        let response = panic_response(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], 500);
        assert_eq!(json["message"], "error");
        assert_eq!(json["data"]["data"], "Internal server error");
    }
}
