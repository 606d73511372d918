use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors raised inside the agent. None of these reach an HTTP client:
/// adapter errors are converted to fallback data and config problems are
/// logged at startup.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected response shape: {0}")]
    Schema(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_display_lists_names() {
        let err = AgentError::MissingCredentials(vec!["META_ACCESS_TOKEN", "META_APP_ID"]);
        assert_eq!(
            err.to_string(),
            "Missing credentials: META_ACCESS_TOKEN, META_APP_ID"
        );
    }

    #[test]
    fn test_api_error_status_codes() {
        fn status_of(err: ApiError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            status_of(ApiError::BadRequest("no message".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
    }
}
