use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Maximum length of the `detail` field attached to upstream failures.
/// Upstream error bodies can be arbitrarily large (HTML error pages,
/// tracebacks), so they are truncated before being surfaced to clients.
pub const MAX_ERROR_DETAIL: usize = 500;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        detail: Option<String>,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds an `Upstream` error from a non-success upstream status and
    /// whatever body came with it, truncated to [`MAX_ERROR_DETAIL`].
    pub fn upstream_status(status: reqwest::StatusCode, body: &str) -> Self {
        let body = body.trim();
        AppError::Upstream {
            message: format!("Backend {}", status.as_u16()),
            detail: (!body.is_empty()).then(|| truncate_detail(body)),
        }
    }
}

/// Truncates an error detail string to at most [`MAX_ERROR_DETAIL`] characters.
pub fn truncate_detail(detail: &str) -> String {
    if detail.len() <= MAX_ERROR_DETAIL {
        detail.to_string()
    } else {
        detail.chars().take(MAX_ERROR_DETAIL).collect()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Upstream { message, detail } => (StatusCode::BAD_GATEWAY, message, detail),
            AppError::HttpClient(e) => (
                StatusCode::BAD_GATEWAY,
                "Upstream request failed".to_string(),
                Some(truncate_detail(&e.to_string())),
            ),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
        };

        let body = match detail {
            Some(detail) => Json(json!({ "error": message, "detail": detail })),
            None => Json(json!({ "error": message })),
        };

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_detail_short_input_unchanged() {
        assert_eq!(truncate_detail("boom"), "boom");
    }

    #[test]
    fn test_truncate_detail_caps_length() {
        let long = "x".repeat(2000);
        let truncated = truncate_detail(&long);
        assert_eq!(truncated.chars().count(), MAX_ERROR_DETAIL);
    }

    #[test]
    fn test_upstream_status_omits_empty_detail() {
        let err = AppError::upstream_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "  ");
        match err {
            AppError::Upstream { message, detail } => {
                assert_eq!(message, "Backend 500");
                assert_eq!(detail, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
