use std::io;
use axum::{http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;

/// Error type shared by the gateway, renderer and handlers
#[derive(Debug, Error)]
pub enum WikiError {
    #[error("not found")]
    NotFound,
    #[error("invalid page title {0:?}")]
    InvalidTitle(String),
    #[error("{0}")]
    Store(String),
    #[error("{0}")]
    Codec(#[from] serde_json::Error),
    #[error("{0}")]
    Template(String),
    #[error("{0}")]
    BadForm(String),
    #[error("{0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<redis::RedisError> for WikiError {
    fn from(err: redis::RedisError) -> Self {
        WikiError::Store(err.to_string())
    }
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        match self {
            WikiError::NotFound | WikiError::InvalidTitle(_) => {
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }
            WikiError::Store(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Store error: {}", e),
            )
                .into_response(),
            WikiError::Codec(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Encoding error: {}", e),
            )
                .into_response(),
            WikiError::Template(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Template error: {}", e),
            )
                .into_response(),
            WikiError::BadForm(e) => (
                StatusCode::BAD_REQUEST,
                format!("Bad form: {}", e),
            )
                .into_response(),
            WikiError::Config(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Configuration error: {}", e),
            )
                .into_response(),
            WikiError::Io(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("I/O error: {}", e),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_level_errors_map_to_not_found() {
        assert_eq!(WikiError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            WikiError::InvalidTitle("foo-bar".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn store_errors_map_to_internal_server_error() {
        let resp = WikiError::Store("connection refused".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_forms_are_bad_requests() {
        let resp = WikiError::BadForm("unexpected end of multipart".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
