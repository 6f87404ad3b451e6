use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use siteqa_core::AppError;
use thiserror::Error;

/// Error returned by handlers, rendered as `{"detail": "<message>"}`.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub AppError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::InvalidInput(_) | AppError::Config(_) => StatusCode::BAD_REQUEST,
            AppError::DataSourceUnavailable(_) => StatusCode::NOT_FOUND,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }

        let body = Json(json!({ "detail": self.0.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Config("x".into()), StatusCode::BAD_REQUEST),
            (AppError::DataSourceUnavailable("x".into()), StatusCode::NOT_FOUND),
            (AppError::UpstreamUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Generation("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Crawl("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_response_status() {
        let response = ApiError(AppError::UpstreamUnavailable("store offline".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
