//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ImpactError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request parameters
    BadRequest(String),
    /// Engine error
    Impact(ImpactError),
}

impl AppError {
    fn status_and_body(&self) -> (StatusCode, ApiError) {
        match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg.clone()))
            }
            AppError::Impact(err) => {
                let (status, code) = match err {
                    ImpactError::InvalidInput { context, .. }
                        if context.entity.as_deref() == Some("scenario") =>
                    {
                        (StatusCode::NOT_FOUND, "NOT_FOUND")
                    }
                    ImpactError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, err.code()),
                    ImpactError::Configuration { .. } => {
                        (StatusCode::SERVICE_UNAVAILABLE, err.code())
                    }
                    ImpactError::DataConsistency { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, err.code())
                    }
                    ImpactError::ProviderUnavailable { .. } => (StatusCode::BAD_GATEWAY, err.code()),
                };
                let mut body = ApiError::new(code, err.message());
                if let Some(details) = err.context().details.as_deref() {
                    body = body.with_details(details);
                }
                (status, body)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_body();
        if status.is_server_error() {
            tracing::error!(code = %error.code, "{}", error.message);
        }
        (status, Json(error)).into_response()
    }
}

impl From<ImpactError> for AppError {
    fn from(err: ImpactError) -> Self {
        AppError::Impact(err)
    }
}

impl From<crate::db::repository::RepositoryError> for AppError {
    fn from(err: crate::db::repository::RepositoryError) -> Self {
        AppError::Impact(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::ErrorContext;

    fn status_of(err: ImpactError) -> (StatusCode, String) {
        let (status, body) = AppError::from(err).status_and_body();
        (status, body.code)
    }

    #[test]
    fn test_unknown_scenario_is_not_found() {
        let err = ImpactError::invalid_input_with_context(
            "Scenario 9 not found",
            ErrorContext::new("get_scenario").with_entity("scenario").with_entity_id(9),
        );
        assert_eq!(status_of(err), (StatusCode::NOT_FOUND, "NOT_FOUND".to_string()));
    }

    #[test]
    fn test_error_kinds_map_to_status() {
        assert_eq!(
            status_of(ImpactError::invalid_input("bad age group")).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ImpactError::configuration("no provider")),
            (StatusCode::SERVICE_UNAVAILABLE, "IMPACT_UNAVAILABLE".to_string())
        );
        assert_eq!(
            status_of(ImpactError::data_consistency("two rows")),
            (StatusCode::INTERNAL_SERVER_ERROR, "DATA_CONSISTENCY".to_string())
        );
        assert_eq!(
            status_of(ImpactError::provider_unavailable("down")),
            (StatusCode::BAD_GATEWAY, "PROVIDER_UNAVAILABLE".to_string())
        );
    }

    #[test]
    fn test_details_are_forwarded() {
        let err = ImpactError::invalid_input_with_context(
            "Unknown age group",
            ErrorContext::new("scenario_impact").with_details("valid: 0-5, all"),
        );
        let (_, body) = AppError::from(err).status_and_body();
        assert_eq!(body.details.as_deref(), Some("valid: 0-5, all"));
    }
}
