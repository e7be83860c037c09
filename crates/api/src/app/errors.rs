use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use pricelens_core::DomainError;
use pricelens_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => {
            tracing::debug!(reason = %msg, "request rejected");
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        ServiceError::NotFound(msg) => {
            tracing::debug!(reason = %msg, "resource not found");
            json_error(StatusCode::NOT_FOUND, "not_found", msg)
        }
        ServiceError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    service_error_to_response(err.into())
}

/// 400 for a request the extractor could not decode (bad JSON, bad query string).
pub fn rejection_to_response(rejection: impl std::fmt::Display) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
