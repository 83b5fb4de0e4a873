use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use mesa_core::DomainError;

/// Translate a domain failure into the wire format: an HTTP status plus a
/// `{severity, summary, detail}` body. Internal details never leak; the
/// orchestrator already replaced them with a user-facing message.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(detail) => {
            json_error(StatusCode::BAD_REQUEST, "warn", "invalid request", detail)
        }
        DomainError::NotFound(detail) => {
            json_error(StatusCode::NOT_FOUND, "warn", "not found", detail)
        }
        DomainError::Forbidden(detail) => {
            json_error(StatusCode::FORBIDDEN, "warn", "forbidden", detail)
        }
        DomainError::Conflict(detail) => {
            json_error(StatusCode::CONFLICT, "warn", "conflict", detail)
        }
        DomainError::InvalidState(detail) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "warn",
            "invalid state",
            detail,
        ),
        DomainError::Internal(detail) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "error",
            "internal error",
            detail,
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    severity: &'static str,
    summary: &'static str,
    detail: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "severity": severity,
            "summary": summary,
            "detail": detail.into(),
        })),
    )
        .into_response()
}
