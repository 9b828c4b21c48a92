use core::str::FromStr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use farmhub_infra::AppError;

pub fn app_error_to_response(err: AppError) -> Response {
    match err {
        AppError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "request validation failed",
                "errors": errors.errors(),
            })),
        )
            .into_response(),
        AppError::Domain(msg) => json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg),
        AppError::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized"),
        AppError::Forbidden(permission) => json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            format!("missing permission '{permission}'"),
        ),
        AppError::NotFound(what) => json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found")),
        AppError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        AppError::Storage(msg) => {
            error!(error = %msg, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "storage failure")
        }
        AppError::Internal(msg) => {
            error!(error = %msg, "internal failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Serialize a handler result with `status`, or map the failure.
pub fn reply<T: Serialize>(status: StatusCode, result: Result<T, AppError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(e) => app_error_to_response(e),
    }
}

/// 204 on success.
pub fn no_content(result: Result<(), AppError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => app_error_to_response(e),
    }
}

pub fn parse_id<I: FromStr>(raw: &str, what: &str) -> Result<I, Response> {
    raw.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}
