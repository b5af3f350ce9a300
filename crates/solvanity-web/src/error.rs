use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use solvanity_core::{ConstraintError, GrindError};

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": message.into(),
        })),
    )
        .into_response()
}

pub fn constraint_error_response(err: &ConstraintError) -> Response {
    error_response(StatusCode::BAD_REQUEST, err.to_string())
}

pub fn grind_error_response(err: &GrindError) -> Response {
    let status = if err.is_rejection() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    error_response(status, err.to_string())
}
