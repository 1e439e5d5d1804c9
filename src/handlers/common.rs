use crate::errors::ServiceError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::Validate;

/// Result of a JSON handler
pub type ApiResult<T> = Result<Json<T>, ServiceError>;

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input.validate().map_err(ServiceError::from)
}

/// Rejects non-positive path ids before any lookup.
pub fn path_id(raw: i32, entity: &str) -> Result<i32, ServiceError> {
    if raw > 0 {
        Ok(raw)
    } else {
        Err(ServiceError::BadRequest(format!("Invalid {} id", entity)))
    }
}

/// Downloadable file body with content type and attachment filename.
pub fn file_response(body: impl Into<axum::body::Body>, content_type: &'static str, filename: &str) -> Response {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body.into(),
    )
        .into_response()
}
