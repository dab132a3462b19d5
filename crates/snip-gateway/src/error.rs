use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use snip_core::MappingError;
use tracing::warn;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

const INVALID_MESSAGE: &str = "short url invalid";
const NOT_FOUND_MESSAGE: &str = "short url not found";

/// Transport-level failure.
///
/// Create failures all collapse into 400 and resolve failures into 404, so
/// a response never says more than "that did not work" about a code.
#[derive(Debug)]
pub enum AppError {
    /// The request body could not be read as a create request.
    BadRequest(String),
    /// The service refused or failed to create the mapping.
    Create(MappingError),
    /// The code could not be resolved.
    Resolve(MappingError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(reason) => {
                warn!(reason, "Malformed create request");
                (StatusCode::BAD_REQUEST, INVALID_MESSAGE)
            }
            AppError::Create(err) => {
                if matches!(err, MappingError::Unavailable(_)) {
                    warn!(error = %err, "Create failed on a backend");
                }
                (StatusCode::BAD_REQUEST, INVALID_MESSAGE)
            }
            AppError::Resolve(err) => {
                if matches!(err, MappingError::Unavailable(_)) {
                    warn!(error = %err, "Resolve failed on a backend");
                }
                (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
