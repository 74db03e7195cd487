use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Transport-level failures. Everything covered by the table contract is
/// reported inside the JSON body instead, see [`crate::table::TableError`].
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unsupported format, only json is available")]
    UnsupportedFormat,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::UnsupportedFormat { .. } => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}
