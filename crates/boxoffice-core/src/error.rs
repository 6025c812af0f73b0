use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON body returned for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub kind: &'a str,
    pub message: String,
}

/// A service error with a stable kind string and an HTTP status.
///
/// Service error enums implement this and forward `IntoResponse` to
/// [`ServiceError::json_response`].
pub trait ServiceError: std::fmt::Display {
    fn kind(&self) -> &'static str;

    fn status(&self) -> StatusCode;

    fn json_response(&self) -> Response {
        let status = self.status();
        // TraceLayer records every request; only 5xx get their own line.
        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "internal error");
        }
        let body = ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
