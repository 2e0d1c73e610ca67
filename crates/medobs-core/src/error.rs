use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON error envelope returned by every MedObs endpoint.
///
/// `fields` carries per-field validation messages and is omitted otherwise.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: None,
        }
    }

    pub fn with_fields(mut self, fields: serde_json::Value) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        // tower-http TraceLayer already records method/uri/status for all requests;
        // only server faults are logged here.
        if status.is_server_error() {
            tracing::error!(kind = self.kind, error = %self.message, "internal error");
        }
        (status, axum::Json(self)).into_response()
    }
}
