use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Error body in the RFC 9457 shape, extended with an application `code`
/// and per-field validation `errors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    pub status: u16,
    /// Client-facing message; for validation failures every field message
    /// joined with ", ".
    pub detail: String,
    /// Request path the problem occurred on.
    pub instance: String,
    /// Stable identifier such as `DUPLICATE_KEY` or `VALIDATION_ERROR`.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub detail: String,
    /// JSON Pointer to the field, e.g. `/email`.
    pub pointer: String,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".into(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            errors: None,
        }
    }

    pub fn with_type(self, type_url: impl Into<String>) -> Self {
        Self {
            type_url: type_url.into(),
            ..self
        }
    }

    pub fn with_instance(self, path: impl Into<String>) -> Self {
        Self {
            instance: path.into(),
            ..self
        }
    }

    pub fn with_code(self, code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..self
        }
    }

    pub fn with_errors(self, errors: Vec<ValidationError>) -> Self {
        Self {
            errors: Some(errors),
            ..self
        }
    }

    /// Out-of-range codes render as 500.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// `Problem` as an axum response: its status and `application/problem+json`.
#[derive(Debug, Clone)]
pub struct ProblemResponse(pub Problem);

impl From<Problem> for ProblemResponse {
    fn from(p: Problem) -> Self {
        Self(p)
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_PROBLEM_JSON))],
            Json(self.0),
        )
            .into_response()
    }
}

/// Generic 500; the cause belongs in the logs, not in `detail`.
pub fn internal_error(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", detail)
        .with_code("INTERNAL")
        .into()
}
