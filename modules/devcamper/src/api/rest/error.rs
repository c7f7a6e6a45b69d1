use apikit::{store_error_to_problem, Problem, ProblemResponse, ValidationError};
use axum::http::StatusCode;

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    Problem::new(status, title, detail)
        .with_type(format!("https://errors.devcamper.io/{code}"))
        .with_code(code)
        .with_instance(instance)
        .into()
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::NotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "DEVCAMPER_NOT_FOUND",
            "Not Found",
            e.to_string(),
            instance,
        ),
        DomainError::Validation { errors } => {
            let mut resp = from_parts(
                StatusCode::BAD_REQUEST,
                "DEVCAMPER_VALIDATION",
                "Validation error",
                e.to_string(),
                instance,
            );
            resp.0 = resp.0.with_errors(
                errors
                    .iter()
                    .map(|f| ValidationError {
                        detail: f.message.clone(),
                        pointer: format!("/{}", f.field),
                    })
                    .collect(),
            );
            resp
        }
        DomainError::EmailTaken { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "DEVCAMPER_EMAIL_TAKEN",
            "Email taken",
            e.to_string(),
            instance,
        ),
        DomainError::AlreadyReviewed { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "DEVCAMPER_ALREADY_REVIEWED",
            "Already reviewed",
            e.to_string(),
            instance,
        ),
        DomainError::MissingCredentials => from_parts(
            StatusCode::BAD_REQUEST,
            "DEVCAMPER_MISSING_CREDENTIALS",
            "Missing credentials",
            e.to_string(),
            instance,
        ),
        DomainError::InvalidCredentials => from_parts(
            StatusCode::UNAUTHORIZED,
            "DEVCAMPER_INVALID_CREDENTIALS",
            "Unauthorized",
            e.to_string(),
            instance,
        ),
        DomainError::Unauthenticated => from_parts(
            StatusCode::UNAUTHORIZED,
            "DEVCAMPER_UNAUTHENTICATED",
            "Unauthorized",
            e.to_string(),
            instance,
        ),
        DomainError::RoleNotAllowed { .. } | DomainError::NotOwner { .. } => from_parts(
            StatusCode::FORBIDDEN,
            "DEVCAMPER_FORBIDDEN",
            "Forbidden",
            e.to_string(),
            instance,
        ),
        DomainError::AddressNotFound { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "DEVCAMPER_ADDRESS_NOT_FOUND",
            "Address not found",
            e.to_string(),
            instance,
        ),
        DomainError::Geocoder { .. } | DomainError::Credentials { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Internal adapter error");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DEVCAMPER_INTERNAL",
                "Internal Server Error",
                "An internal error occurred",
                instance,
            )
        }
        DomainError::Store(store) => store_error_to_problem(store, instance),
    }
}
