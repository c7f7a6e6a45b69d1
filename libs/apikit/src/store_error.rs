use axum::http::StatusCode;
use docstore::StoreError;
use tracing::error;

use crate::problem::{Problem, ProblemResponse};

/// Map store failures to RFC 9457 responses. Query mistakes are the
/// caller's (400); anything else is logged and hidden behind a 500.
pub fn store_error_to_problem(e: &StoreError, instance: &str) -> ProblemResponse {
    match e {
        StoreError::Cast { .. } => Problem::new(StatusCode::BAD_REQUEST, "Bad Request", e.to_string())
            .with_code("STORE_CAST_FAILED")
            .with_instance(instance)
            .into(),
        StoreError::InvalidFilter { .. } | StoreError::UnknownOperator { .. } => {
            Problem::new(StatusCode::BAD_REQUEST, "Filter error", e.to_string())
                .with_code("STORE_FILTER_INVALID")
                .with_instance(instance)
                .into()
        }
        StoreError::InvalidProjection(_) => {
            Problem::new(StatusCode::BAD_REQUEST, "Select error", e.to_string())
                .with_code("STORE_SELECT_INVALID")
                .with_instance(instance)
                .into()
        }
        StoreError::UnknownRelation { .. } => {
            Problem::new(StatusCode::BAD_REQUEST, "Populate error", e.to_string())
                .with_code("STORE_POPULATE_INVALID")
                .with_instance(instance)
                .into()
        }
        StoreError::Duplicate { field } => Problem::new(
            StatusCode::BAD_REQUEST,
            "Duplicate Key",
            format!("Duplicate field value entered for {field}"),
        )
        .with_code("DUPLICATE_KEY")
        .with_instance(instance)
        .into(),
        StoreError::UnknownCollection(_)
        | StoreError::NotADocument
        | StoreError::Io(_)
        | StoreError::Serde(_) => {
            error!(error = %e, instance, "store failure");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An internal error occurred",
            )
            .with_code("STORE_INTERNAL")
            .with_instance(instance)
            .into()
        }
    }
}
