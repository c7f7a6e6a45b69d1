use apikit::{Problem, ProblemResponse};
use axum::{
    http::{StatusCode, Uri},
    response::Json,
};
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Fallback for paths no module registered.
pub async fn route_not_found(uri: Uri) -> ProblemResponse {
    Problem::new(
        StatusCode::NOT_FOUND,
        "Not Found",
        format!("Route {} not found", uri.path()),
    )
    .with_code("ROUTE_NOT_FOUND")
    .with_instance(uri.path())
    .into()
}
