use axum::{
    body::Body,
    extract::Extension,
    http::{Request, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use api_ingress::request_id::XRequestId;
use api_ingress::{build_router, ApiIngressConfig};

fn app() -> Router {
    let routes = Router::new()
        .route("/bootcamps", get(echo_id))
        .route("/broken", get(failing));
    build_router(routes, &ApiIngressConfig::default())
}

async fn echo_id(Extension(XRequestId(id)): Extension<XRequestId>) -> Json<Value> {
    Json(json!({ "success": true, "requestId": id }))
}

async fn failing(Extension(XRequestId(id)): Extension<XRequestId>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "requestId": id })),
    )
        .into_response()
}

async fn call(uri: &str, id: Option<&str>) -> (StatusCode, Option<String>, Value) {
    let mut req = Request::builder().uri(uri);
    if let Some(id) = id {
        req = req.header("x-request-id", id);
    }
    let resp = app().oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
    let status = resp.status();
    let header = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, header, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn missing_id_is_generated_and_shared_with_handler() {
    let (status, header, body) = call("/bootcamps", None).await;
    assert_eq!(status, StatusCode::OK);

    let header = header.expect("generated x-request-id");
    assert!(!header.is_empty());
    assert_eq!(body["requestId"], header.as_str());
}

#[tokio::test]
async fn incoming_id_is_kept() {
    let (_, header, body) = call("/bootcamps", Some("abc-123")).await;
    assert_eq!(header.as_deref(), Some("abc-123"));
    assert_eq!(body["requestId"], "abc-123");
}

#[tokio::test]
async fn error_responses_echo_the_id() {
    let (status, header, body) = call("/broken", Some("err-7")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some("err-7"));
    assert_eq!(body["requestId"], "err-7");
}

#[tokio::test]
async fn unknown_routes_still_get_an_id() {
    let (status, header, body) = call("/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(header.is_some());
    assert!(body.is_object());
}
