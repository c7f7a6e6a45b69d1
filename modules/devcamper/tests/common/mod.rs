#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use api_ingress::{build_router, ApiIngressConfig};
use devcamper::config::DevcamperConfig;
use devcamper::contract::model::GeoLocation;
use devcamper::domain::error::DomainError;
use devcamper::domain::ports::Geocoder;
use devcamper::infra::jwt::JwtTokenIssuer;
use devcamper::infra::password::Argon2PasswordHasher;
use devcamper::{Devcamper, Ports};
use docstore::MemoryStore;

/// Every address resolves to Boston University; `nowhere` has no match.
pub struct FixedGeocoder;

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoLocation, DomainError> {
        if address == "nowhere" {
            return Err(DomainError::AddressNotFound {
                address: address.to_string(),
            });
        }
        let mut loc = GeoLocation::point(-71.104, 42.350);
        loc.street = Some("233 Bay State Rd".into());
        loc.city = Some("Boston".into());
        loc.state = Some("MA".into());
        loc.zipcode = Some("02215".into());
        loc.country = Some("US".into());
        loc.formatted_address = Some("233 Bay State Rd, Boston, MA, 02215, US".into());
        Ok(loc)
    }
}

pub fn ports() -> Ports {
    Ports {
        geocoder: Arc::new(FixedGeocoder),
        hasher: Arc::new(Argon2PasswordHasher::with_params(8, 1).unwrap()),
        tokens: Arc::new(JwtTokenIssuer::new("test-secret", 30)),
    }
}

pub fn module() -> Devcamper {
    Devcamper::new(DevcamperConfig::default(), MemoryStore::new(), ports()).unwrap()
}

/// Full HTTP stack: ingress middleware around the module's routes.
pub fn app(module: &Devcamper) -> Router {
    let routes = module.register_rest(Router::new()).unwrap();
    build_router(routes, &ApiIngressConfig::default())
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, None).await
}

/// Register through the API and return the bearer token.
pub async fn register(app: &Router, name: &str, role: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "name": name,
            "email": format!("{name}@gmail.com"),
            "password": "123456",
            "role": role
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

pub fn bootcamp_body(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Full stack web development",
        "website": "https://devworks.com",
        "phone": "(111) 111-1111",
        "email": "enroll@devworks.com",
        "address": "233 Bay State Rd Boston MA 02215",
        "careers": ["Web Development", "UI/UX", "Business"],
        "housing": true,
        "jobAssistance": true
    })
}

pub async fn create_bootcamp(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/bootcamps",
        Some(token),
        Some(bootcamp_body(name)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create bootcamp failed: {body}");
    body["data"]["_id"].as_str().unwrap().to_string()
}
