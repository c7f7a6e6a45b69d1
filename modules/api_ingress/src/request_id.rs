//! `x-request-id` handling: generated when absent, echoed on the response,
//! exposed to handlers and recorded on the request span.

use std::time::Duration;

use axum::http::{HeaderName, Request};
use axum::{body::Body, middleware::Next, response::Response};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::request_id::{MakeRequestId, RequestId};
use tower_http::trace::TraceLayer;
use tracing::{field::Empty, Span};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Recorded when a request reaches a handler without an id.
const UNKNOWN: &str = "n/a";

/// The current request's id, available as `Extension<XRequestId>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XRequestId(pub String);

/// Generates nanoid request ids.
#[derive(Clone, Copy, Default)]
pub struct NanoIdMaker;

impl MakeRequestId for NanoIdMaker {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        nanoid::nanoid!().parse().ok().map(RequestId::new)
    }
}

fn id_of<B>(req: &Request<B>) -> &str {
    req.headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(UNKNOWN)
}

/// Copies the header into the request extensions.
pub async fn expose_request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = XRequestId(id_of(&req).to_owned());
    req.extensions_mut().insert(id);
    next.run(req).await
}

fn request_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %id_of(req),
        status = Empty,
        latency_ms = Empty,
    )
}

fn record_response(res: &Response, latency: Duration, span: &Span) {
    span.record("status", res.status().as_u16());
    span.record("latency_ms", latency.as_millis() as u64);
    tracing::debug!(parent: span, "response sent");
}

pub type HttpTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    fn(&Request<Body>) -> Span,
    (),
    fn(&Response, Duration, &Span),
>;

/// One `http_request` span per request carrying its id, status and latency.
pub fn trace_layer() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(request_span as fn(&Request<Body>) -> Span)
        .on_request(())
        .on_response(record_response as fn(&Response, Duration, &Span))
}
