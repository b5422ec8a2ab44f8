//! Request logging middleware configuration

use axum::body::Body;
use http::Request;
use std::time::Duration;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, TraceLayer};
use tracing::{info_span, Span};

type MakeSpanFn = fn(&Request<Body>) -> Span;
type OnResponseFn = fn(&http::Response<Body>, Duration, &Span);

pub fn logging_layer(
) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MakeSpanFn, DefaultOnRequest, OnResponseFn>
{
    TraceLayer::new_for_http()
        .make_span_with(make_span as MakeSpanFn)
        .on_response(on_response as OnResponseFn)
}

fn make_span(request: &Request<Body>) -> Span {
    info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        query = ?request.uri().query(),
    )
}

fn on_response(response: &http::Response<Body>, latency: Duration, _span: &Span) {
    let status = response.status().as_u16();
    if response.status().is_server_error() {
        tracing::error!(status, latency_ms = latency.as_millis(), "request failed");
    } else if response.status().is_client_error() {
        tracing::warn!(status, latency_ms = latency.as_millis(), "request rejected");
    } else {
        tracing::info!(status, latency_ms = latency.as_millis(), "request completed");
    }
}
