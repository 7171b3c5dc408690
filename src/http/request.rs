//! Inbound HTTP request conversion.
//!
//! # Responsibilities
//! - Read the request id assigned by the request-id layer
//! - Turn an axum request into a dispatch [`Request`] (method, path, query,
//!   host, request id) with the site base path applied

use axum::http::{header, HeaderMap, Method, Uri};

use crate::dispatch::Dispatcher;
use crate::routing::Request;

/// Header carrying the request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// The request id, if present and valid UTF-8.
pub fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Build the dispatch request for an inbound HTTP request.
pub fn to_dispatch_request(dispatcher: &Dispatcher, method: &Method, uri: &Uri, headers: &HeaderMap) -> Request {
    let raw = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let mut builder = dispatcher.request_builder(method.as_str(), raw);

    let host = uri
        .authority()
        .map(|a| a.as_str().to_string())
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        });
    if let Some(host) = host {
        builder = builder.host(host);
    }
    if let Some(scheme) = uri.scheme_str() {
        builder = builder.scheme(scheme);
    }
    if let Some(id) = request_id(headers) {
        builder = builder.request_id(id);
    }
    builder.build()
}
