//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: path matching, method
//! validation, dispatch to the document endpoint and access logging.

use crate::config::AppState;
use crate::handler::document;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, IF_NONE_MATCH, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// The only path with content
pub const DOCUMENT_PATH: &str = "/";

/// Request context encapsulating information needed for request processing
pub struct RequestContext {
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

impl RequestContext {
    fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            is_head: req.method() == Method::HEAD,
            if_none_match: req
                .headers()
                .get(IF_NONE_MATCH)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string),
        }
    }
}

/// Outcome of inspecting the request line and headers
enum Dispatch {
    Respond(Response<Full<Bytes>>),
    Document(RequestContext),
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let mut entry = state
        .config
        .logging
        .access_log
        .then(|| AccessLogEntry::from_request(&req, peer_addr));

    let dispatched = dispatch(&req);
    let mut response = match dispatched {
        Dispatch::Respond(resp) => resp,
        Dispatch::Document(ctx) => document::serve_document(&ctx, &state).await,
    };

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Path first, then method: unknown paths are 404 whatever the method
fn dispatch<B>(req: &Request<B>) -> Dispatch {
    if req.uri().path() != DOCUMENT_PATH {
        return Dispatch::Respond(http::build_404_response());
    }

    match check_http_method(req.method()) {
        Some(resp) => Dispatch::Respond(resp),
        None => Dispatch::Document(RequestContext::from_request(req)),
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}
