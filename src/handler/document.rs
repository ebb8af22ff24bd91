//! Document endpoint
//!
//! Reads, parses and re-serializes the source document on every request.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, cache};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// Serve the source document as JSON
///
/// Read or parse failures become an error response (500) and are logged
/// with their kind; the connection and the process carry on.
pub async fn serve_document(ctx: &RequestContext, state: &AppState) -> Response<Full<Bytes>> {
    match state.document.render().await {
        Ok(body) => {
            let etag = cache::generate_etag(&body);
            if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
                return http::build_304_response(&etag);
            }
            http::build_json_response(Bytes::from(body), &etag, ctx.is_head)
        }
        Err(e) => {
            logger::log_document_error(&e);
            http::build_error_response(e.status_code(), ctx.is_head)
        }
    }
}
