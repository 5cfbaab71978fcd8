use std::sync::Arc;
use std::time::Instant;

use tracing::{field, info_span};

use crate::app::{Endpoint, Request, Response};
use crate::pipeline::{Config, Middleware};

/// Runs each request inside a `request` span carrying the request id,
/// method and path, and records status and latency on it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMiddleware;

impl Middleware<Request, Response> for TracingMiddleware {
    fn wrap(&self, inner: Endpoint, _config: Option<&Config>) -> Endpoint {
        Arc::new(move |req: Request| {
            let span = info_span!(
                "request",
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                status = field::Empty,
                latency_ms = field::Empty,
            );
            let _guard = span.enter();
            let start = Instant::now();
            let res = inner(req);
            span.record("status", res.status);
            span.record("latency_ms", start.elapsed().as_millis() as u64);
            res
        })
    }
}
