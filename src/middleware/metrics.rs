use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app::{Endpoint, Request, Response};
use crate::pipeline::{Config, Middleware};

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicUsize,
    errors: AtomicUsize,
    total_latency_ns: AtomicU64,
}

/// Request statistics shared by every endpoint the middleware wraps.
///
/// Clones share the same counters, so keep one clone to read them after
/// handing the other to a pipeline. All updates are relaxed atomics.
#[derive(Debug, Clone, Default)]
pub struct MetricsMiddleware {
    counters: Arc<Counters>,
}

impl MetricsMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that reached an endpoint.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.counters.requests.load(Ordering::Relaxed)
    }

    /// Responses with a 4xx or 5xx status.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.counters.errors.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_latency(&self) -> Duration {
        Duration::from_nanos(self.counters.total_latency_ns.load(Ordering::Relaxed))
    }

    /// Mean processing time; zero before the first request.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count() as u64;
        if count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.counters.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }
}

impl Middleware<Request, Response> for MetricsMiddleware {
    fn wrap(&self, inner: Endpoint, _config: Option<&Config>) -> Endpoint {
        let counters = Arc::clone(&self.counters);
        Arc::new(move |req: Request| {
            counters.requests.fetch_add(1, Ordering::Relaxed);
            let start = Instant::now();
            let res = inner(req);
            let elapsed = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
            counters
                .total_latency_ns
                .fetch_add(elapsed, Ordering::Relaxed);
            if res.status >= 400 {
                counters.errors.fetch_add(1, Ordering::Relaxed);
            }
            res
        })
    }
}
